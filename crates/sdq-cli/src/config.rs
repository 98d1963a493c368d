//! TOML configuration for the `sdq` binary.
//!
//! ```toml
//! [backend]
//! base_url = "http://127.0.0.1:5000/"
//! timeout_secs = 30
//!
//! [parser]
//! dedupe = true
//!
//! [export]
//! edc_base_url = "https://edc.system.com/forms"
//! ```
//!
//! Every key is optional. Command-line flags override file values.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use sdq_client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, parse_base_url};
use sdq_generate::{DEFAULT_EDC_BASE_URL, EdcLink};
use sdq_ingest::IngestOptions;
use sdq_parse::ParseOptions;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Looked up in the working directory when no `--config` is given.
pub const CONFIG_FILENAME: &str = "sdq.toml";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Drop conditions repeated by overlapping rules.
    pub dedupe: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self { dedupe: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub edc_base_url: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            edc_base_url: DEFAULT_EDC_BASE_URL.to_string(),
        }
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub backend_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub no_dedupe: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdqConfig {
    pub backend: BackendConfig,
    pub parser: ParserConfig,
    pub export: ExportConfig,
}

impl SdqConfig {
    /// Load `path`, or `sdq.toml` in the working directory if it exists,
    /// or the defaults.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let local = Path::new(CONFIG_FILENAME);
                if local.is_file() {
                    Self::load(local)
                } else {
                    debug!("no config file, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Apply command-line overrides and re-validate.
    pub fn apply(&mut self, overrides: Overrides) -> Result<(), ConfigError> {
        if let Some(url) = overrides.backend_url {
            self.backend.base_url = url;
        }
        if let Some(secs) = overrides.timeout_secs {
            self.backend.timeout_secs = secs;
        }
        if overrides.no_dedupe {
            self.parser.dedupe = false;
        }
        self.validate()
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Check values that would otherwise fail later, mid-command.
    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_base_url(&self.backend.base_url).map_err(|e| ConfigError::Invalid {
            key: "backend.base_url",
            reason: e.to_string(),
        })?;
        if self.backend.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "backend.timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        self.edc_link()?;
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.backend.timeout_secs)
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            dedupe: self.parser.dedupe,
        }
    }

    pub fn edc_link(&self) -> Result<EdcLink, ConfigError> {
        EdcLink::new(&self.export.edc_base_url).map_err(|e| ConfigError::Invalid {
            key: "export.edc_base_url",
            reason: e.to_string(),
        })
    }

    pub fn ingest_options(&self) -> Result<IngestOptions, ConfigError> {
        Ok(IngestOptions {
            parse: self.parse_options(),
            edc: self.edc_link()?,
        })
    }
}

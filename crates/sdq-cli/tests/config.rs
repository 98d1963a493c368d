use std::fs;

use sdq_cli::config::{ConfigError, SdqConfig};
use tempfile::TempDir;

#[test]
fn loads_file_from_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sdq.toml");
    fs::write(
        &path,
        "[backend]\nbase_url = \"https://sdq.example.org/app\"\ntimeout_secs = 10\n\n\
         [export]\nedc_base_url = \"https://edc.example.org/study/forms\"\n",
    )
    .unwrap();

    let config = SdqConfig::load(&path).unwrap();
    assert_eq!(config.backend.base_url, "https://sdq.example.org/app");
    assert_eq!(config.timeout().as_secs(), 10);
    assert!(config.parser.dedupe);

    let options = config.ingest_options().unwrap();
    assert_eq!(
        options.edc.base().as_str(),
        "https://edc.example.org/study/forms"
    );
}

#[test]
fn explicit_path_must_exist() {
    let dir = TempDir::new().unwrap();
    let err = SdqConfig::resolve(Some(&dir.path().join("missing.toml"))).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn malformed_file_reports_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[parser]\ndedupe = \"sometimes\"\n").unwrap();

    let err = SdqConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("bad.toml"));
}

#[test]
fn invalid_values_are_rejected_on_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sdq.toml");
    fs::write(&path, "[backend]\nbase_url = \"ftp://example.org\"\n").unwrap();
    assert!(matches!(
        SdqConfig::load(&path),
        Err(ConfigError::Invalid {
            key: "backend.base_url",
            ..
        })
    ));
}

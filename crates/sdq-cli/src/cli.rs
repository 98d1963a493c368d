//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use sdq_model::{Domain, ScenarioTag};

#[derive(Parser)]
#[command(
    name = "sdq",
    version,
    about = "Clinical data-quality scenarios from plain-language descriptions",
    long_about = "Turn clinical check descriptions into structured conditions, a bounded\n\
                  query sentence and a pandas filter function.\n\n\
                  Ingests Data Review Plan CSV files into scenario packages and talks to\n\
                  the scenario backend, falling back to local generation when it is\n\
                  unreachable."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Include description text in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// Configuration file (default: ./sdq.toml when present).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL (overrides [backend] base_url).
    #[arg(long = "backend-url", value_name = "URL", global = true)]
    pub backend_url: Option<String>,

    /// Backend request timeout in seconds (overrides [backend] timeout_secs).
    #[arg(long = "timeout", value_name = "SECS", global = true)]
    pub timeout_secs: Option<u64>,

    /// Keep conditions produced twice by overlapping patterns.
    #[arg(long = "no-dedupe", global = true)]
    pub no_dedupe: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Extract conditions and connectives from a description.
    Parse(DescriptionArgs),

    /// Generate query text, filter code and CDASH items for a description.
    Generate(GenerateArgs),

    /// Convert a DRP CSV file into scenarios and exports.
    Ingest(IngestArgs),

    /// Ask the backend for child scenarios of a parent scenario.
    Suggest(SuggestArgs),

    /// Suggest a scenario name and tag for a description.
    Metadata(MetadataArgs),
}

#[derive(Args)]
pub struct DescriptionArgs {
    /// Check description, in plain language.
    #[arg(value_name = "DESCRIPTION")]
    pub description: String,

    /// Print JSON instead of tables.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub input: DescriptionArgs,

    /// Ask the backend first; local generation is used if it fails.
    #[arg(long = "backend")]
    pub backend: bool,

    /// Also print the SDQ prompt template.
    #[arg(long = "template")]
    pub template: bool,
}

#[derive(Args)]
pub struct IngestArgs {
    /// DRP CSV file.
    #[arg(value_name = "DRP_CSV")]
    pub input: PathBuf,

    /// Write the scenarios back out as CSV, with generated code.
    #[arg(long = "csv-out", value_name = "PATH")]
    pub csv_out: Option<PathBuf>,

    /// Write the scenario package as JSON.
    #[arg(long = "package", value_name = "PATH")]
    pub package: Option<PathBuf>,

    /// Print the domain groups after the scenario table.
    #[arg(long = "group")]
    pub group: bool,

    /// Rank domain groups by these domains (repeatable).
    #[arg(long = "recommend-domain", value_name = "CODE")]
    pub recommend_domains: Vec<Domain>,

    /// Rank domain groups by these tags (repeatable).
    #[arg(long = "recommend-tag", value_name = "TAG")]
    pub recommend_tags: Vec<ScenarioTag>,
}

#[derive(Args)]
pub struct SuggestArgs {
    /// Parent scenario name.
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Parent scenario description.
    #[arg(value_name = "DESCRIPTION")]
    pub description: String,

    /// Print JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct MetadataArgs {
    #[command(flatten)]
    pub input: DescriptionArgs,

    /// Ask the backend first; the local heuristics are used if it fails.
    #[arg(long = "backend")]
    pub backend: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

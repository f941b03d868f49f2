use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use faver_common::observability::LogFormat;
use faver_config::FaverConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Text,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

/// Discover and download website favicons.
#[derive(Debug, Parser)]
#[command(name = "faver", version)]
pub struct Cli {
    /// Target URLs; read from stdin, one per line, when omitted
    pub targets: Vec<String>,

    /// Config file (YAML/TOML/JSON); defaults to <config dir>/faver/faver.yaml if present
    #[arg(short, long, env = "FAVER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory icons are written into
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Accept invalid TLS certificates. Weakens transport security.
    #[arg(long)]
    pub insecure: bool,

    /// Abort all remaining targets after the first failure
    #[arg(long)]
    pub fail_fast: bool,

    #[arg(long, value_enum)]
    pub log_format: Option<LogFormatArg>,
}

impl Cli {
    /// Flags win over file and environment values.
    pub fn apply(&self, cfg: &mut FaverConfig) {
        if let Some(dir) = &self.output_dir {
            cfg.output.dir = dir.clone();
        }
        if self.insecure {
            cfg.http.accept_invalid_certs = true;
        }
        if let Some(format) = self.log_format {
            cfg.logging.format = format.into();
        }
    }
}

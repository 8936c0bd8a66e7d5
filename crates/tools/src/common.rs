//! Common utilities and configuration for tools

use anyhow::{Context, Result};
use clap::Args;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Global configuration options
#[derive(Debug, Clone, Default, Serialize, Deserialize, Args)]
pub struct GlobalConfig {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long, global = true)]
    pub debug: bool,

    /// Configuration file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

impl GlobalConfig {
    /// Log level selected by the flags
    pub fn log_level(&self) -> tracing::Level {
        if self.debug {
            tracing::Level::DEBUG
        } else if self.verbose {
            tracing::Level::INFO
        } else {
            tracing::Level::WARN
        }
    }
}

/// Initialize logging based on configuration
pub fn init_logging(config: &GlobalConfig) {
    tracing_subscriber::fmt()
        .with_max_level(config.log_level())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Where command input comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Text(String),
    File(PathBuf),
}

impl InputSource {
    /// Pick the source from `--text` / `--file`
    pub fn from_args(text: Option<String>, file: Option<PathBuf>) -> Result<Self> {
        match (text, file) {
            (Some(text), None) => Ok(InputSource::Text(text)),
            (None, Some(file)) => Ok(InputSource::File(file)),
            (Some(_), Some(_)) => anyhow::bail!("--text and --file are mutually exclusive"),
            (None, None) => anyhow::bail!("Either --text or --file must be specified"),
        }
    }

    /// Read the input as text
    pub fn read_text(&self) -> Result<String> {
        match self {
            InputSource::Text(text) => Ok(text.clone()),
            InputSource::File(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read input file: {:?}", path)),
        }
    }

    /// Read the input as raw bytes
    pub fn read_bytes(&self) -> Result<Vec<u8>> {
        match self {
            InputSource::Text(text) => Ok(text.as_bytes().to_vec()),
            InputSource::File(path) => {
                std::fs::read(path).with_context(|| format!("Failed to read input file: {:?}", path))
            }
        }
    }
}

/// Parse hex digits into bytes; whitespace between pairs is ignored
pub fn parse_hex(input: &str) -> Result<Vec<u8>> {
    let digits: Vec<char> = input.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.len() % 2 != 0 {
        anyhow::bail!("Odd number of hex digits");
    }
    digits
        .chunks(2)
        .map(|pair| {
            let s: String = pair.iter().collect();
            u8::from_str_radix(&s, 16).with_context(|| format!("Invalid hex byte: {}", s))
        })
        .collect()
}

/// Format bytes as space-separated lowercase hex
pub fn format_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Write `data` to `path`, or to stdout when no path is given
pub fn write_output(path: Option<&Path>, data: &[u8]) -> Result<()> {
    use std::io::Write;

    match path {
        Some(path) => std::fs::write(path, data)
            .with_context(|| format!("Failed to write output file: {:?}", path)),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(data)?;
            stdout.flush()?;
            Ok(())
        }
    }
}

//! Subcommand implementations

use crate::common::{format_hex, parse_hex, InputSource};
use crate::config::{load_translate_map, ToolConfig};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use textcodec_codecs::{codecs, translate};
use textcodec_core::prelude::*;
use tracing::{debug, info};

/// Encode text into bytes
#[derive(Parser, Debug, Clone)]
pub struct EncodeArgs {
    /// Target encoding (defaults to the config, then utf-8)
    #[arg(short, long)]
    pub encoding: Option<String>,

    /// Error handler name (defaults to the config, then strict)
    #[arg(long)]
    pub errors: Option<String>,

    /// Input text
    #[arg(short, long)]
    pub text: Option<String>,

    /// Input file, read as UTF-8
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the result as hex
    #[arg(long)]
    pub hex: bool,
}

/// Decode bytes into text
#[derive(Parser, Debug, Clone)]
pub struct DecodeArgs {
    /// Source encoding (defaults to the config, then utf-8)
    #[arg(short, long)]
    pub encoding: Option<String>,

    /// Error handler name (defaults to the config, then strict)
    #[arg(long)]
    pub errors: Option<String>,

    /// Input given as text; with --hex, as hex digits
    #[arg(short, long)]
    pub text: Option<String>,

    /// Input file
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Treat the input as hex digits
    #[arg(long)]
    pub hex: bool,
}

/// Translate text through a code point map
#[derive(Parser, Debug, Clone)]
pub struct TranslateArgs {
    /// TOML map of "c" or "U+XXXX" keys to a string, a code point or false
    #[arg(short, long)]
    pub map: PathBuf,

    /// Input text
    #[arg(short, long)]
    pub text: Option<String>,

    /// Input file, read as UTF-8
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

fn resolve<'a>(flag: &'a Option<String>, fallback: &'a str) -> &'a str {
    flag.as_deref().unwrap_or(fallback)
}

/// Run `encode`, returning the bytes to write
pub fn run_encode(args: &EncodeArgs, config: &ToolConfig) -> Result<Vec<u8>> {
    let encoding = resolve(&args.encoding, config.encoding());
    let errors = resolve(&args.errors, config.errors());
    let text = InputSource::from_args(args.text.clone(), args.file.clone())?.read_text()?;

    info!(encoding, errors, chars = text.chars().count(), "encoding");
    let codec = codecs().lookup(encoding)?;
    let bytes = codec
        .encode(&text, errors)
        .with_context(|| format!("Failed to encode as {}", encoding))?;
    debug!(bytes = bytes.len(), "encoded");

    if args.hex {
        let mut line = format_hex(&bytes);
        line.push('\n');
        Ok(line.into_bytes())
    } else {
        Ok(bytes)
    }
}

/// Run `decode`, returning the text to write
pub fn run_decode(args: &DecodeArgs, config: &ToolConfig) -> Result<String> {
    let encoding = resolve(&args.encoding, config.encoding());
    let errors = resolve(&args.errors, config.errors());
    let source = InputSource::from_args(args.text.clone(), args.file.clone())?;
    let bytes = if args.hex {
        parse_hex(&source.read_text()?)?
    } else {
        source.read_bytes()?
    };

    info!(encoding, errors, bytes = bytes.len(), "decoding");
    let codec = codecs().lookup(encoding)?;
    codec
        .decode(&bytes, errors)
        .with_context(|| format!("Failed to decode as {}", encoding))
}

/// Run `translate`, returning the translated text
pub fn run_translate(args: &TranslateArgs) -> Result<String> {
    let map = load_translate_map(&args.map)?;
    let text = InputSource::from_args(args.text.clone(), args.file.clone())?.read_text()?;

    info!(entries = map.len(), chars = text.chars().count(), "translating");
    translate(&text, &map).context("Failed to translate")
}

/// Registered handler names, one per line
pub fn list_handlers() -> String {
    let mut out = String::new();
    for name in handler_names() {
        out.push_str(&name);
        out.push('\n');
    }
    out
}

/// The codec registry as JSON
pub fn list_codecs() -> Result<String> {
    let mut json = codecs().export_json()?;
    json.push('\n');
    Ok(json)
}

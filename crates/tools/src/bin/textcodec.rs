//! textcodec - encode, decode and translate text with pluggable error handlers

use anyhow::Result;
use clap::{Parser, Subcommand};
use textcodec_core::registry;
use textcodec_tools::commands::{
    list_codecs, list_handlers, run_decode, run_encode, run_translate,
};
use textcodec_tools::common::{init_logging, write_output};
use textcodec_tools::{DecodeArgs, EncodeArgs, GlobalConfig, ToolConfig, TranslateArgs};
use tracing::{debug, info};

/// Text codec tool
#[derive(Parser)]
#[command(name = "textcodec")]
#[command(about = "Encode, decode and translate text with named error handlers")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode text into bytes
    Encode(EncodeArgs),
    /// Decode bytes into text
    Decode(DecodeArgs),
    /// Translate text through a code point map
    Translate(TranslateArgs),
    /// List registered error handlers
    Handlers,
    /// Print the available codecs as JSON
    Codecs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.global);

    let config = match &cli.global.config {
        Some(path) => {
            debug!("Loading config from {:?}", path);
            ToolConfig::from_file(path)?
        }
        None => ToolConfig::default(),
    };
    config.register_handlers(registry::global())?;

    match cli.command {
        Commands::Encode(args) => {
            let bytes = run_encode(&args, &config)?;
            write_output(args.output.as_deref(), &bytes)?;
            info!("Encoded {} bytes", bytes.len());
        }
        Commands::Decode(args) => {
            let text = run_decode(&args, &config)?;
            write_output(args.output.as_deref(), text.as_bytes())?;
            info!("Decoded {} characters", text.chars().count());
        }
        Commands::Translate(args) => {
            let text = run_translate(&args)?;
            write_output(args.output.as_deref(), text.as_bytes())?;
        }
        Commands::Handlers => write_output(None, list_handlers().as_bytes())?,
        Commands::Codecs => write_output(None, list_codecs()?.as_bytes())?,
    }

    Ok(())
}

//! textcodec tools library

pub mod commands;
pub mod common;
pub mod config;

pub use commands::{DecodeArgs, EncodeArgs, TranslateArgs};
pub use common::{GlobalConfig, InputSource};
pub use config::ToolConfig;

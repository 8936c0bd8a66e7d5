//! Configuration management for textcodec tools

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use textcodec_codecs::MapEntry;
use textcodec_core::prelude::*;
use tracing::info;

pub const DEFAULT_ENCODING: &str = "utf-8";
pub const DEFAULT_ERRORS: &str = "strict";

/// Tool configuration, read from TOML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub default_encoding: Option<String>,
    pub default_errors: Option<String>,
    #[serde(rename = "alias")]
    pub aliases: Vec<HandlerAlias>,
    #[serde(rename = "substitute")]
    pub substitutes: Vec<Substitute>,
}

/// Register an existing handler under another name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerAlias {
    pub name: String,
    pub target: String,
}

/// Register a handler that replaces every failing span with fixed text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substitute {
    pub name: String,
    pub replacement: String,
}

impl ToolConfig {
    /// Load configuration from TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: Self = toml::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    pub fn encoding(&self) -> &str {
        self.default_encoding.as_deref().unwrap_or(DEFAULT_ENCODING)
    }

    pub fn errors(&self) -> &str {
        self.default_errors.as_deref().unwrap_or(DEFAULT_ERRORS)
    }

    /// Register the configured substitutes and aliases in `registry`.
    ///
    /// Substitutes go first so an alias may point at one.
    pub fn register_handlers(&self, registry: &HandlerRegistry) -> Result<()> {
        for sub in &self.substitutes {
            let replaced = registry.is_registered(&sub.name);
            registry
                .register(&sub.name, substitute_handler(sub.replacement.clone()))
                .with_context(|| format!("Failed to register substitute '{}'", sub.name))?;
            info!(name = %sub.name, replaced, "registered substitute handler");
        }

        for alias in &self.aliases {
            let handler = registry
                .lookup(&alias.target)
                .with_context(|| format!("Alias '{}' points at an unknown handler", alias.name))?;
            let replaced = registry.is_registered(&alias.name);
            registry
                .register(&alias.name, handler)
                .with_context(|| format!("Failed to register alias '{}'", alias.name))?;
            info!(
                name = %alias.name,
                target = %alias.target,
                replaced,
                "registered handler alias"
            );
        }

        Ok(())
    }
}

/// Handler replying with `replacement` and resuming after the span
pub fn substitute_handler(replacement: String) -> ErrorHandler {
    ErrorHandler::new(move |ctx| {
        ctx.start()?;
        let end = ctx.end()?;
        let end = i64::try_from(end).map_err(|_| CodecError::BadFieldType { field: "end" })?;
        Ok(Reply::pair(replacement.clone(), end))
    })
}

/// Parse a translate-map key: `U+XXXX` or a single character
fn parse_map_key(key: &str) -> Result<u32> {
    if let Some(hex) = key.strip_prefix("U+").or_else(|| key.strip_prefix("u+")) {
        return u32::from_str_radix(hex, 16)
            .with_context(|| format!("Invalid code point key: {}", key));
    }
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c as u32),
        _ => anyhow::bail!("Map key must be a single character or U+XXXX: {:?}", key),
    }
}

fn parse_map_value(key: &str, value: &toml::Value) -> Result<MapEntry> {
    match value {
        toml::Value::String(s) => Ok(MapEntry::Text(s.clone())),
        toml::Value::Integer(n) => u32::try_from(*n)
            .map(MapEntry::Code)
            .with_context(|| format!("Code point for {:?} out of range: {}", key, n)),
        toml::Value::Boolean(false) => Ok(MapEntry::Undefined),
        other => anyhow::bail!(
            "Map value for {:?} must be a string, an integer or false, got {}",
            key,
            other.type_str()
        ),
    }
}

/// Parse a translate map from TOML text
pub fn parse_translate_map(content: &str) -> Result<BTreeMap<u32, MapEntry>> {
    let table: toml::Table = toml::from_str(content).context("Failed to parse translate map")?;
    table
        .iter()
        .map(|(key, value)| Ok((parse_map_key(key)?, parse_map_value(key, value)?)))
        .collect()
}

/// Load a translate map from a TOML file
pub fn load_translate_map(path: &Path) -> Result<BTreeMap<u32, MapEntry>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read translate map: {:?}", path))?;
    parse_translate_map(&content)
}

//! Codec registry for managing available codecs

use crate::single_byte::{Charset, SingleByteDecoder, SingleByteEncoder};
use crate::utf8::{Utf8Decoder, Utf8Encoder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use textcodec_core::prelude::*;
use tracing::debug;

/// Information about a codec
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodecInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub codec_type: CodecType,
    pub aliases: Vec<String>,
    pub operations: Vec<Operation>,
}

/// Type of codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodecType {
    SingleByte,
    Multibyte,
}

/// A codec that can be run by the step engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    SingleByte(Charset),
    Utf8,
}

impl Codec {
    /// Encode `text`, recovering with the handler named `errors`
    pub fn encode(self, text: &str, errors: &str) -> Result<Vec<u8>> {
        self.encode_with(&Engine::global(), text, errors)
    }

    /// Decode `bytes`, recovering with the handler named `errors`
    pub fn decode(self, bytes: &[u8], errors: &str) -> Result<String> {
        self.decode_with(&Engine::global(), bytes, errors)
    }

    pub fn encode_with(self, engine: &Engine<'_>, text: &str, errors: &str) -> Result<Vec<u8>> {
        let chars: Vec<char> = text.chars().collect();
        match self {
            Codec::SingleByte(charset) => engine.run(&SingleByteEncoder(charset), &chars, errors),
            Codec::Utf8 => engine.run(&Utf8Encoder, &chars, errors),
        }
    }

    pub fn decode_with(self, engine: &Engine<'_>, bytes: &[u8], errors: &str) -> Result<String> {
        match self {
            Codec::SingleByte(charset) => engine.run(&SingleByteDecoder(charset), bytes, errors),
            Codec::Utf8 => engine.run(&Utf8Decoder, bytes, errors),
        }
    }
}

/// Lower-case and fold `_` and spaces into `-`
fn normalize(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            '_' | ' ' => '-',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

/// Registry for managing available codecs
pub struct CodecRegistry {
    codecs: HashMap<String, (CodecInfo, Codec)>,
    aliases: HashMap<String, String>,
}

impl CodecRegistry {
    /// Create a new codec registry
    pub fn new() -> Self {
        let mut registry = Self {
            codecs: HashMap::new(),
            aliases: HashMap::new(),
        };

        registry.register_builtin_codecs();
        registry
    }

    /// Register built-in codecs
    fn register_builtin_codecs(&mut self) {
        self.insert(
            CodecInfo {
                id: "ascii".to_string(),
                name: "ASCII".to_string(),
                description: "7-bit US-ASCII".to_string(),
                codec_type: CodecType::SingleByte,
                aliases: vec!["us-ascii".to_string(), "646".to_string()],
                operations: vec![Operation::Encode, Operation::Decode],
            },
            Codec::SingleByte(Charset::Ascii),
        );

        self.insert(
            CodecInfo {
                id: "latin-1".to_string(),
                name: "Latin-1".to_string(),
                description: "ISO-8859-1, the first 256 code points".to_string(),
                codec_type: CodecType::SingleByte,
                aliases: vec![
                    "latin1".to_string(),
                    "iso-8859-1".to_string(),
                    "iso8859-1".to_string(),
                    "l1".to_string(),
                ],
                operations: vec![Operation::Encode, Operation::Decode],
            },
            Codec::SingleByte(Charset::Latin1),
        );

        self.insert(
            CodecInfo {
                id: "iso-8859-15".to_string(),
                name: "Latin-9".to_string(),
                description: "ISO-8859-15, Latin-1 with the euro sign".to_string(),
                codec_type: CodecType::SingleByte,
                aliases: vec![
                    "iso8859-15".to_string(),
                    "latin-9".to_string(),
                    "latin9".to_string(),
                ],
                operations: vec![Operation::Encode, Operation::Decode],
            },
            Codec::SingleByte(Charset::Latin9),
        );

        self.insert(
            CodecInfo {
                id: "utf-8".to_string(),
                name: "UTF-8".to_string(),
                description: "Unicode, 1 to 4 bytes per code point".to_string(),
                codec_type: CodecType::Multibyte,
                aliases: vec!["utf8".to_string(), "u8".to_string()],
                operations: vec![Operation::Encode, Operation::Decode],
            },
            Codec::Utf8,
        );
    }

    fn insert(&mut self, info: CodecInfo, codec: Codec) {
        for alias in &info.aliases {
            self.aliases.insert(normalize(alias), info.id.clone());
        }
        self.codecs.insert(info.id.clone(), (info, codec));
    }

    fn resolve(&self, name: &str) -> Option<&(CodecInfo, Codec)> {
        let key = normalize(name);
        let id = self.aliases.get(&key).unwrap_or(&key);
        self.codecs.get(id)
    }

    /// Find a codec by name or alias
    pub fn lookup(&self, name: &str) -> Result<Codec> {
        let found = self.resolve(name).map(|(_, codec)| *codec);
        debug!(name, found = found.is_some(), "codec lookup");
        found.ok_or_else(|| CodecError::UnknownEncoding {
            name: name.to_string(),
        })
    }

    /// List all available codecs, ordered by id
    pub fn list(&self) -> Vec<&CodecInfo> {
        let mut infos: Vec<&CodecInfo> = self.codecs.values().map(|(info, _)| info).collect();
        infos.sort_by(|a, b| a.id.cmp(&b.id));
        infos
    }

    /// Check if a codec is available
    pub fn is_available(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Export codec registry to JSON
    pub fn export_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.list())
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_creation() {
        let registry = CodecRegistry::new();
        assert!(registry.is_available("ascii"));
        assert!(registry.is_available("latin-1"));
        assert!(registry.is_available("iso-8859-15"));
        assert!(registry.is_available("utf-8"));
    }

    #[test]
    fn test_alias_resolution() {
        let registry = CodecRegistry::new();
        assert_eq!(registry.lookup("ISO_8859_1").unwrap(), Codec::SingleByte(Charset::Latin1));
        assert_eq!(registry.lookup("UTF8").unwrap(), Codec::Utf8);
        assert_eq!(registry.lookup("Latin 9").unwrap(), Codec::SingleByte(Charset::Latin9));
        assert_eq!(registry.lookup("us-ascii").unwrap(), Codec::SingleByte(Charset::Ascii));
    }

    #[test]
    fn test_unknown_encoding() {
        let registry = CodecRegistry::new();
        let err = registry.lookup("ebcdic").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Lookup);
    }

    #[test]
    fn test_export_json() {
        let registry = CodecRegistry::new();
        let json = registry.export_json().unwrap();
        let parsed: Vec<CodecInfo> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 4);
        assert_eq!(parsed[0].id, "ascii");
        assert_eq!(parsed[3].codec_type, CodecType::Multibyte);
        assert_eq!(parsed[0].operations, vec![Operation::Encode, Operation::Decode]);
        assert!(json.contains("\"encode\""));
    }
}

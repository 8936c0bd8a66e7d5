//! textcodec codecs - character sets driven by the error-handling engine
//!
//! This crate provides the standard single-byte and UTF-8 codecs, the
//! charmap adapter for caller-supplied code point tables and `translate`.
//! Every codec reports unmappable spans through the handler protocol in
//! `textcodec-core`.

pub mod charmap;
pub mod registry;
pub mod single_byte;
pub mod utf8;

pub use charmap::{charmap_decode, charmap_encode, translate, CharMap, MapEntry};
pub use registry::{Codec, CodecInfo, CodecRegistry};
pub use textcodec_core::{CodecError, ErrorKind, Result};

use std::sync::LazyLock;

static CODECS: LazyLock<CodecRegistry> = LazyLock::new(CodecRegistry::new);

/// The shared codec registry
pub fn codecs() -> &'static CodecRegistry {
    &CODECS
}

/// Encode `text` with the named codec, recovering through the handler named `errors`
pub fn encode(text: &str, encoding: &str, errors: &str) -> Result<Vec<u8>> {
    CODECS.lookup(encoding)?.encode(text, errors)
}

/// Decode `bytes` with the named codec, recovering through the handler named `errors`
pub fn decode(bytes: &[u8], encoding: &str, errors: &str) -> Result<String> {
    CODECS.lookup(encoding)?.decode(bytes, errors)
}

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        charmap::{
            charmap_decode, charmap_encode, translate, CharMap, CharmapDecoder, CharmapEncoder,
            MapEntry, Translator,
        },
        decode, encode,
        registry::{Codec, CodecInfo, CodecRegistry, CodecType},
        single_byte::Charset,
    };
}

//! Error types for textcodec

use crate::context::ErrorContext;
use thiserror::Error;

/// Broad classification of a [`CodecError`].
///
/// Callers that only care about the category of failure (for example "the
/// handler broke its contract" versus "the data could not be mapped") match on
/// this instead of on individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Data could not be mapped and no handler recovered from it.
    Unicode,
    /// A handler, context or mapping value had the wrong shape.
    Type,
    /// A handler asked to resume outside the input.
    Index,
    /// A handler or encoding name is not registered.
    Lookup,
    /// A value was well-typed but not acceptable.
    Value,
    /// A user-supplied mapping failed while being consulted.
    Mapping,
}

/// Codec error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodecError {
    #[error("{0}")]
    Encode(Box<ErrorContext>),

    #[error("{0}")]
    Decode(Box<ErrorContext>),

    #[error("{0}")]
    Translate(Box<ErrorContext>),

    #[error("error handler must return a (str, int) tuple, got {got}")]
    BadReply { got: String },

    #[error("don't know how to handle {operation} in error callback")]
    WrongContext { operation: String },

    #[error("error context has no '{field}' attribute")]
    MissingField { field: &'static str },

    #[error("error context attribute '{field}' has the wrong type")]
    BadFieldType { field: &'static str },

    #[error("character mapping must be in range({limit:#x}), got {value}")]
    MappingRange { value: u32, limit: u32 },

    #[error("character mapping must return {expected}")]
    MappingType { expected: &'static str },

    #[error("handler name must be a non-empty string")]
    InvalidHandlerName,

    #[error("position {position} from error handler out of bounds (input length {len})")]
    PositionOutOfRange { position: i64, len: usize },

    #[error("unknown error handler name '{name}'")]
    UnknownHandler { name: String },

    #[error("unknown encoding: {name}")]
    UnknownEncoding { name: String },

    #[error("invalid span {start}..{end} for input of length {len}")]
    InvalidSpan { start: usize, end: usize, len: usize },

    #[error("built-in error handler '{name}' cannot be replaced")]
    BuiltinHandler { name: String },

    #[error("character mapping lookup failed: {msg}")]
    MappingLookup { msg: String },
}

impl CodecError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CodecError::Encode(_) | CodecError::Decode(_) | CodecError::Translate(_) => {
                ErrorKind::Unicode
            }
            CodecError::BadReply { .. }
            | CodecError::WrongContext { .. }
            | CodecError::MissingField { .. }
            | CodecError::BadFieldType { .. }
            | CodecError::MappingRange { .. }
            | CodecError::MappingType { .. }
            | CodecError::InvalidHandlerName => ErrorKind::Type,
            CodecError::PositionOutOfRange { .. } => ErrorKind::Index,
            CodecError::UnknownHandler { .. } | CodecError::UnknownEncoding { .. } => {
                ErrorKind::Lookup
            }
            CodecError::InvalidSpan { .. } | CodecError::BuiltinHandler { .. } => ErrorKind::Value,
            CodecError::MappingLookup { .. } => ErrorKind::Mapping,
        }
    }

    /// The failing context, for the three unrecovered-data variants.
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            CodecError::Encode(ctx) | CodecError::Decode(ctx) | CodecError::Translate(ctx) => {
                Some(ctx)
            }
            _ => None,
        }
    }
}

/// Result type for textcodec operations
pub type Result<T> = std::result::Result<T, CodecError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ErrorContext;

    #[test]
    fn test_kind_classification() {
        let ctx = ErrorContext::encode("ascii", "\u{3042}", 0, 1, "ouch").unwrap();
        assert_eq!(CodecError::Encode(Box::new(ctx)).kind(), ErrorKind::Unicode);
        assert_eq!(CodecError::InvalidHandlerName.kind(), ErrorKind::Type);
        assert_eq!(
            CodecError::PositionOutOfRange { position: 3, len: 2 }.kind(),
            ErrorKind::Index
        );
        assert_eq!(
            CodecError::UnknownHandler { name: "test.unknown".into() }.kind(),
            ErrorKind::Lookup
        );
        assert_eq!(
            CodecError::MappingLookup { msg: "boom".into() }.kind(),
            ErrorKind::Mapping
        );
    }

    #[test]
    fn test_unicode_error_displays_context() {
        let ctx = ErrorContext::decode("ascii", b"g\xfcrk".to_vec(), 1, 2, "ouch").unwrap();
        let err = CodecError::Decode(Box::new(ctx));
        assert_eq!(
            err.to_string(),
            "'ascii' codec can't decode byte 0xfc in position 1: ouch"
        );
        assert!(err.context().is_some());
    }
}

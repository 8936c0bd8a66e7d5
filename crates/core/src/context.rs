//! Error contexts describing one unprocessable span of codec input

use crate::{CodecError, Result};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use std::sync::Arc;

/// Kind of codec operation that produced an error context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Characters to bytes
    Encode,
    /// Bytes to characters
    Decode,
    /// Characters to characters through a mapping table
    Translate,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Encode => "encode",
            Operation::Decode => "decode",
            Operation::Translate => "translate",
        })
    }
}

/// The full input buffer of a codec operation, shared read-only
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Units {
    Text(Arc<[char]>),
    Bytes(Arc<[u8]>),
}

impl Units {
    /// Number of units (characters or bytes)
    pub fn len(&self) -> usize {
        match self {
            Units::Text(chars) => chars.len(),
            Units::Bytes(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_text(&self) -> bool {
        matches!(self, Units::Text(_))
    }
}

impl From<&str> for Units {
    fn from(s: &str) -> Self {
        Units::Text(s.chars().collect())
    }
}

impl From<String> for Units {
    fn from(s: String) -> Self {
        Units::from(s.as_str())
    }
}

impl From<Vec<char>> for Units {
    fn from(chars: Vec<char>) -> Self {
        Units::Text(chars.into())
    }
}

impl From<Arc<[char]>> for Units {
    fn from(chars: Arc<[char]>) -> Self {
        Units::Text(chars)
    }
}

impl From<&[u8]> for Units {
    fn from(bytes: &[u8]) -> Self {
        Units::Bytes(bytes.into())
    }
}

impl From<Vec<u8>> for Units {
    fn from(bytes: Vec<u8>) -> Self {
        Units::Bytes(bytes.into())
    }
}

impl From<Arc<[u8]>> for Units {
    fn from(bytes: Arc<[u8]>) -> Self {
        Units::Bytes(bytes)
    }
}

/// Context fields, as named by [`ErrorContext::strip_field`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Encoding,
    Object,
    Start,
    End,
    Reason,
}

/// One contiguous span `[start, end)` of input that a codec could not process.
///
/// Contexts are validated on construction, but every field is still read
/// through a checked accessor: a context can be rebuilt without a field (see
/// [`ErrorContext::strip_field`]) and readers must report that as a
/// [`CodecError::MissingField`] rather than assume the field is there.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorContext {
    operation: Operation,
    encoding: Option<String>,
    object: Option<Units>,
    start: Option<usize>,
    end: Option<usize>,
    reason: Option<String>,
}

impl ErrorContext {
    /// Context for a failed encode (`object` must be text)
    pub fn encode(
        encoding: impl Into<String>,
        object: impl Into<Units>,
        start: usize,
        end: usize,
        reason: impl Into<String>,
    ) -> Result<Self> {
        Self::build(Operation::Encode, Some(encoding.into()), object.into(), start, end, reason.into())
    }

    /// Context for a failed decode (`object` must be bytes)
    pub fn decode(
        encoding: impl Into<String>,
        object: impl Into<Units>,
        start: usize,
        end: usize,
        reason: impl Into<String>,
    ) -> Result<Self> {
        Self::build(Operation::Decode, Some(encoding.into()), object.into(), start, end, reason.into())
    }

    /// Context for a failed translate (`object` must be text)
    pub fn translate(
        object: impl Into<Units>,
        start: usize,
        end: usize,
        reason: impl Into<String>,
    ) -> Result<Self> {
        Self::build(Operation::Translate, None, object.into(), start, end, reason.into())
    }

    pub(crate) fn build(
        operation: Operation,
        encoding: Option<String>,
        object: Units,
        start: usize,
        end: usize,
        reason: String,
    ) -> Result<Self> {
        let wants_text = operation != Operation::Decode;
        if object.is_text() != wants_text {
            return Err(CodecError::BadFieldType { field: "object" });
        }
        if start >= end || end > object.len() {
            return Err(CodecError::InvalidSpan { start, end, len: object.len() });
        }
        Ok(Self {
            operation,
            encoding,
            object: Some(object),
            start: Some(start),
            end: Some(end),
            reason: Some(reason),
        })
    }

    /// Drop one field, producing a context that every reader must reject.
    #[doc(hidden)]
    pub fn strip_field(mut self, field: Field) -> Self {
        match field {
            Field::Encoding => self.encoding = None,
            Field::Object => self.object = None,
            Field::Start => self.start = None,
            Field::End => self.end = None,
            Field::Reason => self.reason = None,
        }
        self
    }

    /// Swap in an object without checking its unit type or the span.
    #[doc(hidden)]
    pub fn replace_object_unchecked(mut self, object: Units) -> Self {
        self.object = Some(object);
        self
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Codec name; translate contexts have none.
    pub fn encoding(&self) -> Result<&str> {
        self.encoding
            .as_deref()
            .ok_or(CodecError::MissingField { field: "encoding" })
    }

    pub fn object(&self) -> Result<&Units> {
        self.object
            .as_ref()
            .ok_or(CodecError::MissingField { field: "object" })
    }

    /// The object as characters; fails for byte objects.
    pub fn text(&self) -> Result<&[char]> {
        match self.object()? {
            Units::Text(chars) => Ok(chars),
            Units::Bytes(_) => Err(CodecError::BadFieldType { field: "object" }),
        }
    }

    /// The object as bytes; fails for character objects.
    pub fn bytes(&self) -> Result<&[u8]> {
        match self.object()? {
            Units::Bytes(bytes) => Ok(bytes),
            Units::Text(_) => Err(CodecError::BadFieldType { field: "object" }),
        }
    }

    pub fn start(&self) -> Result<usize> {
        self.start.ok_or(CodecError::MissingField { field: "start" })
    }

    pub fn end(&self) -> Result<usize> {
        self.end.ok_or(CodecError::MissingField { field: "end" })
    }

    pub fn reason(&self) -> Result<&str> {
        self.reason
            .as_deref()
            .ok_or(CodecError::MissingField { field: "reason" })
    }

    /// Characters in `[start, end)`, clamped to the object.
    pub fn failed_text(&self) -> Result<&[char]> {
        let text = self.text()?;
        let (start, end) = clamp(self.start()?, self.end()?, text.len());
        Ok(&text[start..end])
    }

    /// Bytes in `[start, end)`, clamped to the object.
    pub fn failed_bytes(&self) -> Result<&[u8]> {
        let bytes = self.bytes()?;
        let (start, end) = clamp(self.start()?, self.end()?, bytes.len());
        Ok(&bytes[start..end])
    }

    /// Convert into the unrecovered error for this context's operation.
    pub fn into_error(self) -> CodecError {
        match self.operation {
            Operation::Encode => CodecError::Encode(Box::new(self)),
            Operation::Decode => CodecError::Decode(Box::new(self)),
            Operation::Translate => CodecError::Translate(Box::new(self)),
        }
    }
}

fn clamp(start: usize, end: usize, len: usize) -> (usize, usize) {
    let end = end.min(len);
    (start.min(end), end)
}

/// Append `\xhh`, `\uhhhh` or `\Uhhhhhhhh` for `c`, by magnitude.
pub fn push_backslash_escape(out: &mut String, c: char) {
    let code = c as u32;
    // Writing to a String cannot fail.
    let _ = if code <= 0xff {
        write!(out, "\\x{:02x}", code)
    } else if code <= 0xffff {
        write!(out, "\\u{:04x}", code)
    } else {
        write!(out, "\\U{:08x}", code)
    };
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (Ok(object), Ok(start), Ok(end), Ok(reason)) =
            (self.object(), self.start(), self.end(), self.reason())
        else {
            return write!(f, "malformed {} error context", self.operation);
        };
        let single = end == start + 1 && start < object.len();
        let prefix = match self.encoding() {
            Ok(name) => format!("'{}' codec can't {}", name, self.operation),
            Err(_) => format!("can't {}", self.operation),
        };
        match (object, single) {
            (Units::Text(chars), true) => {
                let mut escaped = String::new();
                push_backslash_escape(&mut escaped, chars[start]);
                write!(f, "{} character '{}' in position {}: {}", prefix, escaped, start, reason)
            }
            (Units::Bytes(bytes), true) => write!(
                f,
                "{} byte 0x{:02x} in position {}: {}",
                prefix, bytes[start], start, reason
            ),
            (Units::Text(_), false) => write!(
                f,
                "{} characters in position {}-{}: {}",
                prefix,
                start,
                end.saturating_sub(1),
                reason
            ),
            (Units::Bytes(_), false) => write!(
                f,
                "{} bytes in position {}-{}: {}",
                prefix,
                start,
                end.saturating_sub(1),
                reason
            ),
        }
    }
}

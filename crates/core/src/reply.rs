//! Handler replies and their validation

use crate::{CodecError, Result};
use std::fmt;

/// A loosely typed value returned by an error handler.
///
/// Handlers live on the far side of a plugin boundary, so the engine accepts
/// whatever shape they hand back and checks it with [`Reply::validate`]. Only
/// a pair `(Text, Int)` is a usable reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Int(i64),
    Text(String),
    None,
    Tuple(Vec<Reply>),
}

impl Reply {
    /// The well-formed `(replacement, position)` reply.
    pub fn pair(replacement: impl Into<String>, position: i64) -> Self {
        Reply::Tuple(vec![Reply::Text(replacement.into()), Reply::Int(position)])
    }

    /// Check the shape of the reply and split it into its parts.
    pub fn validate(self) -> Result<Replacement> {
        let got = self.to_string();
        if let Reply::Tuple(items) = self {
            let mut items = items.into_iter();
            if let (Some(Reply::Text(text)), Some(Reply::Int(position)), None) =
                (items.next(), items.next(), items.next())
            {
                return Ok(Replacement { text, position });
            }
        }
        Err(CodecError::BadReply { got })
    }
}

impl From<(&str, i64)> for Reply {
    fn from((text, position): (&str, i64)) -> Self {
        Reply::pair(text, position)
    }
}

impl From<(String, i64)> for Reply {
    fn from((text, position): (String, i64)) -> Self {
        Reply::pair(text, position)
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Int(n) => write!(f, "{}", n),
            Reply::Text(s) => write!(f, "{:?}", s),
            Reply::None => f.write_str("None"),
            Reply::Tuple(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                if items.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// A validated handler reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    /// Characters to splice into the output
    pub text: String,
    /// Resume position; negative values count from the end of the input
    pub position: i64,
}

impl Replacement {
    /// Resolve the resume position against an input of `len` units.
    ///
    /// A negative position is taken relative to `len`; the result must lie in
    /// `0..=len`.
    pub fn resolve_position(&self, len: usize) -> Result<usize> {
        let out_of_range = || CodecError::PositionOutOfRange { position: self.position, len };
        let len_i = i64::try_from(len).map_err(|_| out_of_range())?;
        let pos = if self.position < 0 { self.position + len_i } else { self.position };
        if (0..=len_i).contains(&pos) {
            usize::try_from(pos).map_err(|_| out_of_range())
        } else {
            Err(out_of_range())
        }
    }
}

//! Error handlers: the built-in recovery policies and user callables

use crate::context::{push_backslash_escape, ErrorContext, Operation};
use crate::reply::Reply;
use crate::{CodecError, Result};
use std::fmt::{self, Write as _};
use std::sync::Arc;

/// Signature of a user-supplied error handler
pub type HandlerFn = dyn Fn(&ErrorContext) -> Result<Reply> + Send + Sync;

/// The standard recovery policies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Strict,
    Ignore,
    Replace,
    XmlCharRefReplace,
    BackslashReplace,
}

impl Builtin {
    pub const ALL: [Builtin; 5] = [
        Builtin::Strict,
        Builtin::Ignore,
        Builtin::Replace,
        Builtin::XmlCharRefReplace,
        Builtin::BackslashReplace,
    ];

    /// Registry name of the policy
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Strict => "strict",
            Builtin::Ignore => "ignore",
            Builtin::Replace => "replace",
            Builtin::XmlCharRefReplace => "xmlcharrefreplace",
            Builtin::BackslashReplace => "backslashreplace",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }

    fn call(self, ctx: &ErrorContext) -> Result<Reply> {
        match self {
            Builtin::Strict => strict_errors(ctx),
            Builtin::Ignore => ignore_errors(ctx),
            Builtin::Replace => replace_errors(ctx),
            Builtin::XmlCharRefReplace => xmlcharrefreplace_errors(ctx),
            Builtin::BackslashReplace => backslashreplace_errors(ctx),
        }
    }
}

/// A registered error handler.
///
/// Equality is identity: two built-ins are equal when they are the same
/// policy, two custom handlers when they share the same callable.
#[derive(Clone)]
pub enum ErrorHandler {
    Builtin(Builtin),
    Custom(Arc<HandlerFn>),
}

/// The registered `strict` handler. Compare lookups against this binding:
/// wrapping [`strict_errors`] with [`ErrorHandler::new`] creates a distinct
/// custom handler that is not equal to it.
pub const STRICT: ErrorHandler = ErrorHandler::Builtin(Builtin::Strict);
pub const IGNORE: ErrorHandler = ErrorHandler::Builtin(Builtin::Ignore);
pub const REPLACE: ErrorHandler = ErrorHandler::Builtin(Builtin::Replace);
pub const XMLCHARREFREPLACE: ErrorHandler = ErrorHandler::Builtin(Builtin::XmlCharRefReplace);
pub const BACKSLASHREPLACE: ErrorHandler = ErrorHandler::Builtin(Builtin::BackslashReplace);

impl ErrorHandler {
    /// Wrap a closure as a handler
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&ErrorContext) -> Result<Reply> + Send + Sync + 'static,
    {
        ErrorHandler::Custom(Arc::new(handler))
    }

    /// Invoke the handler for one failure
    pub fn handle(&self, ctx: &ErrorContext) -> Result<Reply> {
        match self {
            ErrorHandler::Builtin(builtin) => builtin.call(ctx),
            ErrorHandler::Custom(handler) => handler(ctx),
        }
    }
}

impl PartialEq for ErrorHandler {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ErrorHandler::Builtin(a), ErrorHandler::Builtin(b)) => a == b,
            (ErrorHandler::Custom(a), ErrorHandler::Custom(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            _ => false,
        }
    }
}

impl Eq for ErrorHandler {}

impl fmt::Debug for ErrorHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorHandler::Builtin(b) => write!(f, "ErrorHandler::Builtin({})", b.name()),
            ErrorHandler::Custom(h) => write!(f, "ErrorHandler::Custom({:p})", Arc::as_ptr(h)),
        }
    }
}

/// Read every field a built-in relies on, rejecting malformed contexts up front.
fn checked(ctx: &ErrorContext) -> Result<()> {
    match ctx.operation() {
        Operation::Decode => ctx.bytes().map(drop)?,
        Operation::Encode | Operation::Translate => ctx.text().map(drop)?,
    }
    ctx.start()?;
    ctx.end()?;
    Ok(())
}

fn end_position(ctx: &ErrorContext) -> Result<i64> {
    let end = ctx.end()?;
    i64::try_from(end).map_err(|_| CodecError::BadFieldType { field: "end" })
}

fn encode_only(ctx: &ErrorContext) -> Result<()> {
    match ctx.operation() {
        Operation::Encode => Ok(()),
        other => Err(CodecError::WrongContext { operation: other.to_string() }),
    }
}

/// Fail with the context as the operation's error.
pub fn strict_errors(ctx: &ErrorContext) -> Result<Reply> {
    checked(ctx)?;
    Err(ctx.clone().into_error())
}

/// Drop the failing span.
pub fn ignore_errors(ctx: &ErrorContext) -> Result<Reply> {
    checked(ctx)?;
    Ok(Reply::pair("", end_position(ctx)?))
}

/// `?` per character when encoding, U+FFFD per character when translating,
/// a single U+FFFD per failing byte sequence when decoding.
pub fn replace_errors(ctx: &ErrorContext) -> Result<Reply> {
    checked(ctx)?;
    let replacement = match ctx.operation() {
        Operation::Encode => "?".repeat(ctx.failed_text()?.len()),
        Operation::Translate => "\u{FFFD}".repeat(ctx.failed_text()?.len()),
        Operation::Decode => "\u{FFFD}".to_string(),
    };
    Ok(Reply::pair(replacement, end_position(ctx)?))
}

/// Decimal numeric character references; encode only.
pub fn xmlcharrefreplace_errors(ctx: &ErrorContext) -> Result<Reply> {
    encode_only(ctx)?;
    checked(ctx)?;
    let mut out = String::new();
    for &c in ctx.failed_text()? {
        let _ = write!(out, "&#{};", c as u32);
    }
    Ok(Reply::pair(out, end_position(ctx)?))
}

/// `\x`, `\u` or `\U` escapes per character; encode only.
pub fn backslashreplace_errors(ctx: &ErrorContext) -> Result<Reply> {
    encode_only(ctx)?;
    checked(ctx)?;
    let mut out = String::new();
    for &c in ctx.failed_text()? {
        push_backslash_escape(&mut out, c);
    }
    Ok(Reply::pair(out, end_position(ctx)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Field, Units};
    use crate::ErrorKind;

    fn enc(s: &str) -> ErrorContext {
        ErrorContext::encode("ascii", s, 0, s.chars().count(), "ouch").unwrap()
    }

    fn dec() -> ErrorContext {
        ErrorContext::decode("ascii", b"\xff".to_vec(), 0, 1, "ouch").unwrap()
    }

    fn tr() -> ErrorContext {
        ErrorContext::translate("\u{3042}", 0, 1, "ouch").unwrap()
    }

    #[test]
    fn test_strict_reraises_context() {
        let err = strict_errors(&enc("\u{3042}")).unwrap_err();
        assert_eq!(err, CodecError::Encode(Box::new(enc("\u{3042}"))));
        assert!(matches!(strict_errors(&dec()), Err(CodecError::Decode(_))));
        assert!(matches!(strict_errors(&tr()), Err(CodecError::Translate(_))));
    }

    #[test]
    fn test_ignore() {
        assert_eq!(ignore_errors(&enc("\u{3042}")).unwrap(), Reply::pair("", 1));
        assert_eq!(ignore_errors(&dec()).unwrap(), Reply::pair("", 1));
        assert_eq!(ignore_errors(&tr()).unwrap(), Reply::pair("", 1));
    }

    #[test]
    fn test_replace() {
        assert_eq!(replace_errors(&enc("\u{3042}")).unwrap(), Reply::pair("?", 1));
        assert_eq!(replace_errors(&dec()).unwrap(), Reply::pair("\u{FFFD}", 1));
        assert_eq!(replace_errors(&tr()).unwrap(), Reply::pair("\u{FFFD}", 1));
        assert_eq!(replace_errors(&enc("DEF")).unwrap(), Reply::pair("???", 3));
    }

    #[test]
    fn test_replace_rejects_foreign_objects() {
        let bad_encode = ErrorContext::encode("ascii", "x", 0, 1, "bad")
            .unwrap()
            .replace_object_unchecked(Units::from(Vec::<u8>::new()));
        assert_eq!(replace_errors(&bad_encode).unwrap_err().kind(), ErrorKind::Type);

        let bad_decode = dec().replace_object_unchecked(Units::from(""));
        assert_eq!(replace_errors(&bad_decode).unwrap_err().kind(), ErrorKind::Type);
    }

    #[test]
    fn test_xmlcharrefreplace() {
        let codes = [0u32, 1, 9, 10, 99, 100, 999, 1000, 9999, 10000, 0x3042];
        let s: String = codes.iter().filter_map(|&c| char::from_u32(c)).collect();
        let expected: String = codes.iter().map(|c| format!("&#{};", c)).collect();
        assert_eq!(
            xmlcharrefreplace_errors(&enc(&s)).unwrap(),
            Reply::pair(expected, codes.len() as i64)
        );
        assert_eq!(
            xmlcharrefreplace_errors(&enc("\u{3042}")).unwrap(),
            Reply::pair("&#12354;", 1)
        );
    }

    #[test]
    fn test_backslashreplace() {
        let cases = [
            ("\u{3042}", "\\u3042"),
            ("\u{0}", "\\x00"),
            ("\u{ff}", "\\xff"),
            ("\u{100}", "\\u0100"),
            ("\u{ffff}", "\\uffff"),
            ("\u{10000}", "\\U00010000"),
            ("\u{10ffff}", "\\U0010ffff"),
        ];
        for (input, expected) in cases {
            assert_eq!(backslashreplace_errors(&enc(input)).unwrap(), Reply::pair(expected, 1));
        }
    }

    #[test]
    fn test_encode_only_handlers_reject_other_directions() {
        for handler in [xmlcharrefreplace_errors, backslashreplace_errors] {
            assert_eq!(handler(&dec()).unwrap_err().kind(), ErrorKind::Type);
            assert_eq!(handler(&tr()).unwrap_err().kind(), ErrorKind::Type);
        }
    }

    #[test]
    fn test_missing_fields_are_type_errors() {
        let no_end = dec().strip_field(Field::End);
        let no_start = tr().strip_field(Field::Start);
        let no_object = tr().strip_field(Field::Object);
        for builtin in Builtin::ALL {
            for ctx in [&no_end, &no_start, &no_object] {
                if let Err(err) = ErrorHandler::Builtin(builtin).handle(ctx) {
                    assert_eq!(err.kind(), ErrorKind::Type, "{} on {:?}", builtin.name(), ctx);
                } else {
                    panic!("{} accepted a malformed context", builtin.name());
                }
            }
        }
    }

    #[test]
    fn test_handler_identity() {
        assert_eq!(STRICT, ErrorHandler::Builtin(Builtin::Strict));
        assert_ne!(STRICT, IGNORE);

        let a = ErrorHandler::new(|ctx| ignore_errors(ctx));
        let b = ErrorHandler::new(|ctx| ignore_errors(ctx));
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_builtin_names_round_trip() {
        for builtin in Builtin::ALL {
            assert_eq!(Builtin::from_name(builtin.name()), Some(builtin));
        }
        assert_eq!(Builtin::from_name("test.unknown"), None);
    }
}

//! textcodec core - error handling for text codecs
//!
//! This crate provides the error-handler protocol shared by every codec:
//! error contexts describing an unprocessable span, the built-in recovery
//! policies, the named handler registry and the step engine that drives a
//! character-set mapping and splices handler replies into its output.

pub mod context;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod registry;
pub mod reply;

pub use error::{CodecError, ErrorKind, Result};
pub use registry::{handler_names, lookup_error, register_error};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        context::{ErrorContext, Operation, Units},
        engine::{encode_replacement, Engine, MappingStep, Sink, Step},
        error::{CodecError, ErrorKind, Result},
        handlers::{
            backslashreplace_errors, ignore_errors, replace_errors, strict_errors,
            xmlcharrefreplace_errors, Builtin, ErrorHandler, BACKSLASHREPLACE, IGNORE, REPLACE,
            STRICT, XMLCHARREFREPLACE,
        },
        registry::{handler_names, lookup_error, register_error, HandlerRegistry},
        reply::{Replacement, Reply},
    };
}

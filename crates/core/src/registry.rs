//! Registry of named error handlers

use crate::handlers::{Builtin, ErrorHandler};
use crate::{CodecError, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

static GLOBAL: LazyLock<HandlerRegistry> = LazyLock::new(HandlerRegistry::new);

/// Table of error handlers by name.
///
/// Seeded with the built-in policies, which cannot be replaced. Other names
/// may be registered or overwritten at any time; nothing is ever removed.
pub struct HandlerRegistry {
    handlers: RwLock<HashMap<String, ErrorHandler>>,
}

impl HandlerRegistry {
    /// Create a new registry holding only the built-ins
    pub fn new() -> Self {
        let handlers = Builtin::ALL
            .into_iter()
            .map(|b| (b.name().to_string(), ErrorHandler::Builtin(b)))
            .collect();
        Self {
            handlers: RwLock::new(handlers),
        }
    }

    /// Register `handler` under `name`, replacing any previous user entry.
    ///
    /// Built-in names are reserved: registering one fails with
    /// [`CodecError::BuiltinHandler`] and leaves the built-in in place, so a
    /// lookup of a built-in name always yields the built-in policy.
    pub fn register(&self, name: &str, handler: ErrorHandler) -> Result<()> {
        if name.is_empty() {
            return Err(CodecError::InvalidHandlerName);
        }
        if Builtin::from_name(name).is_some() {
            return Err(CodecError::BuiltinHandler {
                name: name.to_string(),
            });
        }

        let previous = self.handlers.write().insert(name.to_string(), handler);
        debug!(name, replaced = previous.is_some(), "registered error handler");
        Ok(())
    }

    /// Get the handler registered under `name`
    pub fn lookup(&self, name: &str) -> Result<ErrorHandler> {
        self.handlers
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| CodecError::UnknownHandler {
                name: name.to_string(),
            })
    }

    /// Check if a handler is registered
    pub fn is_registered(&self, name: &str) -> bool {
        self.handlers.read().contains_key(name)
    }

    /// All registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// The process-wide registry
pub fn global() -> &'static HandlerRegistry {
    &GLOBAL
}

/// Register a handler in the process-wide registry
pub fn register_error(name: &str, handler: ErrorHandler) -> Result<()> {
    GLOBAL.register(name, handler)
}

/// Look up a handler in the process-wide registry
pub fn lookup_error(name: &str) -> Result<ErrorHandler> {
    GLOBAL.lookup(name)
}

/// Names in the process-wide registry, sorted
pub fn handler_names() -> Vec<String> {
    GLOBAL.names()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{
        ignore_errors, BACKSLASHREPLACE, IGNORE, REPLACE, STRICT, XMLCHARREFREPLACE,
    };
    use crate::ErrorKind;
    use std::thread;

    #[test]
    fn test_builtins_are_identity_stable() {
        assert_eq!(lookup_error("strict").unwrap(), STRICT);
        assert_eq!(lookup_error("ignore").unwrap(), IGNORE);
        assert_eq!(lookup_error("replace").unwrap(), REPLACE);
        assert_eq!(lookup_error("xmlcharrefreplace").unwrap(), XMLCHARREFREPLACE);
        assert_eq!(lookup_error("backslashreplace").unwrap(), BACKSLASHREPLACE);
    }

    #[test]
    fn test_strict_binding_identity() {
        let wrapped = ErrorHandler::new(crate::handlers::strict_errors);
        assert_eq!(lookup_error("strict").unwrap(), STRICT);
        assert_ne!(lookup_error("strict").unwrap(), wrapped);
        assert_eq!(wrapped, wrapped.clone());
    }

    #[test]
    fn test_unknown_handler() {
        let err = lookup_error("test.unknown").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Lookup);
    }

    #[test]
    fn test_bad_register_calls() {
        let registry = HandlerRegistry::new();
        assert_eq!(
            registry.register("", IGNORE).unwrap_err().kind(),
            ErrorKind::Type
        );
        assert_eq!(
            registry.register("strict", IGNORE).unwrap_err().kind(),
            ErrorKind::Value
        );
        assert_eq!(registry.lookup("strict").unwrap(), STRICT);
    }

    #[test]
    fn test_builtin_under_another_name() {
        let registry = HandlerRegistry::new();
        registry
            .register("test.strict", registry.lookup("strict").unwrap())
            .unwrap();
        assert_eq!(registry.lookup("test.strict").unwrap(), STRICT);
    }

    #[test]
    fn test_overwrite_user_entry() {
        let registry = HandlerRegistry::new();
        let first = ErrorHandler::new(ignore_errors);
        let second = ErrorHandler::new(ignore_errors);
        registry.register("test.handler", first.clone()).unwrap();
        assert_eq!(registry.lookup("test.handler").unwrap(), first);
        registry.register("test.handler", second.clone()).unwrap();
        assert_eq!(registry.lookup("test.handler").unwrap(), second);
        assert!(registry.names().contains(&"test.handler".to_string()));
    }

    #[test]
    fn test_concurrent_registration() {
        let registry = HandlerRegistry::new();
        thread::scope(|s| {
            for t in 0..8 {
                let registry = &registry;
                s.spawn(move || {
                    for i in 0..50 {
                        let name = format!("test.t{}.h{}", t, i);
                        registry.register(&name, IGNORE).unwrap();
                        assert_eq!(registry.lookup(&name).unwrap(), IGNORE);
                        assert_eq!(registry.lookup("strict").unwrap(), STRICT);
                    }
                });
            }
        });
        assert_eq!(registry.names().len(), Builtin::ALL.len() + 8 * 50);
    }
}

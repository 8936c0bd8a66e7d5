//! The codec step engine: drives a mapping step over an input buffer and
//! runs the error-handler protocol whenever the step rejects a span.
//!
//! A run moves through three states. While *scanning*, the step maps units at
//! the cursor. A rejection coalesces into the longest run of units rejected
//! for the same reason, and the handler is *invoked* with a fresh
//! [`ErrorContext`]. A valid reply is spliced into the output and scanning
//! *resumes* at the position the handler chose, which may lie before, at or
//! after the failing span. Any invalid reply ends the run with an error and
//! no partial output.

use crate::context::{ErrorContext, Operation, Units};
use crate::handlers::ErrorHandler;
use crate::registry::{self, HandlerRegistry};
use crate::Result;
use std::borrow::Cow;
use tracing::{debug, trace};

/// Outcome of asking a step to map the unit(s) at one position
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// `consumed` input units were mapped and their output appended
    Mapped { consumed: usize },
    /// The `len` units starting at the position cannot be mapped
    Rejected {
        len: usize,
        reason: Cow<'static, str>,
    },
}

impl Step {
    pub fn mapped(consumed: usize) -> Self {
        Step::Mapped { consumed }
    }

    pub fn rejected(len: usize, reason: impl Into<Cow<'static, str>>) -> Self {
        Step::Rejected {
            len,
            reason: reason.into(),
        }
    }
}

/// Output buffer of a run; probing must be able to undo appended output.
pub trait Sink: Default {
    fn mark(&self) -> usize;
    fn rewind(&mut self, mark: usize);
}

impl Sink for Vec<u8> {
    fn mark(&self) -> usize {
        self.len()
    }

    fn rewind(&mut self, mark: usize) {
        self.truncate(mark);
    }
}

impl Sink for String {
    fn mark(&self) -> usize {
        self.len()
    }

    fn rewind(&mut self, mark: usize) {
        self.truncate(mark);
    }
}

/// Input unit type; knows how to share an input buffer with error contexts.
pub trait CodeUnit: Copy {
    fn share(input: &[Self]) -> Units;
}

impl CodeUnit for char {
    fn share(input: &[Self]) -> Units {
        Units::Text(input.into())
    }
}

impl CodeUnit for u8 {
    fn share(input: &[Self]) -> Units {
        Units::Bytes(input.into())
    }
}

/// One character set or translation table, seen one position at a time.
pub trait MappingStep {
    type Unit: CodeUnit;
    type Output: Sink;

    /// Operation this step performs
    const OPERATION: Operation;

    /// Codec name reported in error contexts
    fn encoding(&self) -> &str;

    /// Map the unit(s) at `pos`. Errors other than a rejection (for example
    /// a failing user table) abort the run unchanged.
    fn map(&self, input: &[Self::Unit], pos: usize, out: &mut Self::Output) -> Result<Step>;

    /// Append a handler's replacement text. Returns `false` if the text
    /// cannot be represented in the output.
    fn splice(&self, replacement: &str, out: &mut Self::Output) -> Result<bool>;

    /// Whether adjacent rejections with the same reason share one handler call
    fn coalesces(&self) -> bool {
        true
    }
}

/// Splice a replacement by encoding it through the same step.
pub fn encode_replacement<S>(step: &S, replacement: &str, out: &mut S::Output) -> Result<bool>
where
    S: MappingStep<Unit = char>,
{
    let chars: Vec<char> = replacement.chars().collect();
    let mut pos = 0;
    while pos < chars.len() {
        match step.map(&chars, pos, out)? {
            Step::Mapped { consumed } => pos += consumed.max(1),
            Step::Rejected { .. } => return Ok(false),
        }
    }
    Ok(true)
}

enum Policy<'a> {
    Named(&'a str),
    Fixed(ErrorHandler),
}

/// Runs mapping steps against a handler registry
#[derive(Clone, Copy)]
pub struct Engine<'r> {
    registry: &'r HandlerRegistry,
}

impl Engine<'static> {
    /// Engine backed by the process-wide registry
    pub fn global() -> Self {
        Self {
            registry: registry::global(),
        }
    }
}

impl<'r> Engine<'r> {
    pub fn with_registry(registry: &'r HandlerRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r HandlerRegistry {
        self.registry
    }

    /// Run `step` over `input`, recovering through the handler named `errors`.
    ///
    /// The name is resolved at the first failure, so an unknown name only
    /// fails runs that actually need a handler.
    pub fn run<S: MappingStep>(&self, step: &S, input: &[S::Unit], errors: &str) -> Result<S::Output> {
        self.drive(step, input, Policy::Named(errors))
    }

    /// Run `step` with a handler given directly rather than by name
    pub fn run_with<S: MappingStep>(
        &self,
        step: &S,
        input: &[S::Unit],
        handler: ErrorHandler,
    ) -> Result<S::Output> {
        self.drive(step, input, Policy::Fixed(handler))
    }

    fn drive<S: MappingStep>(&self, step: &S, input: &[S::Unit], policy: Policy<'_>) -> Result<S::Output> {
        let mut out = S::Output::default();
        let mut pos = 0;
        let mut shared: Option<Units> = None;
        let mut handler: Option<ErrorHandler> = None;

        while pos < input.len() {
            let (len, reason) = match step.map(input, pos, &mut out)? {
                Step::Mapped { consumed } => {
                    debug_assert!(consumed > 0, "mapping step made no progress");
                    pos += consumed.max(1);
                    continue;
                }
                Step::Rejected { len, reason } => (len, reason),
            };

            let start = pos;
            let mut end = (start + len.max(1)).min(input.len());
            if step.coalesces() {
                let mark = out.mark();
                while end < input.len() {
                    match step.map(input, end, &mut out)? {
                        Step::Rejected { len, reason: next } if next == reason => {
                            end = (end + len.max(1)).min(input.len());
                        }
                        _ => break,
                    }
                }
                out.rewind(mark);
            }

            let object = shared.get_or_insert_with(|| S::Unit::share(input)).clone();
            let encoding = (S::OPERATION != Operation::Translate).then(|| step.encoding().to_string());
            let ctx = ErrorContext::build(S::OPERATION, encoding, object, start, end, reason.into_owned())?;

            let active = match handler.take() {
                Some(active) => active,
                None => match &policy {
                    Policy::Fixed(fixed) => fixed.clone(),
                    Policy::Named(name) => self.registry.lookup(name)?,
                },
            };

            trace!(encoding = step.encoding(), start, end, "invoking error handler");
            let reply = active.handle(&ctx);
            handler = Some(active);
            let replacement = reply
                .and_then(|reply| reply.validate())
                .inspect_err(|err| debug!(encoding = step.encoding(), start, end, %err, "error handler failed"))?;
            let resume = replacement.resolve_position(input.len())?;

            if !step.splice(&replacement.text, &mut out)? {
                // Re-read the span: the context is the only record of it now.
                let unencodable = ErrorContext::build(
                    S::OPERATION,
                    ctx.encoding().ok().map(str::to_string),
                    ctx.object()?.clone(),
                    ctx.start()?,
                    ctx.end()?,
                    "error handler replacement cannot be encoded".to_string(),
                )?;
                return Err(unencodable.into_error());
            }

            trace!(resume, "resuming after error handler");
            pos = resume;
        }

        Ok(out)
    }
}

/// Run `step` through the process-wide registry
pub fn run<S: MappingStep>(step: &S, input: &[S::Unit], errors: &str) -> Result<S::Output> {
    Engine::global().run(step, input, errors)
}

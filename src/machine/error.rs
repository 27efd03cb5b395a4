use thiserror::Error;

use crate::machine::filter::Compaction;

/// A specialized `Result` type for state-machine operations.
pub type MachineResult<T> = Result<T, MachineError>;

/// The error type handler and filter callables report their own failures
/// with. Boxed so that implementations can surface whatever error type their
/// business logic produces.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while a state machine declares its bindings. These are
/// non-recoverable startup failures: a machine whose configuration is
/// rejected never starts.
#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error("filter bound to '{tag}' which is a query type; only commands are logged and filtered")]
    FilterOnQuery { tag: &'static str },
}

/// Structured error type produced by dispatch and filtering.
#[derive(Error, Debug)]
pub enum MachineError {
    /// No exact, ancestor, or universal handler matched the operation. This
    /// is a registration bug in the concrete state machine, not a transient
    /// condition.
    #[error("unknown operation type: {0}")]
    UnknownOperation(&'static str),

    /// No exact, ancestor, or universal filter matched the command for the
    /// requested compaction mode.
    #[error("unknown command type '{tag}' for {mode} compaction")]
    UnknownCommand {
        tag: &'static str,
        mode: Compaction,
    },

    /// A query commit was handed to the compaction filter. Queries are never
    /// logged, so there is nothing to compact.
    #[error("cannot filter '{0}': queries are never logged")]
    NotFilterable(&'static str),

    /// A handler or filter callable reported a failure. The offending
    /// operation is named so that callers receive a uniform error shape
    /// regardless of what the callable did internally.
    #[error("operation '{operation}' failed: {source}")]
    Application {
        operation: &'static str,
        #[source]
        source: HandlerError,
    },
}

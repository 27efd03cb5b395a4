use std::fmt;

use crate::machine::operation::{Kind, Operation, OperationType};
use crate::machine::session::SessionId;

// One committed log entry presented for application or compaction review.
//
// The commit only borrows its operation value. The replay engine is free to
// recycle or release the underlying storage as soon as `apply` or `filter`
// returns, so neither the dispatcher nor a handler can hold on to a commit
// past the call; the borrow makes that a compile error rather than a
// discipline.
pub struct Commit<'a> {
    index: u64,
    session: Option<SessionId>,
    operation: &'a dyn Operation,
}

impl<'a> Commit<'a> {
    pub fn new(index: u64, operation: &'a dyn Operation) -> Self {
        Commit {
            index,
            session: None,
            operation,
        }
    }

    // Attaches the session that submitted the operation, when known.
    pub fn with_session(mut self, session: SessionId) -> Self {
        self.session = Some(session);
        self
    }

    // Position of this entry in the log.
    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn session(&self) -> Option<SessionId> {
        self.session
    }

    pub fn operation_type(&self) -> &'static OperationType {
        self.operation.operation_type()
    }

    pub fn kind(&self) -> Kind {
        self.operation_type().kind()
    }

    pub fn operation(&self) -> &dyn Operation {
        self.operation
    }

    // Recovers the concrete operation value. Returns None if the commit
    // holds a different type than the handler expects.
    pub fn operation_as<T: Operation + 'static>(&self) -> Option<&T> {
        self.operation.as_any().downcast_ref::<T>()
    }
}

impl fmt::Debug for Commit<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Commit")
            .field("index", &self.index)
            .field("type", &self.operation_type().name())
            .finish()
    }
}

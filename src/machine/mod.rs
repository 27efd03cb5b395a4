// The state-machine application layer of a replicated log. The consensus
// engine hands committed entries to a `Machine`, which resolves each one to
// the handler its `StateMachine` implementation registered and applies it;
// during log compaction the same resolution policy picks the filter that
// decides whether a historical command can be discarded.

mod commit;
pub use commit::Commit;

mod dispatch;
pub use dispatch::Machine;

mod error;
pub use error::{HandlerError, MachineError, MachineResult, RegistrationError};

mod filter;
pub use filter::Compaction;

mod operation;
pub use operation::{Ancestors, Kind, Operation, OperationType};

mod registry;
pub use registry::{FilterHandler, OperationHandler, Registry};

mod response;
pub use response::{DecodeError, ErrorCode, Response};

mod session;
pub use session::{Session, SessionId};

mod state_machine;
pub use state_machine::StateMachine;

#[cfg(test)]
pub(crate) mod testing;

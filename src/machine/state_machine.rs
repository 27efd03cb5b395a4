use crate::machine::error::RegistrationError;
use crate::machine::registry::Registry;
use crate::machine::session::Session;

// The contract a replicated application implements. The consensus engine
// drives the machine exclusively through the owning `Machine` host, which
// applies committed operations in log order on every replica.
//
// Handlers and filters are declared once, in `configure`, which runs when
// the host is constructed. All replicas must register identical bindings;
// anything nondeterministic in a handler breaks the guarantee that replicas
// converge on the same state.
pub trait StateMachine: Sized {
    // Declares the handler and filter bindings for this machine.
    fn configure(registry: &mut Registry<Self>) -> Result<(), RegistrationError>;

    // Called exactly once when a new session becomes visible to the state
    // machine.
    fn register(&mut self, _session: &Session) {}

    // Called when a session times out without being closed. State held for
    // the session should be reclaimed here.
    fn expire(&mut self, _session: &Session) {}

    // Called on graceful session termination.
    fn close(&mut self, _session: &Session) {}
}

use std::fmt;

// Identifies a client session. Sessions are owned by the surrounding
// replication engine; the state machine only ever sees their identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

// An opaque handle for one client connection, passed to the lifecycle
// hooks. Equality is identity equality on the session id.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
}

impl Session {
    pub fn new(id: SessionId) -> Self {
        Session { id }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }
}

impl PartialEq for Session {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Session {}

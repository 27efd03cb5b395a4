use std::any::Any;
use std::fmt::Debug;

// The two disjoint kinds of operations a state machine accepts. Commands
// mutate state and are durably logged, which also makes them eligible for
// compaction. Queries are read-only and never enter the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Command,
    Query,
}

// A tag identifying the shape of one state-machine call. Tags are declared
// as statics and form a lattice through their parent links, which is what
// handler resolution walks when no exact binding exists.
//
// Tag names must be unique within a state machine; they double as the
// lookup keys for bindings and resolution caches.
#[derive(Debug)]
pub struct OperationType {
    name: &'static str,
    kind: Kind,
    parent: Option<&'static OperationType>,
}

impl OperationType {
    // Declares a command tag, optionally as a child of another tag.
    pub const fn command(name: &'static str, parent: Option<&'static OperationType>) -> Self {
        OperationType {
            name,
            kind: Kind::Command,
            parent,
        }
    }

    // Declares a query tag, optionally as a child of another tag.
    pub const fn query(name: &'static str, parent: Option<&'static OperationType>) -> Self {
        OperationType {
            name,
            kind: Kind::Query,
            parent,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn is_command(&self) -> bool {
        self.kind == Kind::Command
    }

    // Walks the tag lattice starting at this tag, nearest first.
    pub fn ancestors(&'static self) -> Ancestors {
        Ancestors { next: Some(self) }
    }

    // Returns true if this tag equals the supplied tag or descends from it.
    pub fn is_a(&'static self, ancestor: &OperationType) -> bool {
        self.ancestors().any(|tag| tag.name == ancestor.name)
    }
}

impl PartialEq for OperationType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for OperationType {}

// Iterator over a tag and its transitive parents, nearest first.
pub struct Ancestors {
    next: Option<&'static OperationType>,
}

impl Iterator for Ancestors {
    type Item = &'static OperationType;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent;
        Some(current)
    }
}

// A concrete operation value carried by a commit. Implementations report
// their runtime tag and expose themselves for downcasting so that handlers
// can recover the concrete type.
pub trait Operation: Debug + Send + Sync {
    fn operation_type(&self) -> &'static OperationType;

    fn as_any(&self) -> &dyn Any;
}

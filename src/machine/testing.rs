use bytes::Bytes;
use std::any::Any;

use crate::machine::commit::Commit;
use crate::machine::error::RegistrationError;
use crate::machine::filter::Compaction;
use crate::machine::operation::{Operation, OperationType};
use crate::machine::registry::Registry;
use crate::machine::session::Session;
use crate::machine::state_machine::StateMachine;

// Tag lattice used across the dispatch and filter tests. SET and INCREMENT
// are siblings under WRITE; ORPHAN stands alone; LEN is the only query.
pub static WRITE: OperationType = OperationType::command("test.write", None);
pub static SET: OperationType = OperationType::command("test.set", Some(&WRITE));
pub static INCREMENT: OperationType = OperationType::command("test.increment", Some(&WRITE));
pub static ORPHAN: OperationType = OperationType::command("test.orphan", None);
pub static EXPLODE: OperationType = OperationType::command("test.explode", None);
pub static LEN: OperationType = OperationType::query("test.len", None);

// An operation value whose tag is chosen at construction time.
#[derive(Debug)]
pub struct TestOp {
    tag: &'static OperationType,
}

impl TestOp {
    pub fn new(tag: &'static OperationType) -> Self {
        TestOp { tag }
    }
}

impl Operation for TestOp {
    fn operation_type(&self) -> &'static OperationType {
        self.tag
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// A fake machine that records which handler ran for which commit tag, plus
// every session lifecycle notification it receives.
//
// Bindings: SET, WRITE, LEN and a universal operation fallback; EXPLODE
// always fails. Filters exist for major compaction only (WRITE keeps,
// EXPLODE fails), leaving minor resolution empty on purpose.
#[derive(Default)]
pub struct CountingMachine {
    pub applied: Vec<(&'static str, &'static str)>,
    pub sessions: Vec<(&'static str, Session)>,
}

impl StateMachine for CountingMachine {
    fn configure(registry: &mut Registry<Self>) -> Result<(), RegistrationError> {
        registry.operation(&SET, |machine: &mut Self, commit: &Commit| {
            machine.applied.push(("set", commit.operation_type().name()));
            Ok(Bytes::from_static(b"set"))
        });
        registry.operation(&WRITE, |machine: &mut Self, commit: &Commit| {
            machine.applied.push(("write", commit.operation_type().name()));
            Ok(Bytes::from_static(b"write"))
        });
        registry.operation(&LEN, |machine: &mut Self, commit: &Commit| {
            machine.applied.push(("len", commit.operation_type().name()));
            Ok(Bytes::from_static(b"len"))
        });
        registry.operation(&EXPLODE, |_machine: &mut Self, _commit: &Commit| {
            Err("boom".into())
        });
        registry.universal_operation(|machine: &mut Self, commit: &Commit| {
            machine
                .applied
                .push(("universal", commit.operation_type().name()));
            Ok(Bytes::from_static(b"universal"))
        });

        registry.filter(Compaction::Major, &WRITE, |_machine: &Self, _commit: &Commit| {
            Ok(true)
        })?;
        registry.filter(Compaction::Major, &EXPLODE, |_machine: &Self, _commit: &Commit| {
            Err("filter boom".into())
        })?;
        Ok(())
    }

    fn register(&mut self, session: &Session) {
        self.sessions.push(("register", session.clone()));
    }

    fn expire(&mut self, session: &Session) {
        self.sessions.push(("expire", session.clone()));
    }

    fn close(&mut self, session: &Session) {
        self.sessions.push(("close", session.clone()));
    }
}

// A machine with a single SET binding: no ancestors, no wildcards, no
// filters. Used to exercise resolution exhaustion.
#[derive(Default)]
pub struct SparseMachine {
    pub applied: usize,
}

impl StateMachine for SparseMachine {
    fn configure(registry: &mut Registry<Self>) -> Result<(), RegistrationError> {
        registry.operation(&SET, |machine: &mut Self, _commit: &Commit| {
            machine.applied += 1;
            Ok(Bytes::new())
        });
        Ok(())
    }
}

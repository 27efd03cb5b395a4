use std::fmt;
use tracing::debug;

use crate::machine::commit::Commit;
use crate::machine::dispatch::Machine;
use crate::machine::error::{MachineError, MachineResult};
use crate::machine::state_machine::StateMachine;

// Compaction modes partition filter bindings into independent namespaces. A
// command type may carry a different filter per mode, or none at all and
// fall through to that mode's wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compaction {
    Minor,
    Major,
}

impl fmt::Display for Compaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compaction::Minor => write!(f, "minor"),
            Compaction::Major => write!(f, "major"),
        }
    }
}

impl<M: StateMachine> Machine<M> {
    // Decides whether a committed command must be retained during
    // compaction. `Ok(true)` keeps the entry, `Ok(false)` allows the
    // compaction engine to discard it.
    //
    // Resolution mirrors `apply` exactly, additionally keyed by mode. But
    // unlike `apply`, failures here are hard errors: a command whose
    // durability is safety-critical must halt compaction rather than have
    // its fate guessed.
    pub fn filter(&self, commit: &Commit, compaction: Compaction) -> MachineResult<bool> {
        debug!("filtering {:?} for {} compaction", commit, compaction);

        let tag = commit.operation_type();
        if !tag.is_command() {
            return Err(MachineError::NotFilterable(tag.name()));
        }

        let key = (compaction, tag.name());
        let id = match self.filter_cache.get(key) {
            Some(id) => id,
            None => {
                let resolved = self.registry.resolve_filter(compaction, tag).ok_or(
                    MachineError::UnknownCommand {
                        tag: tag.name(),
                        mode: compaction,
                    },
                )?;
                self.filter_cache.insert_if_absent(key, resolved)
            }
        };

        let filter = self.registry.filter_handler(id);
        filter(&self.state, commit).map_err(|source| MachineError::Application {
            operation: tag.name(),
            source,
        })
    }
}

use bytes::Bytes;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::RwLock;
use tracing::debug;

use crate::machine::commit::Commit;
use crate::machine::error::{MachineError, MachineResult, RegistrationError};
use crate::machine::filter::Compaction;
use crate::machine::registry::{BindingId, Registry};
use crate::machine::session::Session;
use crate::machine::state_machine::StateMachine;

// Memoized tag-to-binding resolutions. Grows monotonically, bounded by the
// number of distinct concrete tags the machine ever sees, and is never
// invalidated: once a tag resolves, every later lookup must return the same
// binding.
//
// Lookups can race when queries are dispatched from multiple threads, so
// population goes through insert-if-absent. Two racers resolve identically
// against the immutable registry; whichever inserts first wins and both get
// its result.
pub(super) struct ResolutionCache<K> {
    resolved: RwLock<HashMap<K, BindingId>>,
}

impl<K: Copy + Eq + Hash> ResolutionCache<K> {
    pub(super) fn new() -> Self {
        ResolutionCache {
            resolved: RwLock::new(HashMap::new()),
        }
    }

    pub(super) fn get(&self, key: K) -> Option<BindingId> {
        self.resolved
            .read()
            .expect("resolution cache poisoned")
            .get(&key)
            .copied()
    }

    pub(super) fn insert_if_absent(&self, key: K, id: BindingId) -> BindingId {
        *self
            .resolved
            .write()
            .expect("resolution cache poisoned")
            .entry(key)
            .or_insert(id)
    }

    #[cfg(test)]
    pub(super) fn len(&self) -> usize {
        self.resolved.read().expect("resolution cache poisoned").len()
    }
}

// Hosts one replicated state machine: owns the implementer's state, the
// immutable binding registry built from its `configure`, and the resolution
// caches. The surrounding engine feeds it committed entries one at a time,
// in log order.
pub struct Machine<M: StateMachine> {
    pub(super) state: M,
    pub(super) registry: Registry<M>,
    pub(super) operation_cache: ResolutionCache<&'static str>,
    pub(super) filter_cache: ResolutionCache<(Compaction, &'static str)>,
}

impl<M: StateMachine> Machine<M> {
    // Builds the registry by running the machine's registration code. A
    // rejected declaration means the machine never starts.
    pub fn new(state: M) -> Result<Self, RegistrationError> {
        let mut registry = Registry::new();
        M::configure(&mut registry)?;
        Ok(Machine {
            state,
            registry,
            operation_cache: ResolutionCache::new(),
            filter_cache: ResolutionCache::new(),
        })
    }

    // Applies one committed operation and returns the handler's result.
    //
    // Failures come back as values, never as panics: the replay loop has to
    // keep processing subsequent commits even when one handler fails. A
    // handler failure is wrapped with the operation's identity so callers
    // see a uniform error shape.
    pub fn apply(&mut self, commit: &Commit) -> MachineResult<Bytes> {
        debug!("applying {:?}", commit);

        let tag = commit.operation_type();
        let id = match self.operation_cache.get(tag.name()) {
            Some(id) => id,
            None => {
                let resolved = self
                    .registry
                    .resolve_operation(tag)
                    .ok_or(MachineError::UnknownOperation(tag.name()))?;
                self.operation_cache.insert_if_absent(tag.name(), resolved)
            }
        };

        let handler = self.registry.operation_handler(id);
        handler(&mut self.state, commit).map_err(|source| MachineError::Application {
            operation: tag.name(),
            source,
        })
    }

    // Read access to the underlying machine state.
    pub fn state(&self) -> &M {
        &self.state
    }

    pub fn register(&mut self, session: &Session) {
        debug!("registering {}", session.id());
        self.state.register(session);
    }

    pub fn expire(&mut self, session: &Session) {
        debug!("expiring {}", session.id());
        self.state.expire(session);
    }

    pub fn close(&mut self, session: &Session) {
        debug!("closing {}", session.id());
        self.state.close(session);
    }
}

use bytes::Bytes;
use std::collections::HashMap;

use crate::machine::commit::Commit;
use crate::machine::error::{HandlerError, RegistrationError};
use crate::machine::filter::Compaction;
use crate::machine::operation::OperationType;

// Callable bound to an operation tag. Invoked with exclusive access to the
// machine state and a borrowed commit; returns the serialized result.
pub type OperationHandler<M> =
    Box<dyn Fn(&mut M, &Commit) -> Result<Bytes, HandlerError> + Send + Sync>;

// Callable bound to a command tag for one compaction mode. Returns whether
// the entry must be retained.
pub type FilterHandler<M> = Box<dyn Fn(&M, &Commit) -> Result<bool, HandlerError> + Send + Sync>;

// Identifies one registered binding. Ids are stable for the lifetime of the
// registry, which is what makes cached resolutions identical across calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BindingId(usize);

#[cfg(test)]
impl BindingId {
    pub(crate) fn for_testing(id: usize) -> Self {
        BindingId(id)
    }
}

// Holds the handler and filter bindings declared by one state machine.
//
// The registry is populated once, inside `StateMachine::configure`, and is
// immutable afterwards. Registration is first-writer-wins: a second binding
// for an already-bound slot is silently ignored.
pub struct Registry<M> {
    operations: Vec<OperationHandler<M>>,
    operations_by_tag: HashMap<&'static str, BindingId>,
    universal_operation: Option<BindingId>,

    filters: Vec<FilterHandler<M>>,
    filters_by_tag: HashMap<(Compaction, &'static str), BindingId>,
    universal_filters: HashMap<Compaction, BindingId>,
}

impl<M> Registry<M> {
    pub(crate) fn new() -> Self {
        Registry {
            operations: Vec::new(),
            operations_by_tag: HashMap::new(),
            universal_operation: None,
            filters: Vec::new(),
            filters_by_tag: HashMap::new(),
            universal_filters: HashMap::new(),
        }
    }

    // Binds a handler to an operation tag. First registration for a tag
    // wins; later ones are ignored.
    pub fn operation<F>(&mut self, tag: &'static OperationType, handler: F) -> &mut Self
    where
        F: Fn(&mut M, &Commit) -> Result<Bytes, HandlerError> + Send + Sync + 'static,
    {
        if !self.operations_by_tag.contains_key(tag.name()) {
            let id = BindingId(self.operations.len());
            self.operations.push(Box::new(handler));
            self.operations_by_tag.insert(tag.name(), id);
        }
        self
    }

    // Designates the fallback handler used when no tag matches.
    pub fn universal_operation<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut M, &Commit) -> Result<Bytes, HandlerError> + Send + Sync + 'static,
    {
        if self.universal_operation.is_none() {
            let id = BindingId(self.operations.len());
            self.operations.push(Box::new(handler));
            self.universal_operation = Some(id);
        }
        self
    }

    // Binds a filter to a command tag under one compaction mode. Query tags
    // are rejected here, at declaration time, rather than on the first
    // compaction pass that happens to hit them.
    pub fn filter<F>(
        &mut self,
        mode: Compaction,
        tag: &'static OperationType,
        filter: F,
    ) -> Result<(), RegistrationError>
    where
        F: Fn(&M, &Commit) -> Result<bool, HandlerError> + Send + Sync + 'static,
    {
        if !tag.is_command() {
            return Err(RegistrationError::FilterOnQuery { tag: tag.name() });
        }
        if !self.filters_by_tag.contains_key(&(mode, tag.name())) {
            let id = BindingId(self.filters.len());
            self.filters.push(Box::new(filter));
            self.filters_by_tag.insert((mode, tag.name()), id);
        }
        Ok(())
    }

    // Designates the fallback filter for one compaction mode.
    pub fn universal_filter<F>(&mut self, mode: Compaction, filter: F) -> &mut Self
    where
        F: Fn(&M, &Commit) -> Result<bool, HandlerError> + Send + Sync + 'static,
    {
        if !self.universal_filters.contains_key(&mode) {
            let id = BindingId(self.filters.len());
            self.filters.push(Box::new(filter));
            self.universal_filters.insert(mode, id);
        }
        self
    }

    // Resolves an operation tag to a binding: exact match first, then the
    // nearest registered ancestor, then the universal fallback. Walking the
    // tag lattice nearest-first keeps the choice deterministic when several
    // ancestors are bound.
    pub(crate) fn resolve_operation(&self, tag: &'static OperationType) -> Option<BindingId> {
        for ancestor in tag.ancestors() {
            if let Some(&id) = self.operations_by_tag.get(ancestor.name()) {
                return Some(id);
            }
        }
        self.universal_operation
    }

    // Same resolution policy as operations, additionally keyed by mode.
    pub(crate) fn resolve_filter(
        &self,
        mode: Compaction,
        tag: &'static OperationType,
    ) -> Option<BindingId> {
        for ancestor in tag.ancestors() {
            if let Some(&id) = self.filters_by_tag.get(&(mode, ancestor.name())) {
                return Some(id);
            }
        }
        self.universal_filters.get(&mode).copied()
    }

    pub(crate) fn operation_handler(&self, id: BindingId) -> &OperationHandler<M> {
        &self.operations[id.0]
    }

    pub(crate) fn filter_handler(&self, id: BindingId) -> &FilterHandler<M> {
        &self.filters[id.0]
    }
}

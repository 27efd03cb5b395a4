use bytes::Bytes;
use std::any::Any;
use std::collections::HashMap;

use crate::machine::{
    Commit, Compaction, HandlerError, Operation, OperationType, Registry, RegistrationError,
    StateMachine,
};

// Tag lattice for the store. Set and Delete are both writes, so a handler
// or filter bound to WRITE covers either of them.
pub static WRITE: OperationType = OperationType::command("keyvalue.write", None);
pub static SET: OperationType = OperationType::command("keyvalue.set", Some(&WRITE));
pub static DELETE: OperationType = OperationType::command("keyvalue.delete", Some(&WRITE));
pub static GET: OperationType = OperationType::query("keyvalue.get", None);

// Sets a key to a value. Applying returns the value that was written.
#[derive(Debug)]
pub struct Set {
    pub key: Bytes,
    pub value: Bytes,
}

impl Operation for Set {
    fn operation_type(&self) -> &'static OperationType {
        &SET
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// Removes a key. Applying returns the removed value.
#[derive(Debug)]
pub struct Delete {
    pub key: Bytes,
}

impl Operation for Delete {
    fn operation_type(&self) -> &'static OperationType {
        &DELETE
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// Reads the value of a key.
#[derive(Debug)]
pub struct Get {
    pub key: Bytes,
}

impl Operation for Get {
    fn operation_type(&self) -> &'static OperationType {
        &GET
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Slot {
    value: Bytes,

    // Log index of the set that wrote the current value. The major
    // compaction filter keeps a set entry only while it is the one that
    // produced the live value.
    written_at: u64,
}

// A key-value store where both the key and the value type are just bytes,
// backed by a simple in-memory hash map.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct MapStore {
    data: HashMap<Bytes, Slot>,
}

impl MapStore {
    pub fn new() -> Self {
        MapStore {
            data: HashMap::new(),
        }
    }

    pub fn get(&self, key: &Bytes) -> Option<Bytes> {
        self.data.get(key).map(|slot| slot.value.clone())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn set(&mut self, key: Bytes, value: Bytes, written_at: u64) {
        self.data.insert(key, Slot { value, written_at });
    }

    fn delete(&mut self, key: &Bytes) -> Option<Bytes> {
        self.data.remove(key).map(|slot| slot.value)
    }

    fn written_at(&self, key: &Bytes) -> Option<u64> {
        self.data.get(key).map(|slot| slot.written_at)
    }
}

impl StateMachine for MapStore {
    fn configure(registry: &mut Registry<Self>) -> Result<(), RegistrationError> {
        registry.operation(&SET, |store: &mut Self, commit: &Commit| {
            let op = expect_operation::<Set>(commit)?;
            store.set(op.key.clone(), op.value.clone(), commit.index());
            Ok(op.value.clone())
        });
        registry.operation(&DELETE, |store: &mut Self, commit: &Commit| {
            let op = expect_operation::<Delete>(commit)?;
            store
                .delete(&op.key)
                .ok_or_else(|| missing_key(&op.key))
        });
        registry.operation(&GET, |store: &mut Self, commit: &Commit| {
            let op = expect_operation::<Get>(commit)?;
            store.get(&op.key).ok_or_else(|| missing_key(&op.key))
        });

        // A set survives major compaction only while it wrote the value
        // that is still live; an applied delete carries no live state.
        registry.filter(Compaction::Major, &SET, |store: &Self, commit: &Commit| {
            let op = expect_operation::<Set>(commit)?;
            Ok(store.written_at(&op.key) == Some(commit.index()))
        })?;
        registry.filter(Compaction::Major, &DELETE, |_store: &Self, _commit: &Commit| {
            Ok(false)
        })?;

        // Minor compaction retains history and tombstones wholesale.
        registry.universal_filter(Compaction::Minor, |_store: &Self, _commit: &Commit| Ok(true));
        Ok(())
    }
}

fn expect_operation<'a, T: Operation + 'static>(commit: &'a Commit) -> Result<&'a T, HandlerError> {
    commit.operation_as::<T>().ok_or_else(|| {
        format!(
            "commit {} does not carry a {}",
            commit.index(),
            std::any::type_name::<T>()
        )
        .into()
    })
}

fn missing_key(key: &Bytes) -> HandlerError {
    format!("key not present: {:?}", String::from_utf8_lossy(key)).into()
}

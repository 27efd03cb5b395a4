// This module provides a key-value state machine built on the dispatch
// core. It doubles as the reference for how applications declare their
// operation tags, handlers, and compaction filters.

pub use store::{Delete, Get, MapStore, Set, DELETE, GET, SET, WRITE};

mod store;

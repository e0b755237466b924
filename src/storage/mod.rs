//! Concrete index storage: the in-memory index and its JSON snapshot format

mod memory;
mod snapshot;

pub use memory::{IndexStats, MemoryIndex};
pub use snapshot::{ElementEntry, IndexSnapshot, SNAPSHOT_VERSION};

//! Snapshot store adapters.
//!
//! [`DirectorySnapshotStore`] keeps one JSON file per key inside a
//! capability-scoped directory; [`InMemorySnapshotStore`] keeps blobs for the
//! lifetime of the process and backs tests and throwaway sessions.

mod directory;
mod memory;

pub use directory::DirectorySnapshotStore;
pub use memory::InMemorySnapshotStore;

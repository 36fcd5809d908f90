//! Snapshot persistence.

mod atomic_file;
mod snapshot;

pub use atomic_file::AtomicFile;
pub use snapshot::SnapshotStore;

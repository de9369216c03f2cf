mod snapshot;
mod unmatched;

pub use snapshot::SnapshotManager;
pub use unmatched::UnmatchedManager;

pub mod json;
pub mod snapshot;

pub use json::JsonFormatter;
pub use snapshot::SnapshotFormatter;

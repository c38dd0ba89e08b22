//! Order lines and the persisted state snapshot

pub mod snapshot;
pub mod types;

pub use snapshot::{SNAPSHOT_VERSION, StateSnapshot, TableSnapshot};
pub use types::OrderLine;

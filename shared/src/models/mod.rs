//! Data models shared between the core and its presentation layers

pub mod table;

pub use table::{BadgeState, InvalidTableId, TOGO_ID, TableId, TableRecord, TableStatus};

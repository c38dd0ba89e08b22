//! Shared types for the venue point-of-sale core
//!
//! Data model and error codes used by the edge crate and by any
//! presentation layer that renders its state.

pub mod error;
pub mod models;
pub mod order;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{ErrorCategory, ErrorCode};
pub use models::{BadgeState, TableId, TableRecord, TableStatus};
pub use order::{OrderLine, StateSnapshot, TableSnapshot};

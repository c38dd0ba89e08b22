//! Table/order state machine and its persistence
//!
//! - **ledger**: TableLedger, owner of every table record and the status rules
//! - **revenue**: RevenueTracker, running total of the business day
//! - **session**: SessionController, command front with selection context
//! - **storage**: PersistenceStore seam and its redb implementation
//! - **reconcile**: restoring a snapshot against the configured tables
//! - **money**: decimal arithmetic for prices and totals
//!
//! # Data Flow
//!
//! ```text
//! Command → SessionController → TableLedger / RevenueTracker
//!                 ↓
//!          PersistenceStore.save(snapshot)
//!                 ↓
//!          SessionEvent broadcast → presentation re-reads views
//! ```

pub mod error;
pub mod ledger;
pub mod money;
pub mod reconcile;
pub mod revenue;
pub mod session;
pub mod storage;

// Re-exports
pub use error::{PosError, PosResult};
pub use ledger::TableLedger;
pub use reconcile::RestoreReport;
pub use revenue::RevenueTracker;
pub use session::{SessionController, SessionEvent, StartupSource, TableView};
pub use storage::{PersistenceStore, RecoveredFile, RedbStore, StorageError, StorageResult};

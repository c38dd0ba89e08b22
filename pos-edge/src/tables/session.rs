//! SessionController - command front for the presentation layer
//!
//! # Command Flow
//!
//! ```text
//! command(args)
//!     ├─ 1. Resolve the selected table (NoTableSelected)
//!     ├─ 2. Validate input
//!     ├─ 3. Mutate TableLedger / RevenueTracker
//!     ├─ 4. Save the full snapshot (synchronous, every mutation)
//!     ├─ 5. Broadcast SessionEvent
//!     └─ 6. Return result
//! ```
//!
//! A failed save does not roll back the mutation. The controller keeps an
//! unsaved flag until a later save (any command, or `retry_save`) succeeds.
//!
//! If the stored snapshot could not be read for a reason other than damage
//! (I/O, locked file), saving is blocked so the defaults cannot overwrite it.
//! The block lifts on `retry_load` or an explicit `accept_reset`.

use serde::Serialize;
use std::path::Path;
use tokio::sync::broadcast;

use shared::models::{BadgeState, TableId, TableStatus};
use shared::order::{OrderLine, StateSnapshot};

use super::error::{PosError, PosResult};
use super::ledger::TableLedger;
use super::reconcile::{self, RestoreReport};
use super::revenue::RevenueTracker;
use super::storage::{PersistenceStore, RedbStore, StorageResult};
use crate::utils::validation;

/// Event broadcast channel capacity
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Emitted after every successful command
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionEvent {
    TableSelected { table_id: TableId },
    ItemAdded { table_id: TableId, line: OrderLine, table_total: f64 },
    ItemRemoved { table_id: TableId, index: usize, line: OrderLine },
    TablePaid { table_id: TableId, amount: f64, revenue: f64 },
    TableClosed { table_id: TableId },
    DayStarted,
}

/// Read model of one table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView {
    pub id: TableId,
    pub label: String,
    pub orders: Vec<OrderLine>,
    pub total: f64,
    pub status: TableStatus,
    pub status_text: &'static str,
    pub badge: BadgeState,
}

/// Where the initial state came from
#[derive(Debug, Clone, PartialEq)]
pub enum StartupSource {
    /// No snapshot stored
    Fresh,
    /// Snapshot restored
    Restored(RestoreReport),
    /// Snapshot unusable; default tables used instead
    Fallback(PosError),
}

pub struct SessionController {
    ledger: TableLedger,
    tracker: RevenueTracker,
    selected: Option<TableId>,
    store: Box<dyn PersistenceStore>,
    last_save_error: Option<String>,
    /// Set while the stored snapshot is unread and must not be overwritten
    load_blocked: Option<String>,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("ledger", &self.ledger)
            .field("tracker", &self.tracker)
            .field("selected", &self.selected)
            .field("last_save_error", &self.last_save_error)
            .field("load_blocked", &self.load_blocked)
            .finish_non_exhaustive()
    }
}

impl SessionController {
    /// Fresh session with idle tables; the store is not read
    pub fn new(ids: &[TableId], store: Box<dyn PersistenceStore>) -> Self {
        Self::with_state(TableLedger::new(ids), RevenueTracker::new(), store)
    }

    /// Load the stored snapshot and reconcile it with the configured tables
    ///
    /// Never fails: an unreadable snapshot falls back to the default table
    /// set and is reported through [`StartupSource::Fallback`]. A damaged
    /// snapshot is replaced on the next save; any other load failure blocks
    /// saving until [`retry_load`](Self::retry_load) or
    /// [`accept_reset`](Self::accept_reset).
    pub fn open(ids: &[TableId], store: Box<dyn PersistenceStore>) -> (Self, StartupSource) {
        match load_state(ids, store.as_ref()) {
            Ok(Some((ledger, tracker, report))) => {
                let session = Self::with_state(ledger, tracker, store);
                (session, StartupSource::Restored(report))
            }
            Ok(None) => (Self::new(ids, store), StartupSource::Fresh),
            Err(e) if e.is_corruption() => {
                let err = PosError::CorruptData(e.to_string());
                tracing::error!(error = %err, "Saved state damaged, falling back to default tables");
                (Self::new(ids, store), StartupSource::Fallback(err))
            }
            Err(e) => {
                let message = e.to_string();
                tracing::error!(
                    error = %message,
                    "Saved state could not be read, saving blocked until reload or discard"
                );
                let mut session = Self::new(ids, store);
                session.load_blocked = Some(message.clone());
                session.last_save_error = Some(message.clone());
                (session, StartupSource::Fallback(PosError::PersistenceFailure(message)))
            }
        }
    }

    /// Open the redb file at `path` and load from it
    ///
    /// A damaged database file is moved aside and replaced by an empty one;
    /// the session then starts from the default tables and reports
    /// [`PosError::CorruptData`]. Other open errors are returned.
    pub fn open_file(ids: &[TableId], path: impl AsRef<Path>) -> StorageResult<(Self, StartupSource)> {
        let (store, recovered) = RedbStore::open_or_recover(path)?;
        match recovered {
            Some(recovered) => {
                let err = PosError::CorruptData(format!(
                    "{} (damaged file moved to {})",
                    recovered.reason,
                    recovered.moved_to.display()
                ));
                Ok((Self::new(ids, Box::new(store)), StartupSource::Fallback(err)))
            }
            None => Ok(Self::open(ids, Box::new(store))),
        }
    }

    fn with_state(
        ledger: TableLedger,
        tracker: RevenueTracker,
        store: Box<dyn PersistenceStore>,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            ledger,
            tracker,
            selected: None,
            store,
            last_save_error: None,
            load_blocked: None,
            event_tx,
        }
    }

    /// Subscribe to event broadcasts
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    // ========== Commands ==========

    /// Make `id` the current table
    pub fn select_table(&mut self, id: TableId) -> PosResult<()> {
        if !self.ledger.contains(id) {
            tracing::warn!(table = %id, "Select rejected: unknown table");
            return Err(PosError::invalid_table(id));
        }
        self.selected = Some(id);
        self.emit(SessionEvent::TableSelected { table_id: id });
        Ok(())
    }

    /// Add an item to the current table, returning the new table total
    pub fn add_item(&mut self, name: &str, price: f64) -> PosResult<f64> {
        let id = self.current()?;
        let line = validation::validate_order_line(name, price)?;

        self.ledger.add_order(id, line.clone())?;
        let table_total = self.ledger.table_total(id)?;
        tracing::info!(table = %id, item = %line.name, price = line.price, table_total, "Item added");

        self.commit(SessionEvent::ItemAdded {
            table_id: id,
            line,
            table_total,
        })?;
        Ok(table_total)
    }

    /// Remove the line at `index` from the current table
    pub fn remove_item(&mut self, index: usize) -> PosResult<OrderLine> {
        let id = self.current()?;
        let line = self.ledger.remove_order(id, index).inspect_err(|e| {
            tracing::warn!(table = %id, index, error = %e, "Remove rejected");
        })?;
        tracing::info!(table = %id, index, item = %line.name, "Item removed");

        self.commit(SessionEvent::ItemRemoved {
            table_id: id,
            index,
            line: line.clone(),
        })?;
        Ok(line)
    }

    /// Mark the current table paid and record its total as revenue
    ///
    /// Returns the amount charged. [`PosError::AlreadyPaid`] leaves revenue
    /// untouched and saves nothing.
    pub fn mark_current_paid(&mut self) -> PosResult<f64> {
        let id = self.current()?;
        let amount = self.ledger.mark_paid(id).inspect_err(|e| {
            tracing::warn!(table = %id, error = %e, "Payment rejected");
        })?;
        let revenue = self.tracker.record_payment(amount)?;
        tracing::info!(table = %id, amount, revenue, "Table paid");

        self.commit(SessionEvent::TablePaid {
            table_id: id,
            amount,
            revenue,
        })?;
        Ok(amount)
    }

    /// Clear the current table
    ///
    /// Destructive; confirmation is up to the caller.
    pub fn close_current_table(&mut self) -> PosResult<()> {
        let id = self.current()?;
        self.ledger.close_table(id)?;
        tracing::info!(table = %id, "Table closed");
        self.commit(SessionEvent::TableClosed { table_id: id })
    }

    /// Reset daily revenue to zero; table state is untouched
    pub fn start_new_day(&mut self) -> PosResult<()> {
        let previous = self.tracker.current_total();
        self.tracker.reset_day();
        tracing::info!(previous_revenue = previous, "New business day started");
        self.commit(SessionEvent::DayStarted)
    }

    /// Save the current state again after an earlier failure
    pub fn retry_save(&mut self) -> PosResult<()> {
        self.persist()
    }

    /// Read the stored snapshot again, replacing the in-memory state
    ///
    /// Lifts the save block on success. Selection is cleared.
    pub fn retry_load(&mut self) -> PosResult<StartupSource> {
        let ids = self.ledger.ids().to_vec();
        let loaded = load_state(&ids, self.store.as_ref()).map_err(|e| {
            tracing::warn!(error = %e, "Reload failed");
            if e.is_corruption() {
                PosError::CorruptData(e.to_string())
            } else {
                PosError::PersistenceFailure(e.to_string())
            }
        })?;

        let source = match loaded {
            Some((ledger, tracker, report)) => {
                self.ledger = ledger;
                self.tracker = tracker;
                StartupSource::Restored(report)
            }
            None => {
                self.ledger = TableLedger::new(&ids);
                self.tracker = RevenueTracker::new();
                StartupSource::Fresh
            }
        };
        self.selected = None;
        self.load_blocked = None;
        self.last_save_error = None;
        tracing::info!("Saved state reloaded, saving unblocked");
        Ok(source)
    }

    /// Give up on the unread snapshot and save the current state over it
    ///
    /// Destructive; confirmation is up to the caller.
    pub fn accept_reset(&mut self) -> PosResult<()> {
        if let Some(reason) = self.load_blocked.take() {
            tracing::warn!(reason = %reason, "Unread saved state discarded by operator");
        }
        self.persist()
    }

    // ========== Views ==========

    pub fn selected(&self) -> Option<TableId> {
        self.selected
    }

    /// Known tables in display order
    pub fn table_ids(&self) -> &[TableId] {
        self.ledger.ids()
    }

    pub fn table_view(&self, id: TableId) -> PosResult<TableView> {
        let record = self.ledger.get(id)?;
        Ok(TableView {
            id,
            label: id.label(),
            orders: record.orders.clone(),
            total: self.ledger.table_total(id)?,
            status: record.status,
            status_text: record.status_text(),
            badge: record.badge(),
        })
    }

    /// Views of every table in display order
    pub fn tables(&self) -> Vec<TableView> {
        self.ledger
            .ids()
            .iter()
            .filter_map(|id| self.table_view(*id).ok())
            .collect()
    }

    pub fn current_view(&self) -> Option<TableView> {
        self.selected.and_then(|id| self.table_view(id).ok())
    }

    pub fn revenue(&self) -> f64 {
        self.tracker.current_total()
    }

    /// In-memory state differs from the last successful save
    pub fn has_unsaved_changes(&self) -> bool {
        self.last_save_error.is_some() || self.load_blocked.is_some()
    }

    /// Saving is blocked because the stored snapshot was never read
    pub fn is_save_blocked(&self) -> bool {
        self.load_blocked.is_some()
    }

    pub fn last_save_error(&self) -> Option<&str> {
        self.last_save_error.as_deref()
    }

    /// Full serializable state
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot::new(self.ledger.snapshot_tables(), self.tracker.current_total())
    }

    // ========== Internals ==========

    fn current(&self) -> PosResult<TableId> {
        self.selected.ok_or(PosError::NoTableSelected)
    }

    /// Persist, then broadcast even if the save failed (the mutation stands)
    fn commit(&mut self, event: SessionEvent) -> PosResult<()> {
        let saved = self.persist();
        self.emit(event);
        saved
    }

    fn persist(&mut self) -> PosResult<()> {
        if let Some(reason) = &self.load_blocked {
            tracing::warn!(reason = %reason, "Save skipped: saved state not loaded");
            return Err(PosError::PersistenceFailure(format!(
                "saving blocked, saved state not loaded: {reason}"
            )));
        }
        match self.store.save(&self.snapshot()) {
            Ok(()) => {
                if self.last_save_error.take().is_some() {
                    tracing::info!("State saved, unsaved changes cleared");
                }
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to save state");
                let message = e.to_string();
                self.last_save_error = Some(message.clone());
                Err(PosError::PersistenceFailure(message))
            }
        }
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is not an error
        let _ = self.event_tx.send(event);
    }
}

/// Read and reconcile the stored snapshot; `None` when nothing is stored
fn load_state(
    ids: &[TableId],
    store: &dyn PersistenceStore,
) -> StorageResult<Option<(TableLedger, RevenueTracker, RestoreReport)>> {
    match store.load()? {
        None => {
            tracing::info!(tables = ids.len(), "No saved state, starting fresh");
            Ok(None)
        }
        Some(snapshot) => {
            tracing::info!(
                saved_at = snapshot.saved_at,
                revenue = snapshot.revenue,
                "Restoring saved state"
            );
            Ok(Some(reconcile::restore(ids, snapshot)))
        }
    }
}

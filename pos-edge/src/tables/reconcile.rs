//! Reconciliation of a loaded snapshot against the configured table set
//!
//! The configured identifiers are authoritative: configured tables missing
//! from the snapshot start idle, snapshot tables no longer configured are
//! dropped. Restored records that could not have been produced by the
//! ledger are repaired rather than rejected.

use shared::models::{TableId, TableRecord, TableStatus};
use shared::order::StateSnapshot;

use super::ledger::TableLedger;
use super::money;
use super::revenue::RevenueTracker;

/// What changed while restoring a snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestoreReport {
    /// Configured tables not present in the snapshot
    pub created: Vec<TableId>,
    /// Snapshot tables not present in the configuration
    pub dropped: Vec<TableId>,
    /// Tables whose orders or status were repaired
    pub repaired: Vec<TableId>,
    /// Stored revenue was invalid and reset to zero
    pub revenue_reset: bool,
}

impl RestoreReport {
    pub fn is_clean(&self) -> bool {
        self.created.is_empty()
            && self.dropped.is_empty()
            && self.repaired.is_empty()
            && !self.revenue_reset
    }
}

/// Rebuild ledger and tracker from a snapshot
pub fn restore(
    ids: &[TableId],
    mut snapshot: StateSnapshot,
) -> (TableLedger, RevenueTracker, RestoreReport) {
    let mut report = RestoreReport::default();
    let mut records = Vec::with_capacity(ids.len());

    for &id in ids {
        match snapshot.tables.remove(&id) {
            Some(stored) => {
                let mut record = stored.into_record(id);
                if repair_record(&mut record) {
                    tracing::warn!(table = %id, status = ?record.status, "Repaired restored table");
                    report.repaired.push(id);
                }
                records.push(record);
            }
            None => {
                tracing::info!(table = %id, "Table missing from snapshot, starting idle");
                report.created.push(id);
                records.push(TableRecord::new(id));
            }
        }
    }

    for id in snapshot.tables.keys() {
        tracing::warn!(table = %id, "Dropping table not in configuration");
        report.dropped.push(*id);
    }

    let tracker = RevenueTracker::with_total(snapshot.revenue).unwrap_or_else(|e| {
        tracing::warn!(revenue = snapshot.revenue, error = %e, "Invalid stored revenue, resetting to zero");
        report.revenue_reset = true;
        RevenueTracker::new()
    });

    (TableLedger::from_records(records), tracker, report)
}

/// Bring a restored record back inside the ledger's reachable states
///
/// Returns true when anything changed.
fn repair_record(record: &mut TableRecord) -> bool {
    let before_len = record.orders.len();
    record
        .orders
        .retain(|line| !line.name.trim().is_empty() && money::validate_price(line.price).is_ok());
    let mut changed = record.orders.len() != before_len;

    let has_orders = !record.orders.is_empty();
    let repaired = match (record.id.is_counter(), record.status, has_orders) {
        // Free always means empty, and the counter is never free
        (false, TableStatus::Free, true) => Some(TableStatus::Occupied),
        (true, TableStatus::Free, true) => Some(TableStatus::Occupied),
        (true, TableStatus::Free, false) => Some(TableStatus::Active),
        // Active belongs to the counter only
        (false, TableStatus::Active, true) => Some(TableStatus::Occupied),
        (false, TableStatus::Active, false) => Some(TableStatus::Free),
        // Paid requires orders
        (false, TableStatus::Paid, false) => Some(TableStatus::Free),
        (true, TableStatus::Paid, false) => Some(TableStatus::Active),
        _ => None,
    };

    if let Some(status) = repaired {
        record.status = status;
        changed = true;
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::{OrderLine, TableSnapshot};
    use std::collections::BTreeMap;

    const T1: TableId = TableId::Number(1);
    const T2: TableId = TableId::Number(2);

    fn table(orders: Vec<OrderLine>, status: TableStatus) -> TableSnapshot {
        TableSnapshot { orders, status }
    }

    fn snapshot(tables: Vec<(TableId, TableSnapshot)>, revenue: f64) -> StateSnapshot {
        StateSnapshot::new(tables.into_iter().collect::<BTreeMap<_, _>>(), revenue)
    }

    #[test]
    fn test_restore_clean_snapshot() {
        let snap = snapshot(
            vec![
                (T1, table(vec![OrderLine::new("Burger", 8.5)], TableStatus::Paid)),
                (T2, table(vec![], TableStatus::Free)),
                (TableId::ToGo, table(vec![], TableStatus::Active)),
            ],
            8.5,
        );
        let (ledger, tracker, report) = restore(&[T1, T2, TableId::ToGo], snap);

        assert!(report.is_clean());
        assert_eq!(ledger.ids(), &[T1, T2, TableId::ToGo]);
        assert_eq!(ledger.get(T1).unwrap().status, TableStatus::Paid);
        assert_eq!(tracker.current_total(), 8.5);
    }

    #[test]
    fn test_restore_follows_configuration() {
        let snap = snapshot(
            vec![
                (T1, table(vec![OrderLine::new("Tea", 2.0)], TableStatus::Occupied)),
                (TableId::Number(7), table(vec![], TableStatus::Free)),
            ],
            0.0,
        );
        let (ledger, _, report) = restore(&[T2, T1], snap);

        assert_eq!(ledger.ids(), &[T2, T1]);
        assert_eq!(report.created, vec![T2]);
        assert_eq!(report.dropped, vec![TableId::Number(7)]);
        assert_eq!(ledger.get(T1).unwrap().orders.len(), 1);
        assert!(!ledger.contains(TableId::Number(7)));
    }

    #[test]
    fn test_reachable_empty_occupied_is_kept() {
        // Paid table whose only line was removed
        let snap = snapshot(vec![(T1, table(vec![], TableStatus::Occupied))], 0.0);
        let (ledger, _, report) = restore(&[T1], snap);
        assert!(report.is_clean());
        assert_eq!(ledger.get(T1).unwrap().status, TableStatus::Occupied);
    }

    #[test]
    fn test_repairs_invalid_status() {
        let snap = snapshot(
            vec![
                (T1, table(vec![OrderLine::new("Tea", 2.0)], TableStatus::Free)),
                (T2, table(vec![], TableStatus::Paid)),
                (TableId::ToGo, table(vec![], TableStatus::Free)),
            ],
            0.0,
        );
        let (ledger, _, report) = restore(&[T1, T2, TableId::ToGo], snap);

        assert_eq!(report.repaired, vec![T1, T2, TableId::ToGo]);
        assert_eq!(ledger.get(T1).unwrap().status, TableStatus::Occupied);
        assert_eq!(ledger.get(T2).unwrap().status, TableStatus::Free);
        assert_eq!(ledger.get(TableId::ToGo).unwrap().status, TableStatus::Active);
    }

    #[test]
    fn test_drops_invalid_lines() {
        let snap = snapshot(
            vec![(
                T1,
                table(
                    vec![OrderLine::new("", 1.0), OrderLine::new("Soup", -4.0)],
                    TableStatus::Occupied,
                ),
            )],
            0.0,
        );
        let (ledger, _, report) = restore(&[T1], snap);
        assert_eq!(report.repaired, vec![T1]);
        assert!(ledger.get(T1).unwrap().orders.is_empty());
    }

    #[test]
    fn test_negative_revenue_resets() {
        let snap = snapshot(vec![], -12.0);
        let (_, tracker, report) = restore(&[T1], snap);
        assert!(report.revenue_reset);
        assert_eq!(tracker.current_total(), 0.0);
    }
}

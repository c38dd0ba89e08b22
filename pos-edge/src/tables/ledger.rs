//! TableLedger - owns every table record and enforces the status machine
//!
//! # State machine (numbered tables)
//!
//! ```text
//! Free     --add_order-->           Occupied
//! Occupied --add_order-->           Occupied
//! Occupied --mark_paid-->           Paid
//! Paid     --add_order-->           Occupied
//! Paid     --remove_order-->        Occupied   (paid demotion wins, even when emptied)
//! Occupied --remove_order(last)-->  Free
//! Any      --close_table-->         Free
//! ```
//!
//! The to-go counter follows the same order mutations but never reaches
//! `Free`: it idles at `Active` and `close_table` restores it there.

use std::collections::{BTreeMap, HashMap};

use shared::models::{TableId, TableRecord, TableStatus};
use shared::order::{OrderLine, TableSnapshot};

use super::error::{PosError, PosResult};
use super::money;

#[derive(Debug, Clone, PartialEq)]
pub struct TableLedger {
    /// Display order
    order: Vec<TableId>,
    records: HashMap<TableId, TableRecord>,
}

impl TableLedger {
    /// Create a ledger with an idle record for every identifier
    ///
    /// Duplicates are ignored; the first occurrence fixes the display position.
    pub fn new(ids: &[TableId]) -> Self {
        Self::from_records(ids.iter().copied().map(TableRecord::new))
    }

    /// Build a ledger from existing records, in the given display order
    pub fn from_records(records: impl IntoIterator<Item = TableRecord>) -> Self {
        let mut ledger = Self {
            order: Vec::new(),
            records: HashMap::new(),
        };
        for record in records {
            if ledger.records.contains_key(&record.id) {
                continue;
            }
            ledger.order.push(record.id);
            ledger.records.insert(record.id, record);
        }
        ledger
    }

    pub fn contains(&self, id: TableId) -> bool {
        self.records.contains_key(&id)
    }

    /// Known identifiers in display order
    pub fn ids(&self) -> &[TableId] {
        &self.order
    }

    /// Records in display order
    pub fn records(&self) -> impl Iterator<Item = &TableRecord> {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    pub fn get(&self, id: TableId) -> PosResult<&TableRecord> {
        self.records
            .get(&id)
            .ok_or_else(|| PosError::invalid_table(id))
    }

    fn get_mut(&mut self, id: TableId) -> PosResult<&mut TableRecord> {
        self.records
            .get_mut(&id)
            .ok_or_else(|| PosError::invalid_table(id))
    }

    /// Append a line to the table's orders
    ///
    /// A `Free` or `Paid` table becomes `Occupied`. The counter's `Active`
    /// state is left as is. The price is stored rounded to cents.
    pub fn add_order(&mut self, id: TableId, mut line: OrderLine) -> PosResult<()> {
        let record = self.get_mut(id)?;
        if line.name.trim().is_empty() {
            return Err(PosError::invalid_item("name must not be empty"));
        }
        money::validate_price(line.price)?;
        line.price = money::round_cents(line.price);

        if matches!(record.status, TableStatus::Paid | TableStatus::Free) {
            record.status = TableStatus::Occupied;
        }
        record.orders.push(line);
        Ok(())
    }

    /// Remove the line at `index`; later lines shift down by one
    pub fn remove_order(&mut self, id: TableId, index: usize) -> PosResult<OrderLine> {
        let record = self.get_mut(id)?;
        let len = record.orders.len();
        if index >= len {
            return Err(PosError::IndexOutOfRange { index, len });
        }

        let removed = record.orders.remove(index);

        // Paid demotion is checked before the empty check
        if record.status == TableStatus::Paid {
            record.status = TableStatus::Occupied;
        } else if record.orders.is_empty() && !id.is_counter() {
            record.status = TableStatus::Free;
        }
        Ok(removed)
    }

    /// Mark the table paid and return the amount to record as revenue
    ///
    /// A second call without an intervening order change yields
    /// [`PosError::AlreadyPaid`], which callers must treat as a no-op.
    pub fn mark_paid(&mut self, id: TableId) -> PosResult<f64> {
        let record = self.get_mut(id)?;
        if record.orders.is_empty() {
            return Err(PosError::EmptyOrder(id));
        }
        if record.status == TableStatus::Paid {
            return Err(PosError::AlreadyPaid(id));
        }

        let total = money::to_f64(money::lines_total(&record.orders));
        record.status = TableStatus::Paid;
        Ok(total)
    }

    /// Clear all orders and return the table to its idle state
    pub fn close_table(&mut self, id: TableId) -> PosResult<()> {
        let record = self.get_mut(id)?;
        record.orders.clear();
        record.status = TableStatus::idle_for(id);
        Ok(())
    }

    /// Sum of order prices (0 for an empty table)
    pub fn table_total(&self, id: TableId) -> PosResult<f64> {
        let record = self.get(id)?;
        Ok(money::to_f64(money::lines_total(&record.orders)))
    }

    /// Persisted form of every table
    pub fn snapshot_tables(&self) -> BTreeMap<TableId, TableSnapshot> {
        self.records()
            .map(|record| (record.id, TableSnapshot::from(record)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T1: TableId = TableId::Number(1);

    fn default_ids() -> Vec<TableId> {
        vec![
            TableId::Number(1),
            TableId::Number(2),
            TableId::Number(3),
            TableId::Number(4),
            TableId::ToGo,
        ]
    }

    fn ledger() -> TableLedger {
        TableLedger::new(&default_ids())
    }

    fn status(ledger: &TableLedger, id: TableId) -> TableStatus {
        ledger.get(id).unwrap().status
    }

    #[test]
    fn test_new_ledger_is_idle_in_display_order() {
        let ledger = ledger();
        assert_eq!(ledger.ids(), default_ids().as_slice());
        for record in ledger.records() {
            assert!(record.orders.is_empty());
        }
        assert_eq!(status(&ledger, T1), TableStatus::Free);
        assert_eq!(status(&ledger, TableId::ToGo), TableStatus::Active);
    }

    #[test]
    fn test_duplicate_ids_keep_first_position() {
        let ledger = TableLedger::new(&[TableId::Number(2), TableId::ToGo, TableId::Number(2)]);
        assert_eq!(ledger.ids(), &[TableId::Number(2), TableId::ToGo]);
    }

    #[test]
    fn test_unknown_table() {
        let mut ledger = ledger();
        let id = TableId::Number(9);
        assert_eq!(
            ledger.add_order(id, OrderLine::new("Tea", 2.0)),
            Err(PosError::InvalidTable("9".into()))
        );
        assert!(matches!(ledger.remove_order(id, 0), Err(PosError::InvalidTable(_))));
        assert!(matches!(ledger.mark_paid(id), Err(PosError::InvalidTable(_))));
        assert!(matches!(ledger.close_table(id), Err(PosError::InvalidTable(_))));
        assert!(matches!(ledger.table_total(id), Err(PosError::InvalidTable(_))));
    }

    #[test]
    fn test_add_order_occupies_table() {
        let mut ledger = ledger();
        ledger.add_order(T1, OrderLine::new("Burger", 8.5)).unwrap();
        assert_eq!(ledger.get(T1).unwrap().orders.len(), 1);
        assert_eq!(status(&ledger, T1), TableStatus::Occupied);

        ledger.add_order(T1, OrderLine::new("Fries", 3.0)).unwrap();
        assert_eq!(ledger.get(T1).unwrap().orders.len(), 2);
        assert_eq!(status(&ledger, T1), TableStatus::Occupied);
        assert_eq!(ledger.table_total(T1).unwrap(), 11.5);
    }

    #[test]
    fn test_add_order_rejects_invalid_line() {
        let mut ledger = ledger();
        assert!(matches!(
            ledger.add_order(T1, OrderLine::new("  ", 1.0)),
            Err(PosError::InvalidItem(_))
        ));
        assert!(matches!(
            ledger.add_order(T1, OrderLine::new("Soup", -1.0)),
            Err(PosError::InvalidItem(_))
        ));
        assert_eq!(status(&ledger, T1), TableStatus::Free);
        assert!(ledger.get(T1).unwrap().orders.is_empty());
    }

    #[test]
    fn test_add_order_rounds_price_to_cents() {
        let mut ledger = ledger();
        ledger.add_order(T1, OrderLine::new("Platter", 103053.73547058823)).unwrap();
        assert_eq!(ledger.get(T1).unwrap().orders[0].price, 103053.74);
        assert_eq!(ledger.table_total(T1).unwrap(), 103053.74);
    }

    #[test]
    fn test_add_order_after_paid_reopens() {
        let mut ledger = ledger();
        ledger.add_order(T1, OrderLine::new("Burger", 8.5)).unwrap();
        ledger.mark_paid(T1).unwrap();
        ledger.add_order(T1, OrderLine::new("Dessert", 4.0)).unwrap();
        assert_eq!(status(&ledger, T1), TableStatus::Occupied);
    }

    #[test]
    fn test_remove_order_positional() {
        let mut ledger = ledger();
        for (name, price) in [("A", 1.0), ("B", 2.0), ("C", 3.0)] {
            ledger.add_order(T1, OrderLine::new(name, price)).unwrap();
        }
        let removed = ledger.remove_order(T1, 1).unwrap();
        assert_eq!(removed.name, "B");

        let names: Vec<_> = ledger
            .get(T1)
            .unwrap()
            .orders
            .iter()
            .map(|l| l.name.as_str())
            .collect();
        assert_eq!(names, vec!["A", "C"]);
    }

    #[test]
    fn test_remove_order_out_of_range() {
        let mut ledger = ledger();
        assert_eq!(
            ledger.remove_order(T1, 0),
            Err(PosError::IndexOutOfRange { index: 0, len: 0 })
        );
        ledger.add_order(T1, OrderLine::new("A", 1.0)).unwrap();
        assert_eq!(
            ledger.remove_order(T1, 1),
            Err(PosError::IndexOutOfRange { index: 1, len: 1 })
        );
        assert_eq!(status(&ledger, T1), TableStatus::Occupied);
    }

    #[test]
    fn test_remove_last_order_frees_table() {
        let mut ledger = ledger();
        ledger.add_order(T1, OrderLine::new("A", 1.0)).unwrap();
        ledger.remove_order(T1, 0).unwrap();
        assert_eq!(status(&ledger, T1), TableStatus::Free);
    }

    #[test]
    fn test_remove_from_paid_demotes_before_freeing() {
        let mut ledger = ledger();
        ledger.add_order(T1, OrderLine::new("Burger", 8.5)).unwrap();
        ledger.mark_paid(T1).unwrap();

        ledger.remove_order(T1, 0).unwrap();
        assert!(ledger.get(T1).unwrap().orders.is_empty());
        assert_eq!(status(&ledger, T1), TableStatus::Occupied);
    }

    #[test]
    fn test_mark_paid_returns_total() {
        let mut ledger = ledger();
        ledger.add_order(T1, OrderLine::new("Coffee", 0.1)).unwrap();
        ledger.add_order(T1, OrderLine::new("Coffee", 0.2)).unwrap();
        assert_eq!(ledger.mark_paid(T1), Ok(0.3));
        assert_eq!(status(&ledger, T1), TableStatus::Paid);
    }

    #[test]
    fn test_mark_paid_empty_order() {
        let mut ledger = ledger();
        assert_eq!(ledger.mark_paid(T1), Err(PosError::EmptyOrder(T1)));
        assert_eq!(status(&ledger, T1), TableStatus::Free);
    }

    #[test]
    fn test_mark_paid_twice() {
        let mut ledger = ledger();
        ledger.add_order(T1, OrderLine::new("Burger", 8.5)).unwrap();
        assert_eq!(ledger.mark_paid(T1), Ok(8.5));
        assert_eq!(ledger.mark_paid(T1), Err(PosError::AlreadyPaid(T1)));
        assert_eq!(status(&ledger, T1), TableStatus::Paid);
    }

    #[test]
    fn test_close_table() {
        let mut ledger = ledger();
        ledger.add_order(T1, OrderLine::new("Burger", 8.5)).unwrap();
        ledger.mark_paid(T1).unwrap();
        ledger.close_table(T1).unwrap();
        assert!(ledger.get(T1).unwrap().orders.is_empty());
        assert_eq!(status(&ledger, T1), TableStatus::Free);
        assert_eq!(ledger.table_total(T1).unwrap(), 0.0);
    }

    #[test]
    fn test_counter_never_free() {
        let mut ledger = ledger();
        let togo = TableId::ToGo;

        ledger.add_order(togo, OrderLine::new("Coffee", 3.0)).unwrap();
        assert_eq!(status(&ledger, togo), TableStatus::Active);
        ledger.remove_order(togo, 0).unwrap();
        assert_eq!(status(&ledger, togo), TableStatus::Active);

        ledger.add_order(togo, OrderLine::new("Coffee", 3.0)).unwrap();
        ledger.mark_paid(togo).unwrap();
        assert_eq!(status(&ledger, togo), TableStatus::Paid);
        ledger.remove_order(togo, 0).unwrap();
        assert_eq!(status(&ledger, togo), TableStatus::Occupied);

        ledger.add_order(togo, OrderLine::new("Bagel", 4.5)).unwrap();
        ledger.close_table(togo).unwrap();
        assert_eq!(status(&ledger, togo), TableStatus::Active);
    }

    #[test]
    fn test_snapshot_tables_covers_every_table() {
        let mut ledger = ledger();
        ledger.add_order(T1, OrderLine::new("Burger", 8.5)).unwrap();
        let tables = ledger.snapshot_tables();
        assert_eq!(tables.len(), 5);
        assert_eq!(tables[&T1].status, TableStatus::Occupied);
        assert_eq!(tables[&TableId::ToGo].status, TableStatus::Active);
    }
}

//! Persisted state snapshot
//!
//! The complete serializable state of one venue: every table's order list
//! and status plus the running revenue total. Every save overwrites the
//! previous snapshot in full.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::OrderLine;
use crate::models::{TableId, TableRecord, TableStatus};

/// Current snapshot schema version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Persisted form of a single table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub orders: Vec<OrderLine>,
    pub status: TableStatus,
}

impl TableSnapshot {
    pub fn into_record(self, id: TableId) -> TableRecord {
        TableRecord {
            id,
            orders: self.orders,
            status: self.status,
        }
    }
}

impl From<&TableRecord> for TableSnapshot {
    fn from(record: &TableRecord) -> Self {
        Self {
            orders: record.orders.clone(),
            status: record.status,
        }
    }
}

/// Full state snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Schema version (see [`SNAPSHOT_VERSION`])
    pub version: u32,
    /// Save time (Unix millis)
    pub saved_at: i64,
    pub tables: BTreeMap<TableId, TableSnapshot>,
    /// Running revenue total of the current business day
    pub revenue: f64,
}

impl StateSnapshot {
    pub fn new(tables: BTreeMap<TableId, TableSnapshot>, revenue: f64) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            saved_at: crate::util::now_millis(),
            tables,
            revenue,
        }
    }

    /// Whether this build knows how to read the snapshot
    pub fn is_supported_version(&self) -> bool {
        (1..=SNAPSHOT_VERSION).contains(&self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_json_shape() {
        let mut tables = BTreeMap::new();
        tables.insert(
            TableId::Number(1),
            TableSnapshot {
                orders: vec![OrderLine::new("Burger", 8.5)],
                status: TableStatus::Occupied,
            },
        );
        tables.insert(
            TableId::ToGo,
            TableSnapshot {
                orders: vec![],
                status: TableStatus::Active,
            },
        );
        let snapshot = StateSnapshot::new(tables, 12.0);

        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["revenue"], 12.0);
        assert_eq!(value["tables"]["1"]["status"], "occupied");
        assert_eq!(value["tables"]["1"]["orders"][0]["name"], "Burger");
        assert_eq!(value["tables"]["togo"]["status"], "active");

        let decoded: StateSnapshot = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn test_supported_version() {
        let mut snapshot = StateSnapshot::new(BTreeMap::new(), 0.0);
        assert!(snapshot.is_supported_version());
        snapshot.version = SNAPSHOT_VERSION + 1;
        assert!(!snapshot.is_supported_version());
        snapshot.version = 0;
        assert!(!snapshot.is_supported_version());
    }

    #[test]
    fn test_table_snapshot_record_conversion() {
        let mut record = TableRecord::new(TableId::Number(2));
        record.orders.push(OrderLine::new("Fries", 3.0));
        record.status = TableStatus::Paid;

        let snap = TableSnapshot::from(&record);
        assert_eq!(snap.into_record(TableId::Number(2)), record);
    }
}

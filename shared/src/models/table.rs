//! Table Model

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::order::OrderLine;

/// Sentinel identifier of the to-go counter
pub const TOGO_ID: &str = "togo";

/// Table identifier (桌台标识)
///
/// Either a physical table number (>= 1) or the to-go counter. Serialized as
/// a string (`"3"`, `"togo"`) so it can key a JSON map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TableId {
    Number(u32),
    ToGo,
}

impl TableId {
    /// Whether this identifier is the to-go counter
    pub fn is_counter(&self) -> bool {
        matches!(self, TableId::ToGo)
    }

    /// Human-readable title shown above the order list
    pub fn label(&self) -> String {
        match self {
            TableId::Number(n) => format!("Table {}", n),
            TableId::ToGo => "To Go Counter".to_string(),
        }
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableId::Number(n) => write!(f, "{}", n),
            TableId::ToGo => f.write_str(TOGO_ID),
        }
    }
}

/// Error returned when a string is not a valid table identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTableId(pub String);

impl fmt::Display for InvalidTableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid table identifier: {:?}", self.0)
    }
}

impl std::error::Error for InvalidTableId {}

impl FromStr for TableId {
    type Err = InvalidTableId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case(TOGO_ID) {
            return Ok(TableId::ToGo);
        }
        match trimmed.parse::<u32>() {
            Ok(n) if n >= 1 => Ok(TableId::Number(n)),
            _ => Err(InvalidTableId(s.to_string())),
        }
    }
}

impl Serialize for TableId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TableId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Billing status of a table
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    /// No open orders (numbered tables only)
    Free,
    /// Has unpaid orders
    Occupied,
    /// Orders have been paid
    Paid,
    /// Idle state of the to-go counter
    Active,
}

impl TableStatus {
    /// Initial status for a freshly created or closed table
    pub fn idle_for(id: TableId) -> Self {
        if id.is_counter() {
            TableStatus::Active
        } else {
            TableStatus::Free
        }
    }
}

/// Payment badge shown next to the order list
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BadgeState {
    Hidden,
    Unpaid,
    Paid,
}

/// One table's billing cycle: ordered lines plus status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRecord {
    pub id: TableId,
    pub orders: Vec<OrderLine>,
    pub status: TableStatus,
}

impl TableRecord {
    /// Create an empty record in its idle state
    pub fn new(id: TableId) -> Self {
        Self {
            id,
            orders: Vec::new(),
            status: TableStatus::idle_for(id),
        }
    }

    /// Badge derived from the order list and status
    pub fn badge(&self) -> BadgeState {
        if self.orders.is_empty() {
            BadgeState::Hidden
        } else if self.status == TableStatus::Paid {
            BadgeState::Paid
        } else {
            BadgeState::Unpaid
        }
    }

    /// Status text shown on the table card
    pub fn status_text(&self) -> &'static str {
        if self.id.is_counter() {
            return "Counter Open";
        }
        match self.status {
            TableStatus::Free => "Free",
            TableStatus::Occupied => "Occupied",
            TableStatus::Paid => "Paid",
            TableStatus::Active => "Active",
        }
    }
}

//! Order line types

use serde::{Deserialize, Serialize};

/// One purchased item recorded against a table
///
/// Immutable once created; removed by its position in the table's list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub name: String,
    pub price: f64,
}

impl OrderLine {
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }
}

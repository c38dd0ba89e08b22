//! Command error taxonomy
//!
//! Every failure is recovered at the command boundary and surfaced to the
//! presentation layer as a notice. None of them is fatal to the process.

use shared::error::{ErrorCategory, ErrorCode};
use shared::models::{InvalidTableId, TableId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PosError {
    #[error("Table not found: {0}")]
    InvalidTable(String),

    #[error("Select a table first")]
    NoTableSelected,

    #[error("Invalid item: {0}")]
    InvalidItem(String),

    #[error("Item index {index} out of range ({len} items)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("No orders to pay on {0}")]
    EmptyOrder(TableId),

    #[error("{0} is already paid")]
    AlreadyPaid(TableId),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Saved state is corrupted: {0}")]
    CorruptData(String),

    #[error("Failed to save state: {0}")]
    PersistenceFailure(String),
}

impl PosError {
    pub fn invalid_table(id: impl ToString) -> Self {
        Self::InvalidTable(id.to_string())
    }

    pub fn invalid_item(msg: impl Into<String>) -> Self {
        Self::InvalidItem(msg.into())
    }

    /// Numeric code for the presentation layer
    pub fn code(&self) -> ErrorCode {
        match self {
            PosError::InvalidTable(_) => ErrorCode::TableNotFound,
            PosError::NoTableSelected => ErrorCode::TableNotSelected,
            PosError::InvalidItem(_) => ErrorCode::ItemInvalid,
            PosError::IndexOutOfRange { .. } => ErrorCode::ItemIndexOutOfRange,
            PosError::EmptyOrder(_) => ErrorCode::OrderEmpty,
            PosError::AlreadyPaid(_) => ErrorCode::AlreadyPaid,
            PosError::InvalidAmount(_) => ErrorCode::InvalidAmount,
            PosError::CorruptData(_) => ErrorCode::StorageCorrupted,
            PosError::PersistenceFailure(_) => ErrorCode::StorageFailed,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        self.code().category()
    }

    /// Informational errors the caller treats as a no-op
    pub fn is_soft(&self) -> bool {
        matches!(self, PosError::AlreadyPaid(_))
    }
}

impl From<InvalidTableId> for PosError {
    fn from(err: InvalidTableId) -> Self {
        PosError::InvalidTable(err.0)
    }
}

pub type PosResult<T> = Result<T, PosError>;

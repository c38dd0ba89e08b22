//! Unified error codes for the point-of-sale core
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 7xxx: Table errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so the terminal front-end
/// (or any other presentation layer) can localize notices without parsing
/// messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Invalid configuration value
    InvalidConfig = 3,

    // ==================== 4xxx: Order ====================
    /// Order list is empty
    OrderEmpty = 4001,
    /// Order line name or price is invalid
    ItemInvalid = 4002,
    /// Order line index is out of range
    ItemIndexOutOfRange = 4003,

    // ==================== 5xxx: Payment ====================
    /// Table has already been paid
    AlreadyPaid = 5001,
    /// Payment amount is invalid
    InvalidAmount = 5002,

    // ==================== 7xxx: Table ====================
    /// Table identifier is unknown
    TableNotFound = 7001,
    /// No table is currently selected
    TableNotSelected = 7002,

    // ==================== 9xxx: System ====================
    /// Persisting the state snapshot failed
    StorageFailed = 9401,
    /// Stored snapshot is unreadable
    StorageCorrupted = 9403,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            ErrorCode::InvalidConfig => "Invalid configuration",

            ErrorCode::OrderEmpty => "No orders to pay",
            ErrorCode::ItemInvalid => "Invalid order item",
            ErrorCode::ItemIndexOutOfRange => "Order item index out of range",

            ErrorCode::AlreadyPaid => "Table already paid",
            ErrorCode::InvalidAmount => "Invalid payment amount",

            ErrorCode::TableNotFound => "Table not found",
            ErrorCode::TableNotSelected => "Select a table first",

            ErrorCode::StorageFailed => "Failed to save state",
            ErrorCode::StorageCorrupted => "Saved state is corrupted",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            3 => Ok(ErrorCode::InvalidConfig),

            4001 => Ok(ErrorCode::OrderEmpty),
            4002 => Ok(ErrorCode::ItemInvalid),
            4003 => Ok(ErrorCode::ItemIndexOutOfRange),

            5001 => Ok(ErrorCode::AlreadyPaid),
            5002 => Ok(ErrorCode::InvalidAmount),

            7001 => Ok(ErrorCode::TableNotFound),
            7002 => Ok(ErrorCode::TableNotSelected),

            9401 => Ok(ErrorCode::StorageFailed),
            9403 => Ok(ErrorCode::StorageCorrupted),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::InvalidConfig.code(), 3);
        assert_eq!(ErrorCode::OrderEmpty.code(), 4001);
        assert_eq!(ErrorCode::ItemIndexOutOfRange.code(), 4003);
        assert_eq!(ErrorCode::AlreadyPaid.code(), 5001);
        assert_eq!(ErrorCode::TableNotFound.code(), 7001);
        assert_eq!(ErrorCode::TableNotSelected.code(), 7002);
        assert_eq!(ErrorCode::StorageCorrupted.code(), 9403);
    }

    #[test]
    fn test_try_from() {
        assert_eq!(ErrorCode::try_from(7001), Ok(ErrorCode::TableNotFound));
        assert_eq!(ErrorCode::try_from(9401), Ok(ErrorCode::StorageFailed));
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_string(&ErrorCode::OrderEmpty).unwrap();
        assert_eq!(json, "4001");

        let code: ErrorCode = serde_json::from_str("5001").unwrap();
        assert_eq!(code, ErrorCode::AlreadyPaid);

        let result: Result<ErrorCode, _> = serde_json::from_str("10000");
        assert!(result.is_err());
    }

    #[test]
    fn test_display_and_message() {
        assert_eq!(format!("{}", ErrorCode::TableNotSelected), "7002");
        assert_eq!(ErrorCode::OrderEmpty.message(), "No orders to pay");
        assert_eq!(ErrorCode::AlreadyPaid.message(), "Table already paid");
        assert_eq!(
            format!("{}", InvalidErrorCode(42)),
            "invalid error code: 42"
        );
    }
}

//! Unified error codes for the point-of-sale core
//!
//! - [`ErrorCode`]: Standardized numeric codes for every command failure
//! - [`ErrorCategory`]: Classification of codes by domain
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 7xxx: Table errors
//! - 9xxx: System errors

mod category;
mod codes;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};

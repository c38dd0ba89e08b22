//! Input validation helpers
//!
//! Operator input is normalized before it reaches the ledger: names are
//! trimmed and bounded so a stray paste cannot bloat every saved snapshot,
//! prices are rounded to cents.

use shared::order::OrderLine;

use crate::tables::error::{PosError, PosResult};
use crate::tables::money;

// ── Text length limits ──────────────────────────────────────────────

/// Order line names (menu item names are short; 200 leaves room for notes)
pub const MAX_NAME_LEN: usize = 200;

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> PosResult<()> {
    if value.trim().is_empty() {
        return Err(PosError::invalid_item(format!("{field} must not be empty")));
    }
    if value.chars().count() > max_len {
        return Err(PosError::invalid_item(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.chars().count()
        )));
    }
    Ok(())
}

/// Build an order line from operator input (name trimmed, price in cents)
pub fn validate_order_line(name: &str, price: f64) -> PosResult<OrderLine> {
    let name = name.trim();
    validate_required_text(name, "name", MAX_NAME_LEN)?;
    money::validate_price(price)?;
    Ok(OrderLine::new(name, money::round_cents(price)))
}

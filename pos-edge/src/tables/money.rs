//! Money calculation utilities using rust_decimal for precision
//!
//! Prices and totals are stored as `f64`; every sum is computed with
//! `Decimal` and rounded back to 2 decimal places.

use rust_decimal::prelude::*;
use shared::order::OrderLine;

use super::error::{PosError, PosResult};

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed price per item
pub const MAX_PRICE: f64 = 1_000_000.0;

/// Validate that a f64 value is finite (not NaN, not Infinity)
#[inline]
fn require_finite(value: f64, field_name: &str) -> Result<(), String> {
    if !value.is_finite() {
        return Err(format!("{} must be a finite number, got {}", field_name, value));
    }
    Ok(())
}

/// Validate an order line price
pub fn validate_price(price: f64) -> PosResult<()> {
    require_finite(price, "price").map_err(PosError::InvalidItem)?;
    if price < 0.0 {
        return Err(PosError::invalid_item(format!(
            "price must be non-negative, got {}",
            price
        )));
    }
    if price > MAX_PRICE {
        return Err(PosError::invalid_item(format!(
            "price exceeds maximum allowed ({}), got {}",
            MAX_PRICE, price
        )));
    }
    Ok(())
}

/// Validate a payment amount forwarded to the revenue tracker
pub fn validate_amount(amount: f64) -> PosResult<()> {
    require_finite(amount, "amount").map_err(PosError::InvalidAmount)?;
    if amount < 0.0 {
        return Err(PosError::InvalidAmount(format!(
            "amount must be non-negative, got {}",
            amount
        )));
    }
    Ok(())
}

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Round a price to whole cents
///
/// Stored prices are always cent values, so they survive the JSON snapshot
/// unchanged.
#[inline]
pub fn round_cents(value: f64) -> f64 {
    to_f64(to_decimal(value))
}

/// Sum of all line prices
pub fn lines_total(lines: &[OrderLine]) -> Decimal {
    lines.iter().map(|line| to_decimal(line.price)).sum()
}

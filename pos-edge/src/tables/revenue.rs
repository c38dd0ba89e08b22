//! RevenueTracker - running revenue total of the current business day

use rust_decimal::Decimal;

use super::error::PosResult;
use super::money;

/// Session-scoped revenue accumulator
///
/// The total only grows, except through [`RevenueTracker::reset_day`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RevenueTracker {
    total: Decimal,
}

impl RevenueTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a previously persisted total
    pub fn with_total(total: f64) -> PosResult<Self> {
        money::validate_amount(total)?;
        Ok(Self {
            total: money::to_decimal(total),
        })
    }

    /// Add a payment to the running total and return the new total
    pub fn record_payment(&mut self, amount: f64) -> PosResult<f64> {
        money::validate_amount(amount)?;
        self.total += money::to_decimal(amount);
        Ok(self.current_total())
    }

    /// Start a new business day: total back to zero
    pub fn reset_day(&mut self) {
        self.total = Decimal::ZERO;
    }

    pub fn current_total(&self) -> f64 {
        money::to_f64(self.total)
    }
}

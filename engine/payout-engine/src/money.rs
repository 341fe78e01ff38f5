//! Conversion between external currency amounts and integer cents
//!
//! Every amount crossing into the engine is rounded to cents exactly once, here.
//! All splitting happens on `i64` cents afterwards.

use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};

use crate::error::{PayoutError, Result};

/// Round a currency amount to whole cents, half away from zero
pub fn round_to_cents(amount: Decimal) -> Result<i64> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|cents| cents.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|cents| cents.to_i64())
        .ok_or(PayoutError::AmountOutOfRange(amount))
}

/// Convert cents back into a currency amount with two decimal places
pub fn cents_to_amount(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Format cents for display, e.g. `$1234.50` or `-$0.05`
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}${}.{:02}", sign, abs / 100, abs % 100)
}

/// Multiply an amount by a count and round to cents
pub(crate) fn scaled_cents(amount: Decimal, count: i64) -> Result<i64> {
    let total = amount
        .checked_mul(Decimal::from(count))
        .ok_or(PayoutError::AmountOutOfRange(amount))?;
    round_to_cents(total)
}

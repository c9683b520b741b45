//! Currency rounding.

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept for currency amounts.
pub const CURRENCY_DP: u32 = 2;

/// Rounds an amount to cents, halves away from zero.
///
/// # Example
///
/// ```
/// use pilot_pay::calculation::round_currency;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(
///     round_currency(Decimal::from_str("107.025").unwrap()),
///     Decimal::from_str("107.03").unwrap()
/// );
/// ```
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CURRENCY_DP, RoundingStrategy::MidpointAwayFromZero)
}

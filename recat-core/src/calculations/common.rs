//! Common utility functions for recategorization arithmetic.

use rust_decimal::Decimal;

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use recat_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(12.344)), dec!(12.34));
/// assert_eq!(round_half_up(dec!(12.345)), dec!(12.35));
/// assert_eq!(round_half_up(dec!(-12.345)), dec!(-12.35));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Percentage change from `previous` to `current`, at full precision.
///
/// Returns `None` when `previous` is zero or the result does not fit in a
/// `Decimal`. Rounding is left to whoever presents the value.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use recat_core::calculations::common::{percent_change, round_half_up};
///
/// assert_eq!(percent_change(dec!(200), dec!(250)), Some(dec!(25)));
/// assert_eq!(percent_change(dec!(30), dec!(40)).map(round_half_up), Some(dec!(33.33)));
/// assert_eq!(percent_change(dec!(0), dec!(250)), None);
/// ```
pub fn percent_change(
    previous: Decimal,
    current: Decimal,
) -> Option<Decimal> {
    (current - previous)
        .checked_div(previous)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
}

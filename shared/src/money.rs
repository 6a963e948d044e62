//! Money calculation utilities using rust_decimal for precision
//!
//! Wire prices are `f64`; every calculation goes through `Decimal` and is
//! rounded to 2 decimal places before converting back.

use rust_decimal::prelude::*;

/// Rounding for monetary values (2 decimal places, half-up)
pub const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Convert an f64 wire value to Decimal
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert a Decimal back to an f64 wire value, rounded to 2 places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or(0.0)
}

/// Compare two monetary values within [`MONEY_TOLERANCE`]
#[inline]
pub fn money_eq(a: f64, b: f64) -> bool {
    (to_decimal(a) - to_decimal(b)).abs() <= MONEY_TOLERANCE
}

/// Line total: unit price x quantity, rounded
pub fn line_total(unit_price: f64, quantity: i32) -> f64 {
    to_f64(to_decimal(unit_price) * Decimal::from(quantity))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_eq_within_one_cent() {
        assert!(money_eq(25.00, 25.00));
        assert!(money_eq(25.00, 25.01));
        assert!(money_eq(25.00, 24.99));
        assert!(!money_eq(25.00, 25.02));
    }

    #[test]
    fn line_total_is_exact_for_decimal_prices() {
        // 12.50 * 2 would accumulate noise in f64 chains; Decimal keeps it exact
        assert_eq!(line_total(12.50, 2), 25.00);
        assert_eq!(line_total(7.25, 3), 21.75);
        assert_eq!(line_total(0.10, 3), 0.30);
    }

    #[test]
    fn to_f64_rounds_half_away_from_zero() {
        let d = Decimal::new(10_005, 3); // 10.005
        assert_eq!(to_f64(d), 10.01);
    }
}

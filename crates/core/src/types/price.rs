//! Money helpers using decimal arithmetic.
//!
//! All storefront amounts are US dollars held as [`Decimal`] so that tax and
//! line totals never pick up binary floating point drift.

use rust_decimal::{Decimal, RoundingStrategy};

/// Flat sales tax applied to the cart subtotal (8%).
pub const TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

/// Tax owed on a subtotal at [`TAX_RATE`].
///
/// The result is not rounded; callers round for display only.
#[must_use]
pub fn tax_on(subtotal: Decimal) -> Decimal {
    subtotal * TAX_RATE
}

/// Format an amount for display (e.g., `$19.99`).
///
/// Rounds half away from zero to cents.
#[must_use]
pub fn format_usd(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-${:.2}", rounded.abs())
    } else {
        format!("${rounded:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_is_eight_percent() {
        assert_eq!(TAX_RATE, Decimal::new(8, 2));
    }

    #[test]
    fn test_tax_on_fifty_dollars() {
        assert_eq!(tax_on(Decimal::new(50, 0)), Decimal::new(4, 0));
    }

    #[test]
    fn test_format_usd_pads_cents() {
        assert_eq!(format_usd(Decimal::new(54, 0)), "$54.00");
        assert_eq!(format_usd(Decimal::new(1999, 2)), "$19.99");
    }

    #[test]
    fn test_format_usd_rounds_half_up() {
        assert_eq!(format_usd(Decimal::new(12345, 3)), "$12.35");
    }

    #[test]
    fn test_format_usd_negative() {
        assert_eq!(format_usd(Decimal::new(-500, 2)), "-$5.00");
    }
}

//! Price Calculator
//!
//! Logic for computing reservation totals.
//! Uses rust_decimal for precise calculations, stores as f64.

use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal for calculation
#[inline]
fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Boarding charge for a stay: `daily_rate × days`, rounded to currency
/// precision
pub fn boarding_charge(daily_rate: f64, days: i64) -> f64 {
    let charge = to_decimal(daily_rate) * Decimal::from(days.max(0));
    to_f64(charge.max(Decimal::ZERO))
}

/// Total charge for a reservation.
///
/// `service_price × pet_count`, plus `daily_rate × days` for boarding
/// stays. The per-pet price is a flat multiplier of the single service
/// price; there is no per-pet differentiation by size or species.
///
/// Pure function of its inputs — re-derivable at audit time from the
/// persisted reservation fields.
pub fn compute_total(service_price: f64, pet_count: u32, boarding: Option<(f64, i64)>) -> f64 {
    let mut total = to_decimal(service_price) * Decimal::from(pet_count);
    if let Some((daily_rate, days)) = boarding {
        total += to_decimal(daily_rate) * Decimal::from(days.max(0));
    }
    to_f64(total.max(Decimal::ZERO))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_pet_regular() {
        assert_eq!(compute_total(300.0, 1, None), 300.0);
    }

    #[test]
    fn test_multi_pet_flat_multiplier() {
        // 3 pets on one regular-service reservation, price 300 → 900
        assert_eq!(compute_total(300.0, 3, None), 900.0);
    }

    #[test]
    fn test_boarding_adds_daily_rate() {
        // 1 pet, daily_rate 500, 3 nights → service price + 1500
        assert_eq!(compute_total(250.0, 1, Some((500.0, 3))), 1750.0);
    }

    #[test]
    fn test_multi_pet_boarding() {
        // Per-pet multiplier applies to the service price only; the cage
        // is charged once per stay
        assert_eq!(compute_total(250.0, 2, Some((500.0, 3))), 2000.0);
    }

    #[test]
    fn test_boarding_charge_alone() {
        assert_eq!(boarding_charge(500.0, 3), 1500.0);
        assert_eq!(boarding_charge(499.99, 2), 999.98);
    }

    #[test]
    fn test_free_service() {
        assert_eq!(compute_total(0.0, 5, None), 0.0);
    }

    // ========== Precision tests ==========

    #[test]
    fn test_precision_fractional_price() {
        // 3 × 99.99 = 299.97 exactly, no float drift
        assert_eq!(compute_total(99.99, 3, None), 299.97);
    }

    #[test]
    fn test_precision_rounding_half_up() {
        // 3 × 0.335 = 1.005 → rounds to 1.01 (half-up)
        assert_eq!(compute_total(0.335, 3, None), 1.01);
    }

    #[test]
    fn test_negative_days_clamped() {
        assert_eq!(boarding_charge(500.0, -1), 0.0);
        assert_eq!(compute_total(300.0, 1, Some((500.0, -2))), 300.0);
    }
}

//! Supply saturation estimate.

use crate::engine::urgency::SAFE_SUPPLY_WINDOW_HOURS;

/// Percentage of supply considered consumed for a given supply window.
///
/// `0h -> 100.0`, `>= 24h -> 0.0`, linear in between.
pub fn saturation_percentage(supply_window_hours: u32) -> f64 {
    let window = f64::from(SAFE_SUPPLY_WINDOW_HOURS);
    let hours = f64::from(supply_window_hours);
    (100.0 * (1.0 - hours / window)).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_anchor_points() {
        assert_eq!(saturation_percentage(0), 100.0);
        assert_eq!(saturation_percentage(12), 50.0);
        assert_eq!(saturation_percentage(24), 0.0);
        assert_eq!(saturation_percentage(6), 75.0);
    }

    #[test]
    fn test_beyond_window_is_safe() {
        assert_eq!(saturation_percentage(48), 0.0);
        assert_eq!(saturation_percentage(u32::MAX), 0.0);
    }

    proptest! {
        #[test]
        fn prop_non_increasing(hours in 0u32..200, extra in 0u32..200) {
            prop_assert!(saturation_percentage(hours + extra) <= saturation_percentage(hours));
        }

        #[test]
        fn prop_in_range(hours in any::<u32>()) {
            let value = saturation_percentage(hours);
            prop_assert!((0.0..=100.0).contains(&value));
        }
    }
}

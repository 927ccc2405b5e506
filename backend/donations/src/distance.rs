//! Donor-to-receiver distance estimates.
//!
//! No geocoding is performed yet. [`RandomDistance`] produces a placeholder
//! value so the dashboard has something to show; its output is
//! non-deterministic and carries no meaning beyond its format
//! (`"<miles>.<tenths> mi"`, within `[0.5, 10.0)`).

use rand::Rng;

/// Source of the `distance` string stamped on a donation when it is created.
pub trait DistanceEstimator: Send + Sync {
    fn estimate(&self, donor_address: Option<&str>) -> String;
}

/// Smallest and largest-exclusive estimate, in tenths of a mile.
const MIN_TENTHS: u32 = 5;
const MAX_TENTHS: u32 = 100;

/// Uniformly random placeholder estimate.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomDistance;

impl DistanceEstimator for RandomDistance {
    fn estimate(&self, _donor_address: Option<&str>) -> String {
        // Sampling whole tenths keeps the rounded value inside the range.
        let tenths = rand::rng().random_range(MIN_TENTHS..MAX_TENTHS);
        format_miles(tenths)
    }
}

fn format_miles(tenths: u32) -> String {
    format!("{}.{} mi", tenths / 10, tenths % 10)
}

/// Check that `s` reads `<digits>.<digit> mi` and return the miles.
#[cfg(test)]
pub(crate) fn parse_miles(s: &str) -> f64 {
    let number = s.strip_suffix(" mi").expect("missing unit suffix");
    let (whole, frac) = number.split_once('.').expect("missing decimal point");
    assert!(!whole.is_empty() && whole.chars().all(|c| c.is_ascii_digit()));
    assert!(frac.len() == 1 && frac.chars().all(|c| c.is_ascii_digit()));
    number.parse().unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_tenths() {
        assert_eq!(format_miles(5), "0.5 mi");
        assert_eq!(format_miles(42), "4.2 mi");
        assert_eq!(format_miles(99), "9.9 mi");
    }

    #[test]
    fn random_estimates_stay_in_range() {
        let estimator = RandomDistance;
        for _ in 0..1_000 {
            let miles = parse_miles(&estimator.estimate(Some("1 Main St")));
            assert!((0.5..10.0).contains(&miles), "out of range: {miles}");
        }
    }

    #[test]
    fn address_is_optional() {
        parse_miles(&RandomDistance.estimate(None));
    }
}

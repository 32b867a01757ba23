//! Vial supply tracking.
//!
//! The tracker holds the only counter the caller mutates (`doses_used`).
//! Remaining doses, percentage and depletion are derived fresh on every
//! read; nothing is latched.

use crate::types::SupplyState;

/// Whole doses a vial yields at `dose_mcg`, or 0 when the dose is unknown
pub fn doses_in_vial(vial_mass_mcg: f64, dose_mcg: f64) -> f64 {
    if vial_mass_mcg > 0.0 && dose_mcg > 0.0 {
        vial_mass_mcg / dose_mcg
    } else {
        0.0
    }
}

/// Doses-used counter bounded by the vial contents
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SupplyTracker {
    doses_in_vial: f64,
    doses_used: f64,
}

impl SupplyTracker {
    /// Start tracking with `doses_used` already logged (negative values clamp to 0)
    pub fn new(doses_in_vial: f64, doses_used: f64) -> Self {
        let mut tracker = Self {
            doses_in_vial: doses_in_vial.max(0.0),
            doses_used: 0.0,
        };
        tracker.set_used(doses_used);
        tracker
    }

    pub fn doses_in_vial(&self) -> f64 {
        self.doses_in_vial
    }

    pub fn doses_used(&self) -> f64 {
        self.doses_used
    }

    /// Log one dose. Stops at the vial contents rather than overshooting.
    pub fn increment(&mut self) {
        let next = (self.doses_used + 1.0).min(self.doses_in_vial);
        if next <= self.doses_used {
            tracing::debug!(
                "Doses used already at vial contents ({:.1}), ignoring increment",
                self.doses_in_vial
            );
            return;
        }
        self.doses_used = next;
    }

    /// Un-log one dose, never below zero
    pub fn decrement(&mut self) {
        self.doses_used = (self.doses_used - 1.0).max(0.0);
    }

    /// Direct entry. Only the lower bound applies, so an over-count shows
    /// up as a negative remaining figure and a depleted vial.
    pub fn set_used(&mut self, doses_used: f64) {
        if doses_used < 0.0 {
            tracing::debug!("Clamping doses used {} to 0", doses_used);
        }
        self.doses_used = doses_used.max(0.0);
    }

    pub fn doses_remaining(&self) -> f64 {
        self.doses_in_vial - self.doses_used
    }

    pub fn percent_remaining(&self) -> f64 {
        if self.doses_in_vial > 0.0 {
            (self.doses_remaining() / self.doses_in_vial * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        }
    }

    pub fn is_depleted(&self) -> bool {
        self.doses_remaining() <= 0.0 && self.doses_in_vial > 0.0
    }

    pub fn state(&self) -> SupplyState {
        SupplyState {
            doses_in_vial: self.doses_in_vial,
            doses_used: self.doses_used,
            doses_remaining: self.doses_remaining(),
            percent_remaining: self.percent_remaining(),
            depleted: self.is_depleted(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_doses_in_vial() {
        assert_eq!(doses_in_vial(10_000.0, 250.0), 40.0);
        assert_eq!(doses_in_vial(10_000.0, 0.0), 0.0);
        assert_eq!(doses_in_vial(0.0, 250.0), 0.0);
    }

    #[test]
    fn test_depletion_boundary() {
        assert!(SupplyTracker::new(10.0, 10.0).is_depleted());
        assert!(!SupplyTracker::new(10.0, 9.999).is_depleted());
    }

    #[test]
    fn test_empty_vial_is_never_depleted() {
        let tracker = SupplyTracker::new(0.0, 3.0);
        assert!(!tracker.is_depleted());
        assert_eq!(tracker.percent_remaining(), 0.0);
    }

    #[test]
    fn test_increment_stops_at_vial_contents() {
        let mut tracker = SupplyTracker::new(2.5, 0.0);
        tracker.increment();
        tracker.increment();
        assert_eq!(tracker.doses_used(), 2.0);

        tracker.increment();
        assert_eq!(tracker.doses_used(), 2.5);
        assert!(tracker.is_depleted());

        tracker.increment();
        assert_eq!(tracker.doses_used(), 2.5);
    }

    #[test]
    fn test_decrement_stops_at_zero() {
        let mut tracker = SupplyTracker::new(10.0, 1.0);
        tracker.decrement();
        tracker.decrement();
        assert_eq!(tracker.doses_used(), 0.0);
    }

    #[test]
    fn test_overcount_keeps_negative_remaining() {
        let tracker = SupplyTracker::new(10.0, 12.0);
        assert_eq!(tracker.doses_remaining(), -2.0);
        assert_eq!(tracker.percent_remaining(), 0.0);
        assert!(tracker.is_depleted());
    }

    #[test]
    fn test_state_snapshot() {
        let state = SupplyTracker::new(40.0, 10.0).state();
        assert_eq!(state.doses_remaining, 30.0);
        assert_eq!(state.percent_remaining, 75.0);
        assert!(!state.depleted);
    }

    proptest! {
        #[test]
        fn prop_supply_conserves_mass(
            vial_mcg in 100.0f64..100_000.0,
            dose in 1.0f64..5_000.0,
        ) {
            let n = doses_in_vial(vial_mcg, dose);
            prop_assert!((n * dose - vial_mcg).abs() <= 1e-9 * vial_mcg);
        }

        #[test]
        fn prop_percentage_stays_in_bounds(
            total in 0.0f64..100.0,
            used in -10.0f64..200.0,
        ) {
            let pct = SupplyTracker::new(total, used).percent_remaining();
            prop_assert!((0.0..=100.0).contains(&pct));
        }
    }
}

//! Dosing schedule projection.
//!
//! This module turns a schedule selection into:
//! - A weekly dose count (fixed per schedule, user-supplied for custom)
//! - Days of supply for a vial
//! - A reorder date one lead time ahead of running out
//!
//! The custom frequency is a linked pair: writing either field derives the
//! other once, and the derived write never feeds back.

use crate::types::{DosingSchedule, ReorderDate, ReorderProjection};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Buffer between the reorder date and the day the vial runs dry
pub const REORDER_LEAD_DAYS: f64 = 7.0;

const DAYS_PER_WEEK: f64 = 7.0;

/// Custom frequency as doses per week and the equivalent dosing interval
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct CustomFrequency {
    doses_per_week: f64,
    days_between_doses: f64,
}

impl CustomFrequency {
    pub fn from_doses_per_week(doses_per_week: f64) -> Self {
        let mut freq = Self::default();
        freq.set_doses_per_week(doses_per_week);
        freq
    }

    pub fn from_days_between_doses(days: f64) -> Self {
        let mut freq = Self::default();
        freq.set_days_between_doses(days);
        freq
    }

    pub fn doses_per_week(&self) -> f64 {
        self.doses_per_week
    }

    pub fn days_between_doses(&self) -> f64 {
        self.days_between_doses
    }

    /// Store the weekly count as given; the interval follows, rounded to 0.1 day.
    /// A non-positive count leaves the interval untouched.
    pub fn set_doses_per_week(&mut self, doses_per_week: f64) {
        self.doses_per_week = doses_per_week;
        if doses_per_week > 0.0 {
            self.days_between_doses = round_tenth(DAYS_PER_WEEK / doses_per_week);
        }
    }

    /// Store the interval as given; the weekly count follows, rounded to 0.1.
    /// A non-positive interval leaves the count untouched.
    pub fn set_days_between_doses(&mut self, days: f64) {
        self.days_between_doses = days;
        if days > 0.0 {
            self.doses_per_week = round_tenth(DAYS_PER_WEEK / days);
        }
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Weekly dose count for a schedule
pub fn doses_per_week(schedule: DosingSchedule, custom: &CustomFrequency) -> f64 {
    match schedule {
        DosingSchedule::OnceDaily => 7.0,
        DosingSchedule::TwiceDaily => 14.0,
        DosingSchedule::FiveDaysPerWeek => 5.0,
        DosingSchedule::TwoToThreeXWeek => 2.5,
        DosingSchedule::EveryOtherDay => 3.5,
        DosingSchedule::Custom => custom.doses_per_week(),
    }
}

/// Calendar days a vial lasts at the given weekly rate, or 0 if either is unknown
pub fn days_of_supply(doses_in_vial: f64, doses_per_week: f64) -> f64 {
    if doses_in_vial > 0.0 && doses_per_week > 0.0 {
        doses_in_vial / (doses_per_week / DAYS_PER_WEEK)
    } else {
        0.0
    }
}

/// Reorder date for a supply lasting `days_of_supply` days from `today`
pub fn reorder_date(today: NaiveDate, days_of_supply: f64) -> ReorderDate {
    if days_of_supply <= 0.0 {
        return ReorderDate::Unavailable;
    }

    let lead_days = (days_of_supply - REORDER_LEAD_DAYS).floor();
    if lead_days <= 0.0 {
        return ReorderDate::OrderNow;
    }

    match today.checked_add_days(Days::new(lead_days as u64)) {
        Some(date) => ReorderDate::On(date),
        None => {
            tracing::warn!(
                "Reorder date {} days after {} is out of calendar range",
                lead_days,
                today
            );
            ReorderDate::Unavailable
        }
    }
}

/// Full projection for one vial under a schedule
pub fn project(
    schedule: DosingSchedule,
    custom: &CustomFrequency,
    doses_in_vial: f64,
    today: NaiveDate,
) -> ReorderProjection {
    let per_week = doses_per_week(schedule, custom);
    let supply_days = days_of_supply(doses_in_vial, per_week);
    let reorder = reorder_date(today, supply_days);

    tracing::debug!(
        "Schedule {}: {} doses/week, {:.1} days of supply, reorder {:?}",
        schedule.key(),
        per_week,
        supply_days,
        reorder
    );

    ReorderProjection {
        doses_per_week: per_week,
        days_of_supply: supply_days,
        reorder,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_fixed_schedule_rates() {
        let custom = CustomFrequency::default();
        assert_eq!(doses_per_week(DosingSchedule::OnceDaily, &custom), 7.0);
        assert_eq!(doses_per_week(DosingSchedule::TwiceDaily, &custom), 14.0);
        assert_eq!(doses_per_week(DosingSchedule::FiveDaysPerWeek, &custom), 5.0);
        assert_eq!(doses_per_week(DosingSchedule::TwoToThreeXWeek, &custom), 2.5);
        assert_eq!(doses_per_week(DosingSchedule::EveryOtherDay, &custom), 3.5);
        assert_eq!(doses_per_week(DosingSchedule::Custom, &custom), 0.0);
    }

    #[test]
    fn test_custom_linkage() {
        let mut freq = CustomFrequency::default();
        freq.set_doses_per_week(2.0);
        assert_eq!(freq.days_between_doses(), 3.5);

        freq.set_days_between_doses(7.0);
        assert_eq!(freq.doses_per_week(), 1.0);
        assert_eq!(freq.days_between_doses(), 7.0);
    }

    #[test]
    fn test_custom_linkage_rounds_derived_field_only() {
        let freq = CustomFrequency::from_doses_per_week(3.0);
        // 7 / 3 = 2.333.. -> 2.3, while the edited field keeps its value
        assert_eq!(freq.days_between_doses(), 2.3);
        assert_eq!(freq.doses_per_week(), 3.0);

        let freq = CustomFrequency::from_days_between_doses(3.0);
        assert_eq!(freq.doses_per_week(), 2.3);
        assert_eq!(freq.days_between_doses(), 3.0);
    }

    #[test]
    fn test_clearing_custom_field_keeps_partner() {
        let mut freq = CustomFrequency::from_doses_per_week(2.0);
        freq.set_doses_per_week(0.0);
        assert_eq!(freq.doses_per_week(), 0.0);
        assert_eq!(freq.days_between_doses(), 3.5);
    }

    #[test]
    fn test_days_of_supply() {
        assert_eq!(days_of_supply(40.0, 7.0), 40.0);
        assert_eq!(days_of_supply(40.0, 14.0), 20.0);
        assert_eq!(days_of_supply(0.0, 7.0), 0.0);
        assert_eq!(days_of_supply(40.0, 0.0), 0.0);
    }

    #[test]
    fn test_reorder_date_ahead_of_lead_time() {
        let today = day(2026, 10, 19);
        assert_eq!(reorder_date(today, 40.0), ReorderDate::On(day(2026, 11, 21)));
    }

    #[test]
    fn test_reorder_date_rolls_over_year() {
        let today = day(2026, 12, 20);
        assert_eq!(reorder_date(today, 20.5), ReorderDate::On(day(2027, 1, 2)));
    }

    #[test]
    fn test_reorder_date_leap_day() {
        let today = day(2028, 2, 20);
        assert_eq!(reorder_date(today, 16.0), ReorderDate::On(day(2028, 2, 29)));
    }

    #[test]
    fn test_order_now_inside_lead_time() {
        let today = day(2026, 10, 19);
        assert_eq!(reorder_date(today, 5.0), ReorderDate::OrderNow);
        assert_eq!(reorder_date(today, 7.9), ReorderDate::OrderNow);
        assert_eq!(reorder_date(today, 8.0), ReorderDate::On(day(2026, 10, 20)));
    }

    #[test]
    fn test_unavailable_without_supply() {
        assert_eq!(reorder_date(day(2026, 10, 19), 0.0), ReorderDate::Unavailable);
    }

    #[test]
    fn test_project_custom_schedule() {
        let custom = CustomFrequency::from_days_between_doses(7.0);
        let projection = project(DosingSchedule::Custom, &custom, 10.0, day(2026, 1, 1));
        assert_eq!(projection.doses_per_week, 1.0);
        assert!((projection.days_of_supply - 70.0).abs() < 1e-9);
        assert_eq!(projection.reorder, ReorderDate::On(day(2026, 3, 5)));
    }

    #[test]
    fn test_display_format() {
        assert_eq!(ReorderDate::On(day(2026, 11, 1)).display_text(), "Nov 1, 2026");
        assert_eq!(ReorderDate::OrderNow.display_text(), "Order Now");
        assert_eq!(ReorderDate::Unavailable.display_text(), "--");
    }
}

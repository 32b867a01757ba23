//! Recompute pass over the whole form.
//!
//! This module wires the components together in one direction:
//! - Concentration from the vial
//! - Units or delivered dose (effective dose first in units mode)
//! - Supply counts for the planned dose (entered or weight-based, in both modes)
//! - Schedule projection and reorder date
//!
//! `recompute` is pure and rebuilds every output from scratch. Callers run
//! it after each mutation; `Calculator` does that for them.

use crate::concentration::{Concentration, VialSpec};
use crate::conversion::{dose_for_units, exceeds_capacity, fill_percentage, units_for_dose};
use crate::reminder::ReminderEvent;
use crate::supply::{doses_in_vial, SupplyTracker};
use crate::validation::{validate, ValidationReport};
use crate::weight::effective_dose;
use crate::{
    schedule, CalculationResult, DoseForm, DoseInput, DosingSchedule, Error, ReorderProjection,
    Result, SupplyState, ValueUnit,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const INCOMPLETE_LABEL: &str = "Select vial size and water volume to begin";
pub const DEFAULT_LABEL: &str = "Result:";
pub const UNITS_LABEL: &str = "Units to Pull:";
pub const ACTUAL_DOSE_LABEL: &str = "Actual Dose:";

/// Every output of one pass, consistent with a single form state
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub concentration: Option<Concentration>,
    pub result: CalculationResult,
    /// Planned dose behind supply, projection and reminders
    pub effective_dose_mcg: f64,
    pub supply: SupplyState,
    pub projection: ReorderProjection,
    pub syringe_fill_percent: f64,
    pub validation: ValidationReport,
}

/// Derive all outputs from `form`, projecting reorder dates from `today`
pub fn recompute(form: &DoseForm, today: NaiveDate) -> Snapshot {
    let vial = VialSpec::new(form.vial_mg, form.water_ml);
    let concentration = vial.resolve();

    let result = match concentration {
        Some(ref conc) => calculate(form, conc),
        None => CalculationResult::placeholder(INCOMPLETE_LABEL, value_unit(form)),
    };

    let per_dose = if concentration.is_some() {
        effective_dose(form.planned_dose_input())
    } else {
        0.0
    };
    let supply = SupplyTracker::new(doses_in_vial(vial.mass_mcg(), per_dose), form.doses_used);
    let projection = schedule::project(form.schedule, &form.custom, supply.doses_in_vial(), today);

    let snapshot = Snapshot {
        concentration,
        syringe_fill_percent: fill_percentage(result.units, form.syringe),
        result,
        effective_dose_mcg: per_dose,
        supply: supply.state(),
        projection,
        validation: validate(form),
    };

    tracing::debug!(
        "Recomputed: {} ({}), {:.1} doses in vial, reorder {}",
        snapshot.result.main_text(),
        snapshot.result.label,
        snapshot.supply.doses_in_vial,
        snapshot.projection.reorder.display_text()
    );

    snapshot
}

fn value_unit(form: &DoseForm) -> ValueUnit {
    match form.dose_input() {
        DoseInput::FromUnits { .. } => ValueUnit::Mcg,
        DoseInput::Direct { .. } | DoseInput::WeightBased { .. } => ValueUnit::Units,
    }
}

fn calculate(form: &DoseForm, conc: &Concentration) -> CalculationResult {
    let input = form.dose_input();
    let mut result = CalculationResult::placeholder(DEFAULT_LABEL, value_unit(form));

    match input {
        DoseInput::Direct { .. } | DoseInput::WeightBased { .. } => {
            let dose = effective_dose(input);
            if let Some(draw) = units_for_dose(dose, conc, form.syringe) {
                result.main_value = Some(draw.units);
                result.units = draw.units;
                result.dose_mcg = dose;
                result.capacity_exceeded = draw.capacity_exceeded;
                result.label = match input {
                    DoseInput::WeightBased { .. } => format!("Calculated Dose: {:.0}mcg", dose),
                    _ => UNITS_LABEL.to_string(),
                };
            }
        }
        DoseInput::FromUnits { units } => {
            if let Some(dose) = dose_for_units(units, conc) {
                result.main_value = Some(dose);
                result.units = units;
                result.dose_mcg = dose;
                result.capacity_exceeded = exceeds_capacity(units, form.syringe);
                result.label = ACTUAL_DOSE_LABEL.to_string();
            }
        }
    }

    result.total_mass_for_cycle_mg = result.dose_mcg * form.cycle_days as f64 / 1000.0;
    result
}

/// Schedule name as written into reminders
pub fn schedule_name(form: &DoseForm) -> String {
    match form.schedule {
        DosingSchedule::Custom => {
            format!("Custom ({} doses/week)", form.custom.doses_per_week())
        }
        other => other.label().to_string(),
    }
}

/// Reminder for the projected reorder date.
///
/// Fails when the projection is "order now" or unavailable; callers should
/// check `ReorderDate::exportable` first.
pub fn reminder_event(form: &DoseForm, snapshot: &Snapshot) -> Result<ReminderEvent> {
    let reorder_date = snapshot.projection.reorder.exportable().ok_or_else(|| {
        Error::Export(format!(
            "no reorder date to export (reorder status: {})",
            snapshot.projection.reorder.display_text()
        ))
    })?;

    Ok(ReminderEvent {
        reorder_date,
        vial_mg: form.vial_mg,
        dose_mcg: snapshot.effective_dose_mcg,
        days_of_supply: snapshot.projection.days_of_supply,
        schedule_name: schedule_name(form),
    })
}

/// Form state plus its latest snapshot, recomputed after every mutation
#[derive(Clone, Debug)]
pub struct Calculator {
    form: DoseForm,
    today: NaiveDate,
    snapshot: Snapshot,
}

impl Calculator {
    pub fn new(form: DoseForm, today: NaiveDate) -> Self {
        let snapshot = recompute(&form, today);
        Self {
            form,
            today,
            snapshot,
        }
    }

    pub fn form(&self) -> &DoseForm {
        &self.form
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Mutate the form, then rebuild the snapshot in one pass
    pub fn update<F>(&mut self, f: F) -> &Snapshot
    where
        F: FnOnce(&mut DoseForm),
    {
        f(&mut self.form);
        self.refresh()
    }

    /// Move the projection origin (e.g. at midnight)
    pub fn set_today(&mut self, today: NaiveDate) -> &Snapshot {
        self.today = today;
        self.refresh()
    }

    /// Count one more dose taken, bounded by the vial contents
    pub fn log_dose(&mut self) -> &Snapshot {
        let mut tracker = self.tracker();
        tracker.increment();
        self.update(|form| form.doses_used = tracker.doses_used())
    }

    /// Take back one logged dose, never below zero
    pub fn undo_dose(&mut self) -> &Snapshot {
        let mut tracker = self.tracker();
        tracker.decrement();
        self.update(|form| form.doses_used = tracker.doses_used())
    }

    pub fn reminder_event(&self) -> Result<ReminderEvent> {
        reminder_event(&self.form, &self.snapshot)
    }

    fn tracker(&self) -> SupplyTracker {
        SupplyTracker::new(self.snapshot.supply.doses_in_vial, self.form.doses_used)
    }

    fn refresh(&mut self) -> &Snapshot {
        self.snapshot = recompute(&self.form, self.today);
        &self.snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::CustomFrequency;
    use crate::{CalculationMode, ReorderDate, SyringeSize};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn form(vial_mg: f64, water_ml: f64, dose: f64) -> DoseForm {
        DoseForm {
            vial_mg,
            water_ml,
            desired_dose_mcg: dose,
            ..DoseForm::default()
        }
    }

    #[test]
    fn test_end_to_end_units_mode() {
        let snap = recompute(&form(10.0, 2.0, 250.0), today());

        let conc = snap.concentration.unwrap();
        assert!((conc.mg_per_ml - 5.0).abs() < 1e-12);
        assert_eq!(snap.result.main_text(), "5.0 Units");
        assert_eq!(snap.result.label, UNITS_LABEL);
        assert!(!snap.result.capacity_exceeded);
        assert!((snap.syringe_fill_percent - 100.0 / 6.0).abs() < 1e-9);
        assert!(snap.validation.is_valid());
    }

    #[test]
    fn test_incomplete_vial_gives_placeholder() {
        let snap = recompute(&form(10.0, 0.0, 250.0), today());

        assert!(snap.concentration.is_none());
        assert_eq!(snap.result.main_text(), "--");
        assert_eq!(snap.result.label, INCOMPLETE_LABEL);
        assert_eq!(snap.supply.doses_in_vial, 0.0);
        assert_eq!(snap.projection.reorder, ReorderDate::Unavailable);
        assert!(!snap.validation.is_valid());
    }

    #[test]
    fn test_missing_dose_keeps_generic_label() {
        let snap = recompute(&form(10.0, 2.0, 0.0), today());
        assert_eq!(snap.result.main_value, None);
        assert_eq!(snap.result.label, DEFAULT_LABEL);
    }

    #[test]
    fn test_weight_based_matches_direct_entry() {
        let weighted = DoseForm {
            weight_based: true,
            body_weight_kg: 80.0,
            mcg_per_kg: 2.5,
            ..form(10.0, 2.0, 0.0)
        };
        let direct = form(10.0, 2.0, 200.0);

        let a = recompute(&weighted, today());
        let b = recompute(&direct, today());
        assert_eq!(a.result.units, b.result.units);
        assert_eq!(a.result.label, "Calculated Dose: 200mcg");
        assert_eq!(a.supply, b.supply);
    }

    #[test]
    fn test_dose_mode() {
        let f = DoseForm {
            mode: CalculationMode::Dose,
            syringe_units: 5.0,
            cycle_days: 30,
            ..form(10.0, 2.0, 0.0)
        };
        let snap = recompute(&f, today());
        assert_eq!(snap.result.main_text(), "250.0 mcg");
        assert_eq!(snap.result.label, ACTUAL_DOSE_LABEL);
        assert!((snap.result.total_mass_for_cycle_mg - 7.5).abs() < 1e-9);
        // No planned dose entered, so nothing to count supply against
        assert_eq!(snap.effective_dose_mcg, 0.0);
        assert_eq!(snap.supply.doses_in_vial, 0.0);
    }

    #[test]
    fn test_dose_mode_supply_follows_planned_dose() {
        // 10 units of 10 mg / 2 ml deliver 500 mcg, but the plan is 250 mcg
        let f = DoseForm {
            mode: CalculationMode::Dose,
            syringe_units: 10.0,
            ..form(10.0, 2.0, 250.0)
        };
        let snap = recompute(&f, today());
        assert_eq!(snap.result.main_text(), "500.0 mcg");
        assert_eq!(snap.effective_dose_mcg, 250.0);
        assert!((snap.supply.doses_in_vial - 40.0).abs() < 1e-9);
        assert!((snap.projection.days_of_supply - 40.0).abs() < 1e-9);

        let units_mode = DoseForm {
            mode: CalculationMode::Units,
            ..f.clone()
        };
        let units_mode = recompute(&units_mode, today());
        assert_eq!(snap.supply, units_mode.supply);
        assert_eq!(snap.projection, units_mode.projection);

        let event = reminder_event(&f, &snap).unwrap();
        assert_eq!(event.dose_mcg, 250.0);
    }

    #[test]
    fn test_dose_mode_weight_based_supply() {
        let f = DoseForm {
            mode: CalculationMode::Dose,
            syringe_units: 4.0,
            weight_based: true,
            body_weight_kg: 80.0,
            mcg_per_kg: 2.5,
            ..form(10.0, 2.0, 0.0)
        };
        let snap = recompute(&f, today());
        assert_eq!(snap.effective_dose_mcg, 200.0);
        assert!((snap.supply.doses_in_vial - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_dose_mode_flags_units_over_capacity() {
        let f = DoseForm {
            mode: CalculationMode::Dose,
            syringe: SyringeSize::PointThree,
            syringe_units: 40.0,
            ..form(10.0, 2.0, 250.0)
        };
        let snap = recompute(&f, today());
        assert_eq!(snap.result.main_text(), "2000.0 mcg");
        assert!(snap.result.capacity_exceeded);
        assert_eq!(snap.syringe_fill_percent, 100.0);

        let within = recompute(&DoseForm { syringe_units: 30.0, ..f }, today());
        assert!(!within.result.capacity_exceeded);
        assert_eq!(within.syringe_fill_percent, 100.0);
    }

    #[test]
    fn test_non_finite_dose_degrades_to_placeholder() {
        for bad in [f64::NAN, f64::INFINITY] {
            let snap = recompute(&form(10.0, 2.0, bad), today());
            assert_eq!(snap.result.main_text(), "--");
            assert_eq!(snap.result.label, DEFAULT_LABEL);
            assert_eq!(snap.supply.doses_in_vial, 0.0);
            assert_eq!(snap.projection.reorder, ReorderDate::Unavailable);
            assert!(!snap.validation.is_valid());
        }
    }

    #[test]
    fn test_capacity_advisory_does_not_block() {
        let f = DoseForm {
            syringe: SyringeSize::PointThree,
            ..form(5.0, 3.0, 1000.0)
        };
        let snap = recompute(&f, today());
        // 5 mg / 3 ml -> 16.67 mcg per unit -> 60 units
        assert!(snap.result.capacity_exceeded);
        assert!((snap.result.units - 60.0).abs() < 1e-9);
        assert_eq!(snap.syringe_fill_percent, 100.0);
    }

    #[test]
    fn test_reorder_projection_examples() {
        let snap = recompute(&form(10.0, 1.0, 250.0), today());
        assert_eq!(snap.supply.doses_in_vial, 40.0);
        assert_eq!(snap.projection.days_of_supply, 40.0);
        assert_eq!(
            snap.projection.reorder,
            ReorderDate::On(today() + chrono::Days::new(33))
        );

        let snap = recompute(&form(5.0, 1.0, 1000.0), today());
        assert_eq!(snap.supply.doses_in_vial, 5.0);
        assert_eq!(snap.projection.reorder, ReorderDate::OrderNow);
    }

    #[test]
    fn test_reminder_event_requires_date() {
        let f = form(5.0, 1.0, 1000.0);
        let snap = recompute(&f, today());
        assert!(matches!(reminder_event(&f, &snap), Err(Error::Export(_))));

        let f = form(10.0, 1.0, 250.0);
        let snap = recompute(&f, today());
        let event = reminder_event(&f, &snap).unwrap();
        assert_eq!(event.schedule_name, "Once Daily");
        assert_eq!(event.dose_mcg, 250.0);
        assert_eq!(event.days_of_supply, 40.0);
    }

    #[test]
    fn test_custom_schedule_name() {
        let f = DoseForm {
            schedule: DosingSchedule::Custom,
            custom: CustomFrequency::from_doses_per_week(3.0),
            ..form(10.0, 1.0, 250.0)
        };
        assert_eq!(schedule_name(&f), "Custom (3 doses/week)");
    }

    #[test]
    fn test_calculator_logs_doses_until_depleted() {
        let mut calc = Calculator::new(form(1.0, 1.0, 500.0), today());
        assert_eq!(calc.snapshot().supply.doses_in_vial, 2.0);

        calc.log_dose();
        calc.log_dose();
        assert!(calc.snapshot().supply.depleted);

        calc.log_dose();
        assert_eq!(calc.form().doses_used, 2.0);

        calc.undo_dose();
        assert!(!calc.snapshot().supply.depleted);
        assert_eq!(calc.snapshot().supply.percent_remaining, 50.0);
    }

    #[test]
    fn test_calculator_update_recomputes_everything() {
        let mut calc = Calculator::new(DoseForm::default(), today());
        assert_eq!(calc.snapshot().result.main_value, None);

        calc.update(|f| {
            f.vial_mg = 10.0;
            f.water_ml = 2.0;
            f.desired_dose_mcg = 250.0;
        });
        assert_eq!(calc.snapshot().result.main_text(), "5.0 Units");

        calc.update(|f| f.water_ml = 1.0);
        assert_eq!(calc.snapshot().result.main_text(), "2.5 Units");
    }

    #[test]
    fn test_calculator_custom_linkage_feeds_projection() {
        let mut calc = Calculator::new(form(10.0, 1.0, 250.0), today());
        calc.update(|f| {
            f.schedule = DosingSchedule::Custom;
            f.custom.set_days_between_doses(7.0);
        });
        assert_eq!(calc.form().custom.doses_per_week(), 1.0);
        assert!((calc.snapshot().projection.days_of_supply - 280.0).abs() < 1e-9);
    }
}

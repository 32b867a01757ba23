//! Per-field input validation.
//!
//! Validation annotates; it never blocks a recompute. A field is only
//! checked when the active mode and toggles make it relevant.

use crate::types::{CalculationMode, DoseForm, DosingSchedule};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const REQUIRED_POSITIVE: &str = "Required - must be positive";

/// Form fields subject to validation
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    VialSize,
    WaterVolume,
    DesiredDose,
    BodyWeight,
    McgPerKg,
    SyringeUnits,
    CustomDosesPerWeek,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::VialSize => "vial size",
            Field::WaterVolume => "water volume",
            Field::DesiredDose => "desired dose",
            Field::BodyWeight => "body weight",
            Field::McgPerKg => "mcg per kg",
            Field::SyringeUnits => "syringe units",
            Field::CustomDosesPerWeek => "custom doses per week",
        };
        f.write_str(name)
    }
}

/// Violations keyed by field, in field order
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ValidationReport {
    errors: BTreeMap<Field, String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.errors.iter().map(|(field, msg)| (*field, msg.as_str()))
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    fn require_positive(&mut self, field: Field, value: f64) {
        if !value.is_finite() || value <= 0.0 {
            self.errors.insert(field, REQUIRED_POSITIVE.to_string());
        }
    }
}

/// Flag every relevant field that is not strictly positive
pub fn validate(form: &DoseForm) -> ValidationReport {
    let mut report = ValidationReport::default();

    report.require_positive(Field::VialSize, form.vial_mg);
    report.require_positive(Field::WaterVolume, form.water_ml);

    match form.mode {
        CalculationMode::Units if form.weight_based => {
            report.require_positive(Field::BodyWeight, form.body_weight_kg);
            report.require_positive(Field::McgPerKg, form.mcg_per_kg);
        }
        CalculationMode::Units => {
            report.require_positive(Field::DesiredDose, form.desired_dose_mcg);
        }
        CalculationMode::Dose => {
            report.require_positive(Field::SyringeUnits, form.syringe_units);
        }
    }

    if form.schedule == DosingSchedule::Custom {
        report.require_positive(Field::CustomDosesPerWeek, form.custom.doses_per_week());
    }

    if !report.is_valid() {
        tracing::debug!("Validation flagged {} field(s)", report.len());
    }

    report
}

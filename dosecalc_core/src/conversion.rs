//! Dose ⇄ syringe-unit conversion.
//!
//! Both directions go through `Concentration::mcg_per_unit`, so
//! `dose_for_units(units_for_dose(d).units) == d` up to float rounding.
//! A `Concentration` can only exist for a complete vial, which makes the
//! "no concentration, no result" rule a property of the signatures.

use crate::concentration::Concentration;
use crate::types::SyringeSize;
use serde::{Deserialize, Serialize};

/// Units to draw for a dose, with the capacity advisory
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct UnitsDraw {
    pub units: f64,
    /// Advisory only: the draw is still reported
    pub capacity_exceeded: bool,
}

/// Syringe units needed to deliver `dose_mcg`
///
/// Returns `None` for a non-positive or non-finite dose.
pub fn units_for_dose(
    dose_mcg: f64,
    concentration: &Concentration,
    syringe: SyringeSize,
) -> Option<UnitsDraw> {
    if !dose_mcg.is_finite() || dose_mcg <= 0.0 {
        return None;
    }

    let units = dose_mcg / concentration.mcg_per_unit;
    let capacity_exceeded = exceeds_capacity(units, syringe);
    if capacity_exceeded {
        tracing::warn!(
            "{:.1} units exceeds {} capacity ({} units)",
            units,
            syringe,
            syringe.capacity_units()
        );
    }

    Some(UnitsDraw {
        units,
        capacity_exceeded,
    })
}

/// Dose in micrograms delivered by drawing `units`
///
/// Returns `None` for a non-positive or non-finite draw.
pub fn dose_for_units(units: f64, concentration: &Concentration) -> Option<f64> {
    if !units.is_finite() || units <= 0.0 {
        return None;
    }
    Some(units * concentration.mcg_per_unit)
}

pub fn exceeds_capacity(units: f64, syringe: SyringeSize) -> bool {
    units > syringe.capacity_units()
}

/// How full the barrel is, as a percentage capped at 100
pub fn fill_percentage(units: f64, syringe: SyringeSize) -> f64 {
    (units / syringe.capacity_units() * 100.0).clamp(0.0, 100.0)
}

//! Reconstituted vial concentration.
//!
//! A vial is complete only when both its mass and diluent volume are
//! strictly positive; anything else resolves to `None` and downstream
//! stages short-circuit to placeholders.

use crate::types::UNITS_PER_ML;
use serde::{Deserialize, Serialize};

/// Micrograms per milligram
pub const MCG_PER_MG: f64 = 1000.0;

/// Vial contents before and after reconstitution
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct VialSpec {
    pub mass_mg: f64,
    pub diluent_ml: f64,
}

impl VialSpec {
    pub fn new(mass_mg: f64, diluent_ml: f64) -> Self {
        Self { mass_mg, diluent_ml }
    }

    pub fn is_complete(&self) -> bool {
        self.mass_mg > 0.0 && self.diluent_ml > 0.0
    }

    pub fn mass_mcg(&self) -> f64 {
        self.mass_mg * MCG_PER_MG
    }

    /// Concentration and conversion factor, or `None` while incomplete
    pub fn resolve(&self) -> Option<Concentration> {
        if !self.is_complete() {
            tracing::debug!(
                "Vial incomplete ({} mg in {} ml), skipping concentration",
                self.mass_mg,
                self.diluent_ml
            );
            return None;
        }

        Some(Concentration::from_mg_per_ml(self.mass_mg / self.diluent_ml))
    }
}

/// Resolved concentration of a complete vial
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Concentration {
    pub mg_per_ml: f64,
    /// Micrograms carried by one syringe unit. The single factor both
    /// conversion directions are derived from.
    pub mcg_per_unit: f64,
}

impl Concentration {
    pub fn from_mg_per_ml(mg_per_ml: f64) -> Self {
        Self {
            mg_per_ml,
            mcg_per_unit: mg_per_ml * MCG_PER_MG / UNITS_PER_ML,
        }
    }
}

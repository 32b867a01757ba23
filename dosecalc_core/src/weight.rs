//! Effective-dose resolution.
//!
//! Weight-based and direct entry both end in a single microgram figure
//! that feeds `conversion::units_for_dose`; no path converts on its own.

use crate::types::DoseInput;

/// Body weight × per-kg rate, or `None` unless both are positive and finite
pub fn weight_based_dose(weight_kg: f64, mcg_per_kg: f64) -> Option<f64> {
    let dose = weight_kg * mcg_per_kg;
    if weight_kg > 0.0 && mcg_per_kg > 0.0 && dose.is_finite() {
        Some(dose)
    } else {
        None
    }
}

/// The dose (mcg) a units-mode pass converts, or 0 when none is resolvable.
///
/// `FromUnits` carries no dose of its own and resolves to 0.
pub fn effective_dose(input: DoseInput) -> f64 {
    match input {
        DoseInput::Direct { mcg } if mcg.is_finite() => mcg.max(0.0),
        DoseInput::Direct { .. } => 0.0,
        DoseInput::WeightBased {
            weight_kg,
            mcg_per_kg,
        } => weight_based_dose(weight_kg, mcg_per_kg).unwrap_or(0.0),
        DoseInput::FromUnits { .. } => 0.0,
    }
}

//! Core domain types for the dosing calculator.
//!
//! This module defines the values that flow through one recompute pass:
//! - Enumerated inputs (calculation mode, syringe size, dosing schedule)
//! - The raw form state consumed from the caller
//! - The calculation, supply and reorder outputs handed back

use crate::schedule::CustomFrequency;
use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Syringe graduation: 100 units fill one millilitre.
pub const UNITS_PER_ML: f64 = 100.0;

// ============================================================================
// Enumerated inputs
// ============================================================================

/// Which direction the converter runs
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CalculationMode {
    /// Dose known, find syringe units to draw
    #[default]
    Units,
    /// Syringe units known, find the dose delivered
    Dose,
}

impl FromStr for CalculationMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "units" | "find-units" => Ok(CalculationMode::Units),
            "dose" | "find-dose" => Ok(CalculationMode::Dose),
            other => Err(Error::Parse(format!(
                "unknown calculation mode '{}', expected 'units' or 'dose'",
                other
            ))),
        }
    }
}

/// Supported insulin-style syringe barrels
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "f64", into = "f64")]
pub enum SyringeSize {
    #[default]
    PointThree,
    PointFive,
    One,
}

impl SyringeSize {
    pub const ALL: [SyringeSize; 3] = [
        SyringeSize::PointThree,
        SyringeSize::PointFive,
        SyringeSize::One,
    ];

    pub fn capacity_ml(self) -> f64 {
        match self {
            SyringeSize::PointThree => 0.3,
            SyringeSize::PointFive => 0.5,
            SyringeSize::One => 1.0,
        }
    }

    /// Barrel capacity in syringe units (IU)
    pub fn capacity_units(self) -> f64 {
        // (capacity_ml * UNITS_PER_ML), kept exact: 0.3 * 100.0 is not 30.0 in f64
        match self {
            SyringeSize::PointThree => 30.0,
            SyringeSize::PointFive => 50.0,
            SyringeSize::One => UNITS_PER_ML,
        }
    }

    /// Match a millilitre value against the supported barrels
    pub fn from_ml(ml: f64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|size| (size.capacity_ml() - ml).abs() < 1e-9)
    }

    /// Graduation labels from empty to full, in whole units.
    ///
    /// The 0.3 mL barrel is marked in 6 intervals, the larger two in 10.
    pub fn markers(self) -> Vec<u32> {
        let intervals = match self {
            SyringeSize::PointThree => 6,
            SyringeSize::PointFive | SyringeSize::One => 10,
        };
        let step = self.capacity_units() / intervals as f64;
        (0..=intervals)
            .map(|i| (step * i as f64).round() as u32)
            .collect()
    }
}

impl fmt::Display for SyringeSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ml ({}U)", self.capacity_ml(), self.capacity_units())
    }
}

impl TryFrom<f64> for SyringeSize {
    type Error = Error;

    fn try_from(ml: f64) -> Result<Self> {
        Self::from_ml(ml).ok_or_else(|| {
            Error::Parse(format!(
                "unsupported syringe size {} ml, expected 0.3, 0.5 or 1.0",
                ml
            ))
        })
    }
}

impl From<SyringeSize> for f64 {
    fn from(size: SyringeSize) -> f64 {
        size.capacity_ml()
    }
}

impl FromStr for SyringeSize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim().trim_end_matches("ml").trim();
        let ml: f64 = trimmed
            .parse()
            .map_err(|_| Error::Parse(format!("invalid syringe size '{}'", s)))?;
        Self::try_from(ml)
    }
}

/// Dosing frequency selection
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum DosingSchedule {
    #[default]
    #[serde(rename = "once-daily")]
    OnceDaily,
    #[serde(rename = "twice-daily")]
    TwiceDaily,
    #[serde(rename = "once-daily-5days")]
    FiveDaysPerWeek,
    #[serde(rename = "2-3x-week")]
    TwoToThreeXWeek,
    #[serde(rename = "every-other-day")]
    EveryOtherDay,
    /// Frequency taken from the linked custom pair
    #[serde(rename = "custom")]
    Custom,
}

impl DosingSchedule {
    pub const ALL: [DosingSchedule; 6] = [
        DosingSchedule::OnceDaily,
        DosingSchedule::TwiceDaily,
        DosingSchedule::FiveDaysPerWeek,
        DosingSchedule::TwoToThreeXWeek,
        DosingSchedule::EveryOtherDay,
        DosingSchedule::Custom,
    ];

    /// Identifier accepted on the command line and in config files
    pub fn key(self) -> &'static str {
        match self {
            DosingSchedule::OnceDaily => "once-daily",
            DosingSchedule::TwiceDaily => "twice-daily",
            DosingSchedule::FiveDaysPerWeek => "once-daily-5days",
            DosingSchedule::TwoToThreeXWeek => "2-3x-week",
            DosingSchedule::EveryOtherDay => "every-other-day",
            DosingSchedule::Custom => "custom",
        }
    }

    /// Human-readable name
    pub fn label(self) -> &'static str {
        match self {
            DosingSchedule::OnceDaily => "Once Daily",
            DosingSchedule::TwiceDaily => "Twice Daily",
            DosingSchedule::FiveDaysPerWeek => "Once Daily (5 days/week)",
            DosingSchedule::TwoToThreeXWeek => "2-3x per week",
            DosingSchedule::EveryOtherDay => "Every other day",
            DosingSchedule::Custom => "Custom",
        }
    }
}

impl FromStr for DosingSchedule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|schedule| schedule.key() == wanted)
            .ok_or_else(|| {
                let known: Vec<_> = Self::ALL.iter().map(|s| s.key()).collect();
                Error::Parse(format!(
                    "unknown dosing schedule '{}', expected one of: {}",
                    s,
                    known.join(", ")
                ))
            })
    }
}

// ============================================================================
// Form state (input contract)
// ============================================================================

/// The dose that drives one conversion, chosen by mode and weight toggle
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DoseInput {
    Direct { mcg: f64 },
    WeightBased { weight_kg: f64, mcg_per_kg: f64 },
    FromUnits { units: f64 },
}

/// Everything the caller can set. Each mutation is followed by a fresh
/// `engine::recompute` over the whole form.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DoseForm {
    pub mode: CalculationMode,
    pub vial_mg: f64,
    pub water_ml: f64,
    pub syringe: SyringeSize,
    pub weight_based: bool,
    pub body_weight_kg: f64,
    pub mcg_per_kg: f64,
    pub desired_dose_mcg: f64,
    pub syringe_units: f64,
    pub cycle_days: u32,
    pub schedule: DosingSchedule,
    pub custom: CustomFrequency,
    pub doses_used: f64,
    pub current_weight_kg: f64,
    pub target_dose_mcg: f64,
}

impl Default for DoseForm {
    fn default() -> Self {
        Self {
            mode: CalculationMode::Units,
            vial_mg: 0.0,
            water_ml: 0.0,
            syringe: SyringeSize::default(),
            weight_based: false,
            body_weight_kg: 0.0,
            mcg_per_kg: 0.0,
            desired_dose_mcg: 0.0,
            syringe_units: 0.0,
            cycle_days: 0,
            schedule: DosingSchedule::default(),
            custom: CustomFrequency::default(),
            doses_used: 0.0,
            current_weight_kg: 70.0,
            target_dose_mcg: 250.0,
        }
    }
}

impl DoseForm {
    /// The active dose variant for the current mode
    pub fn dose_input(&self) -> DoseInput {
        match self.mode {
            CalculationMode::Units if self.weight_based => DoseInput::WeightBased {
                weight_kg: self.body_weight_kg,
                mcg_per_kg: self.mcg_per_kg,
            },
            CalculationMode::Units => DoseInput::Direct {
                mcg: self.desired_dose_mcg,
            },
            CalculationMode::Dose => DoseInput::FromUnits {
                units: self.syringe_units,
            },
        }
    }

    /// The entered dose regardless of mode; supply and reminders count this
    pub fn planned_dose_input(&self) -> DoseInput {
        if self.weight_based {
            DoseInput::WeightBased {
                weight_kg: self.body_weight_kg,
                mcg_per_kg: self.mcg_per_kg,
            }
        } else {
            DoseInput::Direct {
                mcg: self.desired_dose_mcg,
            }
        }
    }
}

// ============================================================================
// Outputs
// ============================================================================

/// What the main result value measures
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ValueUnit {
    Units,
    Mcg,
}

/// The authoritative output of one calculation pass
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CalculationResult {
    /// `None` while a precondition is missing
    pub main_value: Option<f64>,
    pub value_unit: ValueUnit,
    pub label: String,
    /// Syringe units drawn (0 when nothing is resolved)
    pub units: f64,
    /// Dose in play for this pass: effective dose in units mode,
    /// delivered dose in dose mode
    pub dose_mcg: f64,
    pub total_mass_for_cycle_mg: f64,
    pub capacity_exceeded: bool,
}

impl CalculationResult {
    pub fn placeholder(label: impl Into<String>, value_unit: ValueUnit) -> Self {
        Self {
            main_value: None,
            value_unit,
            label: label.into(),
            units: 0.0,
            dose_mcg: 0.0,
            total_mass_for_cycle_mg: 0.0,
            capacity_exceeded: false,
        }
    }

    /// Main value as displayed, one decimal with its unit suffix
    pub fn main_text(&self) -> String {
        match (self.main_value, self.value_unit) {
            (Some(v), ValueUnit::Units) => format!("{:.1} Units", v),
            (Some(v), ValueUnit::Mcg) => format!("{:.1} mcg", v),
            (None, _) => "--".to_string(),
        }
    }
}

/// Vial depletion as seen after `doses_used` doses
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct SupplyState {
    pub doses_in_vial: f64,
    pub doses_used: f64,
    /// Unclamped; goes negative when more doses are logged than the vial holds
    pub doses_remaining: f64,
    /// Clamped to [0, 100]
    pub percent_remaining: f64,
    pub depleted: bool,
}

/// Outcome of the reorder-date algorithm
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", content = "date", rename_all = "snake_case")]
pub enum ReorderDate {
    /// Reorder on this calendar date
    On(NaiveDate),
    /// Less than the lead time is left
    OrderNow,
    /// No supply figure to project from
    Unavailable,
}

impl ReorderDate {
    /// Display form: `Mon D, YYYY`, `Order Now` or `--`
    pub fn display_text(&self) -> String {
        match self {
            ReorderDate::On(date) => date.format("%b %-d, %Y").to_string(),
            ReorderDate::OrderNow => "Order Now".to_string(),
            ReorderDate::Unavailable => "--".to_string(),
        }
    }

    /// The date a reminder can be exported for, if any
    pub fn exportable(&self) -> Option<NaiveDate> {
        match self {
            ReorderDate::On(date) => Some(*date),
            ReorderDate::OrderNow | ReorderDate::Unavailable => None,
        }
    }
}

/// Days of supply and the derived reorder date
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct ReorderProjection {
    pub doses_per_week: f64,
    pub days_of_supply: f64,
    pub reorder: ReorderDate,
}

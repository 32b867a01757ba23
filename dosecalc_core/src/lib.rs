#![forbid(unsafe_code)]

//! Core calculation engine for reconstituted injectable dosing.
//!
//! This crate provides:
//! - Domain types (form inputs, calculation/supply/reorder outputs)
//! - Concentration and dose ⇄ syringe-unit conversion
//! - Weight-based dose resolution and supply tracking
//! - Schedule projection and reorder dates
//! - Calendar reminder rendering and deferred export
//! - Configuration and logging

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod concentration;
pub mod conversion;
pub mod weight;
pub mod supply;
pub mod schedule;
pub mod validation;
pub mod reminder;
pub mod export;
pub mod presets;
pub mod engine;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use concentration::{Concentration, VialSpec};
pub use schedule::CustomFrequency;
pub use validation::{Field, ValidationReport};
pub use reminder::{render_ics, ReminderEvent};
pub use export::{schedule_export, CalendarFile, PendingExport};
pub use engine::{recompute, Calculator, Snapshot};

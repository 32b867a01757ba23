//! Configuration file support for dosecalc.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/dosecalc/config.toml`.

use crate::reminder::DEFAULT_PRODUCT_ID;
use crate::{DosingSchedule, Error, Result, SyringeSize};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub defaults: DefaultsConfig,

    #[serde(default)]
    pub export: ExportConfig,
}

/// Values used when the caller leaves an input unset
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_syringe_ml")]
    pub syringe_ml: f64,

    #[serde(default)]
    pub schedule: DosingSchedule,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            syringe_ml: default_syringe_ml(),
            schedule: DosingSchedule::default(),
        }
    }
}

impl DefaultsConfig {
    /// The configured barrel, rejected unless it is one of the supported sizes
    pub fn syringe(&self) -> Result<SyringeSize> {
        SyringeSize::from_ml(self.syringe_ml).ok_or_else(|| {
            Error::Config(format!(
                "defaults.syringe_ml = {} is not a supported syringe (0.3, 0.5, 1.0)",
                self.syringe_ml
            ))
        })
    }
}

/// Calendar export settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_filename")]
    pub filename: String,

    /// Pause before the file is assembled
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    #[serde(default = "default_product_id")]
    pub product_id: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            filename: default_filename(),
            delay_ms: default_delay_ms(),
            product_id: default_product_id(),
        }
    }
}

// Default value functions
fn default_syringe_ml() -> f64 {
    SyringeSize::default().capacity_ml()
}

fn default_output_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn default_filename() -> String {
    "peptide-reorder-reminder.ics".into()
}

fn default_delay_ms() -> u64 {
    800
}

fn default_product_id() -> String {
    DEFAULT_PRODUCT_ID.into()
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            tracing::warn!("No config directory for this platform, using ./.config");
            PathBuf::from(".config")
        });
        base.join("dosecalc").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

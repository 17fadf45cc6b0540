//! Configuration file support for the timetable tools.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/ruta/config.toml`.

use crate::allocator::{validate_fill_threshold, DEFAULT_FILL_THRESHOLD};
use crate::engine::DEFAULT_HOURS_PER_SESSION;
use crate::ical::IcalOptions;
use crate::types::parse_weekday;
use crate::{Error, Pace, Result, TimeOfDay};
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub export: ExportConfig,
}

/// Default generation preferences, used when the command line omits them
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_study_days")]
    pub study_days: Vec<String>,

    #[serde(default = "default_hours_per_session")]
    pub hours_per_session: f64,

    #[serde(default)]
    pub preferred_time: TimeOfDay,

    #[serde(default)]
    pub pace: Pace,

    #[serde(default = "default_fill_threshold")]
    pub fill_threshold: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            study_days: default_study_days(),
            hours_per_session: default_hours_per_session(),
            preferred_time: TimeOfDay::default(),
            pace: Pace::default(),
            fill_threshold: default_fill_threshold(),
        }
    }
}

/// Calendar export configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_calendar_name")]
    pub calendar_name: String,

    #[serde(default = "default_summary_prefix")]
    pub summary_prefix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            calendar_name: default_calendar_name(),
            summary_prefix: default_summary_prefix(),
        }
    }
}

impl ExportConfig {
    pub fn ical_options(&self) -> IcalOptions {
        IcalOptions {
            calendar_name: self.calendar_name.clone(),
            summary_prefix: self.summary_prefix.clone(),
        }
    }
}

// Default value functions
fn default_study_days() -> Vec<String> {
    vec!["Monday".into(), "Wednesday".into(), "Friday".into()]
}

fn default_hours_per_session() -> f64 {
    DEFAULT_HOURS_PER_SESSION
}

fn default_fill_threshold() -> f64 {
    DEFAULT_FILL_THRESHOLD
}

fn default_calendar_name() -> String {
    IcalOptions::default().calendar_name
}

fn default_summary_prefix() -> String {
    IcalOptions::default().summary_prefix
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
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            std::env::var_os("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|| PathBuf::from("."))
        });
        base.join("ruta").join("config.toml")
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

    /// Check values the generator cannot work with
    pub fn validate(&self) -> Result<()> {
        validate_fill_threshold(self.generation.fill_threshold)?;
        let hours = self.generation.hours_per_session;
        if hours.is_nan() || hours <= 0.0 {
            return Err(Error::Config(format!(
                "hours_per_session must be positive, got {}",
                hours
            )));
        }
        if self.generation.study_days.is_empty() {
            return Err(Error::Config("study_days must not be empty".into()));
        }
        self.generation.weekdays().map(|_| ())
    }
}

impl GenerationConfig {
    /// Configured study days as weekdays
    pub fn weekdays(&self) -> Result<Vec<Weekday>> {
        self.study_days
            .iter()
            .map(|name| {
                parse_weekday(name)
                    .ok_or_else(|| Error::Config(format!("Invalid study day: {}", name)))
            })
            .collect()
    }
}

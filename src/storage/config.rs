use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::selection::rules::{DurationPreference, RulesError, WorkHours};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error("Invalid booking settings: {0}")]
    InvalidBooking(#[from] RulesError),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub api: ApiConfig,
    pub booking: BookingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default)]
    pub auth_token: Option<String>,
    pub student_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingConfig {
    pub default_duration_minutes: u32,
    /// Last hour shown on the calendar. Selections always end by 21:00.
    pub display_close_hour: u32,
    #[serde(default)]
    pub hourly_rate_cents: Option<u32>,
}

impl BookingConfig {
    pub fn duration_preference(&self) -> Result<DurationPreference, RulesError> {
        DurationPreference::new(self.default_duration_minutes)
    }

    pub fn display_hours(&self) -> Result<WorkHours, RulesError> {
        WorkHours::with_closing_hour(self.display_close_hour)
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.booking.duration_preference()?;
        self.booking.display_hours()?;
        Ok(())
    }

    pub fn load_or_create() -> Result<Self, ConfigError> {
        Self::load_or_create_at(&Self::config_path())
    }

    pub fn load_or_create_at(config_path: &std::path::Path) -> Result<Self, ConfigError> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            Self::from_toml(&content)
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            tracing::info!("Wrote default config to {}", config_path.display());
            Ok(config)
        }
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tutor-booking")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    pub fn save_to(&self, config_path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:8000".to_string(),
                auth_token: None,
                student_id: 1,
            },
            booking: BookingConfig {
                default_duration_minutes: 90,
                display_close_hour: 21,
                hourly_rate_cents: None,
            },
        }
    }
}

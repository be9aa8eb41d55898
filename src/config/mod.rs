//! Persistent user preferences.

use std::{
    cmp::Reverse,
    fs, io,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    core::utils,
    errors::SplitError,
    ledger::SplitMethod,
    money::RoundingIncrement,
    settlement::{SettlementEngine, SettlementStrategy},
    split::SplitCalculator,
    utils::persistence::{sanitize_note, write_atomic, write_file},
};

const BACKUP_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M";

/// Keys accepted by [`Config::set`].
pub const CONFIG_KEYS: &[&str] = &[
    "locale",
    "currency",
    "rounding_increment_cents",
    "settlement_strategy",
    "default_split",
    "ui_color_enabled",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("Unknown configuration key `{0}`")]
    UnknownKey(String),
    #[error("Invalid value for `{key}`: {reason}")]
    InvalidValue { key: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    #[serde(default)]
    pub rounding_increment_cents: RoundingIncrement,
    #[serde(default)]
    pub settlement_strategy: SettlementStrategy,
    #[serde(default)]
    pub default_split: SplitMethod,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_opened_ledger: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "en-US".into(),
            currency: "USD".into(),
            rounding_increment_cents: RoundingIncrement::default(),
            settlement_strategy: SettlementStrategy::default(),
            default_split: SplitMethod::default(),
            ui_color_enabled: Self::default_ui_color_enabled(),
            last_opened_ledger: None,
        }
    }
}

impl Config {
    fn default_ui_color_enabled() -> bool {
        true
    }

    pub fn calculator(&self) -> SplitCalculator {
        SplitCalculator::new(self.rounding_increment_cents)
    }

    pub fn engine(&self) -> SettlementEngine {
        SettlementEngine::new(self.settlement_strategy)
    }

    /// Updates one preference from its textual form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidValue {
            key: key.to_string(),
            reason,
        };
        let value = value.trim();
        match key.trim() {
            "locale" => {
                if value.is_empty() {
                    return Err(invalid("locale cannot be empty".into()));
                }
                self.locale = value.to_string();
            }
            "currency" => {
                if value.len() != 3 || !value.chars().all(|ch| ch.is_ascii_alphabetic()) {
                    return Err(invalid(format!("`{value}` is not a three-letter code")));
                }
                self.currency = value.to_ascii_uppercase();
            }
            "rounding_increment_cents" => {
                let minor: i64 = value
                    .parse()
                    .map_err(|_| invalid(format!("`{value}` is not a whole number")))?;
                self.rounding_increment_cents =
                    RoundingIncrement::new(minor).map_err(|err| invalid(err.to_string()))?;
            }
            "settlement_strategy" => {
                self.settlement_strategy = value
                    .parse()
                    .map_err(|err: SplitError| invalid(err.to_string()))?;
            }
            "default_split" => {
                self.default_split = value
                    .parse()
                    .map_err(|err: SplitError| invalid(err.to_string()))?;
            }
            "ui_color_enabled" => {
                self.ui_color_enabled = match value.to_ascii_lowercase().as_str() {
                    "true" | "on" | "yes" | "1" => true,
                    "false" | "off" | "no" | "0" => false,
                    _ => return Err(invalid(format!("`{value}` is not a boolean"))),
                };
            }
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }
}

/// Loads, saves and backs up [`Config`] as JSON.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
    backups_dir: PathBuf,
}

impl ConfigManager {
    pub fn new(config_path: PathBuf, backups_dir: PathBuf) -> Self {
        Self {
            config_path,
            backups_dir,
        }
    }

    /// Manager rooted at the application data directory.
    pub fn from_app_dir() -> Self {
        Self::new(utils::config_file(), utils::config_backups_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        fs::create_dir_all(&base)?;
        let backups_dir = base.join("config_backups");
        fs::create_dir_all(&backups_dir)?;
        Ok(Self::new(base.join("config.json"), backups_dir))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn load(&self) -> Result<Config, ConfigError> {
        if self.config_path.exists() {
            let data = fs::read_to_string(&self.config_path)?;
            serde_json::from_str(&data).map_err(|err| ConfigError::Serde(err.to_string()))
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(config)
            .map_err(|err| ConfigError::Serde(err.to_string()))?;
        write_atomic(&self.config_path, &json)?;
        Ok(())
    }

    /// Writes a timestamped copy and returns its file name.
    pub fn backup(&self, config: &Config, note: Option<&str>) -> Result<String, ConfigError> {
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let mut name = format!("config_{}", timestamp);
        if let Some(label) = sanitize_note(note) {
            name.push('_');
            name.push_str(&label);
        }
        name.push_str(&format!(".{}", BACKUP_EXTENSION));
        let json = serde_json::to_string_pretty(config)
            .map_err(|err| ConfigError::Serde(err.to_string()))?;
        write_file(&self.backups_dir.join(&name), &json)?;
        Ok(name)
    }

    pub fn restore(&self, backup_name: &str) -> Result<Config, ConfigError> {
        let path = self.backups_dir.join(backup_name);
        if !path.exists() {
            return Err(ConfigError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("configuration backup `{}` not found", backup_name),
            )));
        }
        let data = fs::read_to_string(&path)?;
        serde_json::from_str(&data).map_err(|err| ConfigError::Serde(err.to_string()))
    }

    /// Backup file names, newest first.
    pub fn list_backups(&self) -> Result<Vec<String>, ConfigError> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(name.to_string());
            }
        }
        entries.sort_by_key(|name| Reverse(backup_timestamp(name)));
        Ok(entries)
    }
}

/// Reads the `YYYYmmdd_HHMM` stamp that follows the file prefix.
fn backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let stem = name.strip_suffix(&format!(".{}", BACKUP_EXTENSION))?;
    let mut parts = stem.split('_').skip(1);
    let (date, time) = (parts.next()?, parts.next()?);
    chrono::NaiveDateTime::parse_from_str(&format!("{date}{time}"), "%Y%m%d%H%M")
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_parses_known_keys() {
        let mut config = Config::default();
        config.set("settlement_strategy", "pairwise").unwrap();
        config.set("rounding_increment_cents", "1").unwrap();
        config.set("currency", "eur").unwrap();
        config.set("ui_color_enabled", "off").unwrap();
        assert_eq!(config.settlement_strategy, SettlementStrategy::PairwiseNetting);
        assert_eq!(config.rounding_increment_cents.minor_units(), 1);
        assert_eq!(config.currency, "EUR");
        assert!(!config.ui_color_enabled);
    }

    #[test]
    fn set_rejects_bad_values() {
        let mut config = Config::default();
        assert!(matches!(
            config.set("rounding_increment_cents", "0"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config.set("theme", "dark"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn backup_names_carry_timestamps() {
        assert!(backup_timestamp("config_20240501_1230_before-trip.json").is_some());
        assert!(backup_timestamp("config.json").is_none());
    }
}

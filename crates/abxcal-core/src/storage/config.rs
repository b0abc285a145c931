//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Working-day window searched by the slot finder
//! - Default appointment duration when an antibiotic has none
//! - Diagnostic log level
//!
//! Configuration is stored at `~/.config/abxcal/config.toml`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{ConfigError, Result};

/// Slot-finding and projection parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingConfig {
    /// First hour tried for a free slot.
    #[serde(default = "default_day_start_hour")]
    pub day_start_hour: u32,
    /// Probing stops before this hour.
    #[serde(default = "default_day_end_hour")]
    pub day_end_hour: u32,
    /// Appointment length when the contact's antibiotic is unknown.
    #[serde(default = "default_duration_hours")]
    pub default_duration_hours: f64,
    #[serde(default = "default_ghost_title")]
    pub ghost_title: String,
}

/// Diagnostic output configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive, overridden by `RUST_LOG`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/abxcal/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub scheduling: SchedulingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_day_start_hour() -> u32 {
    8
}
fn default_day_end_hour() -> u32 {
    18
}
fn default_duration_hours() -> f64 {
    1.0
}
fn default_ghost_title() -> String {
    "Ghost Event".into()
}
fn default_log_level() -> String {
    "info".into()
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            day_start_hour: default_day_start_hour(),
            day_end_hour: default_day_end_hour(),
            default_duration_hours: default_duration_hours(),
            ghost_title: default_ghost_title(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl SchedulingConfig {
    /// Check that the probing window and default duration are usable.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] naming the offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.day_end_hour > 24 {
            return Err(ConfigError::InvalidValue {
                key: "scheduling.day_end_hour".into(),
                message: format!("{} is past midnight", self.day_end_hour),
            });
        }
        if self.day_start_hour >= self.day_end_hour {
            return Err(ConfigError::InvalidValue {
                key: "scheduling.day_start_hour".into(),
                message: format!(
                    "must be before day_end_hour ({} >= {})",
                    self.day_start_hour, self.day_end_hour
                ),
            });
        }
        if !(self.default_duration_hours.is_finite() && self.default_duration_hours > 0.0) {
            return Err(ConfigError::InvalidValue {
                key: "scheduling.default_duration_hours".into(),
                message: "must be a positive number of hours".into(),
            });
        }
        Ok(())
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                    ),
                    serde_json::Value::Number(n) => {
                        if n.is_f64() {
                            value
                                .parse::<f64>()
                                .ok()
                                .and_then(serde_json::Number::from_f64)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            let parsed = value
                                .parse::<u64>()
                                .map_err(|_| invalid(format!("cannot parse '{value}' as integer")))?;
                            serde_json::Value::Number(parsed.into())
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(invalid("cannot replace a whole section".into()));
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Check every section for out-of-range values.
    ///
    /// # Errors
    /// Returns the first invalid value found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scheduling.validate()
    }

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing the defaults when no file exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or
    /// validated, or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg = Self::from_toml(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.clone(),
                    message: e.to_string(),
                })?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Parse and validate a TOML document.
    ///
    /// # Errors
    /// Returns an error for malformed TOML or invalid values.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let cfg: Config = toml::from_str(content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Every leaf setting as a `(dot.key, value)` pair, sorted by key.
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut entries = Vec::new();
        match serde_json::to_value(self) {
            Ok(json) => Self::collect_leaves("", &json, &mut entries),
            Err(e) => tracing::warn!(error = %e, "failed to serialize config"),
        }
        entries.sort();
        entries
    }

    fn collect_leaves(prefix: &str, value: &serde_json::Value, out: &mut Vec<(String, String)>) {
        match value {
            serde_json::Value::Object(map) => {
                for (name, child) in map {
                    let key = if prefix.is_empty() {
                        name.clone()
                    } else {
                        format!("{prefix}.{name}")
                    };
                    Self::collect_leaves(&key, child, out);
                }
            }
            serde_json::Value::String(s) => out.push((prefix.to_string(), s.clone())),
            other => out.push((prefix.to_string(), other.to_string())),
        }
    }

    /// Set a value by dot-separated key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the result fails validation. `self` is unchanged on error.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json)?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.apply(key, value)?;
        self.save()
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load config, using defaults");
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed = Config::from_toml(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn config_default_values() {
        let cfg = Config::default();
        assert_eq!(cfg.scheduling.day_start_hour, 8);
        assert_eq!(cfg.scheduling.day_end_hour, 18);
        assert_eq!(cfg.scheduling.default_duration_hours, 1.0);
        assert_eq!(cfg.scheduling.ghost_title, "Ghost Event");
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let cfg = Config::from_toml("[scheduling]\nday_start_hour = 7\n").unwrap();
        assert_eq!(cfg.scheduling.day_start_hour, 7);
        assert_eq!(cfg.scheduling.day_end_hour, 18);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn from_toml_rejects_inverted_window() {
        let err = Config::from_toml("[scheduling]\nday_start_hour = 18\nday_end_hour = 8\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("scheduling.day_start_hour").as_deref(), Some("8"));
        assert_eq!(cfg.get("logging.level").as_deref(), Some("info"));
        assert!(cfg.get("scheduling.missing_key").is_none());
        assert!(cfg.get("scheduling").is_none());
    }

    #[test]
    fn entries_flatten_to_dot_keys() {
        let mut cfg = Config::default();
        cfg.apply("scheduling.ghost_title", "Next visit").unwrap();
        let entries = cfg.entries();
        assert_eq!(entries.len(), 5);
        for (key, value) in &entries {
            assert_eq!(cfg.get(key).as_ref(), Some(value));
        }
        assert!(entries.contains(&("scheduling.ghost_title".into(), "Next visit".into())));
        assert!(entries.contains(&("logging.level".into(), "info".into())));
    }

    #[test]
    fn apply_updates_nested_number() {
        let mut cfg = Config::default();
        cfg.apply("scheduling.day_start_hour", "7").unwrap();
        assert_eq!(cfg.scheduling.day_start_hour, 7);
        cfg.apply("scheduling.default_duration_hours", "1.5").unwrap();
        assert_eq!(cfg.scheduling.default_duration_hours, 1.5);
    }

    #[test]
    fn apply_updates_nested_string() {
        let mut cfg = Config::default();
        cfg.apply("logging.level", "debug").unwrap();
        assert_eq!(cfg.logging.level, "debug");
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(cfg.apply("scheduling.nonexistent_key", "1").is_err());
        assert!(cfg.apply("", "1").is_err());
    }

    #[test]
    fn apply_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(cfg.apply("scheduling.day_start_hour", "early").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn apply_rejects_invalid_window_and_keeps_old_value() {
        let mut cfg = Config::default();
        assert!(cfg.apply("scheduling.day_end_hour", "6").is_err());
        assert_eq!(cfg.scheduling.day_end_hour, 18);
    }
}

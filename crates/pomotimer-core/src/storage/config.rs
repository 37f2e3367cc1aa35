//! TOML-based application configuration.
//!
//! Stores session lengths (in minutes) and whether the timer keeps running
//! into the next phase after a countdown reaches zero.
//!
//! Configuration is stored at `~/.config/pomotimer/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::format::minutes_to_seconds;
use crate::timer::SessionPlan;

/// Schedule-specific configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_focus_duration")]
    pub focus_duration: u32,
    #[serde(default = "default_short_break")]
    pub short_break: u32,
    #[serde(default = "default_long_break")]
    pub long_break: u32,
    #[serde(default = "default_pomodoros_before_long_break")]
    pub pomodoros_before_long_break: u32,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Keep running into the next phase when a countdown completes.
    #[serde(default)]
    pub auto_advance: bool,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

fn default_focus_duration() -> u32 {
    25
}
fn default_short_break() -> u32 {
    5
}
fn default_long_break() -> u32 {
    15
}
fn default_pomodoros_before_long_break() -> u32 {
    4
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            focus_duration: default_focus_duration(),
            short_break: default_short_break(),
            long_break: default_long_break(),
            pomodoros_before_long_break: default_pomodoros_before_long_break(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auto_advance: false,
            schedule: ScheduleConfig::default(),
        }
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
        let mut current = root;
        while let Some(part) = parts.next() {
            if part.is_empty() {
                return Err(unknown());
            }
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;
            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => value
                    .parse::<u32>()
                    .map(|n| serde_json::Value::Number(n.into()))
                    .map_err(|_| invalid(format!("cannot parse '{value}' as a whole number")))?,
                serde_json::Value::Object(_) => return Err(unknown()),
                _ => serde_json::Value::String(value.into()),
            };
            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    /// Default location: `<data_dir>/config.toml`.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn path() -> Result<PathBuf, ConfigError> {
        data_dir()
            .map(|dir| dir.join("config.toml"))
            .map_err(|e| ConfigError::LoadFailed {
                path: PathBuf::from("config.toml"),
                message: e.to_string(),
            })
    }

    /// Load from the default location, writing defaults if the file is missing.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be parsed, or if the
    /// default config cannot be written.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Like [`Config::load`], from an explicit path. A file that parses but
    /// holds a zero length is rejected the same way `set` rejects it.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Self = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        match Self::get_json_value_by_path(&json, key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key. Does not persist.
    ///
    /// # Errors
    /// Returns an error if the key is unknown or the value has the wrong type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("schedule.focus_duration", self.schedule.focus_duration),
            ("schedule.short_break", self.schedule.short_break),
            ("schedule.long_break", self.schedule.long_break),
            (
                "schedule.pomodoros_before_long_break",
                self.schedule.pomodoros_before_long_break,
            ),
        ];
        for (key, value) in checks {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: "must be greater than zero".into(),
                });
            }
        }
        Ok(())
    }

    /// Session lengths in seconds for the timer.
    pub fn plan(&self) -> SessionPlan {
        SessionPlan {
            focus_secs: minutes_to_seconds(self.schedule.focus_duration.into()),
            short_break_secs: minutes_to_seconds(self.schedule.short_break.into()),
            long_break_secs: minutes_to_seconds(self.schedule.long_break.into()),
            pomodoros_before_long_break: self.schedule.pomodoros_before_long_break.max(1),
            auto_advance: self.auto_advance,
        }
    }
}

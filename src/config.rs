use std::fs;
use std::path::Path;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "config/app.json";
pub const DEFAULT_DATABASE_PATH: &str = "data/app.db";
pub const DEFAULT_SESSION_HOURS: i64 = 12;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database_path: String,
    pub session_duration_hours: i64,
    /// Keep appended messages and read marks across restarts.
    pub persist_conversations: bool,
    pub sort_conversations_by_recency: bool,
    pub caregivers_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: DEFAULT_DATABASE_PATH.to_string(),
            session_duration_hours: DEFAULT_SESSION_HOURS,
            persist_conversations: false,
            sort_conversations_by_recency: false,
            caregivers_path: None,
        }
    }
}

impl AppConfig {
    /// Session window; values that are not a positive, representable
    /// number of hours fall back to the default window.
    pub fn session_duration(&self) -> TimeDelta {
        session_window(self.session_duration_hours)
            .unwrap_or_else(|| TimeDelta::hours(DEFAULT_SESSION_HOURS))
    }

    /// Replaces unusable field values with their defaults, one field at a
    /// time, so a single bad entry does not discard the whole file.
    pub fn validated(mut self) -> Self {
        if self.database_path.trim().is_empty() {
            log::warn!("Empty database_path; using {DEFAULT_DATABASE_PATH}");
            self.database_path = DEFAULT_DATABASE_PATH.to_string();
        }

        if session_window(self.session_duration_hours).is_none() {
            log::warn!(
                "Ignoring session_duration_hours = {}; using {DEFAULT_SESSION_HOURS}",
                self.session_duration_hours
            );
            self.session_duration_hours = DEFAULT_SESSION_HOURS;
        }

        if self
            .caregivers_path
            .as_deref()
            .is_some_and(|path| path.trim().is_empty())
        {
            log::warn!("Empty caregivers_path; using the built-in catalogue");
            self.caregivers_path = None;
        }

        self
    }
}

fn session_window(hours: i64) -> Option<TimeDelta> {
    if hours <= 0 {
        return None;
    }
    TimeDelta::try_hours(hours)
}

pub fn load_config(path: &str) -> AppConfig {
    let path = Path::new(path);
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            log::info!(
                "Config file {} not readable ({err}); using defaults",
                path.display()
            );
            return AppConfig::default();
        }
    };

    match serde_json::from_str::<AppConfig>(&content) {
        Ok(config) => config.validated(),
        Err(err) => {
            log::warn!("Failed to parse config file {}: {err}", path.display());
            AppConfig::default()
        }
    }
}

pub fn save_config(path: &str, config: &AppConfig) -> std::io::Result<()> {
    crate::storage::ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let config = load_config(path.to_str().unwrap());
        assert_eq!(config.session_duration(), TimeDelta::hours(12));
        assert!(!config.persist_conversations);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.json");
        fs::write(&path, r#"{"persist_conversations": true}"#).unwrap();

        let config = load_config(path.to_str().unwrap());
        assert!(config.persist_conversations);
        assert_eq!(config.database_path, "data/app.db");
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("app.json");
        let path = path.to_str().unwrap();

        let config = AppConfig {
            session_duration_hours: 2,
            caregivers_path: Some("caregivers.json".into()),
            ..AppConfig::default()
        };
        save_config(path, &config).unwrap();

        let loaded = load_config(path);
        assert_eq!(loaded.session_duration(), TimeDelta::hours(2));
        assert_eq!(loaded.caregivers_path.as_deref(), Some("caregivers.json"));
    }

    #[test]
    fn overflowing_duration_falls_back_instead_of_panicking() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.json");
        fs::write(&path, r#"{"session_duration_hours": 9223372036854775807}"#).unwrap();

        let config = load_config(path.to_str().unwrap());
        assert_eq!(config.session_duration_hours, DEFAULT_SESSION_HOURS);
        assert_eq!(config.session_duration(), TimeDelta::hours(12));

        let unvalidated = AppConfig {
            session_duration_hours: i64::MAX,
            ..AppConfig::default()
        };
        assert_eq!(unvalidated.session_duration(), TimeDelta::hours(12));
    }

    #[test]
    fn blank_fields_are_replaced_individually() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.json");
        fs::write(
            &path,
            r#"{"database_path": "  ", "caregivers_path": "", "session_duration_hours": 3}"#,
        )
        .unwrap();

        let config = load_config(path.to_str().unwrap());
        assert_eq!(config.database_path, DEFAULT_DATABASE_PATH);
        assert_eq!(config.caregivers_path, None);
        assert_eq!(config.session_duration(), TimeDelta::hours(3));
    }

    #[test]
    fn garbage_duration_falls_back() {
        let config = AppConfig {
            session_duration_hours: 0,
            ..AppConfig::default()
        };
        assert_eq!(config.session_duration(), TimeDelta::hours(12));
    }
}

//! Handles settings for the application.
//!
//! Values come from an optional `settings.toml` (or the file passed with
//! `--config`), overridden by `TALLY_`-prefixed environment variables such
//! as `TALLY_DATABASE__URL`.

use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "settings";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct App {
    /// `tracing` level for the binary and the engine.
    pub level: String,
    /// JSON file remembering the current account.
    pub state_path: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            state_path: ".state.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Database {
    pub url: String,
    pub tx_timeout_ms: Option<u64>,
}

impl Default for Database {
    fn default() -> Self {
        Self {
            url: "sqlite:./tally.db?mode=rwc".to_string(),
            tx_timeout_ms: None,
        }
    }
}

impl Database {
    pub fn tx_timeout(&self) -> Option<Duration> {
        self.tx_timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub database: Database,
}

impl Settings {
    /// Loads the settings. An explicit `path` must exist; the default
    /// `settings.toml` is optional.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let file = match path {
            Some(path) => File::with_name(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_PATH).required(false),
        };
        let settings = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("TALLY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[app]\nlevel = \"debug\"\n\n[database]\ntx_timeout_ms = 250\n",
        )
        .unwrap();

        let settings = Settings::load(path.to_str()).unwrap();
        assert_eq!(settings.app.level, "debug");
        assert_eq!(settings.app.state_path, ".state.json");
        assert_eq!(settings.database.url, "sqlite:./tally.db?mode=rwc");
        assert_eq!(
            settings.database.tx_timeout(),
            Some(Duration::from_millis(250))
        );
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(Settings::load(path.to_str()).is_err());
    }
}

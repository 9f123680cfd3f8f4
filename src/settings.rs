// ⚙️ Settings - defaults, then dashboard.toml, then DASHBOARD_* env vars
//
// Example: DASHBOARD_DATABASE_PATH=/tmp/fin.db
//          DASHBOARD_DEFAULT_INPUTS__PAID_IN_CAPITAL=1500

use crate::chart::ChartAlignment;
use crate::model::EditableInputs;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "dashboard.toml";
pub const ENV_PREFIX: &str = "DASHBOARD";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation error: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// SQLite file holding the seven tables
    pub database_path: PathBuf,

    /// Listen address for fin-server
    pub server_addr: String,

    /// EnvFilter directive used when RUST_LOG is unset
    pub log_level: String,

    pub chart_alignment: ChartAlignment,

    /// Pre-filled values for the input form when the store has no year-0 row
    pub default_inputs: EditableInputs,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            database_path: PathBuf::from("fin_dashboard.db"),
            server_addr: "127.0.0.1:3000".to_string(),
            log_level: "info".to_string(),
            chart_alignment: ChartAlignment::default(),
            default_inputs: EditableInputs::default(),
        }
    }
}

impl Settings {
    /// Load settings, layering an optional TOML file and the environment
    ///
    /// A missing file is not an error; a malformed one is.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));

        let builder = config::Config::builder()
            .add_source(config::File::from(file).required(path.is_some()))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings = builder.try_deserialize::<Settings>()?;
        settings.validate()?;

        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "database_path must not be empty".to_string(),
            ));
        }

        self.socket_addr()?;
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server_addr.parse().map_err(|_| {
            ConfigError::ValidationError(format!("invalid server_addr '{}'", self.server_addr))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults_when_file_absent() {
        let settings = Settings::default();

        assert_eq!(settings.chart_alignment, ChartAlignment::ByIndex);
        assert_eq!(settings.default_inputs.paid_in_capital, 1000.0);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.toml");
        fs::write(
            &path,
            r#"
database_path = "data/fin.db"
chart_alignment = "by_year"

[default_inputs]
intangible_assets = 2000.0
shareholder_capital = 750.0
paid_in_capital = 1250.0
"#,
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();

        assert_eq!(settings.database_path, PathBuf::from("data/fin.db"));
        assert_eq!(settings.chart_alignment, ChartAlignment::ByYear);
        assert_eq!(settings.default_inputs.shareholder_capital, 750.0);
        // Untouched keys keep their defaults
        assert_eq!(settings.server_addr, "127.0.0.1:3000");
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();

        let result = Settings::load(Some(&dir.path().join("nope.toml")));

        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }

    #[test]
    fn test_invalid_server_addr() {
        let settings = Settings {
            server_addr: "not an address".to_string(),
            ..Default::default()
        };

        assert!(matches!(settings.validate(), Err(ConfigError::ValidationError(_))));
    }
}

use std::{env, fs, path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadFailed(#[source] std::io::Error),
    #[error("failed to write config file: {0}")]
    WriteFailed(#[source] std::io::Error),
    #[error("failed to parse config file: {0}")]
    ParseFailed(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    SerializeFailed(#[from] toml::ser::Error),
    #[error("no usable config directory")]
    ConfigPathUnavailable,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub http: Http,
    pub database: Database,
    pub probe: Probe,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Http {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Database {
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Probe {
    /// Port used for TCP handshake latency measurements.
    pub tcp_port: u16,
    pub timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http: Http { bind: "0.0.0.0".into(), port: 8080 },
            database: Database { path: "latmon.db".into() },
            probe: Probe { tcp_port: 80, timeout_seconds: 5 },
        }
    }
}

/// Used to ensure we are actually reading a toml file
fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

/// Get default config path ($XDG_CONFIG_HOME/latmon/config.toml or
/// $HOME/.config/...)
fn default_config_path() -> Result<path::PathBuf, ConfigError> {
    let path = if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
        path::PathBuf::from(config_home)
    } else if let Some(home_dir) = env::home_dir() {
        home_dir.join(".config")
    } else {
        return Err(ConfigError::ConfigPathUnavailable);
    };

    Ok(path.join("latmon/config.toml"))
}

impl Config {
    /// Generate Config structure from file
    ///
    /// Creates a default config in ~/.config/latmon/config.toml or the
    /// specified path, with the name config.toml, if one does not exist
    pub fn from_config(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, ConfigError> {
        let config_path: path::PathBuf = if let Some(path) = optional_path {
            normalize_toml_path(path.as_ref())
        } else {
            default_config_path()?
        };

        if config_path.exists() {
            let raw_string = fs::read_to_string(&config_path).map_err(ConfigError::ReadFailed)?;
            Ok(toml::from_str(raw_string.as_str())?)
        } else {
            let config = Self::default();
            config.write_config(&config_path)?;
            Ok(config)
        }
    }

    /// Serialize and write a config to a file
    pub fn write_config(&self, path: &path::Path) -> Result<(), ConfigError> {
        let config_str = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::WriteFailed)?;
        }

        fs::write(path, config_str).map_err(ConfigError::WriteFailed)
    }
}

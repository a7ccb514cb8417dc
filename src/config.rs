//! Runtime configuration, read from TOML.
//!
//! Lookup order: `--config <path>`, then `$XDG_CONFIG_HOME/ecolog/config.toml`
//! when it exists, then built-in defaults. Every key is optional.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::preview::{DEFAULT_DEBOUNCE, PreviewSettings};

/// Errors from loading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The config file is not valid TOML or has unknown keys.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),

    /// The platform does not provide a data directory for the log file.
    #[error("could not determine XDG data directory")]
    NoDataDir,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Base URL of the activity API.
    pub api_url: String,
    /// Timeout for list, save and delete requests.
    pub request_timeout_ms: u64,
    /// Timeout for a preview request; `0` disables it.
    pub preview_timeout_ms: u64,
    /// Activities per list page.
    pub page_size: u32,
    /// `tracing` filter used when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Log file; defaults to the XDG data directory.
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000/api".to_string(),
            request_timeout_ms: 10_000,
            preview_timeout_ms: 10_000,
            page_size: 20,
            log_filter: "ecolog=info".to_string(),
            log_file: None,
        }
    }
}

impl Config {
    /// Loads the config from `path`, or from the default location.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_from_path(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Reads and parses the file at `path`.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// Parses and checks a TOML document.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api_url must not be empty".into()));
        }
        if self.page_size == 0 {
            return Err(ConfigError::Invalid("page_size must be at least 1".into()));
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_ms must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// `$XDG_CONFIG_HOME/ecolog/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ecolog").join("config.toml"))
    }

    /// The log file path, defaulting to `$XDG_DATA_HOME/ecolog/ecolog.log`.
    pub fn log_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.log_file {
            return Ok(path.clone());
        }
        let data_dir = dirs::data_dir().ok_or(ConfigError::NoDataDir)?;
        Ok(data_dir.join("ecolog").join("ecolog.log"))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn preview_settings(&self) -> PreviewSettings {
        PreviewSettings {
            debounce: DEFAULT_DEBOUNCE,
            timeout: (self.preview_timeout_ms > 0)
                .then(|| Duration::from_millis(self.preview_timeout_ms)),
        }
    }
}

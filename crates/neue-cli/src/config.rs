use std::path::{Path, PathBuf};

use neue::ItalicMarker;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
}

/// Settings loaded from an optional TOML file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub app_name: String,
    /// Public base URL used for render links, without a trailing slash.
    pub base_url: String,
    pub renders_enable: bool,
    /// `bold` (`**`) or `single` (`*`).
    pub italic_marker: String,
    pub strict: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "neue".to_string(),
            base_url: "http://localhost:8080".to_string(),
            renders_enable: false,
            italic_marker: "bold".to_string(),
            strict: false,
        }
    }
}

impl Config {
    /// Load from `path`, or defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(text)?;
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "app_name".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                name: "base_url".to_string(),
                message: format!("`{}` is not an http(s) URL", self.base_url),
            });
        }
        self.italic()?;
        Ok(())
    }

    pub fn italic(&self) -> Result<ItalicMarker, ConfigError> {
        match self.italic_marker.as_str() {
            "bold" => Ok(ItalicMarker::Bold),
            "single" => Ok(ItalicMarker::Single),
            other => Err(ConfigError::InvalidValue {
                name: "italic_marker".to_string(),
                message: format!("expected `bold` or `single`, got `{other}`"),
            }),
        }
    }
}

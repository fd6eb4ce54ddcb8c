//! Configuration file loading for the front end.
//!
//! The file is TOML with a single `[search]` table mirroring
//! [`SearchConfig`]. Missing keys keep their defaults.

use chess_engine::SearchConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// Search depth must be at least one ply.
    #[error("Invalid search depth: {0} (must be at least 1)")]
    InvalidDepth(u8),
}

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct EngineConfig {
    #[serde(default)]
    pub search: SearchConfig,
}

impl EngineConfig {
    /// Loads the configuration.
    ///
    /// An explicit `path` must exist. Without one, [`Self::default_path()`]
    /// is read if present and defaults are used otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::read(path)?,
            None => {
                let default_path = Self::default_path();
                if default_path.exists() {
                    Self::read(&default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.depth == 0 {
            return Err(ConfigError::InvalidDepth(self.search.depth));
        }
        Ok(())
    }

    /// Returns `engine.toml` in the current working directory.
    pub fn default_path() -> PathBuf {
        PathBuf::from("engine.toml")
    }
}

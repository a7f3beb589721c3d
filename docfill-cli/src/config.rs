//! `docfill.toml` fill configuration.
//!
//! ```toml
//! [merge]
//! cleanup_base_on_numbered_fill = true
//! restrict_to_selection = false
//!
//! [session]
//! prompt_for_slot = false
//! ```

use std::path::Path;

use docfill::{MergeMode, MergeOptions, SessionOptions};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file not found: {0}")]
    NotFound(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FillConfig {
    #[serde(default)]
    pub merge: MergeConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MergeConfig {
    /// Drop the unsuffixed value when a numbered slot is filled.
    #[serde(default)]
    pub cleanup_base_on_numbered_fill: bool,
    /// Show `{key}` for slot placeholders that received no value.
    #[serde(default)]
    pub restrict_to_selection: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SessionConfig {
    /// Refuse to fill a multi-slot template until a slot is given.
    #[serde(default)]
    pub prompt_for_slot: bool,
}

impl FillConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        let config: FillConfig = toml::from_str(&content)?;
        log::debug!("loaded fill config from {}", path.display());
        Ok(config)
    }

    /// Loads `path` when given, else the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn session_options(&self) -> SessionOptions {
        let mode = if self.merge.restrict_to_selection {
            MergeMode::RestrictToSelection
        } else {
            MergeMode::Normal
        };
        SessionOptions::new()
            .with_merge(
                MergeOptions::new()
                    .with_cleanup_base_on_numbered_fill(self.merge.cleanup_base_on_numbered_fill)
                    .with_mode(mode),
            )
            .with_prompt_for_slot(self.session.prompt_for_slot)
    }
}

//! Engine configuration, loaded from a TOML file.
//!
//! Every field has a default, so the file is optional and may set only the
//! values it cares about.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;
use tracing::{info, warn};

use crate::capture::CaptureConfig;
use crate::clock::PlaybackConfig;
use crate::error::ConfigError;
use crate::reducer::ReducerConfig;
use crate::transport::TransportConfig;
use crate::view::ViewConfig;

/// Default analyzer WebSocket endpoint.
pub const DEFAULT_SERVER_URL: &str = "ws://localhost:8000/ws";

/// Full engine configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Analyzer WebSocket URL
    pub server_url: String,
    /// Default reference track (URL or path) when none is given
    pub reference: Option<String>,
    pub capture: CaptureConfig,
    pub transport: TransportConfig,
    pub reducer: ReducerConfig,
    pub view: ViewConfig,
    pub playback: PlaybackConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            reference: None,
            capture: CaptureConfig::default(),
            transport: TransportConfig::default(),
            reducer: ReducerConfig::default(),
            view: ViewConfig::default(),
            playback: PlaybackConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load `~/.config/pitchcoach/config.toml` (or the platform equivalent).
    ///
    /// Falls back to defaults when the file is missing, and logs a warning
    /// when it exists but cannot be read or parsed.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) if path.exists() => match Self::load_from(&path) {
                Ok(config) => config,
                Err(e) => {
                    warn!("{}. Using defaults.", e);
                    Self::default()
                }
            },
            _ => Self::default(),
        }
    }

    /// Load an explicit config file. Any failure is an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: EngineConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Config file location.
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "pitchcoach").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

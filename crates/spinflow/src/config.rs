//! Application configuration
//!
//! Loaded from a TOML file; `DATABASE_URL` in the environment (or a `.env`
//! file) overrides whatever the file says.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use spinflow_control::WebServerConfig;
use spinflow_core::{AnimatorConfig, LogConfig, SpectrumAnalyzerConfig};

/// Default config file looked up next to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "spinflow.toml";

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Postgres connection string; the DATABASE_URL env var overrides it.
    pub database_url: Option<String>,
    pub server: WebServerConfig,
    pub animator: AnimatorConfig,
    pub audio: AudioSettings,
    pub log: LogConfig,
}

/// Capture and sampling-loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Capture device name; default input device when unset.
    pub device: Option<String>,
    /// Animation frame rate driving the sampling loop.
    pub frame_rate: u32,
    pub analyzer: SpectrumAnalyzerConfig,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            device: None,
            frame_rate: 60,
            analyzer: SpectrumAnalyzerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load the configuration.
    ///
    /// An explicit path must exist; the default path is optional and falls
    /// back to built-in defaults when missing.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(path) => (path, true),
            None => (Path::new(DEFAULT_CONFIG_PATH), false),
        };

        if !path.exists() {
            if required {
                anyhow::bail!("config file not found: {}", path.display());
            }
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Database URL with the environment override applied.
    pub fn resolved_database_url(&self) -> Option<String> {
        std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.is_empty())
            .or_else(|| self.database_url.clone())
    }
}

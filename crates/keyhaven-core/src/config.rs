//! Configuration management for Keyhaven.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main application configuration.
///
/// This is loaded from `~/.config/keyhaven/config.toml` (or platform
/// equivalent). If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Credential harvesting settings (source chain endpoints and timeouts)
    pub harvest: HarvestConfig,
    /// Validation runner settings (checker endpoint, rate limiting)
    pub validation: ValidationConfig,
    /// Sync job settings (retention, refresh cadence)
    pub sync: SyncConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(&config_path)?;
            let config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `KEYHAVEN_MIN_DELAY_MS`: Override the inter-check delay floor
    /// - `KEYHAVEN_ACCELERATOR_URL`: Override the local accelerator endpoint
    /// - `KEYHAVEN_RENDERER_URL`: Override the local renderer endpoint
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;

        // Override from environment
        if let Ok(val) = std::env::var("KEYHAVEN_MIN_DELAY_MS") {
            if let Ok(ms) = val.parse() {
                config.validation.min_delay_ms = ms;
                tracing::debug!("Override validation.min_delay_ms from env: {}", ms);
            }
        }

        if let Ok(val) = std::env::var("KEYHAVEN_ACCELERATOR_URL") {
            config.harvest.accelerator_url = val.clone();
            tracing::debug!("Override harvest.accelerator_url from env: {}", val);
        }

        if let Ok(val) = std::env::var("KEYHAVEN_RENDERER_URL") {
            config.harvest.renderer_url = val.clone();
            tracing::debug!("Override harvest.renderer_url from env: {}", val);
        }

        Ok(config)
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::config_path()?;
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "config_path".to_string(),
                reason: "no parent directory".to_string(),
            })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/keyhaven/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("org", "keyhaven", "keyhaven").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get the data directory path.
    ///
    /// Uses XDG base directories: `~/.local/share/keyhaven`
    pub fn data_dir() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("org", "keyhaven", "keyhaven").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.data_dir().to_path_buf())
    }
}

/// Credential harvesting settings.
///
/// The four timeouts correspond to the four source strategies in preference
/// order; probes share one short budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// Liveness probe budget in milliseconds (hard cap)
    pub probe_timeout_ms: u64,
    /// Fetch timeout for the local accelerator helper
    pub accelerator_timeout_ms: u64,
    /// Fetch timeout for the local full-rendering helper
    pub renderer_timeout_ms: u64,
    /// Per-relay fetch timeout
    pub relay_timeout_ms: u64,
    /// Local accelerator endpoint
    pub accelerator_url: String,
    /// Local full-rendering helper endpoint
    pub renderer_url: String,
    /// Public relay prefixes, tried in order; the target URL is appended
    /// percent-encoded
    pub relay_endpoints: Vec<String>,
    /// Base URL of the source site, used by the direct-fetch liveness probe
    pub source_base_url: Option<String>,
    /// User agent sent on direct and relay fetches
    pub user_agent: String,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            probe_timeout_ms: 2000,
            accelerator_timeout_ms: 30000,
            renderer_timeout_ms: 60000,
            relay_timeout_ms: 15000,
            accelerator_url: "http://127.0.0.1:8191".to_string(),
            renderer_url: "http://127.0.0.1:8192".to_string(),
            relay_endpoints: vec![
                "https://api.allorigins.win/raw?url=".to_string(),
                "https://corsproxy.io/?url=".to_string(),
            ],
            source_base_url: None,
            user_agent: "Keyhaven/0.1.0 (+https://github.com/keyhaven/keyhaven)".to_string(),
        }
    }
}

/// Validation runner settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Minimum delay between consecutive checks, in milliseconds.
    /// A hard floor against platform lockouts, never a suggestion.
    pub min_delay_ms: u64,
    /// Per-check timeout in milliseconds
    pub check_timeout_ms: u64,
    /// Authentication-check helper endpoint
    pub checker_url: String,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: 5000,
            check_timeout_ms: 15000,
            checker_url: "http://127.0.0.1:8193/check".to_string(),
        }
    }
}

/// Sync job settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// How long a finished job stays visible to pollers, in seconds
    pub retention_secs: u64,
    /// Bound on the most-recent-first recently-added-games list
    pub recent_games_limit: usize,
    /// Days between automatic catalog refreshes
    pub refresh_interval_days: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            retention_secs: 300,
            recent_games_limit: 10,
            refresh_interval_days: 7,
        }
    }
}

//! # Sweeper Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     STOCKHOLD_DB_PATH=/var/lib/stockhold/stockhold.db                  │
//! │     STOCKHOLD_SWEEP_INTERVAL_SECS=30                                   │
//! │     STOCKHOLD_SWEEP_ENABLED=false                                      │
//! │     STOCKHOLD_DEFAULT_EXPIRATION_HOURS=48                              │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <path>, or                                                │
//! │     ~/.config/stockhold/sweeper.toml (Linux)                           │
//! │     ~/Library/Application Support/com.stockhold.stockhold/... (macOS)  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     60 second interval, 72 hour window                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # sweeper.toml
//! [database]
//! path = "/var/lib/stockhold/stockhold.db"
//! max_connections = 5
//! busy_timeout_ms = 5000
//!
//! [sweep]
//! enabled = true
//! interval_secs = 60
//!
//! [reservation]
//! default_expiration_hours = 72
//! default_extension_hours = 24
//! max_expiration_hours = 720
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use stockhold_core::ReservationPolicy;
use stockhold_db::DbConfig;

use crate::error::{SweepError, SweepResult};

// =============================================================================
// Database Settings
// =============================================================================

/// Where the reservation database lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file path. Created (and migrated) if missing.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    /// Pool size.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// How long a write waits on a locked database (milliseconds).
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_ms: u64,
}

fn default_db_path() -> PathBuf {
    directories::ProjectDirs::from("com", "stockhold", "stockhold")
        .map(|dirs| dirs.data_dir().join("stockhold.db"))
        .unwrap_or_else(|| PathBuf::from("./stockhold.db"))
}

fn default_max_connections() -> u32 {
    5
}

fn default_busy_timeout() -> u64 {
    5_000
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
            max_connections: default_max_connections(),
            busy_timeout_ms: default_busy_timeout(),
        }
    }
}

// =============================================================================
// Sweep Settings
// =============================================================================

/// Sweep loop behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepSettings {
    /// When false the binary starts, logs, and idles until shutdown.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Seconds between sweeps.
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_interval() -> u64 {
    60
}

impl Default for SweepSettings {
    fn default() -> Self {
        SweepSettings {
            enabled: true,
            interval_secs: default_interval(),
        }
    }
}

impl SweepSettings {
    /// The sweep period as a `Duration`.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

// =============================================================================
// Main Sweeper Configuration
// =============================================================================

/// Complete sweeper configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SweeperConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub sweep: SweepSettings,

    /// Window policy handed to the reservation manager.
    #[serde(default)]
    pub reservation: ReservationPolicy,
}

impl SweeperConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`config_path`, else the platform default)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SweepResult<Self> {
        let explicit = config_path.is_some();
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading sweeper config from file");
                config = Self::from_toml(&std::fs::read_to_string(&path)?)?;
            } else if explicit {
                return Err(SweepError::ConfigLoadFailed(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML document; missing sections and keys take defaults.
    pub fn from_toml(contents: &str) -> SweepResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SweepResult<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(SweepError::InvalidConfig("database.path is empty".into()));
        }

        if self.database.max_connections == 0 {
            return Err(SweepError::InvalidConfig(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if self.sweep.interval_secs == 0 {
            return Err(SweepError::InvalidConfig(
                "sweep.interval_secs must be greater than 0".into(),
            ));
        }

        self.reservation
            .validate()
            .map_err(|e| SweepError::InvalidConfig(format!("reservation: {}", e)))
    }

    /// Applies overrides from `lookup` (the process environment in
    /// production). Unparseable values are logged and ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("STOCKHOLD_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(secs) = lookup("STOCKHOLD_SWEEP_INTERVAL_SECS") {
            match secs.parse::<u64>() {
                Ok(s) => self.sweep.interval_secs = s,
                Err(_) => warn!(value = %secs, "Ignoring invalid STOCKHOLD_SWEEP_INTERVAL_SECS"),
            }
        }

        if let Some(enabled) = lookup("STOCKHOLD_SWEEP_ENABLED") {
            match enabled.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.sweep.enabled = true,
                "0" | "false" | "no" | "off" => self.sweep.enabled = false,
                _ => warn!(value = %enabled, "Ignoring invalid STOCKHOLD_SWEEP_ENABLED"),
            }
        }

        if let Some(hours) = lookup("STOCKHOLD_DEFAULT_EXPIRATION_HOURS") {
            match hours.parse::<u32>() {
                Ok(h) => self.reservation.default_expiration_hours = h,
                Err(_) => {
                    warn!(value = %hours, "Ignoring invalid STOCKHOLD_DEFAULT_EXPIRATION_HOURS")
                }
            }
        }
    }

    /// Pool configuration for [`stockhold_db::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database.path)
            .max_connections(self.database.max_connections)
            .busy_timeout(Duration::from_millis(self.database.busy_timeout_ms))
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "stockhold", "stockhold")
            .map(|dirs| dirs.config_dir().join("sweeper.toml"))
    }
}

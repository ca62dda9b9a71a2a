//! Crosswalk Configuration - signal timing, server, broadcast and logging
//!
//! Each struct implements `Default` with the built-in values, so a missing
//! file or a missing key behaves exactly like the stock controller.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use super::defaults;
use crate::logging::LogFormat;

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "CROSSWALK_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "crosswalk.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for one signal controller.
///
/// Load with `CrosswalkConfig::load()` which searches:
/// 1. `$CROSSWALK_CONFIG` env var
/// 2. `./crosswalk.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrosswalkConfig {
    /// Phase timing
    #[serde(default)]
    pub signal: SignalConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Observer fan-out and controller queue sizing
    #[serde(default)]
    pub broadcast: BroadcastConfig,

    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CrosswalkConfig {
    /// Load configuration using the standard search order:
    /// 1. `$CROSSWALK_CONFIG` environment variable
    /// 2. `./crosswalk.toml` in the current working directory
    /// 3. Built-in defaults
    ///
    /// A file that fails to load is logged and the next source is tried.
    pub fn load() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded config from {}", CONFIG_ENV_VAR);
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV_VAR);
            }
        }

        // 2. Check ./crosswalk.toml
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded config from ./{}", LOCAL_CONFIG_FILE);
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", LOCAL_CONFIG_FILE);
                }
            }
        }

        // 3. Defaults
        info!("No {} found, using built-in defaults", LOCAL_CONFIG_FILE);
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    ///
    /// Unknown keys are reported as warnings and otherwise ignored.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Apply `CROSSWALK_SERVER_ADDR` and `PORT` from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply address overrides from `lookup`.
    ///
    /// `CROSSWALK_SERVER_ADDR` wins over `PORT`; `PORT` binds all interfaces.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = lookup("CROSSWALK_SERVER_ADDR").filter(|a| !a.is_empty()) {
            self.server.addr = addr;
            return;
        }
        if let Some(port) = lookup("PORT") {
            match port.trim().parse::<u16>() {
                Ok(port) => self.server.addr = format!("0.0.0.0:{port}"),
                Err(_) => warn!(port = %port, "Ignoring invalid PORT"),
            }
        }
    }

    /// Validate every section.
    ///
    /// Rules:
    /// - Phase duration must be at least one tick
    /// - Tick interval must be at least `MIN_TICK_INTERVAL_MS`
    /// - Queue and channel capacities must be non-zero
    /// - Server address must be a socket address (`host:port` with a literal IP)
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.signal.phase_duration_secs == 0 {
            errors.push("signal.phase_duration_secs must be >= 1".to_string());
        }
        if self.signal.tick_interval_ms < defaults::MIN_TICK_INTERVAL_MS {
            errors.push(format!(
                "signal.tick_interval_ms = {} is below the minimum of {} ms",
                self.signal.tick_interval_ms,
                defaults::MIN_TICK_INTERVAL_MS
            ));
        }
        if self.broadcast.channel_capacity == 0 {
            errors.push("broadcast.channel_capacity must be >= 1".to_string());
        }
        if self.broadcast.command_queue_capacity == 0 {
            errors.push("broadcast.command_queue_capacity must be >= 1".to_string());
        }
        if self.server.addr.parse::<SocketAddr>().is_err() {
            errors.push(format!(
                "server.addr = '{}' is not a valid socket address",
                self.server.addr
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),
    #[error("Config parse error ({}): {}", .0.display(), .1)]
    Parse(PathBuf, #[source] toml::de::Error),
    #[error("Config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

// ============================================================================
// Signal
// ============================================================================

/// Phase timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalConfig {
    /// Duration D of GO and STOP, counted in clock ticks (seconds at the
    /// default 1 s period)
    #[serde(default = "default_phase_duration")]
    pub phase_duration_secs: u32,

    /// Clock period in milliseconds
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
}

const fn default_phase_duration() -> u32 {
    defaults::PHASE_DURATION_SECS
}
const fn default_tick_interval() -> u64 {
    defaults::TICK_INTERVAL_MS
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            phase_duration_secs: default_phase_duration(),
            tick_interval_ms: default_tick_interval(),
        }
    }
}

// ============================================================================
// Server
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server bind address.
    ///
    /// Can be overridden by `CROSSWALK_SERVER_ADDR`, `PORT`, or `--addr`.
    #[serde(default = "default_server_addr")]
    pub addr: String,
}

fn default_server_addr() -> String {
    defaults::SERVER_ADDR.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_server_addr(),
        }
    }
}

// ============================================================================
// Broadcast
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastConfig {
    /// Per-observer lag budget, in events
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Controller command queue depth
    #[serde(default = "default_command_queue_capacity")]
    pub command_queue_capacity: usize,
}

const fn default_channel_capacity() -> usize {
    defaults::BROADCAST_CHANNEL_CAPACITY
}
const fn default_command_queue_capacity() -> usize {
    defaults::COMMAND_QUEUE_CAPACITY
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
            command_queue_capacity: default_command_queue_capacity(),
        }
    }
}

// ============================================================================
// Logging
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `"pretty"` or `"json"`
    #[serde(default)]
    pub format: LogFormat,
}

// ============================================================================
// Tests
// ============================================================================

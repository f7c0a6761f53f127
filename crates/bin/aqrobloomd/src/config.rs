//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `aqrobloom.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use serde::Deserialize;

use aqrobloom_app::engine::FacilityParams;
use aqrobloom_domain::facility::{DEFAULT_CANVAS, Layout};
use aqrobloom_domain::reservoir::{DEFAULT_CAPACITY, DEFAULT_START_VOLUME};

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Simulation startup parameters.
    pub facility: FacilityConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Facility startup parameters.
///
/// Timer periods and random ranges are fixed and not configurable.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FacilityConfig {
    /// Canvas size the initial layout is centred on.
    pub canvas_width: f64,
    pub canvas_height: f64,
    /// Reservoir capacity.
    pub reservoir_capacity: u32,
    /// Reservoir volume at startup and after a reset.
    pub reservoir_start: u32,
    /// Seed for the random source; entropy when unset.
    pub seed: Option<u64>,
}

impl Config {
    /// Load configuration from `aqrobloom.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("aqrobloom.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("AQROBLOOM_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("AQROBLOOM_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("AQROBLOOM_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Ok(val) = std::env::var("AQROBLOOM_SEED") {
            if let Ok(seed) = val.parse() {
                self.facility.seed = Some(seed);
            }
        }
        if let Ok(val) = std::env::var("AQROBLOOM_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        let facility = &self.facility;
        if !(facility.canvas_width > 0.0 && facility.canvas_height > 0.0) {
            return Err(ConfigError::Validation(
                "canvas dimensions must be positive".to_string(),
            ));
        }
        if facility.reservoir_capacity == 0 {
            return Err(ConfigError::Validation(
                "reservoir capacity must be positive".to_string(),
            ));
        }
        if facility.reservoir_start > facility.reservoir_capacity {
            return Err(ConfigError::Validation(format!(
                "reservoir start volume {} exceeds capacity {}",
                facility.reservoir_start, facility.reservoir_capacity
            )));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Engine startup parameters derived from the `[facility]` table.
    #[must_use]
    pub fn facility_params(&self) -> FacilityParams {
        FacilityParams {
            layout: Layout::centered(self.facility.canvas_width, self.facility.canvas_height),
            reservoir_capacity: self.facility.reservoir_capacity,
            reservoir_start: self.facility.reservoir_start,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "aqrobloomd=info,aqrobloom_app=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for FacilityConfig {
    fn default() -> Self {
        Self {
            canvas_width: DEFAULT_CANVAS.0,
            canvas_height: DEFAULT_CANVAS.1,
            reservoir_capacity: DEFAULT_CAPACITY,
            reservoir_start: DEFAULT_START_VOLUME,
            seed: None,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

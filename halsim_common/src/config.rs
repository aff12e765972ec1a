//! Configuration loading traits and types.
//!
//! This module provides a standardized way to load TOML configuration files
//! for the simulation registry and its harness.
//!
//! # Usage
//!
//! ```rust,no_run
//! use halsim_common::config::{ConfigError, ConfigLoader, SimConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = SimConfig::load(Path::new("halsim.toml"))?;
//!     config.validate()?;
//!     println!("Service: {}", config.shared.service_name);
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::consts::*;

/// Error type for configuration loading operations.
///
/// This enum represents all possible errors that can occur when loading
/// configuration files.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for application logging.
///
/// Represents the verbosity level of logging output.
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, detailed tracing information.
    Trace,
    /// Debug information useful during development.
    Debug,
    /// General information about application operation.
    #[default]
    Info,
    /// Warning messages for potentially problematic situations.
    Warn,
    /// Error messages for serious problems.
    Error,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`.
    pub const fn as_directive(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Common configuration fields shared by every halsim application.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "halsim-bench-01"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Application instance identifier.
    pub service_name: String,
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            service_name: "halsim".to_string(),
        }
    }
}

impl SharedConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if:
    /// - `service_name` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// When a property write notifies its subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NotifyPolicy {
    /// Every write notifies, even when the stored value is unchanged.
    #[default]
    Always,
    /// Only writes that change the stored value notify.
    OnChange,
}

/// Registry behaviour knobs.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    /// Notification policy applied to every scalar property.
    #[serde(default)]
    pub notify: NotifyPolicy,
}

/// Number of slots in each device table.
///
/// Every field defaults to the standard device count for its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Capacities {
    /// Accelerometer slots.
    pub accelerometer: usize,
    /// Analog gyro slots.
    pub analog_gyro: usize,
    /// Analog input slots.
    pub analog_in: usize,
    /// Analog output slots.
    pub analog_out: usize,
    /// Analog trigger slots.
    pub analog_trigger: usize,
    /// Digital I/O slots.
    pub dio: usize,
    /// Digital PWM slots.
    pub digital_pwm: usize,
    /// Duty cycle input slots.
    pub duty_cycle: usize,
    /// Addressable LED slots.
    pub addressable_led: usize,
    /// CTRE pneumatics module slots.
    pub ctre_pcm: usize,
    /// Joystick slots.
    pub joystick: usize,
    /// I2C port slots.
    pub i2c: usize,
    /// SPI port slots.
    pub spi: usize,
}

impl Default for Capacities {
    fn default() -> Self {
        Self {
            accelerometer: NUM_ACCELEROMETERS,
            analog_gyro: NUM_ANALOG_GYROS,
            analog_in: NUM_ANALOG_INPUTS,
            analog_out: NUM_ANALOG_OUTPUTS,
            analog_trigger: NUM_ANALOG_TRIGGERS,
            dio: NUM_DIGITAL_CHANNELS,
            digital_pwm: NUM_DIGITAL_PWM_OUTPUTS,
            duty_cycle: NUM_DUTY_CYCLES,
            addressable_led: NUM_ADDRESSABLE_LEDS,
            ctre_pcm: NUM_CTRE_PCM_MODULES,
            joystick: NUM_JOYSTICK_PORTS,
            i2c: NUM_I2C_PORTS,
            spi: NUM_SPI_PORTS,
        }
    }
}

impl Capacities {
    /// All capacities keyed by category name.
    pub fn entries(&self) -> [(&'static str, usize); 13] {
        [
            ("accelerometer", self.accelerometer),
            ("analog_gyro", self.analog_gyro),
            ("analog_in", self.analog_in),
            ("analog_out", self.analog_out),
            ("analog_trigger", self.analog_trigger),
            ("dio", self.dio),
            ("digital_pwm", self.digital_pwm),
            ("duty_cycle", self.duty_cycle),
            ("addressable_led", self.addressable_led),
            ("ctre_pcm", self.ctre_pcm),
            ("joystick", self.joystick),
            ("i2c", self.i2c),
            ("spi", self.spi),
        ]
    }

    /// Validate every capacity against `1..=MAX_SLOTS_PER_TABLE`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` naming the first offending category.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, capacity) in self.entries() {
            if capacity == 0 || capacity > MAX_SLOTS_PER_TABLE {
                return Err(ConfigError::ValidationError(format!(
                    "capacity for '{name}' must be in 1..={MAX_SLOTS_PER_TABLE}, got {capacity}"
                )));
            }
        }
        Ok(())
    }
}

/// Complete configuration for a simulation context.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// service_name = "halsim"
///
/// [registry]
/// notify = "on_change"
///
/// [capacities]
/// accelerometer = 4
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimConfig {
    /// Shared application settings.
    #[serde(default)]
    pub shared: SharedConfig,

    /// Registry behaviour.
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Device table capacities.
    #[serde(default)]
    pub capacities: Capacities,
}

impl SimConfig {
    /// Validate shared settings and capacities.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError::ValidationError` found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.capacities.validate()
    }
}

/// Trait for loading configuration from TOML files.
///
/// This trait provides a default implementation that works with any type
/// implementing `serde::de::DeserializeOwned`.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the TOML configuration file
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

// Blanket implementation for all types that implement DeserializeOwned.
impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}

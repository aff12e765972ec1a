//! Prelude module for common re-exports.
//!
//! Consumers can do `use halsim_common::prelude::*;` and get the most
//! important types without listing individual paths.

// ─── Logging ────────────────────────────────────────────────────────
pub use crate::config::LogLevel;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{
    Capacities, ConfigError, ConfigLoader, NotifyPolicy, RegistryConfig, SharedConfig, SimConfig,
};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{DEFAULT_CONFIG_PATH, MAX_SLOTS_PER_TABLE};

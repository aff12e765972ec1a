//! halsim Common Library
//!
//! This crate provides shared constants and configuration loading utilities
//! for all halsim workspace crates.
//!
//! # Module Structure
//!
//! - [`consts`] - Default device counts and buffer limits
//! - [`config`] - Configuration loading traits and types
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use halsim_common::prelude::*;
//!
//! let config = SimConfig::default();
//! assert!(config.validate().is_ok());
//! ```

pub mod config;
pub mod consts;
pub mod prelude;

//! Error types for registry operations.
//!
//! A routing-key miss is not an error: lookups return `Option`. Cancelling an
//! unknown subscription is a successful no-op.

use halsim_common::config::ConfigError;
use thiserror::Error;

use crate::callback::CallbackError;
use crate::value::ValueKind;

/// Errors raised by the simulation registry.
#[derive(Debug, Error)]
pub enum SimError {
    /// Slot index outside the table capacity.
    #[error("{category} index {index} out of range (capacity {capacity})")]
    IndexOutOfRange {
        /// Device category of the table
        category: &'static str,
        /// Requested index
        index: usize,
        /// Table capacity
        capacity: usize,
    },

    /// Channel outside a channelized property.
    #[error("channel {channel} out of range for '{property}' ({channels} channels)")]
    ChannelOutOfRange {
        /// Property name
        property: &'static str,
        /// Requested channel
        channel: usize,
        /// Channels declared by the schema
        channels: usize,
    },

    /// Channelized property addressed without a channel.
    #[error("'{property}' has {channels} channels; address one as '{property}[ch]'")]
    MissingChannel {
        /// Property name
        property: &'static str,
        /// Channels declared by the schema
        channels: usize,
    },

    /// Property name not defined for the device category.
    #[error("{category} has no property named '{name}'")]
    InvalidProperty {
        /// Device category
        category: &'static str,
        /// Requested name
        name: String,
    },

    /// Device category not present in the simulation context.
    #[error("unknown device category '{0}'")]
    UnknownCategory(String),

    /// Dynamic write with a value of the wrong kind.
    #[error("type mismatch on '{property}': expected {expected}, got {actual}")]
    TypeMismatch {
        /// Property name
        property: String,
        /// Kind declared by the schema
        expected: ValueKind,
        /// Kind supplied by the caller
        actual: ValueKind,
    },

    /// Buffer write larger than the declared maximum.
    #[error("buffer '{property}' overflow: {len} bytes exceeds maximum {max}")]
    BufferOverflow {
        /// Buffer property name
        property: String,
        /// Bytes supplied
        len: usize,
        /// Declared maximum
        max: usize,
    },

    /// A subscriber callback failed; the first failure of a dispatch pass.
    #[error("callback on '{property}' failed: {source}")]
    Callback {
        /// Property whose dispatch failed
        property: String,
        /// Error returned by the callback
        #[source]
        source: CallbackError,
    },

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Scenario step could not be applied.
    #[error("scenario error: {0}")]
    Scenario(String),
}

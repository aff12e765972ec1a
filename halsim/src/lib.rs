//! # halsim
//!
//! Simulated HAL device-state registry. Every simulated device property is
//! an observable cell: control code reads and writes it, and a simulation
//! harness subscribes to changes, drives values and resets whole devices.
//!
//! # Module Structure
//!
//! - [`value`] - `Value` / `ValueKind` and the `SimValue` typed mapping
//! - [`callback`] - callback types, subscription ids, subscriber lists
//! - [`cell`] - `PropertyCell`, one observable scalar
//! - [`buffer`] - `BufferCell`, one observable byte buffer
//! - [`slot`] - device schemas, typed keys and `DeviceSlot`
//! - [`table`] - fixed-capacity `DeviceTable` and routing-key lookup
//! - [`devices`] - one schema per device category
//! - [`context`] - `SimContext`, owner of every table
//! - [`scenario`] - TOML scenarios for the harness binary
//! - [`error`] - `SimError`
//!
//! # Architecture
//!
//! ```text
//! SimContext
//!   └── DeviceTable<C>          (one per category, fixed capacity)
//!         └── DeviceSlot<C>     (schema C::PROPERTIES / C::BUFFERS)
//!               ├── PropertyCell ── SubscriberList<NotifyFn>
//!               └── BufferCell   ── read / write SubscriberLists
//! ```
//!
//! Notification dispatch is synchronous on the writing thread and never
//! holds a cell lock while user code runs.

#![warn(missing_docs)]

pub mod buffer;
pub mod callback;
pub mod cell;
pub mod context;
pub mod devices;
mod dispatch;
pub mod error;
pub mod scenario;
pub mod slot;
pub mod table;
pub mod value;

pub use crate::buffer::BufferCell;
pub use crate::callback::{
    buffer_fn, const_buffer_fn, notify_fn, CallbackError, CallbackId, CallbackResult,
    NotifyCallback,
};
pub use crate::cell::PropertyCell;
pub use crate::context::{ContextSnapshot, SimContext};
pub use crate::error::SimError;
pub use crate::scenario::{Scenario, ScenarioReport};
pub use crate::slot::{BufferProp, ChannelProp, DeviceCategory, DeviceSlot, Prop};
pub use crate::table::{DeviceTable, DynTable};
pub use crate::value::{SimValue, Value, ValueKind};

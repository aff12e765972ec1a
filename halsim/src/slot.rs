//! Device schemas, typed property keys and device slots.
//!
//! This module defines:
//! - `DeviceCategory` trait - static property schema of one device category
//! - `PropertySpec` / `BufferSpec` / `RoutingSpec` - schema entries
//! - `Prop` / `ChannelProp` / `BufferProp` - typed keys into a schema
//! - `DeviceSlot` - the cells of one simulated device instance
//!
//! # Cell layout
//!
//! A slot flattens its schema into one `Vec<PropertyCell>`. A property with
//! `channels > 1` occupies `channels` consecutive cells named `name[ch]`;
//! every other property occupies a single cell named `name`.

use halsim_common::config::NotifyPolicy;
use serde::Serialize;
use std::collections::BTreeMap;
use std::marker::PhantomData;
use tracing::debug;

use crate::buffer::BufferCell;
use crate::callback::{CallbackId, NotifyCallback};
use crate::cell::PropertyCell;
use crate::error::SimError;
use crate::value::{SimValue, Value};

/// One scalar property of a device schema.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertySpec {
    /// Property name passed to callbacks.
    pub name: &'static str,
    /// Value on construction and after reset. Fixes the property kind.
    pub default: Value,
    /// Number of independent channels, 1 for plain properties.
    pub channels: usize,
}

impl PropertySpec {
    /// Plain single-channel property.
    pub const fn scalar(name: &'static str, default: Value) -> Self {
        Self {
            name,
            default,
            channels: 1,
        }
    }

    /// Property with `channels` independent cells.
    pub const fn channels(name: &'static str, default: Value, channels: usize) -> Self {
        Self {
            name,
            default,
            channels,
        }
    }

    /// True when the property has more than one channel.
    pub const fn is_channelized(&self) -> bool {
        self.channels > 1
    }
}

/// One byte-buffer property of a device schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferSpec {
    /// Buffer name passed to callbacks.
    pub name: &'static str,
    /// Maximum number of bytes the buffer accepts.
    pub max_len: usize,
}

/// Routing key of a category: an `Int` property external code uses to find
/// the slot serving a given port or pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutingSpec {
    /// Name of the `Int` property holding the key.
    pub key: &'static str,
    /// Boolean property that must be true for the slot to match.
    pub gate: Option<&'static str>,
}

/// Static schema of one device category.
///
/// Implemented by zero-sized marker types in [`crate::devices`].
pub trait DeviceCategory: Send + Sync + 'static {
    /// Category name, used for dynamic lookup and in errors.
    const NAME: &'static str;

    /// Scalar properties, in cell order.
    const PROPERTIES: &'static [PropertySpec];

    /// Byte-buffer properties.
    const BUFFERS: &'static [BufferSpec] = &[];

    /// Routing key, if the category has one.
    const ROUTING: Option<RoutingSpec> = None;

    /// Position of `name` in [`PROPERTIES`](Self::PROPERTIES).
    fn property_index(name: &str) -> Option<usize> {
        Self::PROPERTIES.iter().position(|p| p.name == name)
    }
}

/// Typed key of a single-channel property.
pub struct Prop<C, T> {
    index: usize,
    _marker: PhantomData<fn() -> (C, T)>,
}

impl<C: DeviceCategory, T: SimValue> Prop<C, T> {
    /// Key for entry `index` of `C::PROPERTIES`.
    pub const fn new(index: usize) -> Self {
        Self {
            index,
            _marker: PhantomData,
        }
    }

    /// Schema entry this key refers to.
    pub fn spec(&self) -> &'static PropertySpec {
        &C::PROPERTIES[self.index]
    }
}

/// Typed key of a channelized property.
pub struct ChannelProp<C, T> {
    index: usize,
    _marker: PhantomData<fn() -> (C, T)>,
}

impl<C: DeviceCategory, T: SimValue> ChannelProp<C, T> {
    /// Key for entry `index` of `C::PROPERTIES`.
    pub const fn new(index: usize) -> Self {
        Self {
            index,
            _marker: PhantomData,
        }
    }

    /// Schema entry this key refers to.
    pub fn spec(&self) -> &'static PropertySpec {
        &C::PROPERTIES[self.index]
    }
}

/// Typed key of a byte-buffer property.
pub struct BufferProp<C> {
    index: usize,
    _marker: PhantomData<fn() -> C>,
}

impl<C: DeviceCategory> BufferProp<C> {
    /// Key for entry `index` of `C::BUFFERS`.
    pub const fn new(index: usize) -> Self {
        Self {
            index,
            _marker: PhantomData,
        }
    }

    /// Schema entry this key refers to.
    pub fn spec(&self) -> &'static BufferSpec {
        &C::BUFFERS[self.index]
    }
}

// Derives would put bounds on C and T.
impl<C, T> Clone for Prop<C, T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<C, T> Copy for Prop<C, T> {}

impl<C, T> Clone for ChannelProp<C, T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<C, T> Copy for ChannelProp<C, T> {}

impl<C> Clone for BufferProp<C> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<C> Copy for BufferProp<C> {}

/// Serializable view of one slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotSnapshot {
    /// Slot index in its table.
    pub index: usize,
    /// Cell name to current value.
    pub properties: BTreeMap<String, Value>,
    /// Buffer name to stored bytes. Omitted when the category has none.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub buffers: BTreeMap<String, Vec<u8>>,
}

/// State of one simulated device instance.
pub struct DeviceSlot<C: DeviceCategory> {
    index: usize,
    cells: Vec<PropertyCell>,
    /// First cell of each schema entry.
    offsets: Vec<usize>,
    buffers: Vec<BufferCell>,
    _category: PhantomData<fn() -> C>,
}

impl<C: DeviceCategory> DeviceSlot<C> {
    /// Build a slot with every property at its schema default.
    pub fn new(index: usize, policy: NotifyPolicy) -> Self {
        let mut cells = Vec::new();
        let mut offsets = Vec::with_capacity(C::PROPERTIES.len());

        for spec in C::PROPERTIES {
            offsets.push(cells.len());
            if spec.is_channelized() {
                for ch in 0..spec.channels {
                    cells.push(PropertyCell::new(
                        format!("{}[{ch}]", spec.name),
                        spec.default,
                        policy,
                    ));
                }
            } else {
                cells.push(PropertyCell::new(spec.name, spec.default, policy));
            }
        }

        let buffers = C::BUFFERS
            .iter()
            .map(|b| BufferCell::new(b.name, b.max_len))
            .collect();

        Self {
            index,
            cells,
            offsets,
            buffers,
            _category: PhantomData,
        }
    }

    /// Index of this slot in its table.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Cell of a property by name.
    ///
    /// Accepts `name` for single-channel properties and `name[ch]` for one
    /// channel of a channelized property. A bare channelized name fails with
    /// `SimError::MissingChannel`.
    pub fn property(&self, name: &str) -> Result<&PropertyCell, SimError> {
        if let Some((base, channel)) = parse_channel_name(name) {
            return self.channel_property(base, channel);
        }
        let index = C::property_index(name).ok_or_else(|| SimError::InvalidProperty {
            category: C::NAME,
            name: name.to_string(),
        })?;
        let spec = &C::PROPERTIES[index];
        if spec.is_channelized() {
            return Err(SimError::MissingChannel {
                property: spec.name,
                channels: spec.channels,
            });
        }
        Ok(&self.cells[self.offsets[index]])
    }

    /// Cell of one channel of a property by name.
    pub fn channel_property(&self, name: &str, channel: usize) -> Result<&PropertyCell, SimError> {
        let index = C::property_index(name).ok_or_else(|| SimError::InvalidProperty {
            category: C::NAME,
            name: name.to_string(),
        })?;
        self.channel_cell(index, channel)
    }

    /// Buffer cell by name.
    pub fn buffer(&self, name: &str) -> Result<&BufferCell, SimError> {
        C::BUFFERS
            .iter()
            .position(|b| b.name == name)
            .map(|i| &self.buffers[i])
            .ok_or_else(|| SimError::InvalidProperty {
                category: C::NAME,
                name: name.to_string(),
            })
    }

    /// Every scalar cell of the slot, in schema order.
    pub fn cells(&self) -> impl Iterator<Item = &PropertyCell> {
        self.cells.iter()
    }

    /// Every buffer cell of the slot, in schema order.
    pub fn buffers(&self) -> impl Iterator<Item = &BufferCell> {
        self.buffers.iter()
    }

    /// First cell of schema entry `index`.
    pub(crate) fn schema_cell(&self, index: usize) -> &PropertyCell {
        &self.cells[self.offsets[index]]
    }

    fn cell<T: SimValue>(&self, key: Prop<C, T>) -> &PropertyCell {
        &self.cells[self.offsets[key.index]]
    }

    fn channel_cell(&self, index: usize, channel: usize) -> Result<&PropertyCell, SimError> {
        let spec = &C::PROPERTIES[index];
        if channel >= spec.channels {
            return Err(SimError::ChannelOutOfRange {
                property: spec.name,
                channel,
                channels: spec.channels,
            });
        }
        Ok(&self.cells[self.offsets[index] + channel])
    }

    // ----- typed single-channel access -----

    /// Current value of `key`.
    pub fn get<T: SimValue>(&self, key: Prop<C, T>) -> T {
        self.cell(key).get_as::<T>().unwrap_or_default()
    }

    /// Store `value` and notify subscribers of `key`.
    pub fn set<T: SimValue>(&self, key: Prop<C, T>, value: T) -> Result<(), SimError> {
        self.cell(key).set(value)
    }

    /// Subscribe to `key`.
    pub fn register<T: SimValue>(
        &self,
        key: Prop<C, T>,
        callback: NotifyCallback,
        initial_notify: bool,
    ) -> Result<CallbackId, SimError> {
        self.cell(key).register(callback, initial_notify)
    }

    /// Cancel a subscription on `key`.
    pub fn cancel<T: SimValue>(&self, key: Prop<C, T>, id: CallbackId) {
        self.cell(key).cancel(id);
    }

    // ----- typed channel access -----

    /// Current value of one channel of `key`.
    pub fn get_channel<T: SimValue>(
        &self,
        key: ChannelProp<C, T>,
        channel: usize,
    ) -> Result<T, SimError> {
        let cell = self.channel_cell(key.index, channel)?;
        Ok(cell.get_as::<T>().unwrap_or_default())
    }

    /// Store `value` on one channel of `key`.
    pub fn set_channel<T: SimValue>(
        &self,
        key: ChannelProp<C, T>,
        channel: usize,
        value: T,
    ) -> Result<(), SimError> {
        self.channel_cell(key.index, channel)?.set(value)
    }

    /// Subscribe to one channel of `key`.
    pub fn register_channel<T: SimValue>(
        &self,
        key: ChannelProp<C, T>,
        channel: usize,
        callback: NotifyCallback,
        initial_notify: bool,
    ) -> Result<CallbackId, SimError> {
        self.channel_cell(key.index, channel)?
            .register(callback, initial_notify)
    }

    /// Cancel a subscription on one channel of `key`.
    pub fn cancel_channel<T: SimValue>(
        &self,
        key: ChannelProp<C, T>,
        channel: usize,
        id: CallbackId,
    ) -> Result<(), SimError> {
        self.channel_cell(key.index, channel)?.cancel(id);
        Ok(())
    }

    /// Buffer cell of `key`.
    pub fn data(&self, key: BufferProp<C>) -> &BufferCell {
        &self.buffers[key.index]
    }

    // ----- bulk -----

    /// Subscribe `callback` to every scalar cell of the slot.
    ///
    /// Buffers are not included. Returns no ids: the subscriptions live
    /// until the slot is reset. A failing initial notification does not
    /// stop the remaining registrations; the first failure is returned.
    pub fn register_all(
        &self,
        callback: NotifyCallback,
        initial_notify: bool,
    ) -> Result<(), SimError> {
        self.register_each(self.cells.iter(), &callback, initial_notify)
    }

    /// Subscribe `callback` to every single-channel property.
    pub fn register_all_device_wide(
        &self,
        callback: NotifyCallback,
        initial_notify: bool,
    ) -> Result<(), SimError> {
        let cells = C::PROPERTIES
            .iter()
            .zip(&self.offsets)
            .filter(|(spec, _)| !spec.is_channelized())
            .map(|(_, &offset)| &self.cells[offset]);
        self.register_each(cells, &callback, initial_notify)
    }

    /// Subscribe `callback` to `channel` of every channelized property.
    ///
    /// Properties with fewer channels than `channel + 1` are skipped; it is
    /// an error only if no channelized property has that channel.
    pub fn register_all_for_channel(
        &self,
        channel: usize,
        callback: NotifyCallback,
        initial_notify: bool,
    ) -> Result<(), SimError> {
        let widest = C::PROPERTIES
            .iter()
            .filter(|spec| spec.is_channelized())
            .max_by_key(|spec| spec.channels);
        match widest {
            Some(spec) if channel >= spec.channels => {
                return Err(SimError::ChannelOutOfRange {
                    property: spec.name,
                    channel,
                    channels: spec.channels,
                });
            }
            None => {
                return Err(SimError::ChannelOutOfRange {
                    property: C::NAME,
                    channel,
                    channels: 0,
                });
            }
            Some(_) => {}
        }

        let cells = C::PROPERTIES
            .iter()
            .zip(&self.offsets)
            .filter(|(spec, _)| spec.is_channelized() && channel < spec.channels)
            .map(|(_, &offset)| &self.cells[offset + channel]);
        self.register_each(cells, &callback, initial_notify)
    }

    fn register_each<'a>(
        &self,
        cells: impl Iterator<Item = &'a PropertyCell>,
        callback: &NotifyCallback,
        initial_notify: bool,
    ) -> Result<(), SimError> {
        let mut first_error = None;
        let mut count = 0usize;
        for cell in cells {
            count += 1;
            if let Err(e) = cell.register(callback.clone(), initial_notify) {
                first_error.get_or_insert(e);
            }
        }
        debug!(
            category = C::NAME,
            slot = self.index,
            cells = count,
            "Bulk registration"
        );
        first_error.map_or(Ok(()), Err)
    }

    /// Restore every default and drop every subscription of the slot.
    ///
    /// Atomic per cell only; callers writing the same slot from other
    /// threads must serialise with the reset themselves.
    pub fn reset(&self) {
        for cell in &self.cells {
            cell.reset();
        }
        for buffer in &self.buffers {
            buffer.reset();
        }
        debug!(category = C::NAME, slot = self.index, "Slot reset");
    }

    /// Total live subscriptions over every cell and buffer.
    pub fn subscriber_count(&self) -> usize {
        let scalar: usize = self.cells.iter().map(PropertyCell::subscriber_count).sum();
        let buffers: usize = self
            .buffers
            .iter()
            .map(|b| b.reader_count() + b.writer_count())
            .sum();
        scalar + buffers
    }

    /// Current values of the slot.
    pub fn snapshot(&self) -> SlotSnapshot {
        SlotSnapshot {
            index: self.index,
            properties: self
                .cells
                .iter()
                .map(|c| (c.name().to_string(), c.get()))
                .collect(),
            buffers: self
                .buffers
                .iter()
                .map(|b| (b.name().to_string(), b.get()))
                .collect(),
        }
    }
}

impl<C: DeviceCategory> std::fmt::Debug for DeviceSlot<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceSlot")
            .field("category", &C::NAME)
            .field("index", &self.index)
            .field("cells", &self.cells.len())
            .field("buffers", &self.buffers.len())
            .finish()
    }
}

/// Split `name[ch]` into `("name", ch)`.
fn parse_channel_name(name: &str) -> Option<(&str, usize)> {
    let (base, rest) = name.split_once('[')?;
    let channel = rest.strip_suffix(']')?.parse().ok()?;
    Some((base, channel))
}

/// Assert that a typed key points at `name` with a matching kind.
#[cfg(test)]
pub(crate) fn assert_key<C: DeviceCategory, T: SimValue>(key: Prop<C, T>, name: &str) {
    let spec = key.spec();
    assert_eq!(spec.name, name, "{} key index", C::NAME);
    assert_eq!(spec.default.kind(), T::KIND, "{}.{} kind", C::NAME, name);
    assert_eq!(spec.channels, 1, "{}.{} channels", C::NAME, name);
}

/// Channelized counterpart of [`assert_key`].
#[cfg(test)]
pub(crate) fn assert_channel_key<C: DeviceCategory, T: SimValue>(
    key: ChannelProp<C, T>,
    name: &str,
    channels: usize,
) {
    let spec = key.spec();
    assert_eq!(spec.name, name, "{} key index", C::NAME);
    assert_eq!(spec.default.kind(), T::KIND, "{}.{} kind", C::NAME, name);
    assert_eq!(spec.channels, channels, "{}.{} channels", C::NAME, name);
}

/// Schema-wide checks shared by every category's tests.
#[cfg(test)]
pub(crate) fn assert_schema_consistent<C: DeviceCategory>() {
    let mut names: Vec<&str> = C::PROPERTIES.iter().map(|p| p.name).collect();
    names.extend(C::BUFFERS.iter().map(|b| b.name));
    let total = names.len();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), total, "{} has duplicate names", C::NAME);

    for spec in C::PROPERTIES {
        assert!(spec.channels >= 1, "{}.{} has no channels", C::NAME, spec.name);
    }

    if let Some(routing) = C::ROUTING {
        let key = C::property_index(routing.key).expect("routing key in schema");
        assert_eq!(C::PROPERTIES[key].default.kind(), crate::value::ValueKind::Int);
        if let Some(gate) = routing.gate {
            let gate = C::property_index(gate).expect("routing gate in schema");
            assert_eq!(
                C::PROPERTIES[gate].default.kind(),
                crate::value::ValueKind::Boolean
            );
        }
    }
}

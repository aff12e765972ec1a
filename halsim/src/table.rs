//! Fixed-capacity device tables.
//!
//! A [`DeviceTable`] owns every slot of one category. Capacity is fixed at
//! construction; an out-of-range index is an error and never grows the
//! table. [`DynTable`] is the object-safe view used for lookup by category
//! name.

use halsim_common::config::NotifyPolicy;
use serde::Serialize;
use tracing::debug;

use crate::buffer::BufferCell;
use crate::callback::NotifyCallback;
use crate::cell::PropertyCell;
use crate::error::SimError;
use crate::slot::{DeviceCategory, DeviceSlot, SlotSnapshot};
use crate::value::Value;

/// Serializable view of one table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSnapshot {
    /// Category name.
    pub category: &'static str,
    /// Every slot, by index.
    pub slots: Vec<SlotSnapshot>,
}

/// Every slot of one device category.
pub struct DeviceTable<C: DeviceCategory> {
    slots: Vec<DeviceSlot<C>>,
    /// Schema positions of the routing key and its gate.
    routing: Option<(usize, Option<usize>)>,
}

impl<C: DeviceCategory> DeviceTable<C> {
    /// Table of `capacity` slots at their defaults.
    pub fn new(capacity: usize, policy: NotifyPolicy) -> Self {
        let slots = (0..capacity)
            .map(|index| DeviceSlot::new(index, policy))
            .collect();
        let routing = C::ROUTING.and_then(|r| {
            let key = C::property_index(r.key)?;
            let gate = match r.gate {
                Some(gate) => Some(C::property_index(gate)?),
                None => None,
            };
            Some((key, gate))
        });

        debug!(category = C::NAME, capacity, "Device table created");
        Self { slots, routing }
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Slot at `index`.
    pub fn slot(&self, index: usize) -> Result<&DeviceSlot<C>, SimError> {
        self.slots.get(index).ok_or(SimError::IndexOutOfRange {
            category: C::NAME,
            index,
            capacity: self.slots.len(),
        })
    }

    /// Every slot, by index.
    pub fn iter(&self) -> impl Iterator<Item = &DeviceSlot<C>> {
        self.slots.iter()
    }

    /// Lowest slot index whose routing key equals `key`.
    ///
    /// When the category gates its routing key, only slots with the gate
    /// property set to true are considered. Returns `None` if no slot
    /// matches or the category has no routing key.
    pub fn find_by_routing_key(&self, key: i32) -> Option<usize> {
        let (key_index, gate_index) = self.routing?;

        self.slots.iter().position(|slot| {
            let gated_in = gate_index
                .is_none_or(|gate| slot.schema_cell(gate).get() == Value::Boolean(true));
            gated_in && slot.schema_cell(key_index).get() == Value::Int(key)
        })
    }

    /// Reset every slot.
    pub fn reset_all(&self) {
        for slot in &self.slots {
            slot.reset();
        }
        debug!(category = C::NAME, "Table reset");
    }

    /// Current values of every slot.
    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot {
            category: C::NAME,
            slots: self.slots.iter().map(DeviceSlot::snapshot).collect(),
        }
    }
}

impl<C: DeviceCategory> std::fmt::Debug for DeviceTable<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceTable")
            .field("category", &C::NAME)
            .field("capacity", &self.slots.len())
            .finish()
    }
}

/// Category-erased access to a [`DeviceTable`].
///
/// Used by the scenario runner and anything else that only knows the
/// category by name.
pub trait DynTable: Send + Sync {
    /// Category name.
    fn category(&self) -> &'static str;

    /// Number of slots.
    fn capacity(&self) -> usize;

    /// Cell of `name` on slot `index`. Channelized properties must be
    /// addressed as `name[ch]`.
    fn property(&self, index: usize, name: &str) -> Result<&PropertyCell, SimError>;

    /// Buffer `name` on slot `index`.
    fn buffer(&self, index: usize, name: &str) -> Result<&BufferCell, SimError>;

    /// Subscribe `callback` to every scalar cell of slot `index`.
    fn register_all(
        &self,
        index: usize,
        callback: NotifyCallback,
        initial_notify: bool,
    ) -> Result<(), SimError>;

    /// Reset slot `index`.
    fn reset_slot(&self, index: usize) -> Result<(), SimError>;

    /// Reset every slot.
    fn reset_all(&self);

    /// See [`DeviceTable::find_by_routing_key`].
    fn find_by_routing_key(&self, key: i32) -> Option<usize>;

    /// Total live subscriptions over every slot.
    fn subscriber_count(&self) -> usize;

    /// Current values of every slot.
    fn snapshot(&self) -> TableSnapshot;
}

impl<C: DeviceCategory> DynTable for DeviceTable<C> {
    fn category(&self) -> &'static str {
        C::NAME
    }

    fn capacity(&self) -> usize {
        DeviceTable::capacity(self)
    }

    fn property(&self, index: usize, name: &str) -> Result<&PropertyCell, SimError> {
        self.slot(index)?.property(name)
    }

    fn buffer(&self, index: usize, name: &str) -> Result<&BufferCell, SimError> {
        self.slot(index)?.buffer(name)
    }

    fn register_all(
        &self,
        index: usize,
        callback: NotifyCallback,
        initial_notify: bool,
    ) -> Result<(), SimError> {
        self.slot(index)?.register_all(callback, initial_notify)
    }

    fn reset_slot(&self, index: usize) -> Result<(), SimError> {
        self.slot(index)?.reset();
        Ok(())
    }

    fn reset_all(&self) {
        DeviceTable::reset_all(self);
    }

    fn find_by_routing_key(&self, key: i32) -> Option<usize> {
        DeviceTable::find_by_routing_key(self, key)
    }

    fn subscriber_count(&self) -> usize {
        self.slots.iter().map(DeviceSlot::subscriber_count).sum()
    }

    fn snapshot(&self) -> TableSnapshot {
        DeviceTable::snapshot(self)
    }
}

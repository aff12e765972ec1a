//! Analog inputs, including the accumulator attached to each channel.

use crate::slot::{DeviceCategory, Prop, PropertySpec};
use crate::value::Value;

/// Analog input category.
#[derive(Debug, Clone, Copy)]
pub struct AnalogIn;

impl DeviceCategory for AnalogIn {
    const NAME: &'static str = "analog_in";
    const PROPERTIES: &'static [PropertySpec] = &[
        PropertySpec::scalar("initialized", Value::Boolean(false)),
        PropertySpec::scalar("average_bits", Value::Int(7)),
        PropertySpec::scalar("oversample_bits", Value::Int(0)),
        PropertySpec::scalar("voltage", Value::Double(0.0)),
        PropertySpec::scalar("accumulator_initialized", Value::Boolean(false)),
        PropertySpec::scalar("accumulator_value", Value::Long(0)),
        PropertySpec::scalar("accumulator_count", Value::Long(0)),
        PropertySpec::scalar("accumulator_center", Value::Int(0)),
        PropertySpec::scalar("accumulator_deadband", Value::Int(0)),
    ];
}

/// Channel initialized.
pub const INITIALIZED: Prop<AnalogIn, bool> = Prop::new(0);
/// Averaging bits.
pub const AVERAGE_BITS: Prop<AnalogIn, i32> = Prop::new(1);
/// Oversampling bits.
pub const OVERSAMPLE_BITS: Prop<AnalogIn, i32> = Prop::new(2);
/// Input voltage.
pub const VOLTAGE: Prop<AnalogIn, f64> = Prop::new(3);
/// Accumulator initialized.
pub const ACCUMULATOR_INITIALIZED: Prop<AnalogIn, bool> = Prop::new(4);
/// Accumulated value.
pub const ACCUMULATOR_VALUE: Prop<AnalogIn, i64> = Prop::new(5);
/// Accumulated sample count.
pub const ACCUMULATOR_COUNT: Prop<AnalogIn, i64> = Prop::new(6);
/// Accumulator center.
pub const ACCUMULATOR_CENTER: Prop<AnalogIn, i32> = Prop::new(7);
/// Accumulator deadband.
pub const ACCUMULATOR_DEADBAND: Prop<AnalogIn, i32> = Prop::new(8);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::{assert_key, assert_schema_consistent, DeviceSlot};
    use halsim_common::config::NotifyPolicy;

    #[test]
    fn test_keys() {
        assert_schema_consistent::<AnalogIn>();
        assert_key(INITIALIZED, "initialized");
        assert_key(AVERAGE_BITS, "average_bits");
        assert_key(OVERSAMPLE_BITS, "oversample_bits");
        assert_key(VOLTAGE, "voltage");
        assert_key(ACCUMULATOR_INITIALIZED, "accumulator_initialized");
        assert_key(ACCUMULATOR_VALUE, "accumulator_value");
        assert_key(ACCUMULATOR_COUNT, "accumulator_count");
        assert_key(ACCUMULATOR_CENTER, "accumulator_center");
        assert_key(ACCUMULATOR_DEADBAND, "accumulator_deadband");
    }

    #[test]
    fn test_defaults() {
        let slot: DeviceSlot<AnalogIn> = DeviceSlot::new(0, NotifyPolicy::Always);
        assert_eq!(slot.get(AVERAGE_BITS), 7);
        assert_eq!(slot.get(ACCUMULATOR_VALUE), 0);
        slot.set(ACCUMULATOR_VALUE, i64::MAX).unwrap();
        assert_eq!(slot.get(ACCUMULATOR_VALUE), i64::MAX);
    }
}

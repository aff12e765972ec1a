//! Digital I/O channels.

use crate::slot::{DeviceCategory, Prop, PropertySpec};
use crate::value::Value;

/// Digital I/O category.
#[derive(Debug, Clone, Copy)]
pub struct Dio;

impl DeviceCategory for Dio {
    const NAME: &'static str = "dio";
    const PROPERTIES: &'static [PropertySpec] = &[
        PropertySpec::scalar("initialized", Value::Boolean(false)),
        PropertySpec::scalar("value", Value::Boolean(true)),
        PropertySpec::scalar("pulse_length", Value::Double(0.0)),
        PropertySpec::scalar("is_input", Value::Boolean(true)),
        PropertySpec::scalar("filter_index", Value::Int(-1)),
    ];
}

/// Channel initialized.
pub const INITIALIZED: Prop<Dio, bool> = Prop::new(0);
/// Pin level. Inputs float high.
pub const VALUE: Prop<Dio, bool> = Prop::new(1);
/// Length of the last output pulse in seconds.
pub const PULSE_LENGTH: Prop<Dio, f64> = Prop::new(2);
/// Pin mode, true for input.
pub const IS_INPUT: Prop<Dio, bool> = Prop::new(3);
/// Glitch filter index, -1 when unfiltered.
pub const FILTER_INDEX: Prop<Dio, i32> = Prop::new(4);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::{assert_key, assert_schema_consistent, DeviceSlot};
    use halsim_common::config::NotifyPolicy;

    #[test]
    fn test_keys() {
        assert_schema_consistent::<Dio>();
        assert_key(INITIALIZED, "initialized");
        assert_key(VALUE, "value");
        assert_key(PULSE_LENGTH, "pulse_length");
        assert_key(IS_INPUT, "is_input");
        assert_key(FILTER_INDEX, "filter_index");
    }

    #[test]
    fn test_defaults() {
        let slot: DeviceSlot<Dio> = DeviceSlot::new(0, NotifyPolicy::Always);
        assert!(slot.get(VALUE));
        assert!(slot.get(IS_INPUT));
        assert_eq!(slot.get(FILTER_INDEX), -1);
    }
}

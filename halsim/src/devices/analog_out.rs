//! Analog outputs.

use crate::slot::{DeviceCategory, Prop, PropertySpec};
use crate::value::Value;

/// Analog output category.
#[derive(Debug, Clone, Copy)]
pub struct AnalogOut;

impl DeviceCategory for AnalogOut {
    const NAME: &'static str = "analog_out";
    const PROPERTIES: &'static [PropertySpec] = &[
        PropertySpec::scalar("voltage", Value::Double(0.0)),
        PropertySpec::scalar("initialized", Value::Boolean(false)),
    ];
}

/// Output voltage.
pub const VOLTAGE: Prop<AnalogOut, f64> = Prop::new(0);
/// Channel initialized.
pub const INITIALIZED: Prop<AnalogOut, bool> = Prop::new(1);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::{assert_key, assert_schema_consistent};

    #[test]
    fn test_keys() {
        assert_schema_consistent::<AnalogOut>();
        assert_key(VOLTAGE, "voltage");
        assert_key(INITIALIZED, "initialized");
    }
}

//! Analog gyro.

use crate::slot::{DeviceCategory, Prop, PropertySpec};
use crate::value::Value;

/// Analog gyro category.
#[derive(Debug, Clone, Copy)]
pub struct AnalogGyro;

impl DeviceCategory for AnalogGyro {
    const NAME: &'static str = "analog_gyro";
    const PROPERTIES: &'static [PropertySpec] = &[
        PropertySpec::scalar("angle", Value::Double(0.0)),
        PropertySpec::scalar("rate", Value::Double(0.0)),
        PropertySpec::scalar("initialized", Value::Boolean(false)),
    ];
}

/// Angle in degrees.
pub const ANGLE: Prop<AnalogGyro, f64> = Prop::new(0);
/// Rate in degrees per second.
pub const RATE: Prop<AnalogGyro, f64> = Prop::new(1);
/// Gyro initialized.
pub const INITIALIZED: Prop<AnalogGyro, bool> = Prop::new(2);

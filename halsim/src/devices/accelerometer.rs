//! Built-in accelerometer.

use crate::sim_enum_value;
use crate::slot::{DeviceCategory, Prop, PropertySpec};
use crate::value::Value;

/// Built-in accelerometer category.
#[derive(Debug, Clone, Copy)]
pub struct Accelerometer;

/// Measurement range of the accelerometer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum AccelerometerRange {
    /// +/- 2 g
    #[default]
    K2G = 0,
    /// +/- 4 g
    K4G = 1,
    /// +/- 8 g
    K8G = 2,
}

impl AccelerometerRange {
    /// Wire code of the range.
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Range for a wire code.
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::K2G),
            1 => Some(Self::K4G),
            2 => Some(Self::K8G),
            _ => None,
        }
    }
}

sim_enum_value!(AccelerometerRange);

impl DeviceCategory for Accelerometer {
    const NAME: &'static str = "accelerometer";
    const PROPERTIES: &'static [PropertySpec] = &[
        PropertySpec::scalar("active", Value::Boolean(false)),
        PropertySpec::scalar("range", Value::Enum(AccelerometerRange::K2G.code())),
        PropertySpec::scalar("x", Value::Double(0.0)),
        PropertySpec::scalar("y", Value::Double(0.0)),
        PropertySpec::scalar("z", Value::Double(0.0)),
    ];
}

/// Accelerometer enabled.
pub const ACTIVE: Prop<Accelerometer, bool> = Prop::new(0);
/// Measurement range.
pub const RANGE: Prop<Accelerometer, AccelerometerRange> = Prop::new(1);
/// X-axis acceleration in g.
pub const X: Prop<Accelerometer, f64> = Prop::new(2);
/// Y-axis acceleration in g.
pub const Y: Prop<Accelerometer, f64> = Prop::new(3);
/// Z-axis acceleration in g.
pub const Z: Prop<Accelerometer, f64> = Prop::new(4);

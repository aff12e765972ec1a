//! Duty-cycle inputs, routed by the digital channel they sample.

use crate::slot::{DeviceCategory, Prop, PropertySpec, RoutingSpec};
use crate::value::Value;

/// Duty-cycle input category.
#[derive(Debug, Clone, Copy)]
pub struct DutyCycle;

impl DeviceCategory for DutyCycle {
    const NAME: &'static str = "duty_cycle";
    const PROPERTIES: &'static [PropertySpec] = &[
        PropertySpec::scalar("initialized", Value::Boolean(false)),
        PropertySpec::scalar("frequency", Value::Int(0)),
        PropertySpec::scalar("output", Value::Double(0.0)),
        PropertySpec::scalar("digital_channel", Value::Int(-1)),
    ];
    const ROUTING: Option<RoutingSpec> = Some(RoutingSpec {
        key: "digital_channel",
        gate: Some("initialized"),
    });
}

/// Input initialized.
pub const INITIALIZED: Prop<DutyCycle, bool> = Prop::new(0);
/// Measured frequency in Hz.
pub const FREQUENCY: Prop<DutyCycle, i32> = Prop::new(1);
/// Measured duty cycle, 0.0 to 1.0.
pub const OUTPUT: Prop<DutyCycle, f64> = Prop::new(2);
/// Digital source channel; routing key.
pub const DIGITAL_CHANNEL: Prop<DutyCycle, i32> = Prop::new(3);

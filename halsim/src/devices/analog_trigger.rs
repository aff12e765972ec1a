//! Analog triggers, routed by the analog input port they watch.

use crate::slot::{DeviceCategory, Prop, PropertySpec, RoutingSpec};
use crate::value::Value;

/// Analog trigger category.
#[derive(Debug, Clone, Copy)]
pub struct AnalogTrigger;

impl DeviceCategory for AnalogTrigger {
    const NAME: &'static str = "analog_trigger";
    const PROPERTIES: &'static [PropertySpec] = &[
        PropertySpec::scalar("initialized", Value::Boolean(false)),
        PropertySpec::scalar("trigger_lower_bound", Value::Double(0.0)),
        PropertySpec::scalar("trigger_upper_bound", Value::Double(0.0)),
        PropertySpec::scalar("input_port", Value::Int(-1)),
    ];
    const ROUTING: Option<RoutingSpec> = Some(RoutingSpec {
        key: "input_port",
        gate: Some("initialized"),
    });
}

/// Trigger initialized.
pub const INITIALIZED: Prop<AnalogTrigger, bool> = Prop::new(0);
/// Lower threshold voltage.
pub const TRIGGER_LOWER_BOUND: Prop<AnalogTrigger, f64> = Prop::new(1);
/// Upper threshold voltage.
pub const TRIGGER_UPPER_BOUND: Prop<AnalogTrigger, f64> = Prop::new(2);
/// Analog input port being watched; routing key.
pub const INPUT_PORT: Prop<AnalogTrigger, i32> = Prop::new(3);

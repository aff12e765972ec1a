//! Digital PWM generators, routed by output pin.

use crate::slot::{DeviceCategory, Prop, PropertySpec, RoutingSpec};
use crate::value::Value;

/// Digital PWM category.
#[derive(Debug, Clone, Copy)]
pub struct DigitalPwm;

impl DeviceCategory for DigitalPwm {
    const NAME: &'static str = "digital_pwm";
    const PROPERTIES: &'static [PropertySpec] = &[
        PropertySpec::scalar("initialized", Value::Boolean(false)),
        PropertySpec::scalar("duty_cycle", Value::Double(0.0)),
        PropertySpec::scalar("pin", Value::Int(0)),
    ];
    const ROUTING: Option<RoutingSpec> = Some(RoutingSpec {
        key: "pin",
        gate: Some("initialized"),
    });
}

/// Generator initialized.
pub const INITIALIZED: Prop<DigitalPwm, bool> = Prop::new(0);
/// Duty cycle, 0.0 to 1.0.
pub const DUTY_CYCLE: Prop<DigitalPwm, f64> = Prop::new(1);
/// Output pin; routing key.
pub const PIN: Prop<DigitalPwm, i32> = Prop::new(2);

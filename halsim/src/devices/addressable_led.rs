//! Addressable LED strips.
//!
//! Frame data is a byte buffer of `length` LEDs, 4 bytes each
//! (blue, green, red, padding). Device code writes frames; write
//! subscribers see each frame as it is stored.

use halsim_common::consts::{ADDRESSABLE_LED_BYTES_PER_LED, ADDRESSABLE_LED_MAX_LENGTH};

use crate::slot::{BufferProp, BufferSpec, DeviceCategory, Prop, PropertySpec, RoutingSpec};
use crate::value::Value;

/// Addressable LED category.
#[derive(Debug, Clone, Copy)]
pub struct AddressableLed;

impl DeviceCategory for AddressableLed {
    const NAME: &'static str = "addressable_led";
    const PROPERTIES: &'static [PropertySpec] = &[
        PropertySpec::scalar("initialized", Value::Boolean(false)),
        PropertySpec::scalar("output_port", Value::Int(-1)),
        PropertySpec::scalar("length", Value::Int(0)),
        PropertySpec::scalar("running", Value::Boolean(false)),
    ];
    const BUFFERS: &'static [BufferSpec] = &[BufferSpec {
        name: "data",
        max_len: ADDRESSABLE_LED_MAX_LENGTH * ADDRESSABLE_LED_BYTES_PER_LED,
    }];
    const ROUTING: Option<RoutingSpec> = Some(RoutingSpec {
        key: "output_port",
        gate: Some("initialized"),
    });
}

/// Strip initialized.
pub const INITIALIZED: Prop<AddressableLed, bool> = Prop::new(0);
/// PWM output port driving the strip; routing key.
pub const OUTPUT_PORT: Prop<AddressableLed, i32> = Prop::new(1);
/// Number of LEDs.
pub const LENGTH: Prop<AddressableLed, i32> = Prop::new(2);
/// Output running.
pub const RUNNING: Prop<AddressableLed, bool> = Prop::new(3);
/// Frame data.
pub const DATA: BufferProp<AddressableLed> = BufferProp::new(0);

//! CTRE pneumatics control modules.
//!
//! Each module has eight solenoid outputs plus compressor state. Bulk
//! registration is split the way harness code consumes it: one call for
//! the module-wide properties and one per solenoid channel.

use halsim_common::consts::NUM_CTRE_SOLENOID_CHANNELS;

use crate::callback::NotifyCallback;
use crate::error::SimError;
use crate::slot::{ChannelProp, DeviceCategory, DeviceSlot, Prop, PropertySpec};
use crate::value::Value;

/// CTRE PCM category.
#[derive(Debug, Clone, Copy)]
pub struct CtrePcm;

impl DeviceCategory for CtrePcm {
    const NAME: &'static str = "ctre_pcm";
    const PROPERTIES: &'static [PropertySpec] = &[
        PropertySpec::scalar("initialized", Value::Boolean(false)),
        PropertySpec::channels(
            "solenoid_output",
            Value::Boolean(false),
            NUM_CTRE_SOLENOID_CHANNELS,
        ),
        PropertySpec::scalar("compressor_on", Value::Boolean(false)),
        PropertySpec::scalar("closed_loop_enabled", Value::Boolean(true)),
        PropertySpec::scalar("pressure_switch", Value::Boolean(false)),
        PropertySpec::scalar("compressor_current", Value::Double(0.0)),
    ];
}

/// Module initialized.
pub const INITIALIZED: Prop<CtrePcm, bool> = Prop::new(0);
/// Solenoid output state, one channel per solenoid.
pub const SOLENOID_OUTPUT: ChannelProp<CtrePcm, bool> = ChannelProp::new(1);
/// Compressor running.
pub const COMPRESSOR_ON: Prop<CtrePcm, bool> = Prop::new(2);
/// Closed-loop compressor control.
pub const CLOSED_LOOP_ENABLED: Prop<CtrePcm, bool> = Prop::new(3);
/// Pressure switch state.
pub const PRESSURE_SWITCH: Prop<CtrePcm, bool> = Prop::new(4);
/// Compressor current in amps.
pub const COMPRESSOR_CURRENT: Prop<CtrePcm, f64> = Prop::new(5);

/// Subscribe to every module-wide property (everything but solenoids).
pub fn register_all_non_solenoid(
    slot: &DeviceSlot<CtrePcm>,
    callback: NotifyCallback,
    initial_notify: bool,
) -> Result<(), SimError> {
    slot.register_all_device_wide(callback, initial_notify)
}

/// Subscribe to every property of one solenoid channel.
pub fn register_all_solenoid(
    slot: &DeviceSlot<CtrePcm>,
    channel: usize,
    callback: NotifyCallback,
    initial_notify: bool,
) -> Result<(), SimError> {
    slot.register_all_for_channel(channel, callback, initial_notify)
}

//! Joystick ports of the driver station.
//!
//! Buttons are a bitfield; button `n` (1-based) is bit `n - 1`. Axes and
//! POVs are channelized, with `axis_count` / `pov_count` telling device
//! code how many channels are meaningful. The HID name is a UTF-8 buffer.

use halsim_common::consts::{
    JOYSTICK_NAME_MAX_LEN, MAX_JOYSTICK_AXES, MAX_JOYSTICK_BUTTONS, MAX_JOYSTICK_POVS,
};

use crate::error::SimError;
use crate::slot::{
    BufferProp, BufferSpec, ChannelProp, DeviceCategory, DeviceSlot, Prop, PropertySpec,
};
use crate::value::Value;

/// Joystick category.
#[derive(Debug, Clone, Copy)]
pub struct Joystick;

impl DeviceCategory for Joystick {
    const NAME: &'static str = "joystick";
    const PROPERTIES: &'static [PropertySpec] = &[
        PropertySpec::scalar("buttons", Value::Int(0)),
        PropertySpec::scalar("button_count", Value::Int(0)),
        PropertySpec::scalar("axis_count", Value::Int(0)),
        PropertySpec::scalar("pov_count", Value::Int(0)),
        PropertySpec::channels("axes", Value::Double(0.0), MAX_JOYSTICK_AXES),
        PropertySpec::channels("povs", Value::Int(-1), MAX_JOYSTICK_POVS),
        PropertySpec::scalar("is_xbox", Value::Boolean(false)),
        PropertySpec::scalar("joystick_type", Value::Int(-1)),
        PropertySpec::scalar("outputs", Value::Long(0)),
        PropertySpec::scalar("left_rumble", Value::Int(0)),
        PropertySpec::scalar("right_rumble", Value::Int(0)),
        PropertySpec::channels("axis_types", Value::Int(0), MAX_JOYSTICK_AXES),
    ];
    const BUFFERS: &'static [BufferSpec] = &[BufferSpec {
        name: "name",
        max_len: JOYSTICK_NAME_MAX_LEN,
    }];
}

/// Button bitfield.
pub const BUTTONS: Prop<Joystick, i32> = Prop::new(0);
/// Number of buttons reported.
pub const BUTTON_COUNT: Prop<Joystick, i32> = Prop::new(1);
/// Number of axes reported.
pub const AXIS_COUNT: Prop<Joystick, i32> = Prop::new(2);
/// Number of POV hats reported.
pub const POV_COUNT: Prop<Joystick, i32> = Prop::new(3);
/// Axis values, -1.0 to 1.0.
pub const AXES: ChannelProp<Joystick, f64> = ChannelProp::new(4);
/// POV angles in degrees, -1 when released.
pub const POVS: ChannelProp<Joystick, i32> = ChannelProp::new(5);
/// Controller is an Xbox controller.
pub const IS_XBOX: Prop<Joystick, bool> = Prop::new(6);
/// HID type code.
pub const JOYSTICK_TYPE: Prop<Joystick, i32> = Prop::new(7);
/// HID output bitfield written by robot code.
pub const OUTPUTS: Prop<Joystick, i64> = Prop::new(8);
/// Left rumble intensity written by robot code.
pub const LEFT_RUMBLE: Prop<Joystick, i32> = Prop::new(9);
/// Right rumble intensity written by robot code.
pub const RIGHT_RUMBLE: Prop<Joystick, i32> = Prop::new(10);
/// HID usage type of each axis.
pub const AXIS_TYPES: ChannelProp<Joystick, i32> = ChannelProp::new(11);

/// HID device name (UTF-8).
pub const NAME: BufferProp<Joystick> = BufferProp::new(0);

/// Set the HID device name.
pub fn set_name(slot: &DeviceSlot<Joystick>, name: &str) -> Result<(), SimError> {
    slot.data(NAME).set(name.as_bytes())
}

/// HID device name; invalid UTF-8 is replaced.
pub fn name(slot: &DeviceSlot<Joystick>) -> String {
    String::from_utf8_lossy(&slot.data(NAME).get()).into_owned()
}

/// Set the HID usage type of `axis`.
pub fn set_axis_type(slot: &DeviceSlot<Joystick>, axis: usize, kind: i32) -> Result<(), SimError> {
    slot.set_channel(AXIS_TYPES, axis, kind)
}

/// Set or clear button `button` (1-based).
///
/// Read-modify-write on the bitfield: concurrent writers of the same
/// joystick's buttons must serialise themselves.
pub fn set_button(slot: &DeviceSlot<Joystick>, button: usize, state: bool) -> Result<(), SimError> {
    if button == 0 || button > MAX_JOYSTICK_BUTTONS {
        return Err(SimError::ChannelOutOfRange {
            property: "buttons",
            channel: button,
            channels: MAX_JOYSTICK_BUTTONS,
        });
    }
    let mask = 1_u32 << (button - 1);
    let buttons = slot.get(BUTTONS) as u32;
    let updated = if state { buttons | mask } else { buttons & !mask };
    slot.set(BUTTONS, updated as i32)
}

/// State of button `button` (1-based); false outside the bitfield.
pub fn button(slot: &DeviceSlot<Joystick>, button: usize) -> bool {
    if button == 0 || button > MAX_JOYSTICK_BUTTONS {
        return false;
    }
    (slot.get(BUTTONS) as u32) & (1 << (button - 1)) != 0
}

/// Set every axis from `values` and update `axis_count` to match.
pub fn set_axes(slot: &DeviceSlot<Joystick>, values: &[f64]) -> Result<(), SimError> {
    if values.len() > MAX_JOYSTICK_AXES {
        return Err(SimError::ChannelOutOfRange {
            property: "axes",
            channel: values.len() - 1,
            channels: MAX_JOYSTICK_AXES,
        });
    }
    for (axis, value) in values.iter().enumerate() {
        slot.set_channel(AXES, axis, *value)?;
    }
    slot.set(AXIS_COUNT, values.len() as i32)
}

/// Set every POV from `values` and update `pov_count` to match.
pub fn set_povs(slot: &DeviceSlot<Joystick>, values: &[i32]) -> Result<(), SimError> {
    if values.len() > MAX_JOYSTICK_POVS {
        return Err(SimError::ChannelOutOfRange {
            property: "povs",
            channel: values.len() - 1,
            channels: MAX_JOYSTICK_POVS,
        });
    }
    for (pov, value) in values.iter().enumerate() {
        slot.set_channel(POVS, pov, *value)?;
    }
    slot.set(POV_COUNT, values.len() as i32)
}

/// Rumble intensity `n`: 0 is left, 1 is right.
pub fn rumble(slot: &DeviceSlot<Joystick>, n: usize) -> Result<i32, SimError> {
    match n {
        0 => Ok(slot.get(LEFT_RUMBLE)),
        1 => Ok(slot.get(RIGHT_RUMBLE)),
        _ => Err(SimError::ChannelOutOfRange {
            property: "rumble",
            channel: n,
            channels: 2,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::{assert_channel_key, assert_key, assert_schema_consistent};
    use halsim_common::config::NotifyPolicy;

    fn slot() -> DeviceSlot<Joystick> {
        DeviceSlot::new(0, NotifyPolicy::Always)
    }

    #[test]
    fn test_keys() {
        assert_schema_consistent::<Joystick>();
        assert_key(BUTTONS, "buttons");
        assert_key(BUTTON_COUNT, "button_count");
        assert_key(AXIS_COUNT, "axis_count");
        assert_key(POV_COUNT, "pov_count");
        assert_channel_key(AXES, "axes", 12);
        assert_channel_key(POVS, "povs", 12);
        assert_key(IS_XBOX, "is_xbox");
        assert_key(JOYSTICK_TYPE, "joystick_type");
        assert_key(OUTPUTS, "outputs");
        assert_key(LEFT_RUMBLE, "left_rumble");
        assert_key(RIGHT_RUMBLE, "right_rumble");
        assert_channel_key(AXIS_TYPES, "axis_types", 12);
        assert_eq!(NAME.spec().max_len, 256);
    }

    #[test]
    fn test_name_and_axis_types() {
        let s = slot();
        assert_eq!(name(&s), "");
        set_name(&s, "Xbox Controller").unwrap();
        assert_eq!(name(&s), "Xbox Controller");
        assert!(set_name(&s, &"n".repeat(257)).is_err());

        set_axis_type(&s, 4, 3).unwrap();
        assert_eq!(s.get_channel(AXIS_TYPES, 4).unwrap(), 3);
        assert_eq!(s.get_channel(AXIS_TYPES, 0).unwrap(), 0);
        assert!(set_axis_type(&s, 12, 1).is_err());

        s.reset();
        assert_eq!(name(&s), "");
        assert_eq!(s.get_channel(AXIS_TYPES, 4).unwrap(), 0);
    }

    #[test]
    fn test_buttons_are_one_based_bits() {
        let s = slot();
        set_button(&s, 1, true).unwrap();
        set_button(&s, 3, true).unwrap();
        assert_eq!(s.get(BUTTONS), 0b101);
        assert!(button(&s, 3));
        assert!(!button(&s, 2));

        set_button(&s, 1, false).unwrap();
        assert_eq!(s.get(BUTTONS), 0b100);

        set_button(&s, 32, true).unwrap();
        assert!(button(&s, 32));
        assert!(s.get(BUTTONS) < 0);

        assert!(set_button(&s, 0, true).is_err());
        assert!(set_button(&s, 33, true).is_err());
        assert!(!button(&s, 33));
    }

    #[test]
    fn test_axes_and_povs() {
        let s = slot();
        set_axes(&s, &[0.5, -0.25]).unwrap();
        assert_eq!(s.get(AXIS_COUNT), 2);
        assert_eq!(s.get_channel(AXES, 1).unwrap(), -0.25);

        set_povs(&s, &[90]).unwrap();
        assert_eq!(s.get(POV_COUNT), 1);
        assert_eq!(s.get_channel(POVS, 0).unwrap(), 90);
        assert_eq!(s.get_channel(POVS, 1).unwrap(), -1);

        assert!(set_axes(&s, &[0.0; 13]).is_err());
    }

    #[test]
    fn test_rumble() {
        let s = slot();
        s.set(LEFT_RUMBLE, 100).unwrap();
        s.set(RIGHT_RUMBLE, 200).unwrap();
        assert_eq!(rumble(&s, 0).unwrap(), 100);
        assert_eq!(rumble(&s, 1).unwrap(), 200);
        assert!(rumble(&s, 2).is_err());
    }
}

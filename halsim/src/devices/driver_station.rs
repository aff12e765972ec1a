//! Driver station: robot mode, match info and alliance station.
//!
//! There is a single driver-station slot. Joystick state lives in its own
//! table (see [`super::joystick`]). The event name and game-specific
//! message are byte buffers; text is stored as UTF-8.

use halsim_common::consts::{EVENT_NAME_MAX_LEN, GAME_SPECIFIC_MESSAGE_MAX_LEN};

use crate::callback::NotifyCallback;
use crate::error::SimError;
use crate::sim_enum_value;
use crate::slot::{BufferProp, BufferSpec, DeviceCategory, DeviceSlot, Prop, PropertySpec};
use crate::value::Value;

/// Driver station category.
#[derive(Debug, Clone, Copy)]
pub struct DriverStation;

/// Alliance station the robot is assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum AllianceStationId {
    /// Not reported by the field.
    Unknown = 0,
    /// Red 1
    #[default]
    Red1 = 1,
    /// Red 2
    Red2 = 2,
    /// Red 3
    Red3 = 3,
    /// Blue 1
    Blue1 = 4,
    /// Blue 2
    Blue2 = 5,
    /// Blue 3
    Blue3 = 6,
}

impl AllianceStationId {
    /// Wire code of the station.
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Station for a wire code.
    pub const fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            0 => Self::Unknown,
            1 => Self::Red1,
            2 => Self::Red2,
            3 => Self::Red3,
            4 => Self::Blue1,
            5 => Self::Blue2,
            6 => Self::Blue3,
            _ => return None,
        })
    }
}

sim_enum_value!(AllianceStationId);

impl DeviceCategory for DriverStation {
    const NAME: &'static str = "driver_station";
    const PROPERTIES: &'static [PropertySpec] = &[
        PropertySpec::scalar("enabled", Value::Boolean(false)),
        PropertySpec::scalar("autonomous", Value::Boolean(false)),
        PropertySpec::scalar("test", Value::Boolean(false)),
        PropertySpec::scalar("estop", Value::Boolean(false)),
        PropertySpec::scalar("fms_attached", Value::Boolean(false)),
        PropertySpec::scalar("ds_attached", Value::Boolean(false)),
        PropertySpec::scalar(
            "alliance_station_id",
            Value::Enum(AllianceStationId::Red1.code()),
        ),
        PropertySpec::scalar("match_time", Value::Double(-1.0)),
        PropertySpec::scalar("match_number", Value::Int(0)),
        PropertySpec::scalar("replay_number", Value::Int(0)),
        PropertySpec::scalar("match_type", Value::Int(0)),
        PropertySpec::scalar("send_error", Value::Boolean(true)),
        PropertySpec::scalar("send_console_line", Value::Boolean(true)),
        PropertySpec::scalar("new_data", Value::Long(0)),
    ];
    const BUFFERS: &'static [BufferSpec] = &[
        BufferSpec {
            name: "event_name",
            max_len: EVENT_NAME_MAX_LEN,
        },
        BufferSpec {
            name: "game_specific_message",
            max_len: GAME_SPECIFIC_MESSAGE_MAX_LEN,
        },
    ];
}

/// Robot enabled.
pub const ENABLED: Prop<DriverStation, bool> = Prop::new(0);
/// Autonomous mode.
pub const AUTONOMOUS: Prop<DriverStation, bool> = Prop::new(1);
/// Test mode.
pub const TEST: Prop<DriverStation, bool> = Prop::new(2);
/// Emergency stop.
pub const ESTOP: Prop<DriverStation, bool> = Prop::new(3);
/// Field management system attached.
pub const FMS_ATTACHED: Prop<DriverStation, bool> = Prop::new(4);
/// Driver station attached.
pub const DS_ATTACHED: Prop<DriverStation, bool> = Prop::new(5);
/// Alliance station.
pub const ALLIANCE_STATION_ID: Prop<DriverStation, AllianceStationId> = Prop::new(6);
/// Remaining match time in seconds, -1.0 when unknown.
pub const MATCH_TIME: Prop<DriverStation, f64> = Prop::new(7);
/// Match number.
pub const MATCH_NUMBER: Prop<DriverStation, i32> = Prop::new(8);
/// Replay number.
pub const REPLAY_NUMBER: Prop<DriverStation, i32> = Prop::new(9);
/// Match type code (practice, qualification, elimination).
pub const MATCH_TYPE: Prop<DriverStation, i32> = Prop::new(10);
/// Forward error and warning reports; false suppresses them.
pub const SEND_ERROR: Prop<DriverStation, bool> = Prop::new(11);
/// Forward console lines; false suppresses them.
pub const SEND_CONSOLE_LINE: Prop<DriverStation, bool> = Prop::new(12);
/// Bumped by [`notify_new_data`].
pub const NEW_DATA: Prop<DriverStation, i64> = Prop::new(13);

/// Event name (UTF-8).
pub const EVENT_NAME: BufferProp<DriverStation> = BufferProp::new(0);
/// Game-specific message.
pub const GAME_SPECIFIC_MESSAGE: BufferProp<DriverStation> = BufferProp::new(1);

/// Match information as set in one call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchInfo {
    /// Event name.
    pub event_name: String,
    /// Game-specific message.
    pub game_specific_message: Vec<u8>,
    /// Match number.
    pub match_number: i32,
    /// Replay number.
    pub replay_number: i32,
    /// Match type code.
    pub match_type: i32,
}

/// Store every field of `info`.
///
/// Each field is its own property and notifies on its own; readers may
/// observe a partially applied update.
pub fn set_match_info(slot: &DeviceSlot<DriverStation>, info: &MatchInfo) -> Result<(), SimError> {
    slot.data(EVENT_NAME).set(info.event_name.as_bytes())?;
    slot.data(GAME_SPECIFIC_MESSAGE)
        .set(&info.game_specific_message)?;
    slot.set(MATCH_NUMBER, info.match_number)?;
    slot.set(REPLAY_NUMBER, info.replay_number)?;
    slot.set(MATCH_TYPE, info.match_type)
}

/// Current match information.
pub fn match_info(slot: &DeviceSlot<DriverStation>) -> MatchInfo {
    MatchInfo {
        event_name: event_name(slot),
        game_specific_message: slot.data(GAME_SPECIFIC_MESSAGE).get(),
        match_number: slot.get(MATCH_NUMBER),
        replay_number: slot.get(REPLAY_NUMBER),
        match_type: slot.get(MATCH_TYPE),
    }
}

/// Set the event name.
pub fn set_event_name(slot: &DeviceSlot<DriverStation>, name: &str) -> Result<(), SimError> {
    slot.data(EVENT_NAME).set(name.as_bytes())
}

/// Event name; invalid UTF-8 is replaced.
pub fn event_name(slot: &DeviceSlot<DriverStation>) -> String {
    String::from_utf8_lossy(&slot.data(EVENT_NAME).get()).into_owned()
}

/// Set the game-specific message.
pub fn set_game_specific_message(
    slot: &DeviceSlot<DriverStation>,
    message: &[u8],
) -> Result<(), SimError> {
    slot.data(GAME_SPECIFIC_MESSAGE).set(message)
}

/// Publish the current driver-station state to device code.
///
/// Bumps [`NEW_DATA`], so subscribers of that property hear about every
/// publish. Concurrent publishers may coalesce into one increment.
pub fn notify_new_data(slot: &DeviceSlot<DriverStation>) -> Result<(), SimError> {
    slot.set(NEW_DATA, slot.get(NEW_DATA).wrapping_add(1))
}

/// Subscribe to every driver-station property.
pub fn register_all(
    slot: &DeviceSlot<DriverStation>,
    callback: NotifyCallback,
    initial_notify: bool,
) -> Result<(), SimError> {
    slot.register_all(callback, initial_notify)
}

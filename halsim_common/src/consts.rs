//! System-wide constants for the halsim workspace.
//!
//! Single source of truth for default table capacities and buffer limits.
//! Imported by all crates; no duplication permitted.

use static_assertions::const_assert;

/// Hard upper bound for any device table capacity.
pub const MAX_SLOTS_PER_TABLE: usize = 256;

/// Default number of simulated accelerometers.
pub const NUM_ACCELEROMETERS: usize = 1;

/// Default number of simulated analog gyros.
pub const NUM_ANALOG_GYROS: usize = 2;

/// Default number of analog inputs.
pub const NUM_ANALOG_INPUTS: usize = 8;

/// Default number of analog outputs.
pub const NUM_ANALOG_OUTPUTS: usize = 2;

/// Default number of analog triggers.
pub const NUM_ANALOG_TRIGGERS: usize = 8;

/// Default number of digital I/O channels.
pub const NUM_DIGITAL_CHANNELS: usize = 31;

/// Default number of digital PWM generators.
pub const NUM_DIGITAL_PWM_OUTPUTS: usize = 6;

/// Default number of duty cycle inputs.
pub const NUM_DUTY_CYCLES: usize = 8;

/// Default number of addressable LED strips.
pub const NUM_ADDRESSABLE_LEDS: usize = 1;

/// Default number of CTRE pneumatics control modules.
pub const NUM_CTRE_PCM_MODULES: usize = 63;

/// Solenoid output channels per CTRE PCM.
pub const NUM_CTRE_SOLENOID_CHANNELS: usize = 8;

/// Driver station instances (always exactly one).
pub const NUM_DRIVER_STATIONS: usize = 1;

/// Default number of joystick ports.
pub const NUM_JOYSTICK_PORTS: usize = 6;

/// Axes per joystick.
pub const MAX_JOYSTICK_AXES: usize = 12;

/// POV hats per joystick.
pub const MAX_JOYSTICK_POVS: usize = 12;

/// Buttons carried by a joystick's button bitfield.
pub const MAX_JOYSTICK_BUTTONS: usize = 32;

/// Default number of I2C ports.
pub const NUM_I2C_PORTS: usize = 2;

/// Default number of SPI ports.
pub const NUM_SPI_PORTS: usize = 5;

/// Maximum LEDs on one addressable LED strip.
pub const ADDRESSABLE_LED_MAX_LENGTH: usize = 5460;

/// Bytes per LED in the addressable LED data buffer (b, g, r, padding).
pub const ADDRESSABLE_LED_BYTES_PER_LED: usize = 4;

/// Maximum bytes of a joystick name.
pub const JOYSTICK_NAME_MAX_LEN: usize = 256;

/// Maximum bytes of the match event name.
pub const EVENT_NAME_MAX_LEN: usize = 64;

/// Maximum bytes of the game-specific message.
pub const GAME_SPECIFIC_MESSAGE_MAX_LEN: usize = 64;

/// Maximum size of a bus transaction buffer (I2C / SPI).
pub const BUS_BUFFER_MAX_LEN: usize = 1024;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/halsim/halsim.toml";

const_assert!(NUM_CTRE_PCM_MODULES <= MAX_SLOTS_PER_TABLE);
const_assert!(NUM_DIGITAL_CHANNELS <= MAX_SLOTS_PER_TABLE);
const_assert!(MAX_JOYSTICK_BUTTONS <= 32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_are_consistent() {
        assert!(MAX_SLOTS_PER_TABLE > 0);
        assert_eq!(NUM_DRIVER_STATIONS, 1);
        assert!(NUM_JOYSTICK_PORTS > 0);
        assert!(BUS_BUFFER_MAX_LEN > 0);
    }

    #[test]
    fn led_buffer_fits_all_leds() {
        // 5460 LEDs * 4 bytes = 21840 bytes.
        assert_eq!(
            ADDRESSABLE_LED_MAX_LENGTH * ADDRESSABLE_LED_BYTES_PER_LED,
            21_840
        );
    }
}

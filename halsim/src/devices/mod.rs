//! Device category schemas.
//!
//! One module per simulated device category. Each module defines the
//! category marker type, its [`DeviceCategory`](crate::slot::DeviceCategory)
//! schema and the typed keys device code binds to.

pub mod accelerometer;
pub mod addressable_led;
pub mod analog_gyro;
pub mod analog_in;
pub mod analog_out;
pub mod analog_trigger;
pub mod ctre_pcm;
pub mod digital_pwm;
pub mod dio;
pub mod driver_station;
pub mod duty_cycle;
pub mod i2c;
pub mod joystick;
pub mod spi;

pub use accelerometer::{Accelerometer, AccelerometerRange};
pub use addressable_led::AddressableLed;
pub use analog_gyro::AnalogGyro;
pub use analog_in::AnalogIn;
pub use analog_out::AnalogOut;
pub use analog_trigger::AnalogTrigger;
pub use ctre_pcm::CtrePcm;
pub use digital_pwm::DigitalPwm;
pub use dio::Dio;
pub use driver_station::{AllianceStationId, DriverStation};
pub use duty_cycle::DutyCycle;
pub use i2c::I2c;
pub use joystick::Joystick;
pub use spi::Spi;

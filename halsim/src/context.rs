//! Simulation context: owner of every device table.
//!
//! A `SimContext` is built once from [`SimConfig`], passed by reference to
//! whatever drives or observes the simulation, and torn down by dropping
//! it. There is no process-wide store.

use halsim_common::config::{NotifyPolicy, SimConfig};
use halsim_common::consts::NUM_DRIVER_STATIONS;
use serde::Serialize;
use tracing::info;

use crate::devices::{
    Accelerometer, AddressableLed, AnalogGyro, AnalogIn, AnalogOut, AnalogTrigger, CtrePcm,
    DigitalPwm, Dio, DriverStation, DutyCycle, I2c, Joystick, Spi,
};
use crate::error::SimError;
use crate::table::{DeviceTable, DynTable, TableSnapshot};

/// Serializable view of a whole context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextSnapshot {
    /// Notify policy of every cell.
    pub notify: NotifyPolicy,
    /// One entry per device category.
    pub tables: Vec<TableSnapshot>,
}

/// Every device table of one simulated robot.
pub struct SimContext {
    policy: NotifyPolicy,
    accelerometer: DeviceTable<Accelerometer>,
    analog_gyro: DeviceTable<AnalogGyro>,
    analog_in: DeviceTable<AnalogIn>,
    analog_out: DeviceTable<AnalogOut>,
    analog_trigger: DeviceTable<AnalogTrigger>,
    dio: DeviceTable<Dio>,
    digital_pwm: DeviceTable<DigitalPwm>,
    duty_cycle: DeviceTable<DutyCycle>,
    addressable_led: DeviceTable<AddressableLed>,
    ctre_pcm: DeviceTable<CtrePcm>,
    driver_station: DeviceTable<DriverStation>,
    joystick: DeviceTable<Joystick>,
    i2c: DeviceTable<I2c>,
    spi: DeviceTable<Spi>,
}

impl SimContext {
    /// Build every table with the capacities and notify policy of `config`.
    ///
    /// # Errors
    ///
    /// Returns `SimError::Config` if the configuration does not validate.
    pub fn new(config: &SimConfig) -> Result<Self, SimError> {
        config.validate()?;

        let caps = &config.capacities;
        let policy = config.registry.notify;
        let ctx = Self {
            policy,
            accelerometer: DeviceTable::new(caps.accelerometer, policy),
            analog_gyro: DeviceTable::new(caps.analog_gyro, policy),
            analog_in: DeviceTable::new(caps.analog_in, policy),
            analog_out: DeviceTable::new(caps.analog_out, policy),
            analog_trigger: DeviceTable::new(caps.analog_trigger, policy),
            dio: DeviceTable::new(caps.dio, policy),
            digital_pwm: DeviceTable::new(caps.digital_pwm, policy),
            duty_cycle: DeviceTable::new(caps.duty_cycle, policy),
            addressable_led: DeviceTable::new(caps.addressable_led, policy),
            ctre_pcm: DeviceTable::new(caps.ctre_pcm, policy),
            driver_station: DeviceTable::new(NUM_DRIVER_STATIONS, policy),
            joystick: DeviceTable::new(caps.joystick, policy),
            i2c: DeviceTable::new(caps.i2c, policy),
            spi: DeviceTable::new(caps.spi, policy),
        };

        let slots: usize = ctx.tables().iter().map(|t| t.capacity()).sum();
        info!(
            service = %config.shared.service_name,
            ?policy,
            tables = ctx.tables().len(),
            slots,
            "Simulation context ready"
        );
        Ok(ctx)
    }

    /// Notify policy shared by every cell.
    pub fn policy(&self) -> NotifyPolicy {
        self.policy
    }

    /// Accelerometer table.
    pub fn accelerometer(&self) -> &DeviceTable<Accelerometer> {
        &self.accelerometer
    }

    /// Analog gyro table.
    pub fn analog_gyro(&self) -> &DeviceTable<AnalogGyro> {
        &self.analog_gyro
    }

    /// Analog input table.
    pub fn analog_in(&self) -> &DeviceTable<AnalogIn> {
        &self.analog_in
    }

    /// Analog output table.
    pub fn analog_out(&self) -> &DeviceTable<AnalogOut> {
        &self.analog_out
    }

    /// Analog trigger table.
    pub fn analog_trigger(&self) -> &DeviceTable<AnalogTrigger> {
        &self.analog_trigger
    }

    /// Digital I/O table.
    pub fn dio(&self) -> &DeviceTable<Dio> {
        &self.dio
    }

    /// Digital PWM table.
    pub fn digital_pwm(&self) -> &DeviceTable<DigitalPwm> {
        &self.digital_pwm
    }

    /// Duty cycle input table.
    pub fn duty_cycle(&self) -> &DeviceTable<DutyCycle> {
        &self.duty_cycle
    }

    /// Addressable LED table.
    pub fn addressable_led(&self) -> &DeviceTable<AddressableLed> {
        &self.addressable_led
    }

    /// CTRE PCM table.
    pub fn ctre_pcm(&self) -> &DeviceTable<CtrePcm> {
        &self.ctre_pcm
    }

    /// Joystick table.
    pub fn joystick(&self) -> &DeviceTable<Joystick> {
        &self.joystick
    }

    /// I2C table.
    pub fn i2c(&self) -> &DeviceTable<I2c> {
        &self.i2c
    }

    /// SPI table.
    pub fn spi(&self) -> &DeviceTable<Spi> {
        &self.spi
    }

    /// Driver station table. It always holds exactly one slot.
    pub fn driver_station(&self) -> &DeviceTable<DriverStation> {
        &self.driver_station
    }

    /// Every table, in a fixed order.
    pub fn tables(&self) -> [&dyn DynTable; 14] {
        [
            &self.accelerometer,
            &self.analog_gyro,
            &self.analog_in,
            &self.analog_out,
            &self.analog_trigger,
            &self.dio,
            &self.digital_pwm,
            &self.duty_cycle,
            &self.addressable_led,
            &self.ctre_pcm,
            &self.driver_station,
            &self.joystick,
            &self.i2c,
            &self.spi,
        ]
    }

    /// Table of the category called `name`.
    ///
    /// # Errors
    ///
    /// Returns `SimError::UnknownCategory` for names no table carries.
    pub fn table(&self, name: &str) -> Result<&dyn DynTable, SimError> {
        self.tables()
            .into_iter()
            .find(|t| t.category() == name)
            .ok_or_else(|| SimError::UnknownCategory(name.to_string()))
    }

    /// Names of every category, in table order.
    pub fn categories(&self) -> Vec<&'static str> {
        self.tables().iter().map(|t| t.category()).collect()
    }

    /// Reset every slot of every table.
    pub fn reset_all(&self) {
        for table in self.tables() {
            table.reset_all();
        }
        info!("All device tables reset");
    }

    /// Current values of every table.
    pub fn snapshot(&self) -> ContextSnapshot {
        ContextSnapshot {
            notify: self.policy,
            tables: self.tables().iter().map(|t| t.snapshot()).collect(),
        }
    }
}

impl std::fmt::Debug for SimContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimContext")
            .field("policy", &self.policy)
            .field("categories", &self.categories())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::accelerometer;
    use halsim_common::config::ConfigLoader;
    use halsim_common::consts::NUM_DIGITAL_CHANNELS;

    #[test]
    fn test_default_capacities() {
        let ctx = SimContext::new(&SimConfig::default()).unwrap();
        assert_eq!(ctx.dio().capacity(), NUM_DIGITAL_CHANNELS);
        assert_eq!(ctx.table("driver_station").unwrap().capacity(), 1);
        assert!(ctx.driver_station().slot(0).is_ok());
        assert_eq!(ctx.categories().len(), 14);
        assert_eq!(ctx.policy(), NotifyPolicy::Always);
    }

    #[test]
    fn test_capacities_from_config() {
        let config = SimConfig::from_toml(
            r#"
            [registry]
            notify = "on_change"

            [capacities]
            accelerometer = 4
            "#,
        )
        .unwrap();
        let ctx = SimContext::new(&config).unwrap();
        assert_eq!(ctx.accelerometer().capacity(), 4);
        assert_eq!(ctx.policy(), NotifyPolicy::OnChange);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = SimConfig::default();
        config.capacities.spi = 0;
        assert!(matches!(SimContext::new(&config), Err(SimError::Config(_))));
    }

    #[test]
    fn test_table_by_name() {
        let ctx = SimContext::new(&SimConfig::default()).unwrap();
        for name in ctx.categories() {
            assert_eq!(ctx.table(name).unwrap().category(), name);
        }
        assert!(matches!(
            ctx.table("pwm"),
            Err(SimError::UnknownCategory(name)) if name == "pwm"
        ));
    }

    #[test]
    fn test_reset_all_and_snapshot() {
        let ctx = SimContext::new(&SimConfig::default()).unwrap();
        ctx.accelerometer()
            .slot(0)
            .unwrap()
            .set(accelerometer::X, 1.5)
            .unwrap();

        let snap = ctx.snapshot();
        assert_eq!(snap.tables.len(), 14);
        assert_eq!(snap.tables[0].category, "accelerometer");

        ctx.reset_all();
        assert_eq!(ctx.accelerometer().slot(0).unwrap().get(accelerometer::X), 0.0);
    }

    #[test]
    fn test_context_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SimContext>();
    }
}

//! TOML scenarios for driving a [`SimContext`] from the harness.
//!
//! # TOML Example
//!
//! ```toml
//! name = "accelerometer bump"
//!
//! [[watch]]
//! category = "accelerometer"
//! slot = 0
//!
//! [[step]]
//! action = "set"
//! category = "accelerometer"
//! slot = 0
//! property = "x"
//! value = 9.8
//!
//! [[step]]
//! action = "expect"
//! category = "accelerometer"
//! slot = 0
//! property = "x"
//! value = 9.8
//!
//! [[step]]
//! action = "reset_all"
//! ```
//!
//! Scenarios load through [`ConfigLoader`](halsim_common::config::ConfigLoader)
//! like any other TOML document.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};

use crate::callback::notify_fn;
use crate::context::SimContext;
use crate::error::SimError;
use crate::value::{Value, ValueKind};

/// A scalar as written in TOML, before it is matched to a property kind.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// `true` / `false`
    Bool(bool),
    /// Integer literal.
    Integer(i64),
    /// Float literal.
    Float(f64),
}

impl RawValue {
    /// Convert to a [`Value`] of `kind`.
    ///
    /// Integers widen to doubles; an integer outside `i32` is rejected for
    /// `Int` and `Enum` properties.
    pub fn to_value(self, kind: ValueKind) -> Option<Value> {
        match (kind, self) {
            (ValueKind::Boolean, Self::Bool(v)) => Some(Value::Boolean(v)),
            (ValueKind::Int, Self::Integer(v)) => i32::try_from(v).ok().map(Value::Int),
            (ValueKind::Enum, Self::Integer(v)) => i32::try_from(v).ok().map(Value::Enum),
            (ValueKind::Long, Self::Integer(v)) => Some(Value::Long(v)),
            (ValueKind::Double, Self::Float(v)) => Some(Value::Double(v)),
            (ValueKind::Double, Self::Integer(v)) => Some(Value::Double(v as f64)),
            _ => None,
        }
    }
}

/// Slot to observe while the scenario runs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchTarget {
    /// Category name.
    pub category: String,
    /// Slot index.
    pub slot: usize,
}

/// One scenario step.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Write a scalar property (`name`, or `name[ch]` for channelized
    /// properties).
    Set {
        /// Category name.
        category: String,
        /// Slot index.
        slot: usize,
        /// Property name.
        property: String,
        /// New value.
        value: RawValue,
    },
    /// Write a byte buffer.
    SetBuffer {
        /// Category name.
        category: String,
        /// Slot index.
        slot: usize,
        /// Buffer name.
        buffer: String,
        /// New contents.
        bytes: Vec<u8>,
    },
    /// Fail the scenario unless a property holds `value`.
    Expect {
        /// Category name.
        category: String,
        /// Slot index.
        slot: usize,
        /// Property name.
        property: String,
        /// Expected value.
        value: RawValue,
    },
    /// Reset one slot.
    Reset {
        /// Category name.
        category: String,
        /// Slot index.
        slot: usize,
    },
    /// Reset every table.
    ResetAll,
}

/// A named sequence of steps.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Name used in logs and the report.
    #[serde(default)]
    pub name: Option<String>,
    /// Slots whose every change is logged.
    #[serde(default)]
    pub watch: Vec<WatchTarget>,
    /// Steps, applied in order.
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

/// Outcome of a scenario run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioReport {
    /// Scenario name, if any.
    pub name: Option<String>,
    /// Steps applied.
    pub steps: usize,
    /// Notifications seen by watch subscriptions.
    pub notifications: usize,
}

impl Scenario {
    /// Attach watches, then apply every step against `ctx`.
    ///
    /// Stops at the first failing step. Watch subscriptions stay attached
    /// until the watched slot is reset.
    ///
    /// # Errors
    ///
    /// - `SimError::Scenario` for values that do not fit the property or a
    ///   failed `expect`
    /// - any registry error raised by a step
    pub fn run(&self, ctx: &SimContext) -> Result<ScenarioReport, SimError> {
        let seen = Arc::new(AtomicUsize::new(0));

        for target in &self.watch {
            let table = ctx.table(&target.category)?;
            let category = table.category();
            let slot = target.slot;
            let counter = Arc::clone(&seen);
            table.register_all(
                slot,
                notify_fn(move |property, value| {
                    counter.fetch_add(1, Ordering::Relaxed);
                    info!(category, slot, property, %value, "watch");
                    Ok(())
                }),
                false,
            )?;
            debug!(category, slot, "Watch attached");
        }

        for (n, step) in self.steps.iter().enumerate() {
            debug!(index = n, ?step, "Applying scenario step");
            apply(ctx, step).map_err(|e| match e {
                SimError::Scenario(msg) => SimError::Scenario(format!("step {n}: {msg}")),
                other => other,
            })?;
        }

        let report = ScenarioReport {
            name: self.name.clone(),
            steps: self.steps.len(),
            notifications: seen.load(Ordering::Relaxed),
        };
        info!(
            name = report.name.as_deref().unwrap_or("<unnamed>"),
            steps = report.steps,
            notifications = report.notifications,
            "Scenario complete"
        );
        Ok(report)
    }
}

fn apply(ctx: &SimContext, step: &Step) -> Result<(), SimError> {
    match step {
        Step::Set {
            category,
            slot,
            property,
            value,
        } => {
            let cell = ctx.table(category)?.property(*slot, property)?;
            let value = coerce(cell.name(), cell.kind(), *value)?;
            cell.set_value(value)
        }
        Step::SetBuffer {
            category,
            slot,
            buffer,
            bytes,
        } => ctx.table(category)?.buffer(*slot, buffer)?.set(bytes),
        Step::Expect {
            category,
            slot,
            property,
            value,
        } => {
            let cell = ctx.table(category)?.property(*slot, property)?;
            let expected = coerce(cell.name(), cell.kind(), *value)?;
            let actual = cell.get();
            if actual == expected {
                Ok(())
            } else {
                Err(SimError::Scenario(format!(
                    "{category}[{slot}].{property}: expected {expected}, found {actual}"
                )))
            }
        }
        Step::Reset { category, slot } => ctx.table(category)?.reset_slot(*slot),
        Step::ResetAll => {
            ctx.reset_all();
            Ok(())
        }
    }
}

fn coerce(property: &str, kind: ValueKind, raw: RawValue) -> Result<Value, SimError> {
    raw.to_value(kind).ok_or_else(|| {
        SimError::Scenario(format!("value {raw:?} does not fit {kind} property '{property}'"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::{accelerometer, addressable_led, ctre_pcm, joystick};
    use halsim_common::config::{ConfigLoader, SimConfig};

    fn ctx() -> SimContext {
        SimContext::new(&SimConfig::default()).unwrap()
    }

    #[test]
    fn test_raw_value_coercion() {
        assert_eq!(
            RawValue::Integer(3).to_value(ValueKind::Double),
            Some(Value::Double(3.0))
        );
        assert_eq!(
            RawValue::Integer(3).to_value(ValueKind::Enum),
            Some(Value::Enum(3))
        );
        assert_eq!(RawValue::Integer(i64::MAX).to_value(ValueKind::Int), None);
        assert_eq!(RawValue::Float(1.5).to_value(ValueKind::Int), None);
        assert_eq!(RawValue::Bool(true).to_value(ValueKind::Double), None);
    }

    #[test]
    fn test_parse_and_run() {
        let scenario = Scenario::from_toml(
            r#"
            name = "bump"

            [[watch]]
            category = "accelerometer"
            slot = 0

            [[step]]
            action = "set"
            category = "accelerometer"
            slot = 0
            property = "x"
            value = 9.8

            [[step]]
            action = "set"
            category = "joystick"
            slot = 1
            property = "axes[3]"
            value = 1

            [[step]]
            action = "set_buffer"
            category = "addressable_led"
            slot = 0
            buffer = "data"
            bytes = [1, 2, 3, 4]

            [[step]]
            action = "expect"
            category = "accelerometer"
            slot = 0
            property = "x"
            value = 9.8
            "#,
        )
        .unwrap();

        let ctx = ctx();
        let report = scenario.run(&ctx).unwrap();
        assert_eq!(report.name.as_deref(), Some("bump"));
        assert_eq!(report.steps, 4);
        assert_eq!(report.notifications, 1);

        let accel = ctx.accelerometer().slot(0).unwrap();
        assert_eq!(accel.get(accelerometer::X), 9.8);
        let stick = ctx.joystick().slot(1).unwrap();
        assert_eq!(stick.get_channel(joystick::AXES, 3).unwrap(), 1.0);
        let led = ctx.addressable_led().slot(0).unwrap();
        assert_eq!(led.data(addressable_led::DATA).get(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_failed_expect_names_step() {
        let scenario = Scenario::from_toml(
            r#"
            [[step]]
            action = "expect"
            category = "dio"
            slot = 0
            property = "value"
            value = false
            "#,
        )
        .unwrap();
        let err = scenario.run(&ctx()).unwrap_err();
        assert!(matches!(err, SimError::Scenario(ref msg) if msg.starts_with("step 0")));
    }

    #[test]
    fn test_reset_steps() {
        let scenario = Scenario::from_toml(
            r#"
            [[step]]
            action = "set"
            category = "dio"
            slot = 2
            property = "filter_index"
            value = 1

            [[step]]
            action = "reset"
            category = "dio"
            slot = 2

            [[step]]
            action = "expect"
            category = "dio"
            slot = 2
            property = "filter_index"
            value = -1

            [[step]]
            action = "reset_all"
            "#,
        )
        .unwrap();
        assert_eq!(scenario.run(&ctx()).unwrap().steps, 4);
    }

    #[test]
    fn test_registry_errors_pass_through() {
        let bad_category = Scenario {
            steps: vec![Step::Reset {
                category: "pwm".into(),
                slot: 0,
            }],
            ..Scenario::default()
        };
        assert!(matches!(
            bad_category.run(&ctx()),
            Err(SimError::UnknownCategory(_))
        ));

        let bad_kind = Scenario {
            steps: vec![Step::Set {
                category: "dio".into(),
                slot: 0,
                property: "value".into(),
                value: RawValue::Float(0.5),
            }],
            ..Scenario::default()
        };
        assert!(matches!(bad_kind.run(&ctx()), Err(SimError::Scenario(_))));

        let bare_channel = Scenario {
            steps: vec![Step::Set {
                category: "ctre_pcm".into(),
                slot: 0,
                property: "solenoid_output".into(),
                value: RawValue::Bool(true),
            }],
            ..Scenario::default()
        };
        let ctx = ctx();
        assert!(matches!(
            bare_channel.run(&ctx),
            Err(SimError::MissingChannel {
                property: "solenoid_output",
                ..
            })
        ));
        let pcm = ctx.ctre_pcm().slot(0).unwrap();
        assert!(!pcm.get_channel(ctre_pcm::SOLENOID_OUTPUT, 0).unwrap());

        let bad_slot = Scenario {
            watch: vec![WatchTarget {
                category: "spi".into(),
                slot: 99,
            }],
            ..Scenario::default()
        };
        assert!(matches!(
            bad_slot.run(&self::ctx()),
            Err(SimError::IndexOutOfRange { .. })
        ));
    }
}

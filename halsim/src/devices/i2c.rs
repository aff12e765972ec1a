//! I2C ports.
//!
//! Bus traffic goes through the `data` buffer: a transaction written by
//! device code reaches write subscribers, and a read lets read subscribers
//! fill in the bytes the device returns.

use halsim_common::consts::BUS_BUFFER_MAX_LEN;

use crate::slot::{BufferProp, BufferSpec, DeviceCategory, Prop, PropertySpec};
use crate::value::Value;

/// I2C port category.
#[derive(Debug, Clone, Copy)]
pub struct I2c;

impl DeviceCategory for I2c {
    const NAME: &'static str = "i2c";
    const PROPERTIES: &'static [PropertySpec] =
        &[PropertySpec::scalar("initialized", Value::Boolean(false))];
    const BUFFERS: &'static [BufferSpec] = &[BufferSpec {
        name: "data",
        max_len: BUS_BUFFER_MAX_LEN,
    }];
}

/// Port initialized.
pub const INITIALIZED: Prop<I2c, bool> = Prop::new(0);
/// Transaction data.
pub const DATA: BufferProp<I2c> = BufferProp::new(0);

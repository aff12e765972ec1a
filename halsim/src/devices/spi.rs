//! SPI ports.
//!
//! Same buffer semantics as [`super::i2c`]. A full-duplex transaction is a
//! write of the outgoing bytes followed by a read of the same length.

use halsim_common::consts::BUS_BUFFER_MAX_LEN;

use crate::slot::{BufferProp, BufferSpec, DeviceCategory, Prop, PropertySpec};
use crate::value::Value;

/// SPI port category.
#[derive(Debug, Clone, Copy)]
pub struct Spi;

impl DeviceCategory for Spi {
    const NAME: &'static str = "spi";
    const PROPERTIES: &'static [PropertySpec] =
        &[PropertySpec::scalar("initialized", Value::Boolean(false))];
    const BUFFERS: &'static [BufferSpec] = &[BufferSpec {
        name: "data",
        max_len: BUS_BUFFER_MAX_LEN,
    }];
}

/// Port initialized.
pub const INITIALIZED: Prop<Spi, bool> = Prop::new(0);
/// Transaction data.
pub const DATA: BufferProp<Spi> = BufferProp::new(0);

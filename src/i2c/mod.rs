// Licensed under the Apache-2.0 license

//! COLDATA I2C driver module.
//!
//! Each FEMB carries two COLDATA chips, and each COLDATA fronts an I2C bus
//! implemented in WIB firmware as a single-register AXI block: software
//! packs a whole transaction (chip address, register page, register
//! address, data, direction) into one 32-bit control word, writes it to the
//! START register, and polls the same register until the firmware reports
//! the acknowledge bit for every phase of the transaction.
//!
//! [`common`] holds the control-word codec and protocol constants;
//! [`engine`] drives the transaction protocol itself.

pub mod common;
pub mod engine;

pub use common::{ControlWord, I2cError, I2C_POLL_BUDGET, I2C_SETTLE_TIME};
pub use engine::ColdataI2c;

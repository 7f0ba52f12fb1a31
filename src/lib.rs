// Licensed under the Apache-2.0 license

//! Driver kit for the FEMB front-end modules of a WIB DAQ board.
//!
//! The board exposes two kinds of firmware blocks as memory-mapped 32-bit
//! registers: one COLDATA I2C controller per front-end bus, used to
//! configure the COLDATA / COLDADC / LArASIC chip set, and a single
//! fast-command block shared by every module for board-wide timing, reset,
//! and action pulses. [`femb::Femb`] ties both together for one module
//! slot; the register seam ([`ioreg::RegisterIo`]) and the delay seam
//! (`embedded_hal::delay::DelayNs`) keep all of it testable off-board.

// Prevent panic-prone patterns in production code only
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::indexing_slicing))]
#![cfg_attr(not(test), warn(clippy::expect_used))]
#![cfg_attr(not(test), no_std)]

pub mod coldata;
pub mod common;
pub mod fast_cmd;
pub mod femb;
pub mod i2c;
pub mod ioreg;
pub mod larasic;

#[cfg(test)]
pub(crate) mod testutil;

pub use coldata::FrameType;
pub use fast_cmd::{FastAct, FastCmdDispatcher, FastCmdError, FastCmdFlags};
pub use femb::Femb;
pub use i2c::{ColdataI2c, I2cError};
pub use ioreg::{Mmio, RegisterIo};
pub use larasic::LarasicConfig;

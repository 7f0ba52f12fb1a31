// Licensed under the Apache-2.0 license

//! Control-word codec and protocol constants for the COLDATA I2C block.
//!
//! The firmware exposes the whole bus as one 32-bit register: a transaction
//! is issued by writing a packed [`ControlWord`] to [`REG_I2C_START`] and
//! completes when the hardware sets all three acknowledge bits in the same
//! word. The bit layout below is the binding wire contract with the
//! firmware; changing an offset or width corrupts every command the chips
//! receive.

use bitfield_struct::bitfield;
use fugit::MicrosDurationU32;

/// Word offset of the transaction START register in the I2C block.
pub const REG_I2C_START: usize = 0;
/// Word offset of the controller CTRL register in the I2C block.
pub const REG_I2C_CTRL: usize = 1;

/// Minimum settle time between COLDATA I2C transaction phases.
///
/// The firmware needs this long before the acknowledge bits are
/// meaningful, and the bus needs it between back-to-back transactions.
pub const I2C_SETTLE_TIME: MicrosDurationU32 = MicrosDurationU32::from_ticks(27);

/// How many times the engine re-reads the START register waiting for the
/// acknowledge bits before declaring the transaction failed.
pub const I2C_POLL_BUDGET: u32 = 8;

/// One COLDATA I2C transaction, packed the way the firmware expects it.
///
/// The three `ack_*` bits are hardware outputs reporting that the address,
/// register, and data phases completed; the engine clears them before
/// issuing a word and callers never set them.
#[bitfield(u32)]
#[derive(PartialEq, Eq)]
pub struct ControlWord {
    /// Data phase acknowledged (hardware-set).
    pub ack_data: bool,
    /// Data byte: the value to write, or the value read back.
    #[bits(8)]
    pub data: u8,
    /// Register phase acknowledged (hardware-set).
    pub ack_reg: bool,
    /// Register address within the selected page.
    #[bits(8)]
    pub reg_addr: u8,
    /// Address phase acknowledged (hardware-set).
    pub ack_addr: bool,
    /// Direction: `true` reads the register, `false` writes it.
    pub read: bool,
    /// Register page within the chip.
    #[bits(3)]
    pub reg_page: u8,
    /// I2C chip address on this bus.
    #[bits(4)]
    pub chip_addr: u8,
    #[bits(5)]
    __: u8,
}

impl ControlWord {
    /// All three phases acknowledged.
    #[must_use]
    pub const fn acked(&self) -> bool {
        self.ack_addr() && self.ack_reg() && self.ack_data()
    }

    /// Same word with every acknowledge bit cleared, ready to issue.
    #[must_use]
    pub const fn clear_acks(self) -> Self {
        self.with_ack_addr(false)
            .with_ack_reg(false)
            .with_ack_data(false)
    }
}

/// What went wrong with a COLDATA I2C access.
///
/// Every failure is recoverable; retry policy belongs to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum I2cError {
    /// The acknowledge bits never all came back within the poll budget.
    Nak,
    /// A write-then-read round trip disagreed: either a transient bus error
    /// or a chip that silently refused the value.
    VerifyMismatch {
        /// Byte handed to the write phase.
        wrote: u8,
        /// Byte the chip returned.
        read: u8,
    },
    /// Bus index outside the two COLDATA buses on a FEMB.
    InvalidBus(u8),
}

impl core::fmt::Display for I2cError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Nak => write!(f, "transaction not acknowledged within poll budget"),
            Self::VerifyMismatch { wrote, read } => {
                write!(f, "verify mismatch: wrote {wrote:#04x}, read {read:#04x}")
            }
            Self::InvalidBus(bus) => write!(f, "no COLDATA I2C bus {bus}"),
        }
    }
}

impl embedded_hal::i2c::Error for I2cError {
    fn kind(&self) -> embedded_hal::i2c::ErrorKind {
        use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};
        match self {
            Self::Nak => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Unknown),
            Self::VerifyMismatch { .. } | Self::InvalidBus(_) => ErrorKind::Other,
        }
    }
}

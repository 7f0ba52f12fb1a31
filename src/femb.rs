// Licensed under the Apache-2.0 license

//! FEMB device model.
//!
//! A [`Femb`] stands for one of the four front-end module slots on the
//! board. It owns the transaction engine for each of its two COLDATA I2C
//! buses (bus 0: bottom COLDATA and ADCs, bus 1: top) together with their
//! latched-chip-address state, and holds an injected handle on the shared
//! fast-command block.
//!
//! Configuration sequences stop at the first failed write-verify and do not
//! roll back: a failed sequence can leave the chips in a mixed state, and
//! the caller decides whether to retry the whole sequence.

use embedded_hal::delay::DelayNs;

use crate::coldata::{
    FrameType, COLDADC_CHIPS, COLDADC_NORMAL_OPERATION, COLDATA_CHIP, LARASIC_CHANNELS,
    MODE_COLD, MODE_WARM, PAGE_CONFIG, PAGE_LARASIC, REG_FRAME_MODE, REG_LARASIC_CHAN_BASE,
    REG_LARASIC_GLOBAL1, REG_LARASIC_GLOBAL2, REG_OPERATING_MODE, REG_SPI_STATUS,
    SPI_STATUS_PROGRAMMED,
};
use crate::common::{Logger, NoOpLogger};
use crate::fast_cmd::{FastAct, FastCmdDispatcher, FastCmdError, FastCmdFlags};
use crate::i2c::{ColdataI2c, I2cError};
use crate::ioreg::RegisterIo;
use crate::larasic::LarasicConfig;

/// FEMB slots per board.
pub const NUM_FEMBS: usize = 4;
/// COLDATA I2C buses per FEMB.
pub const NUM_I2C_BUSES: usize = 2;

/// One front-end module slot.
pub struct Femb<R, D, L = NoOpLogger> {
    index: u8,
    buses: [ColdataI2c<R, D, L>; NUM_I2C_BUSES],
    fast: FastCmdDispatcher<R>,
}

impl<R: RegisterIo, D: DelayNs + Clone> Femb<R, D> {
    /// Build the model for slot `index` (0-3).
    ///
    /// `bus0`/`bus1` are the register blocks of this slot's two COLDATA I2C
    /// controllers; `fast` is a handle on the board-wide fast-command block,
    /// typically shared between all four slots. Returns `None` for an
    /// out-of-range slot index.
    #[must_use]
    pub fn new(index: u8, bus0: R, bus1: R, fast: R, delay: D) -> Option<Self> {
        if usize::from(index) >= NUM_FEMBS {
            return None;
        }
        Some(Self {
            index,
            buses: [
                ColdataI2c::new(bus0, delay.clone()),
                ColdataI2c::new(bus1, delay),
            ],
            fast: FastCmdDispatcher::new(fast),
        })
    }
}

impl<R: RegisterIo, D: DelayNs, L: Logger> Femb<R, D, L> {
    /// Slot index on the board.
    #[must_use]
    pub fn index(&self) -> u8 {
        self.index
    }

    fn bus(&mut self, bus_idx: u8) -> Result<&mut ColdataI2c<R, D, L>, I2cError> {
        self.buses
            .get_mut(usize::from(bus_idx))
            .ok_or(I2cError::InvalidBus(bus_idx))
    }

    /// Write a register of a chip on the given COLDATA bus of this FEMB.
    ///
    /// # Errors
    ///
    /// [`I2cError::InvalidBus`] or any transaction failure.
    pub fn i2c_write(
        &mut self,
        bus_idx: u8,
        chip_addr: u8,
        reg_page: u8,
        reg_addr: u8,
        data: u8,
    ) -> Result<(), I2cError> {
        self.bus(bus_idx)?.write(chip_addr, reg_page, reg_addr, data)
    }

    /// Read a register of a chip on the given COLDATA bus of this FEMB.
    ///
    /// # Errors
    ///
    /// [`I2cError::InvalidBus`] or any transaction failure.
    pub fn i2c_read(
        &mut self,
        bus_idx: u8,
        chip_addr: u8,
        reg_page: u8,
        reg_addr: u8,
    ) -> Result<u8, I2cError> {
        self.bus(bus_idx)?.read(chip_addr, reg_page, reg_addr)
    }

    /// Write a chip register and confirm it reads back the same.
    ///
    /// # Errors
    ///
    /// [`I2cError::InvalidBus`], a transaction failure, or
    /// [`I2cError::VerifyMismatch`].
    pub fn i2c_write_verify(
        &mut self,
        bus_idx: u8,
        chip_addr: u8,
        reg_page: u8,
        reg_addr: u8,
        data: u8,
    ) -> Result<(), I2cError> {
        self.bus(bus_idx)?
            .write_verify(chip_addr, reg_page, reg_addr, data)
    }

    /// Set operating mode (warm/cold) and output framing on both COLDATA
    /// chips.
    ///
    /// # Errors
    ///
    /// Returns the first failing write-verify; earlier writes stay applied.
    pub fn configure_coldata(&mut self, cold: bool, frame: FrameType) -> Result<(), I2cError> {
        let mode = if cold { MODE_COLD } else { MODE_WARM };
        for (bus, chip) in self.buses.iter_mut().zip(COLDATA_CHIP) {
            bus.write_verify(chip, PAGE_CONFIG, REG_OPERATING_MODE, mode)?;
            bus.write_verify(chip, PAGE_CONFIG, REG_FRAME_MODE, frame.code())?;
        }
        Ok(())
    }

    /// Bring every COLDADC on both buses into normal sampling operation.
    ///
    /// # Errors
    ///
    /// Aborts at the first sub-chip that fails a write-verify; the
    /// remaining sub-chips are not touched. A broken ADC must surface, not
    /// be skipped over.
    pub fn configure_coldadc(&mut self) -> Result<(), I2cError> {
        for (bus, chips) in self.buses.iter_mut().zip(COLDADC_CHIPS) {
            for chip in chips {
                for &(page, reg, value) in COLDADC_NORMAL_OPERATION {
                    bus.write_verify(chip, page, reg, value)?;
                }
            }
        }
        Ok(())
    }

    /// Stage a LArASIC register image on both COLDATA chips.
    ///
    /// The channel byte is written to all 16 channel slots (the record
    /// applies one value to every channel; per-channel divergence is
    /// unimplemented), then the two global bytes. The staged image reaches
    /// the amplifiers when a [`FastAct::ProgramLarasic`] action executes.
    ///
    /// # Errors
    ///
    /// Returns the first failing write-verify; earlier writes stay applied.
    pub fn configure_larasic(&mut self, conf: &LarasicConfig) -> Result<(), I2cError> {
        let chan = conf.channel_reg();
        let global1 = conf.global_reg1();
        let global2 = conf.global_reg2();
        for (bus, chip) in self.buses.iter_mut().zip(COLDATA_CHIP) {
            for slot in 0..LARASIC_CHANNELS {
                bus.write_verify(chip, PAGE_LARASIC, REG_LARASIC_CHAN_BASE + slot, chan)?;
            }
            bus.write_verify(chip, PAGE_LARASIC, REG_LARASIC_GLOBAL1, global1)?;
            bus.write_verify(chip, PAGE_LARASIC, REG_LARASIC_GLOBAL2, global2)?;
        }
        Ok(())
    }

    /// Read back the saved LArASIC SPI programming status from both COLDATA
    /// chips; `true` when both report a completed programming pass.
    ///
    /// Only meaningful after a [`FastAct::SaveStatus`] action has executed;
    /// calling it earlier returns whatever stale byte the register holds.
    ///
    /// # Errors
    ///
    /// Any transaction failure while reading the status registers.
    pub fn read_spi_status(&mut self) -> Result<bool, I2cError> {
        let mut programmed = true;
        for (bus, chip) in self.buses.iter_mut().zip(COLDATA_CHIP) {
            let status = bus.read(chip, PAGE_CONFIG, REG_SPI_STATUS)?;
            programmed &= status == SPI_STATUS_PROGRAMMED;
        }
        Ok(programmed)
    }

    /// Arm the action a subsequent ACT-flagged fast command will perform.
    ///
    /// # Errors
    ///
    /// [`FastCmdError::ActReadback`] if the shared register does not hold
    /// the sub-command after the write.
    pub fn set_fast_act(&mut self, act: FastAct) -> Result<(), FastCmdError> {
        self.fast.set_act(act)
    }

    /// Broadcast a fast command through the shared block.
    ///
    /// This reaches every FEMB on the board, not just this one.
    pub fn fast_cmd(&mut self, code: FastCmdFlags) {
        self.fast.send(code);
    }
}

// Licensed under the Apache-2.0 license

//! COLDATA I2C transaction engine.
//!
//! One engine instance drives one bus: it packs transactions into the
//! firmware control word, issues them through the START register, and polls
//! for the three per-phase acknowledge bits with the mandatory settle time
//! between polls.
//!
//! The engine also carries the chip-address latching workaround. The
//! firmware only latches a new chip address reliably when a prior
//! transaction was already addressed to that chip, so on every change of
//! target the engine first issues one discarded read to the new address and
//! only then the caller's transaction. Callers see nothing of this but the
//! extra settle time.

use embedded_hal::delay::DelayNs;

use crate::common::{Logger, NoOpLogger};
use crate::i2c::common::{
    ControlWord, I2cError, I2C_POLL_BUDGET, I2C_SETTLE_TIME, REG_I2C_START,
};
use crate::ioreg::RegisterIo;

/// Transaction engine for one COLDATA I2C bus.
///
/// `R` is the register block of this bus's firmware controller, `D` the
/// delay provider used to honor the settle time, `L` the diagnostics sink.
pub struct ColdataI2c<R, D, L = NoOpLogger> {
    regs: R,
    delay: D,
    logger: L,
    last_chip: Option<u8>,
}

impl<R: RegisterIo, D: DelayNs> ColdataI2c<R, D> {
    #[must_use]
    pub fn new(regs: R, delay: D) -> Self {
        Self::with_logger(regs, delay, NoOpLogger)
    }
}

impl<R: RegisterIo, D: DelayNs, L: Logger> ColdataI2c<R, D, L> {
    #[must_use]
    pub fn with_logger(regs: R, delay: D, logger: L) -> Self {
        Self {
            regs,
            delay,
            logger,
            last_chip: None,
        }
    }

    /// Chip address the bus hardware currently has latched, if any.
    #[must_use]
    pub fn last_chip(&self) -> Option<u8> {
        self.last_chip
    }

    /// Write `data` to a chip register.
    ///
    /// # Errors
    ///
    /// [`I2cError::Nak`] if any transaction phase goes unacknowledged
    /// within the poll budget.
    pub fn write(
        &mut self,
        chip_addr: u8,
        reg_page: u8,
        reg_addr: u8,
        data: u8,
    ) -> Result<(), I2cError> {
        self.latch_chip(chip_addr, reg_page, reg_addr);
        let word = Self::pack(chip_addr, reg_page, reg_addr).with_data(data);
        match self.issue(word) {
            Ok(_) => Ok(()),
            Err(e) => {
                self.logger.log(format_args!(
                    "i2c write failed: chip {chip_addr:#x} page {reg_page} reg {reg_addr:#04x}"
                ));
                Err(e)
            }
        }
    }

    /// Read a chip register.
    ///
    /// # Errors
    ///
    /// [`I2cError::Nak`] if any transaction phase goes unacknowledged
    /// within the poll budget.
    pub fn read(&mut self, chip_addr: u8, reg_page: u8, reg_addr: u8) -> Result<u8, I2cError> {
        self.latch_chip(chip_addr, reg_page, reg_addr);
        let word = Self::pack(chip_addr, reg_page, reg_addr).with_read(true);
        match self.issue(word) {
            Ok(back) => Ok(back.data()),
            Err(e) => {
                self.logger.log(format_args!(
                    "i2c read failed: chip {chip_addr:#x} page {reg_page} reg {reg_addr:#04x}"
                ));
                Err(e)
            }
        }
    }

    /// Write a chip register and read it back.
    ///
    /// The acknowledge bits alone do not prove the chip stored the value;
    /// this is the only operation that catches a silently-failed write.
    ///
    /// # Errors
    ///
    /// [`I2cError::Nak`] if either transaction fails,
    /// [`I2cError::VerifyMismatch`] if the read-back byte differs.
    pub fn write_verify(
        &mut self,
        chip_addr: u8,
        reg_page: u8,
        reg_addr: u8,
        data: u8,
    ) -> Result<(), I2cError> {
        self.write(chip_addr, reg_page, reg_addr, data)?;
        let read = self.read(chip_addr, reg_page, reg_addr)?;
        if read == data {
            Ok(())
        } else {
            self.logger.log(format_args!(
                "i2c verify mismatch: chip {chip_addr:#x} reg {reg_addr:#04x} wrote {data:#04x} read {read:#04x}"
            ));
            Err(I2cError::VerifyMismatch { wrote: data, read })
        }
    }

    fn pack(chip_addr: u8, reg_page: u8, reg_addr: u8) -> ControlWord {
        // Field widths are narrower than the argument types; mask rather
        // than let the setters reject out-of-range values.
        ControlWord::new()
            .with_chip_addr(chip_addr & 0x0F)
            .with_reg_page(reg_page & 0x07)
            .with_reg_addr(reg_addr)
    }

    /// Prime the bus before the first transaction to a new chip address.
    ///
    /// The result of the priming read is deliberately discarded, and the
    /// latched address advances even if the priming transaction failed:
    /// the hardware latches the address either way.
    fn latch_chip(&mut self, chip_addr: u8, reg_page: u8, reg_addr: u8) {
        // Compare what the hardware will actually see on the wire.
        let chip = chip_addr & 0x0F;
        if self.last_chip == Some(chip) {
            return;
        }
        let word = Self::pack(chip, reg_page, reg_addr).with_read(true);
        let _ = self.issue(word);
        self.last_chip = Some(chip);
    }

    /// Drive one packed word through the START register and poll it to
    /// completion.
    fn issue(&mut self, word: ControlWord) -> Result<ControlWord, I2cError> {
        self.regs.write(REG_I2C_START, word.clear_acks().into_bits());
        let mut readback = ControlWord::new();
        let mut acked = false;
        for _ in 0..I2C_POLL_BUDGET {
            self.delay.delay_us(I2C_SETTLE_TIME.to_micros());
            readback = ControlWord::from_bits(self.regs.read(REG_I2C_START));
            if readback.acked() {
                acked = true;
                break;
            }
        }
        // Keep the next issue a settle interval away from this poll,
        // whether or not the transaction completed.
        self.delay.delay_us(I2C_SETTLE_TIME.to_micros());
        if acked {
            Ok(readback)
        } else {
            Err(I2cError::Nak)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{start_words, FakeColdataBus, FakeDelay};

    fn engine(bus: &FakeColdataBus) -> ColdataI2c<FakeColdataBus, FakeDelay> {
        ColdataI2c::new(bus.clone(), FakeDelay::default())
    }

    #[test]
    fn test_write_stores_value_in_fake_chip() {
        let bus = FakeColdataBus::default();
        let mut i2c = engine(&bus);
        assert_eq!(i2c.write(0x2, 0, 0x03, 0x5A), Ok(()));
        assert_eq!(bus.chip_memory(0x2, 0, 0x03), Some(0x5A));
    }

    #[test]
    fn test_first_access_issues_priming_read() {
        let bus = FakeColdataBus::default();
        let mut i2c = engine(&bus);
        i2c.write(0x2, 0, 0x03, 0x11).unwrap();

        let words = start_words(&bus);
        assert_eq!(words.len(), 2);
        assert!(words[0].read(), "priming transaction must be a read");
        assert_eq!(words[0].chip_addr(), 0x2);
        assert!(!words[1].read());
        assert_eq!(words[1].data(), 0x11);
        assert_eq!(i2c.last_chip(), Some(0x2));
    }

    #[test]
    fn test_same_chip_issues_single_transaction() {
        let bus = FakeColdataBus::default();
        let mut i2c = engine(&bus);
        i2c.write(0x2, 0, 0x03, 0x11).unwrap();
        let before = start_words(&bus).len();
        i2c.write(0x2, 1, 0x40, 0x22).unwrap();
        assert_eq!(start_words(&bus).len(), before + 1);
    }

    #[test]
    fn test_chip_change_issues_priming_read_again() {
        let bus = FakeColdataBus::default();
        let mut i2c = engine(&bus);
        i2c.write(0x2, 0, 0x03, 0x11).unwrap();
        let before = start_words(&bus).len();
        i2c.write(0x4, 0, 0x03, 0x22).unwrap();
        assert_eq!(start_words(&bus).len(), before + 2);
        assert_eq!(i2c.last_chip(), Some(0x4));
    }

    #[test]
    fn test_issued_words_never_carry_ack_bits() {
        let bus = FakeColdataBus::default();
        let mut i2c = engine(&bus);
        i2c.write(0x2, 0, 0x03, 0xFF).unwrap();
        for word in start_words(&bus) {
            assert!(!word.ack_addr() && !word.ack_reg() && !word.ack_data());
        }
    }

    #[test]
    fn test_read_returns_stored_value() {
        let bus = FakeColdataBus::default();
        bus.preload(0x3, 2, 0x80, 0xA5);
        let mut i2c = engine(&bus);
        assert_eq!(i2c.read(0x3, 2, 0x80), Ok(0xA5));
    }

    #[test]
    fn test_nak_after_poll_budget() {
        let bus = FakeColdataBus::default();
        bus.nak_chip(0x2);
        let mut i2c = engine(&bus);
        assert_eq!(i2c.write(0x2, 0, 0x03, 0x11), Err(I2cError::Nak));
        // Priming read plus real transaction, each polled to exhaustion.
        assert_eq!(bus.start_read_count(), 2 * I2C_POLL_BUDGET as usize);
        // Failure still advances the latched address.
        assert_eq!(i2c.last_chip(), Some(0x2));
    }

    #[test]
    fn test_ack_on_later_attempt_still_succeeds() {
        let bus = FakeColdataBus::default();
        bus.set_ack_after(3);
        let mut i2c = engine(&bus);
        assert_eq!(i2c.write(0x2, 0, 0x03, 0x11), Ok(()));
    }

    #[test]
    fn test_never_acking_mid_budget_value_fails_cleanly() {
        let bus = FakeColdataBus::default();
        // Acks that would only appear on poll budget + 1 are a timeout.
        bus.set_ack_after(I2C_POLL_BUDGET);
        let mut i2c = engine(&bus);
        assert_eq!(i2c.read(0x2, 0, 0x03), Err(I2cError::Nak));
    }

    #[test]
    fn test_settle_delay_separates_transactions() {
        let bus = FakeColdataBus::default();
        let delay = FakeDelay::default();
        let mut i2c = ColdataI2c::new(bus.clone(), delay.clone());
        i2c.write(0x2, 0, 0x03, 0x11).unwrap();
        i2c.write(0x2, 0, 0x04, 0x22).unwrap();

        // Every issued transaction spends at least one settle interval
        // polling and one trailing settle interval.
        let issues = start_words(&bus).len() as u64;
        assert!(delay.elapsed_us() >= issues * 2 * u64::from(I2C_SETTLE_TIME.to_micros()));
    }

    #[test]
    fn test_write_verify_detects_stuck_register() {
        let bus = FakeColdataBus::default();
        bus.stick_writes_at(0x00);
        let mut i2c = engine(&bus);
        assert_eq!(
            i2c.write_verify(0x2, 0, 0x03, 0x5A),
            Err(I2cError::VerifyMismatch {
                wrote: 0x5A,
                read: 0x00
            })
        );
    }

    #[test]
    fn test_write_verify_round_trip() {
        let bus = FakeColdataBus::default();
        let mut i2c = engine(&bus);
        assert_eq!(i2c.write_verify(0x2, 1, 0x10, 0xC3), Ok(()));
        assert_eq!(i2c.read(0x2, 1, 0x10), Ok(0xC3));
    }

    #[test]
    fn test_field_masking_keeps_word_well_formed() {
        let bus = FakeColdataBus::default();
        let mut i2c = engine(&bus);
        // Chip and page wider than the hardware fields get masked, not
        // smeared into neighboring fields.
        i2c.write(0x12, 0x09, 0x03, 0x11).unwrap();
        let words = start_words(&bus);
        assert_eq!(words[1].chip_addr(), 0x2);
        assert_eq!(words[1].reg_page(), 0x1);
    }
}

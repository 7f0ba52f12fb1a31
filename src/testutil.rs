// Licensed under the Apache-2.0 license

//! Test doubles for the hardware seams.
//!
//! [`FakeColdataBus`] plays the part of one firmware register block plus the
//! chips behind it: writes to the START register are decoded as control
//! words and answered the way the hardware answers (register memory,
//! acknowledge bits, optional misbehavior), while every other register index
//! acts as plain scratch storage — which is all the fast-command block
//! needs. [`FakeDelay`] records time instead of sleeping.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;

use crate::i2c::common::{ControlWord, REG_I2C_START};
use crate::ioreg::RegisterIo;

#[derive(Default)]
struct BusState {
    /// Chip register memory keyed by (chip, page, reg).
    mem: HashMap<(u8, u8, u8), u8>,
    /// Raw storage for every register index other than START.
    scratch: HashMap<usize, u32>,
    /// Every register write, in order.
    write_log: Vec<(usize, u32)>,
    /// Reads of the START register (i.e. acknowledge polls).
    start_reads: usize,
    /// Chips that never acknowledge any phase.
    nak_chips: Vec<u8>,
    /// Polls to swallow before the acknowledge bits appear.
    ack_after: u32,
    /// When set, writes store this byte instead of the written one.
    stuck_data: Option<u8>,
    /// Word returned by START reads for the pending transaction.
    response: u32,
    polls_left: u32,
}

/// Cloneable handle on one fake register block; clones share state, so a
/// test can keep a handle after moving another into a driver.
#[derive(Clone, Default)]
pub(crate) struct FakeColdataBus(Rc<RefCell<BusState>>);

impl FakeColdataBus {
    /// Value currently held by a fake chip register.
    pub(crate) fn chip_memory(&self, chip: u8, page: u8, reg: u8) -> Option<u8> {
        self.0.borrow().mem.get(&(chip, page, reg)).copied()
    }

    /// Seed a fake chip register.
    pub(crate) fn preload(&self, chip: u8, page: u8, reg: u8, value: u8) {
        self.0.borrow_mut().mem.insert((chip, page, reg), value);
    }

    /// Raw value of a non-START register.
    pub(crate) fn scratch(&self, index: usize) -> u32 {
        self.0.borrow().scratch.get(&index).copied().unwrap_or(0)
    }

    /// All writes seen so far as (index, value).
    pub(crate) fn write_log(&self) -> Vec<(usize, u32)> {
        self.0.borrow().write_log.clone()
    }

    /// Number of acknowledge polls (START reads) seen so far.
    pub(crate) fn start_read_count(&self) -> usize {
        self.0.borrow().start_reads
    }

    /// Make a chip never acknowledge.
    pub(crate) fn nak_chip(&self, chip: u8) {
        self.0.borrow_mut().nak_chips.push(chip);
    }

    /// Withhold the acknowledge bits for the first `polls` reads of every
    /// transaction.
    pub(crate) fn set_ack_after(&self, polls: u32) {
        self.0.borrow_mut().ack_after = polls;
    }

    /// Corrupt all subsequent writes: the stored byte becomes `value`
    /// regardless of what was written. Transactions still acknowledge.
    pub(crate) fn stick_writes_at(&self, value: u8) {
        self.0.borrow_mut().stuck_data = Some(value);
    }
}

impl RegisterIo for FakeColdataBus {
    fn read(&mut self, index: usize) -> u32 {
        let mut s = self.0.borrow_mut();
        if index == REG_I2C_START {
            s.start_reads += 1;
            if s.polls_left > 0 {
                s.polls_left -= 1;
                // Transaction still in flight: acks not up yet.
                return ControlWord::from_bits(s.response).clear_acks().into_bits();
            }
            s.response
        } else {
            s.scratch.get(&index).copied().unwrap_or(0)
        }
    }

    fn write(&mut self, index: usize, value: u32) {
        let mut s = self.0.borrow_mut();
        s.write_log.push((index, value));
        if index != REG_I2C_START {
            let stored = match s.stuck_data {
                Some(stuck) => u32::from(stuck),
                None => value,
            };
            s.scratch.insert(index, stored);
            return;
        }

        let word = ControlWord::from_bits(value);
        let key = (word.chip_addr(), word.reg_page(), word.reg_addr());
        let mut response = word;
        if word.read() {
            response = response.with_data(s.mem.get(&key).copied().unwrap_or(0));
        } else {
            let stored = s.stuck_data.unwrap_or_else(|| word.data());
            s.mem.insert(key, stored);
        }
        if !s.nak_chips.contains(&word.chip_addr()) {
            response = response
                .with_ack_addr(true)
                .with_ack_reg(true)
                .with_ack_data(true);
        }
        s.response = response.into_bits();
        s.polls_left = s.ack_after;
    }
}

/// Decoded control words of every transaction issued on a fake bus.
pub(crate) fn start_words(bus: &FakeColdataBus) -> Vec<ControlWord> {
    bus.write_log()
        .into_iter()
        .filter(|&(index, _)| index == REG_I2C_START)
        .map(|(_, value)| ControlWord::from_bits(value))
        .collect()
}

/// Delay provider that accumulates requested time instead of sleeping.
#[derive(Clone, Default)]
pub(crate) struct FakeDelay(Rc<RefCell<u64>>);

impl FakeDelay {
    /// Total delay requested so far, in microseconds.
    pub(crate) fn elapsed_us(&self) -> u64 {
        *self.0.borrow() / 1_000
    }
}

impl DelayNs for FakeDelay {
    fn delay_ns(&mut self, ns: u32) {
        *self.0.borrow_mut() += u64::from(ns);
    }
}

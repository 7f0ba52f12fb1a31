// Licensed under the Apache-2.0 license

//! LArASIC amplifier configuration record.
//!
//! The LArASIC exposes two global registers plus one register per channel.
//! This record keeps the semantic fields and packs them into the raw
//! register bytes; the packing functions are pure so the byte layout can be
//! checked without hardware. One record configures a whole chip — the
//! channel fields are applied identically to all 16 channels. Per-channel
//! divergence is not supported by this contract.

/// Flat, value-only LArASIC configuration. `Default` is everything off and
/// all codes zero, which packs to all-zero register bytes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LarasicConfig {
    // Global register 1.
    /// Discriminator enable.
    pub sdd: bool,
    /// Discriminator polarity.
    pub sdc: bool,
    /// High-leakage mode.
    pub slkh: bool,
    /// 16x leakage current range.
    pub s16: bool,
    /// Test-pulse enable.
    pub stb: bool,
    /// Test-pulse monitor enable.
    pub stb1: bool,
    /// Leakage current select.
    pub slk: bool,

    // Global register 2.
    /// Pulser DAC trim value (6 bits).
    pub sdac: u8,
    /// DAC output switch 1.
    pub sdacsw1: bool,
    /// DAC output switch 2.
    pub sdacsw2: bool,

    // Channel registers (one value for every channel).
    /// Test-pulse select for the channel input.
    pub sts: bool,
    /// Baseline select (collection/induction polarity).
    pub snc: bool,
    /// Gain code (2 bits): 4.7, 7.8, 14, 25 mV/fC.
    pub gain: u8,
    /// Peaking-time code (2 bits): 0.5, 1, 2, 3 us.
    pub peak_time: u8,
    /// Monitor enable for the channel.
    pub smn: bool,
    /// High-pass filter mode.
    pub sdf: bool,
}

impl LarasicConfig {
    /// Packed global register 1 byte.
    #[must_use]
    pub const fn global_reg1(&self) -> u8 {
        (self.sdd as u8)
            | (self.sdc as u8) << 1
            | (self.slkh as u8) << 2
            | (self.s16 as u8) << 3
            | (self.stb as u8) << 4
            | (self.stb1 as u8) << 5
            | (self.slk as u8) << 6
    }

    /// Packed global register 2 byte.
    #[must_use]
    pub const fn global_reg2(&self) -> u8 {
        (self.sdacsw1 as u8) | (self.sdacsw2 as u8) << 1 | (self.sdac & 0x3F) << 2
    }

    /// Packed channel register byte, applied to every channel.
    #[must_use]
    pub const fn channel_reg(&self) -> u8 {
        (self.sdf as u8)
            | (self.smn as u8) << 1
            | (self.peak_time & 0x3) << 2
            | (self.gain & 0x3) << 4
            | (self.snc as u8) << 6
            | (self.sts as u8) << 7
    }
}

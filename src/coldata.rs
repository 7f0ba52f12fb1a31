// Licensed under the Apache-2.0 license

//! COLDATA and COLDADC register map.
//!
//! Chip addresses and register locations for the front-end chips reachable
//! over the two COLDATA I2C buses of a FEMB. Bus 0 serves the bottom
//! COLDATA and its four ADCs, bus 1 the top set. The values mirror the
//! chip documentation; they are fixed protocol, not configuration.

/// Bottom COLDATA chip address (bus 0).
pub const CHIP_CD_BOT: u8 = 0x2;
/// Top COLDATA chip address (bus 1).
pub const CHIP_CD_TOP: u8 = 0x3;
/// Bottom-side COLDADC chip addresses (bus 0).
pub const CHIP_CD_BOT_ADC: [u8; 4] = [0x4, 0x5, 0x6, 0x7];
/// Top-side COLDADC chip addresses (bus 1).
pub const CHIP_CD_TOP_ADC: [u8; 4] = [0x8, 0x9, 0xA, 0xB];

/// COLDATA chip address for each bus index.
pub const COLDATA_CHIP: [u8; 2] = [CHIP_CD_BOT, CHIP_CD_TOP];
/// COLDADC chip addresses for each bus index.
pub const COLDADC_CHIPS: [[u8; 4]; 2] = [CHIP_CD_BOT_ADC, CHIP_CD_TOP_ADC];

/// Register page holding the COLDATA configuration registers.
pub const PAGE_CONFIG: u8 = 0;
/// Operating mode register: warm or cold front-end electronics.
pub const REG_OPERATING_MODE: u8 = 0x01;
/// Frame mode register: output data framing select.
pub const REG_FRAME_MODE: u8 = 0x03;
/// Saved LArASIC SPI programming status, captured by an `ACT_SAVE_STATUS`
/// fast command.
pub const REG_SPI_STATUS: u8 = 0x24;

/// Operating mode byte for cryogenic operation.
pub const MODE_COLD: u8 = 0x01;
/// Operating mode byte for warm (bench) operation.
pub const MODE_WARM: u8 = 0x00;
/// Status byte reported after a successful LArASIC SPI programming pass.
pub const SPI_STATUS_PROGRAMMED: u8 = 0x01;

/// Register page of the staged LArASIC register image inside COLDATA.
pub const PAGE_LARASIC: u8 = 0x02;
/// Channel registers occupy [`REG_LARASIC_CHAN_BASE`] .. base + 16.
pub const REG_LARASIC_CHAN_BASE: u8 = 0x80;
/// First LArASIC global register slot.
pub const REG_LARASIC_GLOBAL1: u8 = 0x90;
/// Second LArASIC global register slot.
pub const REG_LARASIC_GLOBAL2: u8 = 0x91;
/// Channels per LArASIC.
pub const LARASIC_CHANNELS: u8 = 16;

/// Output data framing written into a COLDATA chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameType {
    /// DD frame.
    Dd,
    /// 12-bit frame.
    Frame12,
    /// 14-bit frame.
    Frame14,
}

impl FrameType {
    /// Byte written to [`REG_FRAME_MODE`].
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Dd => 0x00,
            Self::Frame12 => 0x01,
            Self::Frame14 => 0x02,
        }
    }
}

/// Register writes that take a COLDADC from its power-on state to normal
/// sampling operation, applied in order to every ADC sub-chip as
/// `(page, register, value)`.
pub const COLDADC_NORMAL_OPERATION: &[(u8, u8, u8)] = &[
    (0, 0x80, 0x23), // reference buffers on, internal bias
    (0, 0x84, 0x03), // bias current default
    (0, 0x89, 0x0C), // output driver strength
    (0, 0x98, 0x41), // auto-calibration enable
    (1, 0x01, 0x02), // serializer frame alignment
    (1, 0x06, 0x00), // test pattern off
];

// Licensed under the Apache-2.0 license

//! Fast-command broadcast channel.
//!
//! The fast-command block is one register pair shared by every FEMB on the
//! board: writing a command code to it pulses the timing/reset/action lines
//! of all attached modules at once. There is no acknowledge at this layer;
//! a command is fire-and-forget.
//!
//! Actions are a two-step protocol. [`FastCmdDispatcher::set_act`] arms the
//! sub-command in the act-delay register without executing anything; the
//! action runs when a later [`FastCmdDispatcher::send`] carries
//! [`FastCmdFlags::ACT`], optionally together with `SYNC`/`EDGE` so the
//! action fires in lockstep with an external timing edge. Detector timing
//! alignment depends on that decoupling.
//!
//! There is no process-wide static here: the dispatcher is built over an
//! explicitly shared [`RegisterIo`] handle (see the `&RefCell` impl in
//! [`crate::ioreg`]) and exactly one writer may use it at a time.
//! Multi-threaded callers must put their own lock around every
//! fast-command operation.

use bitflags::bitflags;

use crate::ioreg::RegisterIo;

/// Word offset of the command-code register in the fast-command block.
pub const REG_FAST_CMD_CODE: usize = 0;
/// Word offset of the act-delay/sub-command register.
pub const REG_FAST_CMD_ACT_DELAY: usize = 1;

bitflags! {
    /// Command lines pulsed by one fast-command broadcast. Combinable.
    ///
    /// The bit values are the wire protocol with the firmware and are not
    /// configurable.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FastCmdFlags: u32 {
        const RESET = 1;
        const ACT = 2;
        const SYNC = 4;
        const EDGE = 8;
        const IDLE = 16;
        const EDGE_ACT = 32;
    }
}

/// What an ACT-flagged fast command performs, armed via
/// [`FastCmdDispatcher::set_act`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FastAct {
    Idle = 0x00,
    LarasicPulse = 0x01,
    SaveTime = 0x02,
    SaveStatus = 0x03,
    ClearSave = 0x04,
    ResetColdadc = 0x05,
    ResetLarasic = 0x06,
    ResetLarasicSpi = 0x07,
    ProgramLarasic = 0x08,
}

/// Fast-command failure. Register-level only; actions themselves report
/// nothing back through this block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FastCmdError {
    /// The act-delay register did not read back the armed sub-command.
    ActReadback {
        wrote: u8,
        read: u8,
    },
}

impl core::fmt::Display for FastCmdError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ActReadback { wrote, read } => {
                write!(f, "act register readback: wrote {wrote:#04x}, read {read:#04x}")
            }
        }
    }
}

/// Handle on the shared fast-command register block.
pub struct FastCmdDispatcher<R> {
    regs: R,
}

impl<R: RegisterIo> FastCmdDispatcher<R> {
    #[must_use]
    pub fn new(regs: R) -> Self {
        Self { regs }
    }

    /// Broadcast a fast command to every FEMB on the board.
    ///
    /// Process-wide side effect: all modules sharing the block see the
    /// pulse simultaneously.
    pub fn send(&mut self, code: FastCmdFlags) {
        self.regs.write(REG_FAST_CMD_CODE, code.bits());
    }

    /// Arm the action a subsequent ACT-flagged command will perform.
    ///
    /// Does not execute anything by itself.
    ///
    /// # Errors
    ///
    /// [`FastCmdError::ActReadback`] if the register does not hold the
    /// sub-command after the write.
    pub fn set_act(&mut self, act: FastAct) -> Result<(), FastCmdError> {
        self.regs.write(REG_FAST_CMD_ACT_DELAY, act as u32);
        let read = self.regs.read(REG_FAST_CMD_ACT_DELAY);
        if read == act as u32 {
            Ok(())
        } else {
            Err(FastCmdError::ActReadback {
                wrote: act as u8,
                read: read as u8,
            })
        }
    }
}

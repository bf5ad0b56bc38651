//! Step errors.

use emu_core::Halt;
use thiserror::Error;

/// Why a single step did not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StepError {
    /// A bus read raised the halt signal part-way through the instruction.
    #[error(transparent)]
    Halted(#[from] Halt),

    /// Opcode byte with no documented operation, under
    /// [`IllegalOpcodePolicy::Stop`](crate::IllegalOpcodePolicy::Stop).
    #[error("illegal opcode ${opcode:02X} at ${pc:04X}")]
    IllegalOpcode { opcode: u8, pc: u16 },

    /// The CPU has stopped; set PC or reset to resume.
    #[error("CPU is stopped")]
    Stopped,
}

//! CPU core trait.

use crate::Halt;

/// An instruction-stepped CPU core.
///
/// The CPU owns its bus and executes one whole instruction (or interrupt
/// entry) per `step()`. Callers that need a cycle count accumulate the
/// value each step returns.
pub trait Cpu {
    /// The type used for register inspection.
    type Registers;

    /// Why a step could not complete.
    type Error;

    /// Execute one instruction, returning the cycles it took.
    fn step(&mut self) -> Result<u32, Self::Error>;

    /// Returns the current program counter.
    fn pc(&self) -> u16;

    /// Returns a snapshot of all registers for inspection.
    fn registers(&self) -> Self::Registers;

    /// Returns true once execution has stopped and needs a new PC to resume.
    fn is_halted(&self) -> bool;

    /// Request a maskable interrupt. Returns true if currently accepted.
    fn interrupt(&mut self) -> bool;

    /// Request a non-maskable interrupt.
    fn nmi(&mut self);

    /// Reset the CPU, loading PC from the reset vector.
    fn reset(&mut self) -> Result<(), Halt>;
}

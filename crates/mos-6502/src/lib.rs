//! Instruction-level MOS 6502 interpreter.
//!
//! Each [`Mos6502::step`] executes one whole instruction against an
//! injected [`Bus`] and returns its cycle cost, including the page-crossing
//! and taken-branch penalties. [`Mos6502::run`] steps until a cycle or
//! instruction [`Budget`] is spent, a bus read answers with [`Halt`], or an
//! undefined opcode is met.
//!
//! ```
//! use emu_core::{HaltOn, SimpleBus, halt_at};
//! use mos_6502::{Budget, Mos6502, StopReason};
//!
//! let mut bus = SimpleBus::new();
//! // LDA #$05; ADC #$03; STA $00; LDA $FFFF
//! bus.load(0xF000, &[0xA9, 0x05, 0x69, 0x03, 0x85, 0x00, 0xAD, 0xFF, 0xFF]);
//!
//! let mut cpu = Mos6502::new(HaltOn::new(bus, halt_at(0xFFFF)));
//! cpu.set_pc(0xF000);
//!
//! let mut cycles = 0;
//! let outcome = cpu.run(Budget::Cycles(1_000_000), &mut cycles);
//! assert_eq!(outcome.reason, StopReason::Halted { address: 0xFFFF });
//! assert_eq!(cpu.a(), 8);
//! assert_eq!(cpu.bus().inner().peek(0x0000), 8);
//! ```

mod addressing;
mod alu;
mod config;
mod cpu;
mod error;
pub mod flags;
mod opcodes;
mod ops;
mod registers;
mod run;

pub use addressing::{Mode, Target, crosses_page};
pub use config::{Config, IllegalOpcodePolicy};
pub use cpu::{IRQ_VECTOR, Mos6502, NMI_VECTOR, RESET_VECTOR};
pub use emu_core::{Bus, Halt};
pub use error::StepError;
pub use flags::Status;
pub use opcodes::{Access, Instruction, Mnemonic, OPCODES, decode};
pub use registers::{Registers, STACK_PAGE};
pub use run::{Budget, RunOutcome, StopReason};

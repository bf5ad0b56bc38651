//! Core traits and types shared by the 6502 interpreter.
//!
//! The CPU never owns memory. It sees the address space only through a
//! [`Bus`], and a bus read may answer with [`Halt`] instead of a byte.

mod bus;
mod cpu;
mod observable;

pub use bus::{Bus, Halt, HaltOn, SimpleBus, halt_at};
pub use cpu::Cpu;
pub use observable::{Observable, Value};

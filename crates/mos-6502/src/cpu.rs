//! 6502 CPU implementation.
//!
//! Instruction-level execution: each `step()` runs one whole instruction
//! (or one interrupt entry) and returns its cycle cost.

use emu_core::{Bus, Cpu, Halt, Observable, Value};

use crate::config::{Config, IllegalOpcodePolicy};
use crate::error::StepError;
use crate::flags::{self, C, D, I, N, V, Z};
use crate::opcodes::decode;
use crate::run::StopReason;
use crate::{Registers, Status};

/// NMI vector ($FFFA/$FFFB).
pub const NMI_VECTOR: u16 = 0xFFFA;
/// Reset vector ($FFFC/$FFFD).
pub const RESET_VECTOR: u16 = 0xFFFC;
/// IRQ/BRK vector ($FFFE/$FFFF).
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// Cycles taken to push state and load a vector on IRQ/NMI entry.
const INTERRUPT_CYCLES: u32 = 7;

/// The MOS 6502 CPU.
///
/// Owns the bus it runs against. Registers are public, as is usual for
/// test harnesses poking state directly; the accessor methods are the
/// read-only view for tooling.
#[derive(Debug)]
pub struct Mos6502<B> {
    /// CPU registers.
    pub regs: Registers,

    pub(crate) bus: B,

    config: Config,

    /// Set once execution stops; cleared by `set_pc` or `reset`.
    stopped: Option<StopReason>,

    /// NMI edge latched, serviced before the next fetch.
    nmi_pending: bool,

    /// IRQ latched, serviced before the next fetch while I is clear.
    irq_pending: bool,
}

impl<B: Bus> Mos6502<B> {
    /// Create a CPU with the default [`Config`].
    ///
    /// Registers start in the [`Registers::new`] state. The reset vector is
    /// not read; set PC or call [`reset`](Self::reset).
    #[must_use]
    pub fn new(bus: B) -> Self {
        Self::with_config(bus, Config::default())
    }

    #[must_use]
    pub fn with_config(bus: B, config: Config) -> Self {
        Self {
            regs: Registers::new(),
            bus,
            config,
            stopped: None,
            nmi_pending: false,
            irq_pending: false,
        }
    }

    // ========================================================================
    // Bus and configuration
    // ========================================================================

    #[must_use]
    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    #[must_use]
    pub fn into_bus(self) -> B {
        self.bus
    }

    #[must_use]
    pub fn config(&self) -> Config {
        self.config
    }

    // ========================================================================
    // Register and flag accessors
    // ========================================================================

    #[must_use]
    pub fn a(&self) -> u8 {
        self.regs.a
    }

    #[must_use]
    pub fn x(&self) -> u8 {
        self.regs.x
    }

    #[must_use]
    pub fn y(&self) -> u8 {
        self.regs.y
    }

    #[must_use]
    pub fn sp(&self) -> u8 {
        self.regs.s
    }

    #[must_use]
    pub fn pc(&self) -> u16 {
        self.regs.pc
    }

    #[must_use]
    pub fn status(&self) -> u8 {
        self.regs.p.0
    }

    #[must_use]
    pub fn registers(&self) -> Registers {
        self.regs
    }

    #[must_use]
    pub fn carry(&self) -> bool {
        self.regs.p.is_set(C)
    }

    #[must_use]
    pub fn zero(&self) -> bool {
        self.regs.p.is_set(Z)
    }

    #[must_use]
    pub fn interrupt_disable(&self) -> bool {
        self.regs.p.is_set(I)
    }

    #[must_use]
    pub fn decimal(&self) -> bool {
        self.regs.p.is_set(D)
    }

    #[must_use]
    pub fn break_flag(&self) -> bool {
        self.regs.p.is_set(flags::B)
    }

    #[must_use]
    pub fn overflow(&self) -> bool {
        self.regs.p.is_set(V)
    }

    #[must_use]
    pub fn negative(&self) -> bool {
        self.regs.p.is_set(N)
    }

    pub fn set_a(&mut self, value: u8) {
        self.regs.a = value;
    }

    pub fn set_x(&mut self, value: u8) {
        self.regs.x = value;
    }

    pub fn set_y(&mut self, value: u8) {
        self.regs.y = value;
    }

    pub fn set_sp(&mut self, value: u8) {
        self.regs.s = value;
    }

    /// Set PC. This is also how a stopped CPU is restarted.
    pub fn set_pc(&mut self, value: u16) {
        self.regs.pc = value;
        self.stopped = None;
    }

    pub fn set_status(&mut self, value: u8) {
        self.regs.p = Status::from_byte(value);
    }

    /// Set or clear one flag (one of the [`crate::flags`] masks).
    pub fn set_flag(&mut self, flag: u8, value: bool) {
        self.regs.p.set_if(flag, value);
    }

    /// Why execution stopped, if it has.
    #[must_use]
    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stopped
    }

    pub(crate) fn stop(&mut self, reason: StopReason) {
        self.stopped = Some(reason);
    }

    // ========================================================================
    // Interrupts and reset
    // ========================================================================

    /// Latch an IRQ if I is clear. Returns whether it was accepted.
    pub fn irq(&mut self) -> bool {
        if self.regs.p.is_set(I) {
            false
        } else {
            self.irq_pending = true;
            true
        }
    }

    /// Latch an NMI; it is taken before the next instruction.
    pub fn nmi(&mut self) {
        self.nmi_pending = true;
    }

    /// Restore the reset register state and load PC from $FFFC/$FFFD.
    pub fn reset(&mut self) -> Result<(), Halt> {
        self.regs = Registers::new();
        self.nmi_pending = false;
        self.irq_pending = false;
        self.stopped = None;
        match self.read_word(RESET_VECTOR) {
            Ok(pc) => {
                self.regs.pc = pc;
                log::debug!("reset: PC=${pc:04X}");
                Ok(())
            }
            Err(halt) => {
                self.stopped = Some(StopReason::Halted {
                    address: halt.address,
                });
                Err(halt)
            }
        }
    }

    // ========================================================================
    // Stack
    // ========================================================================

    pub(crate) fn push(&mut self, value: u8) {
        let addr = self.regs.push();
        self.bus.write(addr, value);
    }

    pub(crate) fn pull(&mut self) -> Result<u8, Halt> {
        let addr = self.regs.pop();
        self.bus.read(addr)
    }

    /// Push PC and `status`, set I, and jump through `vector`.
    ///
    /// Shared by BRK, IRQ and NMI; they differ only in the pushed B bit and
    /// the vector.
    pub(crate) fn enter_interrupt(&mut self, vector: u16, status: u8) -> Result<(), Halt> {
        let pc = self.regs.pc;
        self.push((pc >> 8) as u8);
        self.push(pc as u8);
        self.push(status);
        self.regs.p.set(I);
        self.regs.pc = self.read_word(vector)?;
        Ok(())
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Execute one instruction (or pending interrupt entry).
    ///
    /// Returns the cycles consumed. On [`StepError::Halted`] the register
    /// effects made before the halting read are kept and the CPU stops.
    pub fn step(&mut self) -> Result<u32, StepError> {
        if self.stopped.is_some() {
            return Err(StepError::Stopped);
        }

        let result = self.execute_next();
        match result {
            Err(StepError::Halted(halt)) => {
                log::debug!("halted by read of ${:04X}", halt.address);
                self.stopped = Some(StopReason::Halted {
                    address: halt.address,
                });
            }
            Err(StepError::IllegalOpcode { opcode, pc }) => {
                self.stopped = Some(StopReason::IllegalOpcode { opcode, pc });
            }
            _ => {}
        }
        result
    }

    fn execute_next(&mut self) -> Result<u32, StepError> {
        if self.nmi_pending {
            self.nmi_pending = false;
            log::debug!("NMI at PC=${:04X}", self.regs.pc);
            self.enter_interrupt(NMI_VECTOR, self.regs.p.to_byte_irq())?;
            return Ok(INTERRUPT_CYCLES);
        }
        if self.irq_pending && !self.regs.p.is_set(I) {
            self.irq_pending = false;
            log::debug!("IRQ at PC=${:04X}", self.regs.pc);
            self.enter_interrupt(IRQ_VECTOR, self.regs.p.to_byte_irq())?;
            return Ok(INTERRUPT_CYCLES);
        }

        let pc = self.regs.pc;
        let opcode = self.fetch()?;
        let Some(instruction) = decode(opcode) else {
            return self.illegal_opcode(opcode, pc);
        };

        log::trace!(
            "${pc:04X}: {:02X} {} {:?} A={:02X} X={:02X} Y={:02X} S={:02X} P={:02X}",
            opcode,
            instruction.mnemonic,
            instruction.mode,
            self.regs.a,
            self.regs.x,
            self.regs.y,
            self.regs.s,
            self.regs.p.0
        );

        let operand = self.resolve(instruction.mode)?;
        let extra = self.execute(instruction.mnemonic, operand)?;
        let cycles = instruction.cycles + instruction.page_penalty(operand.page_crossed) + extra;
        Ok(u32::from(cycles))
    }

    fn illegal_opcode(&mut self, opcode: u8, pc: u16) -> Result<u32, StepError> {
        match self.config.illegal_opcodes {
            IllegalOpcodePolicy::Stop => {
                self.regs.pc = pc;
                Err(StepError::IllegalOpcode { opcode, pc })
            }
            IllegalOpcodePolicy::Nop => {
                log::warn!("illegal opcode ${opcode:02X} at ${pc:04X} executed as NOP");
                Ok(2)
            }
        }
    }
}

// ============================================================================
// Trait implementations
// ============================================================================

impl<B: Bus> Cpu for Mos6502<B> {
    type Registers = Registers;
    type Error = StepError;

    fn step(&mut self) -> Result<u32, StepError> {
        Mos6502::step(self)
    }

    fn pc(&self) -> u16 {
        self.regs.pc
    }

    fn registers(&self) -> Self::Registers {
        self.regs
    }

    fn is_halted(&self) -> bool {
        self.stopped.is_some()
    }

    fn interrupt(&mut self) -> bool {
        self.irq()
    }

    fn nmi(&mut self) {
        Mos6502::nmi(self);
    }

    fn reset(&mut self) -> Result<(), Halt> {
        Mos6502::reset(self)
    }
}

impl<B> Observable for Mos6502<B> {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "pc" => Some(self.regs.pc.into()),
            "a" => Some(self.regs.a.into()),
            "x" => Some(self.regs.x.into()),
            "y" => Some(self.regs.y.into()),
            "s" | "sp" => Some(self.regs.s.into()),
            "p" | "status" => Some(self.regs.p.0.into()),
            "flags.c" | "c" => Some(self.regs.p.is_set(C).into()),
            "flags.z" | "z" => Some(self.regs.p.is_set(Z).into()),
            "flags.i" | "i" => Some(self.regs.p.is_set(I).into()),
            "flags.d" | "d" => Some(self.regs.p.is_set(D).into()),
            "flags.b" | "b" => Some(self.regs.p.is_set(flags::B).into()),
            "flags.v" | "v" => Some(self.regs.p.is_set(V).into()),
            "flags.n" | "n" => Some(self.regs.p.is_set(N).into()),
            "halted" => Some(self.stopped.is_some().into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "a", "x", "y", "s", "pc", "p", "flags.c", "flags.z", "flags.i", "flags.d", "flags.b",
            "flags.v", "flags.n", "halted",
        ]
    }
}

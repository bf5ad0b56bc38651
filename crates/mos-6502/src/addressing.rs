//! 6502 addressing modes.
//!
//! The 6502 has 13 addressing modes:
//! - Implied: No operand (e.g., CLC, RTS)
//! - Accumulator: Operates on A register (e.g., ASL A)
//! - Immediate: #$nn (literal value)
//! - Zero Page: $nn (8-bit address in page zero)
//! - Zero Page,X: $nn,X (8-bit address + X, wraps in page zero)
//! - Zero Page,Y: $nn,Y (8-bit address + Y, wraps in page zero)
//! - Absolute: $nnnn (16-bit address)
//! - Absolute,X: $nnnn,X (16-bit address + X, may cross page)
//! - Absolute,Y: $nnnn,Y (16-bit address + Y, may cross page)
//! - Indirect: ($nnnn) (JMP only, buggy page boundary behavior)
//! - Indexed Indirect: ($nn,X) (pointer in zero page indexed by X)
//! - Indirect Indexed: ($nn),Y (zero page pointer + Y)
//! - Relative: Branch offset (-128 to +127)

use emu_core::{Bus, Halt};

use crate::Mos6502;

/// Operand addressing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    IndexedIndirect,
    IndirectIndexed,
    Relative,
}

impl Mode {
    /// Operand bytes following the opcode.
    #[must_use]
    pub const fn operand_len(self) -> u16 {
        match self {
            Mode::Implied | Mode::Accumulator => 0,
            Mode::Immediate
            | Mode::ZeroPage
            | Mode::ZeroPageX
            | Mode::ZeroPageY
            | Mode::IndexedIndirect
            | Mode::IndirectIndexed
            | Mode::Relative => 1,
            Mode::Absolute | Mode::AbsoluteX | Mode::AbsoluteY | Mode::Indirect => 2,
        }
    }
}

/// Where an instruction's operand lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// No operand.
    None,
    /// Operate on A directly.
    Accumulator,
    /// Effective address (for Relative, the branch target).
    Address(u16),
}

/// Result of resolving an addressing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub target: Target,
    /// High byte of the effective address differs from the un-indexed base.
    pub page_crossed: bool,
}

impl Resolved {
    const fn at(addr: u16) -> Self {
        Self {
            target: Target::Address(addr),
            page_crossed: false,
        }
    }

    fn indexed(base: u16, addr: u16) -> Self {
        Self {
            target: Target::Address(addr),
            page_crossed: crosses_page(base, addr),
        }
    }
}

/// True if two addresses sit on different 256-byte pages.
#[must_use]
pub const fn crosses_page(a: u16, b: u16) -> bool {
    (a & 0xFF00) != (b & 0xFF00)
}

impl<B: Bus> Mos6502<B> {
    /// Fetch the next byte at PC and increment PC.
    pub(crate) fn fetch(&mut self) -> Result<u8, Halt> {
        let value = self.bus.read(self.regs.pc)?;
        self.regs.pc = self.regs.pc.wrapping_add(1);
        Ok(value)
    }

    /// Fetch a 16-bit word (little-endian) at PC.
    pub(crate) fn fetch_word(&mut self) -> Result<u16, Halt> {
        let low = self.fetch()?;
        let high = self.fetch()?;
        Ok(u16::from_le_bytes([low, high]))
    }

    /// Read a 16-bit word from memory (little-endian).
    pub(crate) fn read_word(&mut self, addr: u16) -> Result<u16, Halt> {
        let low = self.bus.read(addr)?;
        let high = self.bus.read(addr.wrapping_add(1))?;
        Ok(u16::from_le_bytes([low, high]))
    }

    /// Read a 16-bit word whose high byte stays in the same page.
    ///
    /// If addr is $xxFF, high byte comes from $xx00 instead of $xx00+$100.
    /// Zero-page pointers behave the same way within page 0.
    pub(crate) fn read_word_page_wrapped(&mut self, addr: u16) -> Result<u16, Halt> {
        let low = self.bus.read(addr)?;
        let high_addr = (addr & 0xFF00) | (addr.wrapping_add(1) & 0x00FF);
        let high = self.bus.read(high_addr)?;
        Ok(u16::from_le_bytes([low, high]))
    }

    /// Resolve `mode` with PC on the first operand byte, consuming the operand.
    pub(crate) fn resolve(&mut self, mode: Mode) -> Result<Resolved, Halt> {
        let resolved = match mode {
            Mode::Implied => Resolved {
                target: Target::None,
                page_crossed: false,
            },
            Mode::Accumulator => Resolved {
                target: Target::Accumulator,
                page_crossed: false,
            },
            Mode::Immediate => {
                let addr = self.regs.pc;
                self.regs.pc = self.regs.pc.wrapping_add(1);
                Resolved::at(addr)
            }
            Mode::ZeroPage => Resolved::at(u16::from(self.fetch()?)),
            Mode::ZeroPageX => {
                let base = self.fetch()?;
                Resolved::at(u16::from(base.wrapping_add(self.regs.x)))
            }
            Mode::ZeroPageY => {
                let base = self.fetch()?;
                Resolved::at(u16::from(base.wrapping_add(self.regs.y)))
            }
            Mode::Absolute => Resolved::at(self.fetch_word()?),
            Mode::AbsoluteX => {
                let base = self.fetch_word()?;
                Resolved::indexed(base, base.wrapping_add(u16::from(self.regs.x)))
            }
            Mode::AbsoluteY => {
                let base = self.fetch_word()?;
                Resolved::indexed(base, base.wrapping_add(u16::from(self.regs.y)))
            }
            Mode::Indirect => {
                let pointer = self.fetch_word()?;
                Resolved::at(self.read_word_page_wrapped(pointer)?)
            }
            Mode::IndexedIndirect => {
                let pointer = self.fetch()?.wrapping_add(self.regs.x);
                Resolved::at(self.read_word_page_wrapped(u16::from(pointer))?)
            }
            Mode::IndirectIndexed => {
                let pointer = self.fetch()?;
                let base = self.read_word_page_wrapped(u16::from(pointer))?;
                Resolved::indexed(base, base.wrapping_add(u16::from(self.regs.y)))
            }
            Mode::Relative => {
                let offset = self.fetch()? as i8;
                let next = self.regs.pc;
                Resolved::indexed(next, next.wrapping_add(offset as u16))
            }
        };
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emu_core::SimpleBus;

    fn cpu_with(program: &[u8]) -> Mos6502<SimpleBus> {
        let mut bus = SimpleBus::new();
        bus.load(0x0200, program);
        let mut cpu = Mos6502::new(bus);
        cpu.regs.pc = 0x0200;
        cpu
    }

    #[test]
    fn operand_widths_advance_pc() {
        for (mode, len) in [
            (Mode::Implied, 0),
            (Mode::Accumulator, 0),
            (Mode::Immediate, 1),
            (Mode::ZeroPageX, 1),
            (Mode::Relative, 1),
            (Mode::Absolute, 2),
            (Mode::Indirect, 2),
        ] {
            let mut cpu = cpu_with(&[0x10, 0x20]);
            cpu.resolve(mode).unwrap();
            assert_eq!(cpu.regs.pc, 0x0200 + len, "{mode:?}");
            assert_eq!(mode.operand_len(), len);
        }
    }

    #[test]
    fn zero_page_x_wraps() {
        let mut cpu = cpu_with(&[0xF0]);
        cpu.regs.x = 0x20;
        let r = cpu.resolve(Mode::ZeroPageX).unwrap();
        assert_eq!(r.target, Target::Address(0x0010));
        assert!(!r.page_crossed);
    }

    #[test]
    fn absolute_y_reports_page_cross() {
        let mut cpu = cpu_with(&[0xF0, 0x12]);
        cpu.regs.y = 0x20;
        let r = cpu.resolve(Mode::AbsoluteY).unwrap();
        assert_eq!(r.target, Target::Address(0x1310));
        assert!(r.page_crossed);
    }

    #[test]
    fn indirect_indexed_pointer_wraps_in_zero_page() {
        let mut cpu = cpu_with(&[0xFF]);
        cpu.bus.write(0x00FF, 0x34);
        cpu.bus.write(0x0000, 0x12);
        cpu.bus.write(0x0100, 0x99);
        cpu.regs.y = 0x01;
        let r = cpu.resolve(Mode::IndirectIndexed).unwrap();
        assert_eq!(r.target, Target::Address(0x1235));
        assert!(!r.page_crossed);
    }

    #[test]
    fn indexed_indirect_pointer_wraps_in_zero_page() {
        let mut cpu = cpu_with(&[0xFE]);
        cpu.regs.x = 0x01;
        cpu.bus.write(0x00FF, 0x00);
        cpu.bus.write(0x0000, 0x40);
        let r = cpu.resolve(Mode::IndexedIndirect).unwrap();
        assert_eq!(r.target, Target::Address(0x4000));
    }

    #[test]
    fn jmp_indirect_page_bug() {
        let mut cpu = cpu_with(&[0xFF, 0x30]);
        cpu.bus.write(0x30FF, 0x80);
        cpu.bus.write(0x3000, 0x50);
        cpu.bus.write(0x3100, 0x40);
        let r = cpu.resolve(Mode::Indirect).unwrap();
        assert_eq!(r.target, Target::Address(0x5080));
    }

    #[test]
    fn relative_backwards_across_page() {
        // Operand at $0200, next instruction at $0201, offset -2 -> $01FF.
        let mut cpu = cpu_with(&[0xFE]);
        let r = cpu.resolve(Mode::Relative).unwrap();
        assert_eq!(r.target, Target::Address(0x01FF));
        assert!(r.page_crossed);
    }
}

//! Instruction semantics.
//!
//! `execute` runs one decoded operation against its resolved operand and
//! returns any extra cycles beyond the table cost (taken branches only).

#![allow(clippy::enum_glob_use)]

use emu_core::{Bus, Halt};

use crate::addressing::{Resolved, Target};
use crate::alu::{self, AluResult};
use crate::cpu::IRQ_VECTOR;
use crate::flags::{self, C, D, I, N, V, Z};
use crate::opcodes::Mnemonic;
use crate::{Mos6502, Status};

impl<B: Bus> Mos6502<B> {
    pub(crate) fn execute(&mut self, mnemonic: Mnemonic, operand: Resolved) -> Result<u8, Halt> {
        use Mnemonic::*;
        let target = operand.target;

        match mnemonic {
            // Loads and stores
            Lda => {
                self.regs.a = self.load(target)?;
                self.regs.p.update_nz(self.regs.a);
            }
            Ldx => {
                self.regs.x = self.load(target)?;
                self.regs.p.update_nz(self.regs.x);
            }
            Ldy => {
                self.regs.y = self.load(target)?;
                self.regs.p.update_nz(self.regs.y);
            }
            Sta => self.store(target, self.regs.a),
            Stx => self.store(target, self.regs.x),
            Sty => self.store(target, self.regs.y),

            // Arithmetic
            Adc => {
                let m = self.load(target)?;
                let result = self.adc(m);
                self.set_arithmetic(result);
            }
            Sbc => {
                let m = self.load(target)?;
                let result = self.sbc(m);
                self.set_arithmetic(result);
            }

            // Logic
            And => {
                let m = self.load(target)?;
                self.regs.a &= m;
                self.regs.p.update_nz(self.regs.a);
            }
            Ora => {
                let m = self.load(target)?;
                self.regs.a |= m;
                self.regs.p.update_nz(self.regs.a);
            }
            Eor => {
                let m = self.load(target)?;
                self.regs.a ^= m;
                self.regs.p.update_nz(self.regs.a);
            }
            Bit => {
                let m = self.load(target)?;
                self.regs.p.set_if(Z, self.regs.a & m == 0);
                self.regs.p.set_if(N, m & 0x80 != 0);
                self.regs.p.set_if(V, m & 0x40 != 0);
            }

            // Shifts and rotates
            Asl => self.modify(target, Self::asl)?,
            Lsr => self.modify(target, Self::lsr)?,
            Rol => self.modify(target, Self::rol)?,
            Ror => self.modify(target, Self::ror)?,

            // Compare
            Cmp => self.compare(self.regs.a, target)?,
            Cpx => self.compare(self.regs.x, target)?,
            Cpy => self.compare(self.regs.y, target)?,

            // Increment and decrement
            Inc => self.modify(target, Self::inc)?,
            Dec => self.modify(target, Self::dec)?,
            Inx => self.regs.x = self.inc(self.regs.x),
            Iny => self.regs.y = self.inc(self.regs.y),
            Dex => self.regs.x = self.dec(self.regs.x),
            Dey => self.regs.y = self.dec(self.regs.y),

            // Transfers
            Tax => {
                self.regs.x = self.regs.a;
                self.regs.p.update_nz(self.regs.x);
            }
            Tay => {
                self.regs.y = self.regs.a;
                self.regs.p.update_nz(self.regs.y);
            }
            Txa => {
                self.regs.a = self.regs.x;
                self.regs.p.update_nz(self.regs.a);
            }
            Tya => {
                self.regs.a = self.regs.y;
                self.regs.p.update_nz(self.regs.a);
            }
            Tsx => {
                self.regs.x = self.regs.s;
                self.regs.p.update_nz(self.regs.x);
            }
            Txs => self.regs.s = self.regs.x,

            // Branches
            Bcc => return Ok(self.branch(operand, !self.regs.p.is_set(C))),
            Bcs => return Ok(self.branch(operand, self.regs.p.is_set(C))),
            Bne => return Ok(self.branch(operand, !self.regs.p.is_set(Z))),
            Beq => return Ok(self.branch(operand, self.regs.p.is_set(Z))),
            Bpl => return Ok(self.branch(operand, !self.regs.p.is_set(N))),
            Bmi => return Ok(self.branch(operand, self.regs.p.is_set(N))),
            Bvc => return Ok(self.branch(operand, !self.regs.p.is_set(V))),
            Bvs => return Ok(self.branch(operand, self.regs.p.is_set(V))),

            // Jumps and subroutines
            Jmp => self.jump(target),
            Jsr => {
                let ret = self.regs.pc.wrapping_sub(1);
                self.push((ret >> 8) as u8);
                self.push(ret as u8);
                self.jump(target);
            }
            Rts => {
                let lo = self.pull()?;
                let hi = self.pull()?;
                self.regs.pc = u16::from_le_bytes([lo, hi]).wrapping_add(1);
            }

            // Stack
            Pha => self.push(self.regs.a),
            Php => self.push(self.regs.p.to_byte_brk()),
            Pla => {
                self.regs.a = self.pull()?;
                self.regs.p.update_nz(self.regs.a);
            }
            Plp => self.regs.p = Status::from_byte(self.pull()?),

            // Flags
            Clc => self.regs.p.clear(C),
            Sec => self.regs.p.set(C),
            Cli => self.regs.p.clear(I),
            Sei => self.regs.p.set(I),
            Cld => self.regs.p.clear(D),
            Sed => self.regs.p.set(D),
            Clv => self.regs.p.clear(V),

            // Interrupts
            Brk => {
                // The byte after BRK is padding; the pushed PC skips it.
                self.regs.pc = self.regs.pc.wrapping_add(1);
                let status = self.regs.p.to_byte_brk();
                self.regs.p.set(flags::B);
                self.enter_interrupt(IRQ_VECTOR, status)?;
            }
            Rti => {
                self.regs.p = Status::from_byte(self.pull()?);
                let lo = self.pull()?;
                let hi = self.pull()?;
                self.regs.pc = u16::from_le_bytes([lo, hi]);
            }

            Nop => {}
        }
        Ok(0)
    }

    // ========================================================================
    // Operand access
    // ========================================================================

    fn load(&mut self, target: Target) -> Result<u8, Halt> {
        match target {
            Target::Address(addr) => self.bus.read(addr),
            Target::Accumulator => Ok(self.regs.a),
            Target::None => unreachable!("operation without an operand"),
        }
    }

    fn store(&mut self, target: Target, value: u8) {
        match target {
            Target::Address(addr) => self.bus.write(addr, value),
            Target::Accumulator => self.regs.a = value,
            Target::None => unreachable!("operation without an operand"),
        }
    }

    /// Read, transform and write back (memory or A).
    fn modify(&mut self, target: Target, op: fn(&mut Self, u8) -> u8) -> Result<(), Halt> {
        let value = self.load(target)?;
        let result = op(self, value);
        self.store(target, result);
        Ok(())
    }

    fn jump(&mut self, target: Target) {
        if let Target::Address(addr) = target {
            self.regs.pc = addr;
        }
    }

    // ========================================================================
    // ALU glue
    // ========================================================================

    fn bcd_active(&self) -> bool {
        self.config().decimal_mode && self.regs.p.is_set(D)
    }

    fn adc(&self, m: u8) -> AluResult {
        let carry = self.regs.p.is_set(C);
        if self.bcd_active() {
            alu::adc_decimal(self.regs.a, m, carry)
        } else {
            alu::adc_binary(self.regs.a, m, carry)
        }
    }

    fn sbc(&self, m: u8) -> AluResult {
        let carry = self.regs.p.is_set(C);
        if self.bcd_active() {
            alu::sbc_decimal(self.regs.a, m, carry)
        } else {
            alu::sbc_binary(self.regs.a, m, carry)
        }
    }

    fn set_arithmetic(&mut self, result: AluResult) {
        self.regs.a = result.value;
        result.apply(&mut self.regs.p);
    }

    fn compare(&mut self, register: u8, target: Target) -> Result<(), Halt> {
        let m = self.load(target)?;
        let (carry, diff) = alu::compare(register, m);
        self.regs.p.set_if(C, carry);
        self.regs.p.update_nz(diff);
        Ok(())
    }

    fn asl(&mut self, value: u8) -> u8 {
        let result = value << 1;
        self.regs.p.set_if(C, value & 0x80 != 0);
        self.regs.p.update_nz(result);
        result
    }

    fn lsr(&mut self, value: u8) -> u8 {
        let result = value >> 1;
        self.regs.p.set_if(C, value & 0x01 != 0);
        self.regs.p.update_nz(result);
        result
    }

    fn rol(&mut self, value: u8) -> u8 {
        let result = (value << 1) | u8::from(self.regs.p.is_set(C));
        self.regs.p.set_if(C, value & 0x80 != 0);
        self.regs.p.update_nz(result);
        result
    }

    fn ror(&mut self, value: u8) -> u8 {
        let result = (value >> 1) | (u8::from(self.regs.p.is_set(C)) << 7);
        self.regs.p.set_if(C, value & 0x01 != 0);
        self.regs.p.update_nz(result);
        result
    }

    fn inc(&mut self, value: u8) -> u8 {
        let result = value.wrapping_add(1);
        self.regs.p.update_nz(result);
        result
    }

    fn dec(&mut self, value: u8) -> u8 {
        let result = value.wrapping_sub(1);
        self.regs.p.update_nz(result);
        result
    }

    /// Take a branch if `condition`: +1 cycle, +1 more across a page.
    fn branch(&mut self, operand: Resolved, condition: bool) -> u8 {
        match operand.target {
            Target::Address(addr) if condition => {
                self.regs.pc = addr;
                1 + u8::from(operand.page_crossed)
            }
            _ => 0,
        }
    }
}

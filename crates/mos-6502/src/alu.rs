//! ALU operations for the 6502.
//!
//! Pure functions of accumulator, operand and carry-in. Decimal mode follows
//! the NMOS part: the BCD result and (for ADC) carry are corrected, while
//! the other flags leak from the binary or half-adjusted intermediate.

use crate::Status;
use crate::flags::{C, N, V, Z};

/// Result of an ALU operation with the four arithmetic flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluResult {
    pub value: u8,
    pub carry: bool,
    pub overflow: bool,
    pub zero: bool,
    pub negative: bool,
}

impl AluResult {
    /// Copy C, V, Z and N into the status register.
    pub fn apply(self, p: &mut Status) {
        p.set_if(C, self.carry);
        p.set_if(V, self.overflow);
        p.set_if(Z, self.zero);
        p.set_if(N, self.negative);
    }
}

/// Binary ADC.
#[must_use]
pub fn adc_binary(a: u8, m: u8, carry: bool) -> AluResult {
    let sum = u16::from(a) + u16::from(m) + u16::from(carry);
    let result = sum as u8;
    AluResult {
        value: result,
        carry: sum > 0xFF,
        overflow: (a ^ result) & (m ^ result) & 0x80 != 0,
        zero: result == 0,
        negative: result & 0x80 != 0,
    }
}

/// Binary SBC: ADC of the one's complement, carry meaning "no borrow".
#[must_use]
pub fn sbc_binary(a: u8, m: u8, carry: bool) -> AluResult {
    adc_binary(a, !m, carry)
}

/// NMOS decimal ADC.
///
/// Z comes from the plain binary sum. N and V come from the high nibble
/// after the low-nibble adjust but before the high-nibble adjust.
#[must_use]
pub fn adc_decimal(a: u8, m: u8, carry: bool) -> AluResult {
    let c = u8::from(carry);

    let mut lo = (a & 0x0F) + (m & 0x0F) + c;
    if lo > 9 {
        lo += 6;
    }
    let mut hi = u16::from(a >> 4) + u16::from(m >> 4) + u16::from(lo > 0x0F);

    let binary = a.wrapping_add(m).wrapping_add(c);
    let intermediate = ((hi << 4) as u8) | (lo & 0x0F);
    let overflow = (a ^ intermediate) & (m ^ intermediate) & 0x80 != 0;
    let negative = hi & 0x08 != 0;

    if hi > 9 {
        hi += 6;
    }

    AluResult {
        value: ((hi << 4) as u8) | (lo & 0x0F),
        carry: hi > 0x0F,
        overflow,
        zero: binary == 0,
        negative,
    }
}

/// NMOS decimal SBC.
///
/// All four flags are those of the binary subtraction; only A is corrected.
#[must_use]
pub fn sbc_decimal(a: u8, m: u8, carry: bool) -> AluResult {
    let flags = sbc_binary(a, m, carry);
    let borrow = i16::from(!carry);

    let mut lo = i16::from(a & 0x0F) - i16::from(m & 0x0F) - borrow;
    let mut hi = i16::from(a >> 4) - i16::from(m >> 4);
    if lo < 0 {
        lo -= 6;
        hi -= 1;
    }
    if hi < 0 {
        hi -= 6;
    }

    AluResult {
        value: ((hi << 4) as u8) | ((lo & 0x0F) as u8),
        ..flags
    }
}

/// CMP/CPX/CPY: returns (carry, difference). Carry means `register >= m`.
#[must_use]
pub fn compare(register: u8, m: u8) -> (bool, u8) {
    (register >= m, register.wrapping_sub(m))
}

//! Arithmetic and flag computation.
//!
//! Each helper computes a result and updates CC the way the matching
//! instruction class does on the 6809:
//! - loads and logical ops: N, Z from the result, V cleared, C untouched
//! - ADD/ADC: H, N, Z, V, C (16-bit adds leave H alone)
//! - SUB/SBC/CMP: N, Z, V, C with C as the borrow
//! - unary ops: see [`unary`]

use crate::cpu::opcodes::Unary;
use crate::cpu::registers::{CcFlag, Registers};

/// Set N and Z from an 8-bit result.
#[inline]
pub fn set_nz8(regs: &mut Registers, result: u8) {
    regs.set_flag(CcFlag::N, result & 0x80 != 0);
    regs.set_flag(CcFlag::Z, result == 0);
}

/// Set N and Z from a 16-bit result.
#[inline]
pub fn set_nz16(regs: &mut Registers, result: u16) {
    regs.set_flag(CcFlag::N, result & 0x8000 != 0);
    regs.set_flag(CcFlag::Z, result == 0);
}

/// N, Z from the result, V cleared.
#[inline]
pub fn set_flags_logical(regs: &mut Registers, result: u8) {
    set_nz8(regs, result);
    regs.set_flag(CcFlag::V, false);
}

#[inline]
pub fn set_flags_logical16(regs: &mut Registers, result: u16) {
    set_nz16(regs, result);
    regs.set_flag(CcFlag::V, false);
}

/// a + b (+ carry), setting H, N, Z, V, C.
pub fn add8(regs: &mut Registers, a: u8, b: u8, carry: bool) -> u8 {
    let c = carry as u16;
    let sum = a as u16 + b as u16 + c;
    let result = sum as u8;

    regs.set_flag(CcFlag::H, (a & 0x0F) as u16 + (b & 0x0F) as u16 + c > 0x0F);
    set_nz8(regs, result);
    regs.set_flag(CcFlag::V, (a ^ result) & (b ^ result) & 0x80 != 0);
    regs.set_flag(CcFlag::C, sum > 0xFF);
    result
}

/// a + b for ADDD, setting N, Z, V, C.
pub fn add16(regs: &mut Registers, a: u16, b: u16) -> u16 {
    let sum = a as u32 + b as u32;
    let result = sum as u16;

    set_nz16(regs, result);
    regs.set_flag(CcFlag::V, (a ^ result) & (b ^ result) & 0x8000 != 0);
    regs.set_flag(CcFlag::C, sum > 0xFFFF);
    result
}

/// a - b (- borrow), setting N, Z, V, C.
pub fn sub8(regs: &mut Registers, a: u8, b: u8, borrow: bool) -> u8 {
    let diff = a as i16 - b as i16 - borrow as i16;
    let result = diff as u8;

    set_nz8(regs, result);
    regs.set_flag(CcFlag::V, (a ^ b) & (a ^ result) & 0x80 != 0);
    regs.set_flag(CcFlag::C, diff < 0);
    result
}

/// a - b for SUBD and the 16-bit compares, setting N, Z, V, C.
pub fn sub16(regs: &mut Registers, a: u16, b: u16) -> u16 {
    let diff = a as i32 - b as i32;
    let result = diff as u16;

    set_nz16(regs, result);
    regs.set_flag(CcFlag::V, (a ^ b) & (a ^ result) & 0x8000 != 0);
    regs.set_flag(CcFlag::C, diff < 0);
    result
}

/// Apply a read-modify-write operation to an 8-bit value.
///
/// - NEG: V when the input is $80, C when the result is non-zero
/// - COM: V cleared, C set
/// - INC/DEC: V at the signed boundary ($80 / $7F), C untouched
/// - TST: V cleared, value unchanged
/// - CLR: N=0 Z=1 V=0 C=0
/// - shifts: C takes the vacated bit; ASL/ROL set V = N xor C;
///   LSR clears N; ASR keeps bit 7; ROR/ASR/LSR leave V alone
pub fn unary(regs: &mut Registers, op: Unary, value: u8) -> u8 {
    let carry_in = regs.flag(CcFlag::C);

    let result = match op {
        Unary::Neg => {
            let result = value.wrapping_neg();
            regs.set_flag(CcFlag::V, value == 0x80);
            regs.set_flag(CcFlag::C, result != 0);
            result
        }
        Unary::Com => {
            let result = !value;
            regs.set_flag(CcFlag::V, false);
            regs.set_flag(CcFlag::C, true);
            result
        }
        Unary::Inc => {
            let result = value.wrapping_add(1);
            regs.set_flag(CcFlag::V, result == 0x80);
            result
        }
        Unary::Dec => {
            let result = value.wrapping_sub(1);
            regs.set_flag(CcFlag::V, result == 0x7F);
            result
        }
        Unary::Tst => {
            regs.set_flag(CcFlag::V, false);
            value
        }
        Unary::Clr => {
            regs.set_flag(CcFlag::V, false);
            regs.set_flag(CcFlag::C, false);
            0
        }
        Unary::Lsr => {
            regs.set_flag(CcFlag::C, value & 0x01 != 0);
            value >> 1
        }
        Unary::Asr => {
            regs.set_flag(CcFlag::C, value & 0x01 != 0);
            (value >> 1) | (value & 0x80)
        }
        Unary::Ror => {
            regs.set_flag(CcFlag::C, value & 0x01 != 0);
            (value >> 1) | if carry_in { 0x80 } else { 0 }
        }
        Unary::Asl => {
            let result = value << 1;
            regs.set_flag(CcFlag::C, value & 0x80 != 0);
            regs.set_flag(CcFlag::V, (value ^ result) & 0x80 != 0);
            result
        }
        Unary::Rol => {
            let result = (value << 1) | carry_in as u8;
            regs.set_flag(CcFlag::C, value & 0x80 != 0);
            regs.set_flag(CcFlag::V, (value ^ result) & 0x80 != 0);
            result
        }
    };

    set_nz8(regs, result);
    result
}

/// Decimal-adjust A after a BCD addition.
pub fn daa(regs: &mut Registers) {
    let a = regs.a;
    let lsn = a & 0x0F;
    let msn = a >> 4;
    let mut correction: u8 = 0;
    let mut carry = regs.flag(CcFlag::C);

    if regs.flag(CcFlag::H) || lsn > 9 {
        correction |= 0x06;
    }
    if carry || msn > 9 || (msn > 8 && lsn > 9) {
        correction |= 0x60;
        carry = true;
    }

    let result = a.wrapping_add(correction);
    regs.a = result;
    set_nz8(regs, result);
    regs.set_flag(CcFlag::C, carry);
}

/// D = A * B (unsigned). Z from D, C from bit 7 of the result.
pub fn mul(regs: &mut Registers) {
    let d = regs.a as u16 * regs.b as u16;
    regs.set_d(d);
    regs.set_flag(CcFlag::Z, d == 0);
    regs.set_flag(CcFlag::C, d & 0x80 != 0);
}

/// Sign-extend B into A. N, Z from D.
pub fn sex(regs: &mut Registers) {
    regs.a = if regs.b & 0x80 != 0 { 0xFF } else { 0x00 };
    let d = regs.d();
    set_nz16(regs, d);
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn regs() -> Registers {
        Registers::new()
    }

    #[test]
    fn test_add8_half_carry_and_overflow() {
        let mut r = regs();
        assert_eq!(add8(&mut r, 0x0F, 0x01, false), 0x10);
        assert!(r.flag(CcFlag::H));
        assert!(!r.flag(CcFlag::C));

        assert_eq!(add8(&mut r, 0x7F, 0x01, false), 0x80);
        assert!(r.flag(CcFlag::V));
        assert!(r.flag(CcFlag::N));

        assert_eq!(add8(&mut r, 0xFF, 0x01, false), 0x00);
        assert!(r.flag(CcFlag::C));
        assert!(r.flag(CcFlag::Z));
    }

    #[test]
    fn test_sub8_borrow() {
        let mut r = regs();
        assert_eq!(sub8(&mut r, 0x00, 0x01, false), 0xFF);
        assert!(r.flag(CcFlag::C));
        assert!(r.flag(CcFlag::N));
        assert!(!r.flag(CcFlag::V));

        assert_eq!(sub8(&mut r, 0x80, 0x01, false), 0x7F);
        assert!(r.flag(CcFlag::V));
        assert!(!r.flag(CcFlag::C));

        assert_eq!(sub8(&mut r, 0x05, 0x04, true), 0x00);
        assert!(r.flag(CcFlag::Z));
    }

    #[test]
    fn test_sub16_compare() {
        let mut r = regs();
        sub16(&mut r, 0x1000, 0x1000);
        assert!(r.flag(CcFlag::Z));
        sub16(&mut r, 0x0FFF, 0x1000);
        assert!(r.flag(CcFlag::C));
        assert!(r.flag(CcFlag::N));
    }

    #[test]
    fn test_neg() {
        let mut r = regs();
        assert_eq!(unary(&mut r, Unary::Neg, 0x80), 0x80);
        assert!(r.flag(CcFlag::V));
        assert!(r.flag(CcFlag::C));
        assert!(r.flag(CcFlag::N));
        assert!(!r.flag(CcFlag::Z));

        assert_eq!(unary(&mut r, Unary::Neg, 0x00), 0x00);
        assert!(!r.flag(CcFlag::C));
        assert!(r.flag(CcFlag::Z));
    }

    #[test]
    fn test_inc_dec_boundaries() {
        let mut r = regs();
        r.set_flag(CcFlag::C, true);
        assert_eq!(unary(&mut r, Unary::Inc, 0x7F), 0x80);
        assert!(r.flag(CcFlag::V));
        assert!(r.flag(CcFlag::C), "INC leaves C alone");

        assert_eq!(unary(&mut r, Unary::Dec, 0x80), 0x7F);
        assert!(r.flag(CcFlag::V));
        assert_eq!(unary(&mut r, Unary::Dec, 0x01), 0x00);
        assert!(!r.flag(CcFlag::V));
        assert!(r.flag(CcFlag::Z));
    }

    #[test]
    fn test_com_and_clr() {
        let mut r = regs();
        assert_eq!(unary(&mut r, Unary::Com, 0x0F), 0xF0);
        assert!(r.flag(CcFlag::C));
        assert!(!r.flag(CcFlag::V));
        assert!(r.flag(CcFlag::N));

        assert_eq!(unary(&mut r, Unary::Clr, 0x55), 0x00);
        assert_eq!(r.cc & 0x0F, CcFlag::Z as u8);
    }

    #[test]
    fn test_shifts() {
        let mut r = regs();
        assert_eq!(unary(&mut r, Unary::Asr, 0x81), 0xC0);
        assert!(r.flag(CcFlag::C));
        assert!(r.flag(CcFlag::N));

        assert_eq!(unary(&mut r, Unary::Lsr, 0x81), 0x40);
        assert!(r.flag(CcFlag::C));
        assert!(!r.flag(CcFlag::N));

        assert_eq!(unary(&mut r, Unary::Asl, 0x40), 0x80);
        assert!(r.flag(CcFlag::V));
        assert!(!r.flag(CcFlag::C));

        r.set_flag(CcFlag::C, true);
        assert_eq!(unary(&mut r, Unary::Rol, 0x80), 0x01);
        assert!(r.flag(CcFlag::C));

        r.set_flag(CcFlag::C, true);
        assert_eq!(unary(&mut r, Unary::Ror, 0x02), 0x81);
        assert!(!r.flag(CcFlag::C));
    }

    #[test]
    fn test_daa() {
        let mut r = regs();
        // 0x19 + 0x28 = 0x41 binary, 47 in BCD
        r.a = add8(&mut r, 0x19, 0x28, false);
        daa(&mut r);
        assert_eq!(r.a, 0x47);

        r.a = add8(&mut r, 0x99, 0x01, false);
        daa(&mut r);
        assert_eq!(r.a, 0x00);
        assert!(r.flag(CcFlag::C));
    }

    #[test]
    fn test_mul_and_sex() {
        let mut r = regs();
        r.a = 0x0C;
        r.b = 0x10;
        mul(&mut r);
        assert_eq!(r.d(), 0x00C0);
        assert!(r.flag(CcFlag::C));
        assert!(!r.flag(CcFlag::Z));

        r.b = 0x80;
        sex(&mut r);
        assert_eq!(r.d(), 0xFF80);
        assert!(r.flag(CcFlag::N));
    }

    proptest! {
        #[test]
        fn prop_add8_flags(a: u8, b: u8, carry: bool) {
            let mut r = regs();
            let result = add8(&mut r, a, b, carry);
            let raw = a as u16 + b as u16 + carry as u16;
            prop_assert_eq!(result, raw as u8);
            prop_assert_eq!(r.flag(CcFlag::Z), result == 0);
            prop_assert_eq!(r.flag(CcFlag::N), result & 0x80 != 0);
            prop_assert_eq!(r.flag(CcFlag::C), raw > 0xFF);
            prop_assert_eq!(r.flag(CcFlag::V), (a ^ result) & (b ^ result) & 0x80 != 0);
        }

        #[test]
        fn prop_sub8_matches_signed_math(a: u8, b: u8) {
            let mut r = regs();
            let result = sub8(&mut r, a, b, false);
            let signed = a as i8 as i16 - b as i8 as i16;
            prop_assert_eq!(result, a.wrapping_sub(b));
            prop_assert_eq!(r.flag(CcFlag::C), a < b);
            prop_assert_eq!(r.flag(CcFlag::V), !(-128..=127).contains(&signed));
        }

        #[test]
        fn prop_unary_nz(value: u8) {
            for op in [Unary::Neg, Unary::Com, Unary::Inc, Unary::Dec, Unary::Asl, Unary::Lsr] {
                let mut r = regs();
                let result = unary(&mut r, op, value);
                prop_assert_eq!(r.flag(CcFlag::Z), result == 0);
                prop_assert_eq!(r.flag(CcFlag::N), result & 0x80 != 0);
            }
        }
    }
}

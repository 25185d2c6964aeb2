//! Effective-address and operand resolution.
//!
//! - IMMEDIATE: the literal (or label) itself
//! - DIRECT: (DP << 8) | operand
//! - EXTENDED: the operand as a 16-bit address
//! - EXTENDED_INDIRECT: the word stored at the operand
//! - INDEXED: base register, auto inc/dec, signed offset, optional indirection
//!
//! All address arithmetic wraps at 64K.

use crate::asm::symbols::SymbolTable;
use crate::cpu::decode::{AddrMode, DecodeError, DecodedInstruction, IncrementMode, IndexedDetails, OffsetKind};
use crate::cpu::execute::{Cpu, CpuError};

impl Cpu {
    /// Resolve operand text (label or number).
    pub(crate) fn value(&self, text: &str, symbols: &SymbolTable) -> Result<i32, CpuError> {
        Ok(symbols.resolve(text)?)
    }

    /// Effective address of a memory-referencing instruction.
    ///
    /// INDEXED auto increment/decrement updates the index register.
    pub fn effective_address(
        &mut self,
        instr: &DecodedInstruction,
        symbols: &SymbolTable,
    ) -> Result<u16, CpuError> {
        match instr.mode {
            AddrMode::Direct => {
                let low = self.value(&instr.operand, symbols)? as u8;
                Ok(u16::from_be_bytes([self.regs.dp, low]))
            }
            AddrMode::Extended => Ok(self.value(&instr.operand, symbols)? as u16),
            AddrMode::ExtendedIndirect => {
                let pointer = self.value(&instr.operand, symbols)? as u16;
                Ok(self.mem.read_word(pointer))
            }
            AddrMode::Indexed => {
                let details = instr
                    .indexed
                    .as_ref()
                    .ok_or_else(|| DecodeError::MalformedOperand(instr.operand.clone()))?;
                self.indexed_address(details, symbols)
            }
            mode => Err(CpuError::IllegalMode {
                mnemonic: instr.mnemonic.clone(),
                mode,
            }),
        }
    }

    fn indexed_address(
        &mut self,
        details: &IndexedDetails,
        symbols: &SymbolTable,
    ) -> Result<u16, CpuError> {
        let reg = details.base.reg();
        let base = self.regs.get(reg);

        let mut addr = match details.increment {
            IncrementMode::None => base,
            IncrementMode::PreDec1 | IncrementMode::PreDec2 => {
                let step = if details.increment == IncrementMode::PreDec1 { 1 } else { 2 };
                let new = base.wrapping_sub(step);
                self.regs.set(reg, new);
                new
            }
            IncrementMode::PostInc1 | IncrementMode::PostInc2 => {
                let step = if details.increment == IncrementMode::PostInc1 { 1 } else { 2 };
                self.regs.set(reg, base.wrapping_add(step));
                base
            }
        };

        let offset: u16 = match details.kind {
            OffsetKind::None => 0,
            OffsetKind::Bits5 | OffsetKind::Bits8 | OffsetKind::Bits16 => {
                self.value(&details.offset, symbols)? as u16
            }
            OffsetKind::AccA => self.regs.a as i8 as u16,
            OffsetKind::AccB => self.regs.b as i8 as u16,
            OffsetKind::AccD => self.regs.d(),
        };
        addr = addr.wrapping_add(offset);

        if details.indirect {
            addr = self.mem.read_word(addr);
        }
        Ok(addr)
    }

    /// Read an 8-bit operand in any data-reading mode.
    pub fn read_operand8(
        &mut self,
        instr: &DecodedInstruction,
        symbols: &SymbolTable,
    ) -> Result<u8, CpuError> {
        match instr.mode {
            AddrMode::Immediate => Ok(self.value(&instr.operand, symbols)? as u8),
            _ => {
                let ea = self.effective_address(instr, symbols)?;
                Ok(self.mem.read(ea))
            }
        }
    }

    /// Read a 16-bit operand in any data-reading mode.
    pub fn read_operand16(
        &mut self,
        instr: &DecodedInstruction,
        symbols: &SymbolTable,
    ) -> Result<u16, CpuError> {
        match instr.mode {
            AddrMode::Immediate => Ok(self.value(&instr.operand, symbols)? as u16),
            _ => {
                let ea = self.effective_address(instr, symbols)?;
                Ok(self.mem.read_word(ea))
            }
        }
    }

    /// Absolute target of a RELATIVE instruction (label or address).
    pub fn branch_target(
        &self,
        instr: &DecodedInstruction,
        symbols: &SymbolTable,
    ) -> Result<u16, CpuError> {
        Ok(self.value(&instr.operand, symbols)? as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::decode::decode;

    fn ea(cpu: &mut Cpu, line: &str) -> u16 {
        let instr = decode(line).unwrap().unwrap();
        cpu.effective_address(&instr, &SymbolTable::new()).unwrap()
    }

    #[test]
    fn test_direct_uses_dp() {
        let mut cpu = Cpu::new();
        cpu.regs.dp = 0x03;
        assert_eq!(ea(&mut cpu, "LDA $10"), 0x0310);
        assert_eq!(ea(&mut cpu, "LDA <$FC22"), 0x0322);
    }

    #[test]
    fn test_extended_and_indirect() {
        let mut cpu = Cpu::new();
        cpu.mem.write_word(0x0040, 0xFC80);
        assert_eq!(ea(&mut cpu, "LDA $0040"), 0x0040);
        assert_eq!(ea(&mut cpu, "LDA [$0040]"), 0xFC80);
    }

    #[test]
    fn test_indexed_offsets() {
        let mut cpu = Cpu::new();
        cpu.regs.x = 0x0100;
        cpu.regs.a = 0xFF;
        cpu.regs.b = 0x10;
        assert_eq!(ea(&mut cpu, "LDA 5,X"), 0x0105);
        assert_eq!(ea(&mut cpu, "LDA -2,X"), 0x00FE);
        assert_eq!(ea(&mut cpu, "LDA A,X"), 0x00FF);
        assert_eq!(ea(&mut cpu, "LDA B,X"), 0x0110);
        assert_eq!(ea(&mut cpu, "LDA D,X"), 0x0010);
        assert_eq!(cpu.regs.x, 0x0100);
    }

    #[test]
    fn test_auto_increment_decrement() {
        let mut cpu = Cpu::new();
        cpu.regs.y = 0x0200;
        assert_eq!(ea(&mut cpu, "LDA ,Y+"), 0x0200);
        assert_eq!(cpu.regs.y, 0x0201);
        assert_eq!(ea(&mut cpu, "LDD ,Y++"), 0x0201);
        assert_eq!(cpu.regs.y, 0x0203);
        assert_eq!(ea(&mut cpu, "LDA ,-Y"), 0x0202);
        assert_eq!(cpu.regs.y, 0x0202);
        assert_eq!(ea(&mut cpu, "LDD ,--Y"), 0x0200);
        assert_eq!(cpu.regs.y, 0x0200);
    }

    #[test]
    fn test_indexed_wraps_and_indirect() {
        let mut cpu = Cpu::new();
        cpu.regs.u = 0x0000;
        assert_eq!(ea(&mut cpu, "LDA ,-U"), 0xFFFF);
        assert_eq!(cpu.regs.u, 0xFFFF);

        cpu.regs.x = 0x0010;
        cpu.mem.write_word(0x0012, 0x0300);
        assert_eq!(ea(&mut cpu, "LDA [2,X]"), 0x0300);
    }

    #[test]
    fn test_immediate_has_no_address() {
        let mut cpu = Cpu::new();
        let instr = decode("LDA #1").unwrap().unwrap();
        assert!(matches!(
            cpu.effective_address(&instr, &SymbolTable::new()),
            Err(CpuError::IllegalMode { .. })
        ));
        assert_eq!(cpu.read_operand8(&instr, &SymbolTable::new()).unwrap(), 1);
    }
}

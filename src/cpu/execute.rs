//! Instruction semantics for the 6809.
//!
//! Execution works on decoded source lines rather than fetched bytes:
//! the caller places PC at the instruction's address, [`Cpu::execute`]
//! advances it past the instruction, applies the semantics, and reports
//! whether control flow left the straight-line path.
//!
//! Dispatch goes through the metadata table in [`crate::cpu::opcodes`],
//! so each semantic group has exactly one handler.

use crate::asm::symbols::{SymbolTable, ValueError};
use crate::config::SimConfig;
use crate::cpu::alu;
use crate::cpu::decode::{self, AddrMode, DecodeError, DecodedInstruction};
use crate::cpu::emit;
use crate::cpu::memory::AddressSpace;
use crate::cpu::opcodes::{self, Cond, Op, Unary};
use crate::cpu::registers::{CcFlag, Reg, Registers};
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// How an instruction left the program counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// PC moved past the instruction.
    Next,
    /// PC was loaded with a new value (taken branch, jump, call, return,
    /// or a transfer/pull into PC).
    Jump(u16),
}

/// The 6809 CPU: register file plus the address space it owns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cpu {
    pub regs: Registers,
    pub mem: AddressSpace,
    /// Instructions executed since the last reset.
    pub executed: u64,
}

impl Cpu {
    /// Power-on CPU with the stock memory map.
    pub fn new() -> Self {
        Self::with_config(&SimConfig::default())
    }

    pub fn with_config(config: &SimConfig) -> Self {
        Self {
            regs: Registers::with_reset_pc(config.reset_pc),
            mem: AddressSpace::with_regions(config.ram, config.rom),
            executed: 0,
        }
    }

    /// Reset registers to the power-on state. Memory is kept.
    pub fn reset(&mut self, reset_pc: u16) {
        self.regs.reset(reset_pc);
        self.executed = 0;
    }

    /// Execute one decoded instruction located at the current PC.
    pub fn execute(
        &mut self,
        instr: &DecodedInstruction,
        symbols: &SymbolTable,
    ) -> Result<Flow, CpuError> {
        let info = opcodes::lookup(&instr.mnemonic)
            .ok_or_else(|| CpuError::Unsupported(instr.mnemonic.clone()))?;
        let size = emit::size_for(info, instr).ok_or_else(|| CpuError::IllegalMode {
            mnemonic: instr.mnemonic.clone(),
            mode: instr.mode,
        })?;

        log::trace!("${:04X}  {}", self.regs.pc, instr);

        self.regs.pc = self.regs.pc.wrapping_add(size);
        let flow = self.dispatch(info.op, instr, symbols)?;
        if let Flow::Jump(target) = flow {
            self.regs.pc = target;
        }
        self.executed += 1;
        Ok(flow)
    }

    fn dispatch(
        &mut self,
        op: Op,
        instr: &DecodedInstruction,
        symbols: &SymbolTable,
    ) -> Result<Flow, CpuError> {
        match op {
            // ==================== Loads / stores ====================
            Op::Load(r) => {
                if r.is_wide() {
                    let value = self.read_operand16(instr, symbols)?;
                    self.regs.set(r, value);
                    alu::set_flags_logical16(&mut self.regs, value);
                } else {
                    let value = self.read_operand8(instr, symbols)?;
                    self.regs.set(r, value as u16);
                    alu::set_flags_logical(&mut self.regs, value);
                }
            }

            Op::Store(r) => {
                let ea = self.effective_address(instr, symbols)?;
                let value = self.regs.get(r);
                if r.is_wide() {
                    self.mem.write_word(ea, value);
                    alu::set_flags_logical16(&mut self.regs, value);
                } else {
                    self.mem.write(ea, value as u8);
                    alu::set_flags_logical(&mut self.regs, value as u8);
                }
            }

            Op::Lea(r) => {
                let ea = self.effective_address(instr, symbols)?;
                self.regs.set(r, ea);
                if matches!(r, Reg::X | Reg::Y) {
                    self.regs.set_flag(CcFlag::Z, ea == 0);
                }
            }

            // ==================== Arithmetic ====================
            Op::Add(r) | Op::AddCarry(r) => {
                if r.is_wide() {
                    let operand = self.read_operand16(instr, symbols)?;
                    let current = self.regs.get(r);
                    let result = alu::add16(&mut self.regs, current, operand);
                    self.regs.set(r, result);
                } else {
                    let carry = matches!(op, Op::AddCarry(_)) && self.regs.flag(CcFlag::C);
                    let operand = self.read_operand8(instr, symbols)?;
                    let a = self.regs.get(r) as u8;
                    let result = alu::add8(&mut self.regs, a, operand, carry);
                    self.regs.set(r, result as u16);
                }
            }

            Op::Sub(r) | Op::SubCarry(r) | Op::Compare(r) => {
                let store = !matches!(op, Op::Compare(_));
                if r.is_wide() {
                    let operand = self.read_operand16(instr, symbols)?;
                    let current = self.regs.get(r);
                    let result = alu::sub16(&mut self.regs, current, operand);
                    if store {
                        self.regs.set(r, result);
                    }
                } else {
                    let borrow = matches!(op, Op::SubCarry(_)) && self.regs.flag(CcFlag::C);
                    let operand = self.read_operand8(instr, symbols)?;
                    let a = self.regs.get(r) as u8;
                    let result = alu::sub8(&mut self.regs, a, operand, borrow);
                    if store {
                        self.regs.set(r, result as u16);
                    }
                }
            }

            // ==================== Logical ====================
            Op::And(r) | Op::Or(r) | Op::Eor(r) | Op::Bit(r) => {
                let operand = self.read_operand8(instr, symbols)?;
                let a = self.regs.get(r) as u8;
                let result = match op {
                    Op::Or(_) => a | operand,
                    Op::Eor(_) => a ^ operand,
                    _ => a & operand,
                };
                if !matches!(op, Op::Bit(_)) {
                    self.regs.set(r, result as u16);
                }
                alu::set_flags_logical(&mut self.regs, result);
            }

            Op::AndCc => {
                let mask = self.read_operand8(instr, symbols)?;
                self.regs.cc &= mask;
            }

            Op::OrCc => {
                let mask = self.read_operand8(instr, symbols)?;
                self.regs.cc |= mask;
            }

            // ==================== Read-modify-write ====================
            Op::Unary(kind, Some(r)) => {
                let value = self.regs.get(r) as u8;
                let result = alu::unary(&mut self.regs, kind, value);
                if kind != Unary::Tst {
                    self.regs.set(r, result as u16);
                }
            }

            Op::Unary(kind, None) => {
                let ea = self.effective_address(instr, symbols)?;
                let value = self.mem.read(ea);
                let result = alu::unary(&mut self.regs, kind, value);
                if kind != Unary::Tst {
                    self.mem.write(ea, result);
                }
            }

            // ==================== Control flow ====================
            Op::Branch(cond) => {
                let target = self.branch_target(instr, symbols)?;
                if condition_holds(cond, &self.regs) {
                    return Ok(Flow::Jump(target));
                }
            }

            Op::Bsr => {
                let target = self.branch_target(instr, symbols)?;
                self.push_word(Reg::S, self.regs.pc);
                return Ok(Flow::Jump(target));
            }

            Op::Jmp => {
                let target = self.effective_address(instr, symbols)?;
                return Ok(Flow::Jump(target));
            }

            Op::Jsr => {
                let target = self.effective_address(instr, symbols)?;
                self.push_word(Reg::S, self.regs.pc);
                return Ok(Flow::Jump(target));
            }

            Op::Rts => {
                let target = self.pull_word(Reg::S);
                return Ok(Flow::Jump(target));
            }

            Op::Rti => {
                self.regs.cc = self.pull_byte(Reg::S);
                self.regs.a = self.pull_byte(Reg::S);
                self.regs.b = self.pull_byte(Reg::S);
                self.regs.dp = self.pull_byte(Reg::S);
                self.regs.x = self.pull_word(Reg::S);
                self.regs.y = self.pull_word(Reg::S);
                self.regs.u = self.pull_word(Reg::S);
                let target = self.pull_word(Reg::S);
                return Ok(Flow::Jump(target));
            }

            // ==================== Stack / registers ====================
            Op::Push(stack) => {
                let mask = decode::parse_register_mask(&instr.operand, stack)?;
                self.push_registers(stack, mask);
            }

            Op::Pull(stack) => {
                let mask = decode::parse_register_mask(&instr.operand, stack)?;
                self.pull_registers(stack, mask);
                if mask & 0x80 != 0 {
                    return Ok(Flow::Jump(self.regs.pc));
                }
            }

            Op::Tfr => {
                let (src, dst) = decode::parse_register_pair(&instr.operand)?;
                let value = transfer_value(self.regs.get(src), src, dst);
                self.regs.set(dst, value);
                if dst == Reg::Pc {
                    return Ok(Flow::Jump(value));
                }
            }

            Op::Exg => {
                let (r1, r2) = decode::parse_register_pair(&instr.operand)?;
                let v1 = self.regs.get(r1);
                let v2 = self.regs.get(r2);
                self.regs.set(r1, transfer_value(v2, r2, r1));
                self.regs.set(r2, transfer_value(v1, r1, r2));
                if r1 == Reg::Pc || r2 == Reg::Pc {
                    return Ok(Flow::Jump(self.regs.pc));
                }
            }

            // ==================== Miscellaneous ====================
            Op::Abx => self.regs.x = self.regs.x.wrapping_add(self.regs.b as u16),
            Op::Mul => alu::mul(&mut self.regs),
            Op::Sex => alu::sex(&mut self.regs),
            Op::Daa => alu::daa(&mut self.regs),
            Op::Nop | Op::Interrupt => {}
        }

        Ok(Flow::Next)
    }

    // ==================== Stack helpers ====================

    /// Push one byte: decrement the stack pointer, then write.
    pub fn push_byte(&mut self, stack: Reg, value: u8) {
        let sp = self.regs.get(stack).wrapping_sub(1);
        self.regs.set(stack, sp);
        self.mem.write(sp, value);
    }

    /// Push a word, low byte first, so it sits big-endian in memory.
    pub fn push_word(&mut self, stack: Reg, value: u16) {
        let [hi, lo] = value.to_be_bytes();
        self.push_byte(stack, lo);
        self.push_byte(stack, hi);
    }

    /// Pull one byte: read, then increment the stack pointer.
    pub fn pull_byte(&mut self, stack: Reg) -> u8 {
        let sp = self.regs.get(stack);
        let value = self.mem.read(sp);
        self.regs.set(stack, sp.wrapping_add(1));
        value
    }

    pub fn pull_word(&mut self, stack: Reg) -> u16 {
        let hi = self.pull_byte(stack);
        let lo = self.pull_byte(stack);
        u16::from_be_bytes([hi, lo])
    }

    /// Push the registers selected by `mask` in PC, U/S, Y, X, DP, B, A, CC
    /// order. Bit $40 names the other stack pointer.
    fn push_registers(&mut self, stack: Reg, mask: u8) {
        let other = other_stack(stack);
        if mask & 0x80 != 0 { self.push_word(stack, self.regs.pc); }
        if mask & 0x40 != 0 { self.push_word(stack, self.regs.get(other)); }
        if mask & 0x20 != 0 { self.push_word(stack, self.regs.y); }
        if mask & 0x10 != 0 { self.push_word(stack, self.regs.x); }
        if mask & 0x08 != 0 { self.push_byte(stack, self.regs.dp); }
        if mask & 0x04 != 0 { self.push_byte(stack, self.regs.b); }
        if mask & 0x02 != 0 { self.push_byte(stack, self.regs.a); }
        if mask & 0x01 != 0 { self.push_byte(stack, self.regs.cc); }
    }

    /// Pull in the reverse of the push order.
    fn pull_registers(&mut self, stack: Reg, mask: u8) {
        if mask & 0x01 != 0 { self.regs.cc = self.pull_byte(stack); }
        if mask & 0x02 != 0 { self.regs.a = self.pull_byte(stack); }
        if mask & 0x04 != 0 { self.regs.b = self.pull_byte(stack); }
        if mask & 0x08 != 0 { self.regs.dp = self.pull_byte(stack); }
        if mask & 0x10 != 0 { self.regs.x = self.pull_word(stack); }
        if mask & 0x20 != 0 { self.regs.y = self.pull_word(stack); }
        if mask & 0x40 != 0 {
            let value = self.pull_word(stack);
            self.regs.set(other_stack(stack), value);
        }
        if mask & 0x80 != 0 { self.regs.pc = self.pull_word(stack); }
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

fn other_stack(stack: Reg) -> Reg {
    if stack == Reg::S { Reg::U } else { Reg::S }
}

/// Value moved by TFR/EXG between registers of possibly different widths:
/// 8 → 16 fills the high byte with $FF, 16 → 8 keeps the low byte.
fn transfer_value(value: u16, src: Reg, dst: Reg) -> u16 {
    match (src.is_wide(), dst.is_wide()) {
        (false, true) => 0xFF00 | (value & 0xFF),
        _ => value,
    }
}

/// Evaluate a branch condition against CC.
pub fn condition_holds(cond: Cond, regs: &Registers) -> bool {
    let n = regs.flag(CcFlag::N);
    let z = regs.flag(CcFlag::Z);
    let v = regs.flag(CcFlag::V);
    let c = regs.flag(CcFlag::C);
    match cond {
        Cond::Always => true,
        Cond::Never => false,
        Cond::Hi => !c && !z,
        Cond::Ls => c || z,
        Cond::CarryClear => !c,
        Cond::CarrySet => c,
        Cond::Ne => !z,
        Cond::Eq => z,
        Cond::Vc => !v,
        Cond::Vs => v,
        Cond::Pl => !n,
        Cond::Mi => n,
        Cond::Ge => n == v,
        Cond::Lt => n != v,
        Cond::Gt => !z && n == v,
        Cond::Le => z || n != v,
    }
}

/// Errors raised while executing an instruction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpuError {
    #[error("unsupported instruction '{0}'")]
    Unsupported(String),

    #[error("{mnemonic} does not support {mode} addressing")]
    IllegalMode { mnemonic: String, mode: AddrMode },

    #[error("undefined symbol '{0}'")]
    UndefinedSymbol(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl From<ValueError> for CpuError {
    fn from(e: ValueError) -> Self {
        match e {
            ValueError::Undefined(name) => CpuError::UndefinedSymbol(name),
            ValueError::Decode(e) => CpuError::Decode(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::decode::decode;

    /// Execute lines back to back, placing PC as the assembler would.
    fn run_lines(cpu: &mut Cpu, symbols: &SymbolTable, lines: &[&str]) -> Vec<Flow> {
        lines
            .iter()
            .map(|line| {
                let instr = decode(line).unwrap().unwrap();
                cpu.execute(&instr, symbols).unwrap()
            })
            .collect()
    }

    fn run(lines: &[&str]) -> Cpu {
        let mut cpu = Cpu::new();
        run_lines(&mut cpu, &SymbolTable::new(), lines);
        cpu
    }

    #[test]
    fn test_load_store() {
        let cpu = run(&["LDA #$05", "STA $00"]);
        assert_eq!(cpu.regs.a, 0x05);
        assert_eq!(cpu.mem.read(0x0000), 0x05);
        assert!(!cpu.regs.flag(CcFlag::Z));
        assert!(!cpu.regs.flag(CcFlag::N));
        assert_eq!(cpu.regs.pc, 0xFC04);
        assert_eq!(cpu.executed, 2);
    }

    #[test]
    fn test_sixteen_bit_load_store() {
        let cpu = run(&["LDD #$8001", "STD $0010", "LDX $0010"]);
        assert_eq!(cpu.regs.d(), 0x8001);
        assert_eq!(cpu.regs.x, 0x8001);
        assert!(cpu.regs.flag(CcFlag::N));
        assert_eq!(cpu.mem.read_word(0x0010), 0x8001);
    }

    #[test]
    fn test_nega_of_80() {
        let cpu = run(&["LDA #$80", "NEGA"]);
        assert_eq!(cpu.regs.a, 0x80);
        assert!(cpu.regs.flag(CcFlag::V));
        assert!(cpu.regs.flag(CcFlag::C));
        assert!(cpu.regs.flag(CcFlag::N));
        assert!(!cpu.regs.flag(CcFlag::Z));
    }

    #[test]
    fn test_add_and_compare() {
        let cpu = run(&["LDA #$F0", "ADDA #$20", "CMPA #$10"]);
        assert_eq!(cpu.regs.a, 0x10);
        assert!(cpu.regs.flag(CcFlag::Z));
        assert!(!cpu.regs.flag(CcFlag::C));

        let cpu = run(&["LDD #$00FF", "ADDD #$0001", "SUBD #$0100"]);
        assert_eq!(cpu.regs.d(), 0);
        assert!(cpu.regs.flag(CcFlag::Z));
    }

    #[test]
    fn test_adc_sbc_chain() {
        let cpu = run(&["LDA #$FF", "ADDA #$01", "LDB #$00", "ADCB #$00"]);
        assert_eq!(cpu.regs.b, 0x01);

        let cpu = run(&["LDA #$00", "SUBA #$01", "LDB #$05", "SBCB #$00"]);
        assert_eq!(cpu.regs.b, 0x04);
    }

    #[test]
    fn test_logical_and_cc() {
        let cpu = run(&["LDA #$F0", "ANDA #$3C", "ORA #$01", "EORA #$FF"]);
        assert_eq!(cpu.regs.a, !0x31u8);

        let cpu = run(&["LDB #$80", "BITB #$80"]);
        assert_eq!(cpu.regs.b, 0x80);
        assert!(cpu.regs.flag(CcFlag::N));

        let cpu = run(&["ORCC #$50", "ANDCC #$EF"]);
        assert_eq!(cpu.regs.cc, 0x44);
    }

    #[test]
    fn test_memory_rmw() {
        let mut cpu = Cpu::new();
        cpu.mem.write(0x0020, 0x7F);
        run_lines(&mut cpu, &SymbolTable::new(), &["INC $20", "TST $20"]);
        assert_eq!(cpu.mem.read(0x0020), 0x80);
        assert!(cpu.regs.flag(CcFlag::N));
        assert!(!cpu.regs.flag(CcFlag::V));

        run_lines(&mut cpu, &SymbolTable::new(), &["CLR $20"]);
        assert_eq!(cpu.mem.read(0x0020), 0);
        assert!(cpu.regs.flag(CcFlag::Z));
    }

    #[test]
    fn test_branch_taken_and_not_taken() {
        let mut symbols = SymbolTable::new();
        symbols.add_label("TARGET", 0xFC40);
        let mut cpu = Cpu::new();

        let flows = run_lines(&mut cpu, &symbols, &["LDA #0", "BEQ TARGET"]);
        assert_eq!(flows[1], Flow::Jump(0xFC40));
        assert_eq!(cpu.regs.pc, 0xFC40);

        let flows = run_lines(&mut cpu, &symbols, &["LDA #1", "BEQ TARGET"]);
        assert_eq!(flows[1], Flow::Next);
        assert_eq!(cpu.regs.pc, 0xFC44);
    }

    #[test]
    fn test_signed_conditions() {
        let mut regs = Registers::new();
        regs.cc = 0;
        assert!(condition_holds(Cond::Gt, &regs));
        assert!(condition_holds(Cond::Ge, &regs));
        regs.set_flag(CcFlag::N, true);
        assert!(condition_holds(Cond::Lt, &regs));
        assert!(condition_holds(Cond::Le, &regs));
        regs.set_flag(CcFlag::V, true);
        assert!(condition_holds(Cond::Ge, &regs));
        regs.set_flag(CcFlag::C, true);
        assert!(condition_holds(Cond::Ls, &regs));
        assert!(!condition_holds(Cond::Hi, &regs));
    }

    #[test]
    fn test_jsr_rts() {
        let mut symbols = SymbolTable::new();
        symbols.add_label("SUB", 0xFC80);
        let mut cpu = Cpu::new();
        cpu.regs.s = 0x0100;

        let flows = run_lines(&mut cpu, &symbols, &["JSR SUB"]);
        assert_eq!(flows[0], Flow::Jump(0xFC80));
        assert_eq!(cpu.regs.s, 0x00FE);
        assert_eq!(cpu.mem.read_word(0x00FE), 0xFC03);

        let flows = run_lines(&mut cpu, &symbols, &["RTS"]);
        assert_eq!(flows[0], Flow::Jump(0xFC03));
        assert_eq!(cpu.regs.s, 0x0100);
    }

    #[test]
    fn test_bsr_pushes_return_address() {
        let mut symbols = SymbolTable::new();
        symbols.add_label("SUB", 0xFC10);
        let mut cpu = Cpu::new();
        cpu.regs.s = 0x0200;
        run_lines(&mut cpu, &symbols, &["BSR SUB"]);
        assert_eq!(cpu.regs.pc, 0xFC10);
        assert_eq!(cpu.mem.read_word(0x01FE), 0xFC02);
    }

    #[test]
    fn test_push_pull_round_trip() {
        let mut cpu = Cpu::new();
        cpu.regs.s = 0x0300;
        cpu.regs.a = 0x11;
        cpu.regs.b = 0x22;
        cpu.regs.x = 0x3344;

        run_lines(&mut cpu, &SymbolTable::new(), &["PSHS A,B,X"]);
        assert_eq!(cpu.regs.s, 0x02FC);
        // X high, X low, B, A from high to low addresses
        assert_eq!(cpu.mem.read(0x02FC), 0x11);
        assert_eq!(cpu.mem.read(0x02FD), 0x22);
        assert_eq!(cpu.mem.read_word(0x02FE), 0x3344);

        cpu.regs.a = 0;
        cpu.regs.b = 0;
        cpu.regs.x = 0;
        run_lines(&mut cpu, &SymbolTable::new(), &["PULS A,B,X"]);
        assert_eq!(cpu.regs.a, 0x11);
        assert_eq!(cpu.regs.b, 0x22);
        assert_eq!(cpu.regs.x, 0x3344);
        assert_eq!(cpu.regs.s, 0x0300);
    }

    #[test]
    fn test_pshu_saves_s() {
        let mut cpu = Cpu::new();
        cpu.regs.u = 0x0100;
        cpu.regs.s = 0xBEEF;
        run_lines(&mut cpu, &SymbolTable::new(), &["PSHU S"]);
        assert_eq!(cpu.regs.u, 0x00FE);
        assert_eq!(cpu.mem.read_word(0x00FE), 0xBEEF);
    }

    #[test]
    fn test_rti_pulls_everything() {
        let mut cpu = Cpu::new();
        cpu.regs.s = 0x0100;
        cpu.regs.a = 1;
        cpu.regs.b = 2;
        cpu.regs.x = 0x1234;
        cpu.regs.cc = 0x80;
        let flows = run_lines(&mut cpu, &SymbolTable::new(), &["PSHS CC,A,B,DP,X,Y,U,PC"]);
        assert_eq!(flows[0], Flow::Next);
        let saved_pc = cpu.regs.pc;

        cpu.regs.a = 0;
        cpu.regs.x = 0;
        let flows = run_lines(&mut cpu, &SymbolTable::new(), &["RTI"]);
        assert_eq!(flows[0], Flow::Jump(saved_pc));
        assert_eq!(cpu.regs.a, 1);
        assert_eq!(cpu.regs.x, 0x1234);
        assert_eq!(cpu.regs.s, 0x0100);
    }

    #[test]
    fn test_tfr_exg() {
        let cpu = run(&["LDX #$1234", "TFR X,Y", "LDA #$7F", "TFR A,DP"]);
        assert_eq!(cpu.regs.y, 0x1234);
        assert_eq!(cpu.regs.dp, 0x7F);

        let cpu = run(&["LDA #1", "LDB #2", "EXG A,B"]);
        assert_eq!((cpu.regs.a, cpu.regs.b), (2, 1));

        let cpu = run(&["LDB #$05", "TFR B,X"]);
        assert_eq!(cpu.regs.x, 0xFF05);
    }

    #[test]
    fn test_lea() {
        let cpu = run(&["LDX #$0010", "LEAX -$10,X"]);
        assert_eq!(cpu.regs.x, 0);
        assert!(cpu.regs.flag(CcFlag::Z));

        let cpu = run(&["LDS #$0200", "LEAS -2,S"]);
        assert_eq!(cpu.regs.s, 0x01FE);
    }

    #[test]
    fn test_misc_ops() {
        let cpu = run(&["LDA #$10", "LDB #$10", "MUL"]);
        assert_eq!(cpu.regs.d(), 0x0100);

        let cpu = run(&["LDX #$0100", "LDB #$FF", "ABX"]);
        assert_eq!(cpu.regs.x, 0x01FF);

        let cpu = run(&["LDB #$FE", "SEX"]);
        assert_eq!(cpu.regs.d(), 0xFFFE);

        let cpu = run(&["NOP", "SWI", "SYNC"]);
        assert_eq!(cpu.regs.pc, 0xFC03);
    }

    #[test]
    fn test_extended_indirect_jump() {
        let mut cpu = Cpu::new();
        cpu.mem.write_word(0xFFFE, 0xFC20);
        let flows = run_lines(&mut cpu, &SymbolTable::new(), &["JMP [$FFFE]"]);
        assert_eq!(flows[0], Flow::Jump(0xFC20));
    }

    #[test]
    fn test_errors() {
        let mut cpu = Cpu::new();
        let s = SymbolTable::new();

        let instr = decode("FOO #1").unwrap().unwrap();
        assert_eq!(cpu.execute(&instr, &s), Err(CpuError::Unsupported("FOO".into())));

        let instr = decode("STA #1").unwrap().unwrap();
        assert!(matches!(cpu.execute(&instr, &s), Err(CpuError::IllegalMode { .. })));

        let instr = decode("JMP NOWHERE").unwrap().unwrap();
        assert_eq!(cpu.execute(&instr, &s), Err(CpuError::UndefinedSymbol("NOWHERE".into())));
    }
}

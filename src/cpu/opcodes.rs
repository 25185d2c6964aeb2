//! Instruction metadata table.
//!
//! One entry per mnemonic carries everything the rest of the crate needs:
//! - the semantic group the executor dispatches on
//! - the operand width (immediate data, branch displacement, or postbyte)
//! - the opcode for each addressing mode the instruction supports
//!
//! Opcodes above $FF include a $10 or $11 page prefix. Instruction sizes
//! are derived from this table only (see [`crate::cpu::emit::instruction_size`]).

use crate::cpu::decode::AddrMode;
use crate::cpu::registers::Reg;

/// Width of an instruction's trailing operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    /// No operand bytes beyond the addressing mode's own.
    None,
    /// One byte: 8-bit immediate, short displacement, or a postbyte.
    Byte,
    /// Two bytes: 16-bit immediate or long displacement.
    Word,
}

impl Width {
    pub fn bytes(self) -> u16 {
        match self {
            Width::None => 0,
            Width::Byte => 1,
            Width::Word => 2,
        }
    }
}

/// Single-operand read-modify-write operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unary {
    Neg,
    Com,
    Lsr,
    Ror,
    Asr,
    Asl,
    Rol,
    Dec,
    Inc,
    Tst,
    Clr,
}

/// Branch conditions over N, Z, V, C.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cond {
    Always,
    Never,
    Hi,
    Ls,
    CarryClear,
    CarrySet,
    Ne,
    Eq,
    Vc,
    Vs,
    Pl,
    Mi,
    Ge,
    Lt,
    Gt,
    Le,
}

/// Semantic group of an instruction.
///
/// Register-parameterised variants cover the whole A/B/D/X/Y/U/S family
/// with a single handler in the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Load(Reg),
    Store(Reg),
    Lea(Reg),
    Compare(Reg),
    Add(Reg),
    AddCarry(Reg),
    Sub(Reg),
    SubCarry(Reg),
    And(Reg),
    Or(Reg),
    Eor(Reg),
    Bit(Reg),
    AndCc,
    OrCc,
    /// Unary op on A, B, or memory (`None`).
    Unary(Unary, Option<Reg>),
    Branch(Cond),
    Bsr,
    Jmp,
    Jsr,
    Rts,
    Rti,
    /// Push onto the given stack (S or U).
    Push(Reg),
    Pull(Reg),
    Tfr,
    Exg,
    Abx,
    Mul,
    Sex,
    Daa,
    Nop,
    /// SWI, SWI2, SWI3, CWAI and SYNC: accepted, no interrupt delivery.
    Interrupt,
}

/// Metadata for one mnemonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpInfo {
    pub mnemonic: &'static str,
    pub op: Op,
    pub width: Width,
    pub inherent: Option<u16>,
    pub immediate: Option<u16>,
    pub direct: Option<u16>,
    pub indexed: Option<u16>,
    pub extended: Option<u16>,
    pub relative: Option<u16>,
}

impl OpInfo {
    const fn blank(mnemonic: &'static str, op: Op, width: Width) -> Self {
        Self {
            mnemonic,
            op,
            width,
            inherent: None,
            immediate: None,
            direct: None,
            indexed: None,
            extended: None,
            relative: None,
        }
    }

    /// Opcode for an addressing mode, if the instruction supports it.
    ///
    /// EXTENDED_INDIRECT shares the indexed opcode (postbyte $9F).
    pub fn opcode(&self, mode: AddrMode) -> Option<u16> {
        match mode {
            AddrMode::Inherent => self.inherent,
            AddrMode::Immediate => self.immediate,
            AddrMode::Direct => self.direct,
            AddrMode::Extended => self.extended,
            AddrMode::Indexed | AddrMode::ExtendedIndirect => self.indexed,
            AddrMode::Relative => self.relative,
        }
    }

    /// All addressing modes this instruction can be encoded in.
    pub fn modes(&self) -> Vec<AddrMode> {
        AddrMode::ALL
            .iter()
            .copied()
            .filter(|&m| self.opcode(m).is_some())
            .collect()
    }

    /// True for RELATIVE-only instructions (branches, BSR, LBSR).
    pub fn is_branch(&self) -> bool {
        self.relative.is_some()
    }

    /// True for instructions whose inherent form carries a postbyte
    /// (stack register masks and TFR/EXG register pairs).
    pub fn has_postbyte(&self) -> bool {
        self.inherent.is_some() && self.width == Width::Byte
    }
}

/// Number of bytes taken by an opcode (2 with a page prefix).
#[inline]
pub fn opcode_len(opcode: u16) -> u16 {
    if opcode > 0xFF { 2 } else { 1 }
}

/// Immediate/direct/indexed/extended, opcodes spaced by $10.
const fn general(m: &'static str, op: Op, width: Width, imm: u16) -> OpInfo {
    let mut i = OpInfo::blank(m, op, width);
    i.immediate = Some(imm);
    i.direct = Some(imm + 0x10);
    i.indexed = Some(imm + 0x20);
    i.extended = Some(imm + 0x30);
    i
}

/// Direct/indexed/extended only (stores, JSR).
const fn memory(m: &'static str, op: Op, width: Width, dir: u16) -> OpInfo {
    let mut i = OpInfo::blank(m, op, width);
    i.direct = Some(dir);
    i.indexed = Some(dir + 0x10);
    i.extended = Some(dir + 0x20);
    i
}

/// Read-modify-write on memory: direct $0n, indexed $6n, extended $7n.
const fn rmw(m: &'static str, op: Op, n: u16) -> OpInfo {
    let mut i = OpInfo::blank(m, op, Width::Byte);
    i.direct = Some(n);
    i.indexed = Some(0x60 + n);
    i.extended = Some(0x70 + n);
    i
}

const fn inherent(m: &'static str, op: Op, code: u16) -> OpInfo {
    let mut i = OpInfo::blank(m, op, Width::None);
    i.inherent = Some(code);
    i
}

/// Inherent with a postbyte (PSHS/PULS/PSHU/PULU, TFR/EXG).
const fn postbyte(m: &'static str, op: Op, code: u16) -> OpInfo {
    let mut i = OpInfo::blank(m, op, Width::Byte);
    i.inherent = Some(code);
    i
}

const fn immediate(m: &'static str, op: Op, code: u16) -> OpInfo {
    let mut i = OpInfo::blank(m, op, Width::Byte);
    i.immediate = Some(code);
    i
}

const fn indexed(m: &'static str, op: Op, code: u16) -> OpInfo {
    let mut i = OpInfo::blank(m, op, Width::None);
    i.indexed = Some(code);
    i
}

const fn short(m: &'static str, op: Op, code: u16) -> OpInfo {
    let mut i = OpInfo::blank(m, op, Width::Byte);
    i.relative = Some(code);
    i
}

/// Long branch with a 16-bit displacement. LBRA ($16) and LBSR ($17) are
/// 3 bytes; the conditional forms carry a $10 page prefix and take 4.
const fn long(m: &'static str, op: Op, code: u16) -> OpInfo {
    let mut i = OpInfo::blank(m, op, Width::Word);
    i.relative = Some(code);
    i
}

use Reg::{A, B, D, S, U, X, Y};
use Width::{Byte, Word};

/// The instruction set.
pub static TABLE: &[OpInfo] = &[
    // ==================== Loads / stores ====================
    general("LDA", Op::Load(A), Byte, 0x86),
    general("LDB", Op::Load(B), Byte, 0xC6),
    general("LDD", Op::Load(D), Word, 0xCC),
    general("LDX", Op::Load(X), Word, 0x8E),
    general("LDU", Op::Load(U), Word, 0xCE),
    general("LDY", Op::Load(Y), Word, 0x108E),
    general("LDS", Op::Load(S), Word, 0x10CE),
    memory("STA", Op::Store(A), Byte, 0x97),
    memory("STB", Op::Store(B), Byte, 0xD7),
    memory("STD", Op::Store(D), Word, 0xDD),
    memory("STX", Op::Store(X), Word, 0x9F),
    memory("STU", Op::Store(U), Word, 0xDF),
    memory("STY", Op::Store(Y), Word, 0x109F),
    memory("STS", Op::Store(S), Word, 0x10DF),
    indexed("LEAX", Op::Lea(X), 0x30),
    indexed("LEAY", Op::Lea(Y), 0x31),
    indexed("LEAS", Op::Lea(S), 0x32),
    indexed("LEAU", Op::Lea(U), 0x33),
    // ==================== Arithmetic ====================
    general("ADDA", Op::Add(A), Byte, 0x8B),
    general("ADDB", Op::Add(B), Byte, 0xCB),
    general("ADDD", Op::Add(D), Word, 0xC3),
    general("ADCA", Op::AddCarry(A), Byte, 0x89),
    general("ADCB", Op::AddCarry(B), Byte, 0xC9),
    general("SUBA", Op::Sub(A), Byte, 0x80),
    general("SUBB", Op::Sub(B), Byte, 0xC0),
    general("SUBD", Op::Sub(D), Word, 0x83),
    general("SBCA", Op::SubCarry(A), Byte, 0x82),
    general("SBCB", Op::SubCarry(B), Byte, 0xC2),
    general("CMPA", Op::Compare(A), Byte, 0x81),
    general("CMPB", Op::Compare(B), Byte, 0xC1),
    general("CMPD", Op::Compare(D), Word, 0x1083),
    general("CMPX", Op::Compare(X), Word, 0x8C),
    general("CMPY", Op::Compare(Y), Word, 0x108C),
    general("CMPU", Op::Compare(U), Word, 0x1183),
    general("CMPS", Op::Compare(S), Word, 0x118C),
    // ==================== Logical ====================
    general("ANDA", Op::And(A), Byte, 0x84),
    general("ANDB", Op::And(B), Byte, 0xC4),
    general("ORA", Op::Or(A), Byte, 0x8A),
    general("ORB", Op::Or(B), Byte, 0xCA),
    general("EORA", Op::Eor(A), Byte, 0x88),
    general("EORB", Op::Eor(B), Byte, 0xC8),
    general("BITA", Op::Bit(A), Byte, 0x85),
    general("BITB", Op::Bit(B), Byte, 0xC5),
    immediate("ANDCC", Op::AndCc, 0x1C),
    immediate("ORCC", Op::OrCc, 0x1A),
    // ==================== Read-modify-write ====================
    rmw("NEG", Op::Unary(Unary::Neg, None), 0x00),
    rmw("COM", Op::Unary(Unary::Com, None), 0x03),
    rmw("LSR", Op::Unary(Unary::Lsr, None), 0x04),
    rmw("ROR", Op::Unary(Unary::Ror, None), 0x06),
    rmw("ASR", Op::Unary(Unary::Asr, None), 0x07),
    rmw("ASL", Op::Unary(Unary::Asl, None), 0x08),
    rmw("LSL", Op::Unary(Unary::Asl, None), 0x08),
    rmw("ROL", Op::Unary(Unary::Rol, None), 0x09),
    rmw("DEC", Op::Unary(Unary::Dec, None), 0x0A),
    rmw("INC", Op::Unary(Unary::Inc, None), 0x0C),
    rmw("TST", Op::Unary(Unary::Tst, None), 0x0D),
    rmw("CLR", Op::Unary(Unary::Clr, None), 0x0F),
    inherent("NEGA", Op::Unary(Unary::Neg, Some(A)), 0x40),
    inherent("COMA", Op::Unary(Unary::Com, Some(A)), 0x43),
    inherent("LSRA", Op::Unary(Unary::Lsr, Some(A)), 0x44),
    inherent("RORA", Op::Unary(Unary::Ror, Some(A)), 0x46),
    inherent("ASRA", Op::Unary(Unary::Asr, Some(A)), 0x47),
    inherent("ASLA", Op::Unary(Unary::Asl, Some(A)), 0x48),
    inherent("LSLA", Op::Unary(Unary::Asl, Some(A)), 0x48),
    inherent("ROLA", Op::Unary(Unary::Rol, Some(A)), 0x49),
    inherent("DECA", Op::Unary(Unary::Dec, Some(A)), 0x4A),
    inherent("INCA", Op::Unary(Unary::Inc, Some(A)), 0x4C),
    inherent("TSTA", Op::Unary(Unary::Tst, Some(A)), 0x4D),
    inherent("CLRA", Op::Unary(Unary::Clr, Some(A)), 0x4F),
    inherent("NEGB", Op::Unary(Unary::Neg, Some(B)), 0x50),
    inherent("COMB", Op::Unary(Unary::Com, Some(B)), 0x53),
    inherent("LSRB", Op::Unary(Unary::Lsr, Some(B)), 0x54),
    inherent("RORB", Op::Unary(Unary::Ror, Some(B)), 0x56),
    inherent("ASRB", Op::Unary(Unary::Asr, Some(B)), 0x57),
    inherent("ASLB", Op::Unary(Unary::Asl, Some(B)), 0x58),
    inherent("LSLB", Op::Unary(Unary::Asl, Some(B)), 0x58),
    inherent("ROLB", Op::Unary(Unary::Rol, Some(B)), 0x59),
    inherent("DECB", Op::Unary(Unary::Dec, Some(B)), 0x5A),
    inherent("INCB", Op::Unary(Unary::Inc, Some(B)), 0x5C),
    inherent("TSTB", Op::Unary(Unary::Tst, Some(B)), 0x5D),
    inherent("CLRB", Op::Unary(Unary::Clr, Some(B)), 0x5F),
    // ==================== Short branches ====================
    short("BRA", Op::Branch(Cond::Always), 0x20),
    short("BRN", Op::Branch(Cond::Never), 0x21),
    short("BHI", Op::Branch(Cond::Hi), 0x22),
    short("BLS", Op::Branch(Cond::Ls), 0x23),
    short("BCC", Op::Branch(Cond::CarryClear), 0x24),
    short("BHS", Op::Branch(Cond::CarryClear), 0x24),
    short("BCS", Op::Branch(Cond::CarrySet), 0x25),
    short("BLO", Op::Branch(Cond::CarrySet), 0x25),
    short("BNE", Op::Branch(Cond::Ne), 0x26),
    short("BEQ", Op::Branch(Cond::Eq), 0x27),
    short("BVC", Op::Branch(Cond::Vc), 0x28),
    short("BVS", Op::Branch(Cond::Vs), 0x29),
    short("BPL", Op::Branch(Cond::Pl), 0x2A),
    short("BMI", Op::Branch(Cond::Mi), 0x2B),
    short("BGE", Op::Branch(Cond::Ge), 0x2C),
    short("BLT", Op::Branch(Cond::Lt), 0x2D),
    short("BGT", Op::Branch(Cond::Gt), 0x2E),
    short("BLE", Op::Branch(Cond::Le), 0x2F),
    short("BSR", Op::Bsr, 0x8D),
    // ==================== Long branches ====================
    long("LBRA", Op::Branch(Cond::Always), 0x16),
    long("LBSR", Op::Bsr, 0x17),
    long("LBRN", Op::Branch(Cond::Never), 0x1021),
    long("LBHI", Op::Branch(Cond::Hi), 0x1022),
    long("LBLS", Op::Branch(Cond::Ls), 0x1023),
    long("LBCC", Op::Branch(Cond::CarryClear), 0x1024),
    long("LBHS", Op::Branch(Cond::CarryClear), 0x1024),
    long("LBCS", Op::Branch(Cond::CarrySet), 0x1025),
    long("LBLO", Op::Branch(Cond::CarrySet), 0x1025),
    long("LBNE", Op::Branch(Cond::Ne), 0x1026),
    long("LBEQ", Op::Branch(Cond::Eq), 0x1027),
    long("LBVC", Op::Branch(Cond::Vc), 0x1028),
    long("LBVS", Op::Branch(Cond::Vs), 0x1029),
    long("LBPL", Op::Branch(Cond::Pl), 0x102A),
    long("LBMI", Op::Branch(Cond::Mi), 0x102B),
    long("LBGE", Op::Branch(Cond::Ge), 0x102C),
    long("LBLT", Op::Branch(Cond::Lt), 0x102D),
    long("LBGT", Op::Branch(Cond::Gt), 0x102E),
    long("LBLE", Op::Branch(Cond::Le), 0x102F),
    // ==================== Jumps / calls ====================
    rmw("JMP", Op::Jmp, 0x0E),
    memory("JSR", Op::Jsr, Width::None, 0x9D),
    inherent("RTS", Op::Rts, 0x39),
    inherent("RTI", Op::Rti, 0x3B),
    // ==================== Stack / registers ====================
    postbyte("PSHS", Op::Push(S), 0x34),
    postbyte("PULS", Op::Pull(S), 0x35),
    postbyte("PSHU", Op::Push(U), 0x36),
    postbyte("PULU", Op::Pull(U), 0x37),
    postbyte("EXG", Op::Exg, 0x1E),
    postbyte("TFR", Op::Tfr, 0x1F),
    // ==================== Miscellaneous ====================
    inherent("ABX", Op::Abx, 0x3A),
    inherent("MUL", Op::Mul, 0x3D),
    inherent("SEX", Op::Sex, 0x1D),
    inherent("DAA", Op::Daa, 0x19),
    inherent("NOP", Op::Nop, 0x12),
    inherent("SYNC", Op::Interrupt, 0x13),
    inherent("SWI", Op::Interrupt, 0x3F),
    inherent("SWI2", Op::Interrupt, 0x103F),
    inherent("SWI3", Op::Interrupt, 0x113F),
    immediate("CWAI", Op::Interrupt, 0x3C),
];

/// Assembler directives, recognised as keywords by label detection.
pub const DIRECTIVES: &[&str] = &["ORG", "END", "FCB", "FDB", "FCC", "RMB"];

/// Look up an (uppercase) mnemonic.
pub fn lookup(mnemonic: &str) -> Option<&'static OpInfo> {
    TABLE.iter().find(|info| info.mnemonic == mnemonic)
}

/// True if the word is a mnemonic or directive.
pub fn is_keyword(word: &str) -> bool {
    let upper = word.to_ascii_uppercase();
    DIRECTIVES.contains(&upper.as_str()) || lookup(&upper).is_some()
}

/// True for the stack and register-pair instructions, which always
/// decode as INHERENT whatever their operand looks like.
pub fn is_register_list_op(mnemonic: &str) -> bool {
    lookup(mnemonic).is_some_and(|info| info.has_postbyte())
}

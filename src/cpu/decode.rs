//! Instruction decoder for the 6809.
//!
//! Turns one line of assembly source into a [`DecodedInstruction`]:
//! mnemonic, addressing mode and operand text, plus the indexed or
//! direct-page details the emitter and executor need.
//!
//! Operand syntax:
//! - `#value` immediate, `<addr` forced direct, `>addr` forced extended
//! - `[addr]` extended indirect
//! - `offset,R`, `,R+`, `,R++`, `,-R`, `,--R`, `A,R`/`B,R`/`D,R`, optionally in `[...]`
//! - anything else: direct if it is a one- or two-digit literal, extended otherwise
//!
//! Numbers are hexadecimal unless prefixed: `$FF`, `0xFF` and `FF` are the
//! same value, `%1010` is binary, and a leading `-` negates.

use crate::cpu::opcodes;
use crate::cpu::registers::Reg;
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// 6809 addressing modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddrMode {
    Immediate,
    Direct,
    Extended,
    ExtendedIndirect,
    Indexed,
    Inherent,
    Relative,
}

impl AddrMode {
    pub const ALL: [AddrMode; 7] = [
        AddrMode::Immediate,
        AddrMode::Direct,
        AddrMode::Extended,
        AddrMode::ExtendedIndirect,
        AddrMode::Indexed,
        AddrMode::Inherent,
        AddrMode::Relative,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AddrMode::Immediate => "IMMEDIATE",
            AddrMode::Direct => "DIRECT",
            AddrMode::Extended => "EXTENDED",
            AddrMode::ExtendedIndirect => "EXTENDED_INDIRECT",
            AddrMode::Indexed => "INDEXED",
            AddrMode::Inherent => "INHERENT",
            AddrMode::Relative => "RELATIVE",
        }
    }
}

impl std::fmt::Display for AddrMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Auto increment/decrement applied to the index register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncrementMode {
    None,
    /// `,R+`
    PostInc1,
    /// `,R++`
    PostInc2,
    /// `,-R`
    PreDec1,
    /// `,--R`
    PreDec2,
}

/// Kind of offset added to the index register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OffsetKind {
    None,
    /// -16..15, packed into the postbyte.
    Bits5,
    /// -128..127, one extra byte.
    Bits8,
    /// Anything else (or a symbol), two extra bytes.
    Bits16,
    AccA,
    AccB,
    AccD,
}

/// Base register of an indexed operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexReg {
    X,
    Y,
    U,
    S,
}

impl IndexReg {
    pub fn parse(name: &str) -> Option<IndexReg> {
        match name {
            "X" => Some(IndexReg::X),
            "Y" => Some(IndexReg::Y),
            "U" => Some(IndexReg::U),
            "S" => Some(IndexReg::S),
            _ => None,
        }
    }

    /// Register field of the postbyte.
    pub fn code(self) -> u8 {
        match self {
            IndexReg::X => 0x00,
            IndexReg::Y => 0x20,
            IndexReg::U => 0x40,
            IndexReg::S => 0x60,
        }
    }

    pub fn reg(self) -> Reg {
        match self {
            IndexReg::X => Reg::X,
            IndexReg::Y => Reg::Y,
            IndexReg::U => Reg::U,
            IndexReg::S => Reg::S,
        }
    }
}

/// Details of an INDEXED operand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedDetails {
    pub base: IndexReg,
    /// Offset text: a number, a symbol, `A`/`B`/`D`, or empty.
    pub offset: String,
    pub indirect: bool,
    pub increment: IncrementMode,
    pub kind: OffsetKind,
}

/// Details of a DIRECT operand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectDetails {
    /// Low byte of the address (DP supplies the high byte).
    pub offset: String,
    /// Written as `<addr`.
    pub forced: bool,
}

/// One decoded source line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedInstruction {
    /// Uppercase mnemonic.
    pub mnemonic: String,
    pub mode: AddrMode,
    /// Operand with mode prefixes and brackets removed (raw for
    /// INDEXED, RELATIVE and INHERENT).
    pub operand: String,
    /// Register named by the mnemonic (`A` for LDA, `X` for CMPX, ...).
    pub target: Option<Reg>,
    pub indexed: Option<IndexedDetails>,
    pub direct: Option<DirectDetails>,
}

impl DecodedInstruction {
    fn new(mnemonic: String, mode: AddrMode, operand: String) -> Self {
        let target = target_register(&mnemonic);
        Self {
            mnemonic,
            mode,
            operand,
            target,
            indexed: None,
            direct: None,
        }
    }
}

impl std::fmt::Display for DecodedInstruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.operand.is_empty() {
            write!(f, "{} [{}]", self.mnemonic, self.mode)
        } else {
            write!(f, "{} [{}] {}", self.mnemonic, self.mode, self.operand)
        }
    }
}

/// Decoding errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("malformed operand '{0}'")]
    MalformedOperand(String),

    #[error("invalid index register in '{0}' (expected X, Y, U or S)")]
    InvalidIndexRegister(String),

    #[error("unmatched bracket in '{0}'")]
    UnmatchedBracket(String),

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("invalid register list '{0}'")]
    InvalidRegisterList(String),
}

/// Register named by an instruction, taken from its table entry.
fn target_register(mnemonic: &str) -> Option<Reg> {
    use opcodes::Op;
    match opcodes::lookup(mnemonic)?.op {
        Op::Load(r) | Op::Store(r) | Op::Lea(r) | Op::Compare(r)
        | Op::Add(r) | Op::AddCarry(r) | Op::Sub(r) | Op::SubCarry(r)
        | Op::And(r) | Op::Or(r) | Op::Eor(r) | Op::Bit(r)
        | Op::Push(r) | Op::Pull(r) => Some(r),
        Op::Unary(_, r) => r,
        _ => None,
    }
}

/// Strip a trailing `;` comment and surrounding whitespace.
pub fn strip_comment(line: &str) -> &str {
    match line.find(';') {
        Some(idx) => line[..idx].trim(),
        None => line.trim(),
    }
}

/// Decode one source line.
///
/// Returns `Ok(None)` for blank, comment-only and label-only lines.
pub fn decode(line: &str) -> Result<Option<DecodedInstruction>, DecodeError> {
    let line = strip_comment(line);
    let body = remove_label(line);
    if body.is_empty() {
        return Ok(None);
    }
    decode_statement(body).map(Some)
}

/// Decode a non-empty line body whose label and comment are already gone.
pub fn decode_statement(body: &str) -> Result<DecodedInstruction, DecodeError> {
    let (mnemonic, operand) = split_mnemonic(body);
    decode_parts(mnemonic, operand)
}

/// Uppercase first word and the trimmed remainder.
pub fn split_mnemonic(body: &str) -> (String, &str) {
    let body = body.trim();
    match body.split_once(char::is_whitespace) {
        Some((m, rest)) => (m.to_ascii_uppercase(), rest.trim()),
        None => (body.to_ascii_uppercase(), ""),
    }
}

fn decode_parts(mnemonic: String, operand: &str) -> Result<DecodedInstruction, DecodeError> {
    let upper = operand.to_ascii_uppercase();

    if opcodes::is_register_list_op(&mnemonic) {
        return Ok(DecodedInstruction::new(mnemonic, AddrMode::Inherent, upper));
    }
    if opcodes::lookup(&mnemonic).is_some_and(|info| info.is_branch()) {
        return Ok(DecodedInstruction::new(mnemonic, AddrMode::Relative, upper));
    }
    if upper.is_empty() {
        return Ok(DecodedInstruction::new(mnemonic, AddrMode::Inherent, upper));
    }

    if let Some(rest) = upper.strip_prefix('#') {
        return Ok(DecodedInstruction::new(mnemonic, AddrMode::Immediate, clean_value(rest)?));
    }

    if let Some(rest) = upper.strip_prefix('<') {
        let value = clean_value(rest)?;
        let mut instr = DecodedInstruction::new(mnemonic, AddrMode::Direct, value.clone());
        instr.direct = Some(DirectDetails { offset: value, forced: true });
        return Ok(instr);
    }

    if let Some(rest) = upper.strip_prefix('>') {
        return Ok(DecodedInstruction::new(mnemonic, AddrMode::Extended, clean_value(rest)?));
    }

    let opens = upper.starts_with('[');
    let closes = upper.ends_with(']');
    if opens != closes {
        return Err(DecodeError::UnmatchedBracket(operand.to_string()));
    }

    if upper.contains(',') {
        return decode_indexed(mnemonic, &upper);
    }

    if opens {
        let inside = &upper[1..upper.len() - 1];
        return Ok(DecodedInstruction::new(
            mnemonic,
            AddrMode::ExtendedIndirect,
            clean_value(inside)?,
        ));
    }

    let value = clean_value(&upper)?;
    if is_short_literal(&value) {
        let mut instr = DecodedInstruction::new(mnemonic, AddrMode::Direct, value.clone());
        instr.direct = Some(DirectDetails { offset: value, forced: false });
        Ok(instr)
    } else {
        Ok(DecodedInstruction::new(mnemonic, AddrMode::Extended, value))
    }
}

/// Trim a value operand and reject obviously broken ones.
fn clean_value(text: &str) -> Result<String, DecodeError> {
    let text = text.trim();
    if text.is_empty() || text.contains(char::is_whitespace) {
        return Err(DecodeError::MalformedOperand(text.to_string()));
    }
    if text.contains(['[', ']']) {
        return Err(DecodeError::UnmatchedBracket(text.to_string()));
    }
    if !is_symbol(text) {
        parse_number(text)?;
    }
    Ok(text.to_string())
}

/// One or two hex digits (or a binary literal that fits a byte).
fn is_short_literal(value: &str) -> bool {
    if value.starts_with('%') {
        return matches!(parse_number(value), Ok(0..=0xFF));
    }
    let digits = strip_hex_prefix(value);
    !digits.is_empty()
        && digits.len() <= 2
        && digits.chars().all(|c| c.is_ascii_hexdigit())
}

fn decode_indexed(mnemonic: String, operand: &str) -> Result<DecodedInstruction, DecodeError> {
    let compact: String = operand.chars().filter(|c| !c.is_whitespace()).collect();

    let (indirect, inner) = match compact.strip_prefix('[') {
        Some(rest) => match rest.strip_suffix(']') {
            Some(inner) => (true, inner),
            None => return Err(DecodeError::UnmatchedBracket(operand.to_string())),
        },
        None => (false, compact.as_str()),
    };

    let (offset_part, reg_part) = inner
        .split_once(',')
        .ok_or_else(|| DecodeError::MalformedOperand(operand.to_string()))?;

    let (increment, reg_name) = if let Some(r) = reg_part.strip_suffix("++") {
        (IncrementMode::PostInc2, r)
    } else if let Some(r) = reg_part.strip_suffix('+') {
        (IncrementMode::PostInc1, r)
    } else if let Some(r) = reg_part.strip_prefix("--") {
        (IncrementMode::PreDec2, r)
    } else if let Some(r) = reg_part.strip_prefix('-') {
        (IncrementMode::PreDec1, r)
    } else {
        (IncrementMode::None, reg_part)
    };

    let base = IndexReg::parse(reg_name)
        .ok_or_else(|| DecodeError::InvalidIndexRegister(operand.to_string()))?;

    if increment != IncrementMode::None && !offset_part.is_empty() {
        return Err(DecodeError::MalformedOperand(operand.to_string()));
    }

    let kind = match offset_part {
        "" => OffsetKind::None,
        "A" => OffsetKind::AccA,
        "B" => OffsetKind::AccB,
        "D" => OffsetKind::AccD,
        text if is_symbol(text) => OffsetKind::Bits16,
        text => {
            let value = parse_number(text)?;
            match value {
                // The indirect bit shares the postbyte with a 5-bit offset
                -16..=15 if !indirect => OffsetKind::Bits5,
                -128..=127 => OffsetKind::Bits8,
                _ => OffsetKind::Bits16,
            }
        }
    };

    let details = IndexedDetails {
        base,
        offset: offset_part.to_string(),
        indirect,
        increment,
        kind,
    };

    let mut instr = DecodedInstruction::new(mnemonic, AddrMode::Indexed, operand.to_string());
    instr.indexed = Some(details);
    Ok(instr)
}

/// Reclassify operands that name a label.
///
/// A label such as `C` or `FE` also reads as hex, and [`decode`] picks the
/// mode from the numeric value. Labels are 16-bit addresses, so an
/// unforced DIRECT operand becomes EXTENDED and a short indexed offset
/// becomes 16-bit. The assembler applies this in both passes with the same
/// set of label names, so sizes agree.
pub fn bind_labels(instr: &mut DecodedInstruction, is_label: impl Fn(&str) -> bool) {
    match instr.mode {
        AddrMode::Direct => {
            let forced = instr.direct.as_ref().is_some_and(|d| d.forced);
            if !forced && is_label(&instr.operand) {
                instr.mode = AddrMode::Extended;
                instr.direct = None;
            }
        }
        AddrMode::Indexed => {
            if let Some(details) = instr.indexed.as_mut() {
                let short = matches!(details.kind, OffsetKind::Bits5 | OffsetKind::Bits8);
                if short && is_label(&details.offset) {
                    details.kind = OffsetKind::Bits16;
                }
            }
        }
        _ => {}
    }
}

/// Compute the indexed-mode postbyte.
pub fn calculate_post_byte(details: &IndexedDetails) -> Result<u8, DecodeError> {
    let mut post = details.base.code();
    if details.indirect {
        post |= 0x10;
    }

    post |= match details.kind {
        OffsetKind::None => match details.increment {
            IncrementMode::PostInc1 => 0x80,
            IncrementMode::PostInc2 => 0x81,
            IncrementMode::PreDec1 => 0x82,
            IncrementMode::PreDec2 => 0x83,
            IncrementMode::None => 0x84,
        },
        OffsetKind::Bits5 => (parse_number(&details.offset)? & 0x1F) as u8,
        OffsetKind::Bits8 => 0x88,
        OffsetKind::Bits16 => 0x89,
        OffsetKind::AccB => 0x85,
        OffsetKind::AccA => 0x86,
        OffsetKind::AccD => 0x8B,
    };

    Ok(post)
}

/// Number of offset bytes following the postbyte.
pub fn offset_byte_count(details: &IndexedDetails) -> u16 {
    match details.kind {
        OffsetKind::Bits8 => 1,
        OffsetKind::Bits16 => 2,
        _ => 0,
    }
}

// ==================== Numbers and symbols ====================

fn strip_hex_prefix(text: &str) -> &str {
    text.strip_prefix('$')
        .or_else(|| text.strip_prefix("0X"))
        .or_else(|| text.strip_prefix("0x"))
        .unwrap_or(text)
}

/// Parse a numeric literal (hex by default, `$`/`0x` hex, `%` binary,
/// optional leading `-`).
pub fn parse_number(text: &str) -> Result<i32, DecodeError> {
    let text = text.trim();
    let invalid = || DecodeError::InvalidNumber(text.to_string());

    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let magnitude = if let Some(bits) = body.strip_prefix('%') {
        i32::from_str_radix(bits, 2).map_err(|_| invalid())?
    } else {
        let digits = strip_hex_prefix(body);
        if digits.is_empty() || digits.len() > 8 {
            return Err(invalid());
        }
        u32::from_str_radix(digits, 16).map_err(|_| invalid())? as i32
    };

    Ok(if negative { magnitude.wrapping_neg() } else { magnitude })
}

/// True if the text is an identifier that cannot be read as a number.
pub fn is_symbol(text: &str) -> bool {
    is_label_name(text) && parse_number(text).is_err()
}

/// `[A-Z_][A-Z0-9_]*`, case-insensitive.
pub fn is_label_name(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// ==================== Labels ====================

/// True if the line starts with a label: `NAME:` anywhere before the
/// body, or a leading identifier that is not a mnemonic or directive
/// and is followed by more text.
pub fn has_label(line: &str) -> bool {
    let line = strip_comment(line);
    if line.is_empty() {
        return false;
    }
    if line.contains(':') {
        return true;
    }
    match line.split_once(char::is_whitespace) {
        Some((first, _)) => !opcodes::is_keyword(first) && is_label_name(first),
        None => false,
    }
}

/// Uppercase label name, if the line has one.
pub fn extract_label(line: &str) -> Option<String> {
    if !has_label(line) {
        return None;
    }
    let line = strip_comment(line);
    let name = match line.split_once(':') {
        Some((name, _)) => name.trim(),
        None => line.split_whitespace().next().unwrap_or(""),
    };
    Some(name.to_ascii_uppercase())
}

/// The line without its label (and comment).
pub fn remove_label(line: &str) -> &str {
    let stripped = strip_comment(line);
    if !has_label(stripped) {
        return stripped;
    }
    match stripped.split_once(':') {
        Some((_, rest)) => rest.trim(),
        None => stripped
            .split_once(char::is_whitespace)
            .map(|(_, rest)| rest.trim())
            .unwrap_or(""),
    }
}

// ==================== Register operands ====================

/// Parse a PSHS/PULS/PSHU/PULU operand into a register mask.
///
/// Accepts a literal mask (`#$C6`, `$C6`) or a register list (`A,B,X`).
/// `D` selects both accumulators. Bit $40 is the other stack pointer, so
/// `stack` itself (S for PSHS/PULS, U for PSHU/PULU) is rejected.
pub fn parse_register_mask(operand: &str, stack: Reg) -> Result<u8, DecodeError> {
    let operand = operand.trim();
    let invalid = || DecodeError::InvalidRegisterList(operand.to_string());

    if let Some(rest) = operand.strip_prefix('#') {
        return parse_number(rest).map(|v| v as u8).map_err(|_| invalid());
    }
    if operand.starts_with('$') {
        return parse_number(operand).map(|v| v as u8).map_err(|_| invalid());
    }
    if operand.is_empty() {
        return Err(invalid());
    }

    let mut mask = 0u8;
    for name in operand.split(',') {
        mask |= match name.trim().to_ascii_uppercase().as_str() {
            "CC" | "CCR" => 0x01,
            "A" => 0x02,
            "B" => 0x04,
            "D" => 0x06,
            "DP" => 0x08,
            "X" => 0x10,
            "Y" => 0x20,
            "U" if stack != Reg::U => 0x40,
            "S" if stack != Reg::S => 0x40,
            "PC" => 0x80,
            _ => return Err(invalid()),
        };
    }
    Ok(mask)
}

/// Parse a TFR/EXG operand (`src,dst`).
pub fn parse_register_pair(operand: &str) -> Result<(Reg, Reg), DecodeError> {
    let invalid = || DecodeError::InvalidRegisterList(operand.to_string());
    let (src, dst) = operand.split_once(',').ok_or_else(invalid)?;
    let src = Reg::parse(src).ok_or_else(invalid)?;
    let dst = Reg::parse(dst).ok_or_else(invalid)?;
    Ok((src, dst))
}

/// TFR/EXG postbyte: source code in the high nibble, destination low.
pub fn register_pair_byte(src: Reg, dst: Reg) -> u8 {
    (src.transfer_code() << 4) | dst.transfer_code()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_one(line: &str) -> DecodedInstruction {
        decode(line).unwrap().unwrap()
    }

    #[test]
    fn test_blank_and_label_only() {
        assert_eq!(decode("").unwrap(), None);
        assert_eq!(decode("   ; just a comment").unwrap(), None);
        assert_eq!(decode("LOOP:").unwrap(), None);
    }

    #[test]
    fn test_mode_classification() {
        assert_eq!(decode_one("LDA #$05").mode, AddrMode::Immediate);
        assert_eq!(decode_one("LDA $10").mode, AddrMode::Direct);
        assert_eq!(decode_one("LDA $1000").mode, AddrMode::Extended);
        assert_eq!(decode_one("LDA <$1000").mode, AddrMode::Direct);
        assert_eq!(decode_one("LDA >$10").mode, AddrMode::Extended);
        assert_eq!(decode_one("JMP [$FC10]").mode, AddrMode::ExtendedIndirect);
        assert_eq!(decode_one("LDA 5,X").mode, AddrMode::Indexed);
        assert_eq!(decode_one("NOP").mode, AddrMode::Inherent);
        assert_eq!(decode_one("BRA LOOP").mode, AddrMode::Relative);
        assert_eq!(decode_one("LBEQ LOOP").mode, AddrMode::Relative);
        assert_eq!(decode_one("PSHS A,B,X").mode, AddrMode::Inherent);
        assert_eq!(decode_one("TFR A,B").mode, AddrMode::Inherent);
        assert_eq!(decode_one("JMP LOOP").mode, AddrMode::Extended);
    }

    #[test]
    fn test_operand_cleanup() {
        let instr = decode_one("  lda   #$05   ; load five");
        assert_eq!(instr.mnemonic, "LDA");
        assert_eq!(instr.operand, "$05");
        assert_eq!(instr.target, Some(Reg::A));

        let instr = decode_one("STA <$20");
        assert_eq!(instr.direct, Some(DirectDetails { offset: "$20".into(), forced: true }));
    }

    #[test]
    fn test_target_register() {
        assert_eq!(decode_one("CMPX #$10").target, Some(Reg::X));
        assert_eq!(decode_one("INCB").target, Some(Reg::B));
        assert_eq!(decode_one("BCS LOOP").target, None);
        assert_eq!(decode_one("INC $10").target, None);
    }

    #[test]
    fn test_label_on_instruction_line() {
        let instr = decode_one("START: LDA #1");
        assert_eq!(instr.mnemonic, "LDA");
        let instr = decode_one("START LDA #1");
        assert_eq!(instr.mnemonic, "LDA");
    }

    #[test]
    fn test_post_bytes() {
        let pb = |line: &str| {
            let instr = decode_one(line);
            calculate_post_byte(instr.indexed.as_ref().unwrap()).unwrap()
        };
        assert_eq!(pb("LDA 5,X"), 0x05);
        assert_eq!(pb("LDA -1,Y"), 0x3F);
        assert_eq!(pb("LDA ,X+"), 0x80);
        assert_eq!(pb("LDA ,X++"), 0x81);
        assert_eq!(pb("LDA ,-U"), 0xC2);
        assert_eq!(pb("LDA [,--X]"), 0x93);
        assert_eq!(pb("LDA ,S"), 0xE4);
        assert_eq!(pb("LDA $40,X"), 0x88);
        assert_eq!(pb("LDA $1000,X"), 0x89);
        assert_eq!(pb("LDA A,X"), 0x86);
        assert_eq!(pb("LDA B,Y"), 0xA5);
        assert_eq!(pb("LDA D,X"), 0x8B);
    }

    #[test]
    fn test_offset_kinds() {
        let kind = |line: &str| decode_one(line).indexed.unwrap().kind;
        assert_eq!(kind("LDA $F,X"), OffsetKind::Bits5);
        assert_eq!(kind("LDA -$10,X"), OffsetKind::Bits5);
        assert_eq!(kind("LDA 15,X"), OffsetKind::Bits8);
        assert_eq!(kind("LDA 10,X"), OffsetKind::Bits8);
        assert_eq!(kind("LDA 7F,X"), OffsetKind::Bits8);
        assert_eq!(kind("LDA -80,X"), OffsetKind::Bits8);
        assert_eq!(kind("LDA 80,X"), OffsetKind::Bits16);
        assert_eq!(kind("LDA TABLE,X"), OffsetKind::Bits16);
        // indirect never uses the 5-bit form
        assert_eq!(kind("LDA [2,X]"), OffsetKind::Bits8);
    }

    #[test]
    fn test_bind_labels_widens_hex_like_names() {
        let labels = |name: &str| matches!(name, "C" | "FE");

        let mut instr = decode_one("LDA C,X");
        assert_eq!(instr.indexed.as_ref().unwrap().kind, OffsetKind::Bits5);
        bind_labels(&mut instr, labels);
        assert_eq!(instr.indexed.as_ref().unwrap().kind, OffsetKind::Bits16);

        let mut instr = decode_one("LDA FE");
        assert_eq!(instr.mode, AddrMode::Direct);
        bind_labels(&mut instr, labels);
        assert_eq!(instr.mode, AddrMode::Extended);
        assert_eq!(instr.direct, None);

        // forced direct and plain numbers are left alone
        let mut instr = decode_one("LDA <FE");
        bind_labels(&mut instr, labels);
        assert_eq!(instr.mode, AddrMode::Direct);
        let mut instr = decode_one("LDA 12,X");
        bind_labels(&mut instr, labels);
        assert_eq!(instr.indexed.unwrap().kind, OffsetKind::Bits8);
    }

    #[test]
    fn test_offset_byte_count() {
        let count = |line: &str| offset_byte_count(decode_one(line).indexed.as_ref().unwrap());
        assert_eq!(count("LDA ,X"), 0);
        assert_eq!(count("LDA 3,X"), 0);
        assert_eq!(count("LDA A,X"), 0);
        assert_eq!(count("LDA $20,X"), 1);
        assert_eq!(count("LDA $200,X"), 2);
    }

    #[test]
    fn test_indexed_errors() {
        assert!(matches!(decode("LDA 5,Q"), Err(DecodeError::InvalidIndexRegister(_))));
        assert!(matches!(decode("LDA 5,PC"), Err(DecodeError::InvalidIndexRegister(_))));
        assert!(matches!(decode("LDA [5,X"), Err(DecodeError::UnmatchedBracket(_))));
        assert!(matches!(decode("LDA $10]"), Err(DecodeError::UnmatchedBracket(_))));
        assert!(matches!(decode("LDA 2,X+"), Err(DecodeError::MalformedOperand(_))));
        assert!(matches!(decode("LDA #$1G"), Err(DecodeError::InvalidNumber(_))));
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("FF").unwrap(), 0xFF);
        assert_eq!(parse_number("$10").unwrap(), 0x10);
        assert_eq!(parse_number("0x1234").unwrap(), 0x1234);
        assert_eq!(parse_number("%1010").unwrap(), 10);
        assert_eq!(parse_number("-10").unwrap(), -16);
        assert!(parse_number("LOOP").is_err());
        assert!(parse_number("").is_err());
    }

    #[test]
    fn test_labels() {
        assert!(has_label("LOOP: NOP"));
        assert!(has_label("LOOP:"));
        assert!(has_label("LOOP NOP"));
        assert!(!has_label("NOP"));
        assert!(!has_label("LDA #1"));
        assert!(!has_label("ORG $FC00"));
        assert!(!has_label("LOOP"));

        assert_eq!(extract_label("loop: nop").as_deref(), Some("LOOP"));
        assert_eq!(extract_label("Done BRA Done").as_deref(), Some("DONE"));
        assert_eq!(extract_label("NOP"), None);

        assert_eq!(remove_label("LOOP: DECA ; count"), "DECA");
        assert_eq!(remove_label("LOOP DECA"), "DECA");
        assert_eq!(remove_label("LOOP:"), "");
        assert_eq!(remove_label("DECA"), "DECA");
    }

    #[test]
    fn test_register_mask() {
        assert_eq!(parse_register_mask("A,B,X", Reg::S).unwrap(), 0x16);
        assert_eq!(parse_register_mask("D", Reg::S).unwrap(), 0x06);
        assert_eq!(parse_register_mask("cc, dp, pc", Reg::U).unwrap(), 0x89);
        assert_eq!(parse_register_mask("#$FF", Reg::S).unwrap(), 0xFF);
        assert_eq!(parse_register_mask("$40", Reg::S).unwrap(), 0x40);
        assert!(parse_register_mask("A,Q", Reg::S).is_err());
        assert!(parse_register_mask("", Reg::S).is_err());
    }

    #[test]
    fn test_register_mask_rejects_own_stack() {
        assert_eq!(parse_register_mask("U,X", Reg::S).unwrap(), 0x50);
        assert_eq!(parse_register_mask("S,X", Reg::U).unwrap(), 0x50);
        assert!(matches!(
            parse_register_mask("A,S", Reg::S),
            Err(DecodeError::InvalidRegisterList(_))
        ));
        assert!(matches!(
            parse_register_mask("U", Reg::U),
            Err(DecodeError::InvalidRegisterList(_))
        ));
    }

    #[test]
    fn test_register_pair() {
        let (src, dst) = parse_register_pair("X,Y").unwrap();
        assert_eq!(register_pair_byte(src, dst), 0x12);
        let (src, dst) = parse_register_pair("A,DP").unwrap();
        assert_eq!(register_pair_byte(src, dst), 0x8B);
        assert!(parse_register_pair("A").is_err());
    }
}

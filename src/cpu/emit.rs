//! Machine-code emission.
//!
//! [`encode`] turns a decoded instruction into its byte sequence and
//! [`instruction_size`] predicts that length without evaluating any
//! operand. The assembler relies on the two always agreeing.

use crate::asm::symbols::{SymbolTable, ValueError};
use crate::cpu::decode::{
    self, AddrMode, DecodeError, DecodedInstruction, OffsetKind,
};
use crate::cpu::memory::AddressSpace;
use crate::cpu::opcodes::{self, Op, OpInfo, Width};
use thiserror::Error;

/// Postbyte selecting `[n16]` in the indexed opcode space.
pub const EXTENDED_INDIRECT_POSTBYTE: u8 = 0x9F;

/// Encoding errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("no encoding for {mnemonic} in {mode} mode")]
    UnknownInstruction { mnemonic: String, mode: AddrMode },

    #[error("undefined symbol '{0}'")]
    UndefinedSymbol(String),

    #[error("{mnemonic} displacement {displacement} out of range")]
    BranchOutOfRange { mnemonic: String, displacement: i32 },

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl From<ValueError> for EncodeError {
    fn from(e: ValueError) -> Self {
        match e {
            ValueError::Undefined(name) => EncodeError::UndefinedSymbol(name),
            ValueError::Decode(e) => EncodeError::Decode(e),
        }
    }
}

/// Table entry and opcode for an instruction, if it can be encoded.
fn lookup(instr: &DecodedInstruction) -> Result<(&'static OpInfo, u16), EncodeError> {
    let unknown = || EncodeError::UnknownInstruction {
        mnemonic: instr.mnemonic.clone(),
        mode: instr.mode,
    };
    let info = opcodes::lookup(&instr.mnemonic).ok_or_else(unknown)?;
    let opcode = info.opcode(instr.mode).ok_or_else(unknown)?;
    Ok((info, opcode))
}

/// Size in bytes of an instruction the table knows how to encode.
pub fn size_for(info: &OpInfo, instr: &DecodedInstruction) -> Option<u16> {
    let opcode = info.opcode(instr.mode)?;
    let operand = match instr.mode {
        AddrMode::Inherent => u16::from(info.has_postbyte()),
        AddrMode::Immediate | AddrMode::Relative => info.width.bytes(),
        AddrMode::Direct => 1,
        AddrMode::Extended => 2,
        AddrMode::ExtendedIndirect => 3,
        AddrMode::Indexed => 1 + decode::offset_byte_count(instr.indexed.as_ref()?),
    };
    Some(opcodes::opcode_len(opcode) + operand)
}

/// Number of bytes [`encode`] produces for this instruction.
pub fn instruction_size(instr: &DecodedInstruction) -> Result<u16, EncodeError> {
    let (info, _) = lookup(instr)?;
    size_for(info, instr)
        .ok_or_else(|| DecodeError::MalformedOperand(instr.operand.clone()).into())
}

/// Encode an instruction located at `address`.
///
/// `address` only matters for RELATIVE displacements.
pub fn encode(
    instr: &DecodedInstruction,
    address: u16,
    symbols: &SymbolTable,
) -> Result<Vec<u8>, EncodeError> {
    let (info, opcode) = lookup(instr)?;
    let size = instruction_size(instr)?;

    let mut bytes = Vec::with_capacity(size as usize);
    if opcode > 0xFF {
        bytes.extend_from_slice(&opcode.to_be_bytes());
    } else {
        bytes.push(opcode as u8);
    }

    match instr.mode {
        AddrMode::Inherent => {
            if info.has_postbyte() {
                bytes.push(register_postbyte(info, &instr.operand)?);
            }
        }
        AddrMode::Immediate => {
            let value = symbols.resolve(&instr.operand)?;
            push_width(&mut bytes, info.width, value);
        }
        AddrMode::Direct => {
            let value = symbols.resolve(&instr.operand)?;
            bytes.push(value as u8);
        }
        AddrMode::Extended => {
            let value = symbols.resolve(&instr.operand)?;
            bytes.extend_from_slice(&(value as u16).to_be_bytes());
        }
        AddrMode::ExtendedIndirect => {
            let value = symbols.resolve(&instr.operand)?;
            bytes.push(EXTENDED_INDIRECT_POSTBYTE);
            bytes.extend_from_slice(&(value as u16).to_be_bytes());
        }
        AddrMode::Indexed => {
            let details = instr
                .indexed
                .as_ref()
                .ok_or_else(|| DecodeError::MalformedOperand(instr.operand.clone()))?;
            bytes.push(decode::calculate_post_byte(details)?);
            match details.kind {
                OffsetKind::Bits8 => {
                    let value = symbols.resolve(&details.offset)?;
                    bytes.push(value as u8);
                }
                OffsetKind::Bits16 => {
                    let value = symbols.resolve(&details.offset)?;
                    bytes.extend_from_slice(&(value as u16).to_be_bytes());
                }
                _ => {}
            }
        }
        AddrMode::Relative => {
            let target = symbols.resolve(&instr.operand)? as u16;
            let displacement = branch_displacement(address, size, target);
            if !displacement_fits(info.width, displacement) {
                return Err(EncodeError::BranchOutOfRange {
                    mnemonic: instr.mnemonic.clone(),
                    displacement,
                });
            }
            push_width(&mut bytes, info.width, displacement);
        }
    }

    debug_assert_eq!(bytes.len(), size as usize, "size mismatch for {}", instr);
    Ok(bytes)
}

/// target − (address + size), as a signed distance.
pub fn branch_displacement(address: u16, size: u16, target: u16) -> i32 {
    target as i32 - (address as i32 + size as i32)
}

/// True if the displacement is encodable in a branch of this width.
pub fn displacement_fits(width: Width, displacement: i32) -> bool {
    match width {
        Width::Byte => (-128..=127).contains(&displacement),
        Width::Word => (-32768..=32767).contains(&displacement),
        Width::None => false,
    }
}

fn push_width(bytes: &mut Vec<u8>, width: Width, value: i32) {
    match width {
        Width::Byte => bytes.push(value as u8),
        Width::Word => bytes.extend_from_slice(&(value as u16).to_be_bytes()),
        Width::None => {}
    }
}

fn register_postbyte(info: &OpInfo, operand: &str) -> Result<u8, DecodeError> {
    match info.op {
        Op::Tfr | Op::Exg => {
            let (src, dst) = decode::parse_register_pair(operand)?;
            Ok(decode::register_pair_byte(src, dst))
        }
        Op::Push(stack) | Op::Pull(stack) => decode::parse_register_mask(operand, stack),
        _ => Err(DecodeError::InvalidRegisterList(operand.to_string())),
    }
}

/// Writes instruction bytes into an address space at an auto-incrementing
/// cursor. The cursor wraps at $FFFF; writes to unmapped addresses are
/// dropped by the address space (and logged there).
pub struct Emitter<'a> {
    mem: &'a mut AddressSpace,
    cursor: u16,
}

impl<'a> Emitter<'a> {
    pub fn new(mem: &'a mut AddressSpace, origin: u16) -> Self {
        Self { mem, cursor: origin }
    }

    pub fn cursor(&self) -> u16 {
        self.cursor
    }

    pub fn set_cursor(&mut self, addr: u16) {
        self.cursor = addr;
    }

    pub fn write_byte(&mut self, value: u8) {
        self.mem.write(self.cursor, value);
        self.cursor = self.cursor.wrapping_add(1);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.write_byte(b);
        }
    }

    /// Encode at the cursor and write the bytes. Returns what was written.
    pub fn emit(
        &mut self,
        instr: &DecodedInstruction,
        symbols: &SymbolTable,
    ) -> Result<Vec<u8>, EncodeError> {
        let bytes = encode(instr, self.cursor, symbols)?;
        self.write_bytes(&bytes);
        Ok(bytes)
    }
}

//! Two-pass assembler for 6809 source.
//!
//! Pass 1 walks the normalized lines with an address counter and records
//! every label. Pass 2 walks them again from the same origin, checks branch
//! ranges and emits machine code through an [`Emitter`]. Both passes size
//! instructions with [`instruction_size`], so they always agree.
//!
//! Any error aborts the whole assembly.

use crate::asm::listing::Listing;
use crate::asm::source::{self, Data, Program, Statement};
use crate::asm::symbols::{SymbolTable, ValueError};
use crate::config::SimConfig;
use crate::cpu::decode::{self, AddrMode, DecodeError, DecodedInstruction};
use crate::cpu::emit::{self, EncodeError, Emitter};
use crate::cpu::memory::AddressSpace;
use crate::cpu::opcodes::{self, Width};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// Byte written for `END` (SWI).
pub const TERMINATOR: u8 = 0x3F;

/// Value the code region holds before emission.
pub const ROM_FILL: u8 = 0xFF;

/// Result of a successful assembly.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub origin: u16,
    pub symbols: SymbolTable,
    /// Parsed statement per program line, up to and including `END`.
    pub statements: Vec<Statement>,
    /// Address of each entry in `statements`.
    pub addresses: Vec<u16>,
    /// Address → line index for instructions and `END`.
    pub address_map: BTreeMap<u16, usize>,
    pub listing: Listing,
}

impl Assembly {
    /// Line index of the instruction at `addr`.
    pub fn line_at(&self, addr: u16) -> Option<usize> {
        self.address_map.get(&addr).copied()
    }

    pub fn byte_count(&self) -> usize {
        self.listing.byte_count()
    }
}

/// Two-pass assembler with a fixed origin.
#[derive(Debug, Clone, Copy)]
pub struct Assembler {
    origin: u16,
}

impl Assembler {
    /// Create an assembler whose counter starts at `origin`.
    pub fn new(origin: u16) -> Self {
        Self { origin }
    }

    pub fn origin(&self) -> u16 {
        self.origin
    }

    /// Assemble a program into `mem`.
    ///
    /// The ROM region is refilled with $FF first. On error `mem` may hold
    /// partial output, so callers that need all-or-nothing behaviour
    /// assemble into a scratch copy.
    pub fn assemble(&self, program: &Program, mem: &mut AddressSpace) -> Result<Assembly, AsmError> {
        if program.is_empty() {
            return Err(AsmError::EmptyProgram);
        }
        let names = label_names(program);
        let symbols = self.collect_labels(program, &names);
        log::debug!("pass 1: {} labels", symbols.len());

        let assembly = self.emit_code(program, symbols, mem)?;
        log::info!(
            "assembled {} bytes from {} lines ({} labels)",
            assembly.byte_count(),
            assembly.statements.len(),
            assembly.symbols.len()
        );
        Ok(assembly)
    }

    // ==================== Pass 1 ====================

    fn collect_labels(&self, program: &Program, names: &HashSet<String>) -> SymbolTable {
        let mut symbols = SymbolTable::new();
        let mut counter = self.origin;

        for line in &program.lines {
            let mut parsed = match source::parse_line(line) {
                Ok(parsed) => parsed,
                Err(e) => {
                    log::debug!("pass 1: line {} not decodable ({}), assuming 1 byte", line.number, e);
                    if let Some(label) = decode::extract_label(&line.text) {
                        symbols.add_label(&label, counter);
                    }
                    counter = counter.wrapping_add(1);
                    continue;
                }
            };

            bind_labels(&mut parsed.statement, |text| names.contains(text));
            if let Statement::Org(addr) = parsed.statement {
                counter = addr;
            }
            if let Some(label) = &parsed.label {
                symbols.add_label(label, counter);
            }

            let size = match &parsed.statement {
                Statement::End => break,
                Statement::Empty | Statement::Org(_) => 0,
                Statement::Data(data) => data.size(),
                Statement::Instruction(instr) => emit::instruction_size(instr).unwrap_or_else(|e| {
                    log::debug!("pass 1: line {} has no size ({}), assuming 1 byte", line.number, e);
                    1
                }),
            };
            counter = counter.wrapping_add(size);
        }

        symbols
    }

    // ==================== Pass 2 ====================

    fn emit_code(
        &self,
        program: &Program,
        symbols: SymbolTable,
        mem: &mut AddressSpace,
    ) -> Result<Assembly, AsmError> {
        mem.fill_rom(ROM_FILL);
        let mut emitter = Emitter::new(mem, self.origin);

        let mut statements = Vec::with_capacity(program.len());
        let mut addresses = Vec::with_capacity(program.len());
        let mut address_map = BTreeMap::new();
        let mut listing = Listing::new(self.origin);

        for (idx, line) in program.lines.iter().enumerate() {
            let mut parsed = source::parse_line(line)?;
            bind_labels(&mut parsed.statement, |text| symbols.is_label_name(text));
            if let Statement::Org(addr) = parsed.statement {
                emitter.set_cursor(addr);
            }
            let address = emitter.cursor();

            let bytes = match &parsed.statement {
                Statement::Empty | Statement::Org(_) => Vec::new(),
                Statement::End => {
                    emitter.write_byte(TERMINATOR);
                    address_map.entry(address).or_insert(idx);
                    vec![TERMINATOR]
                }
                Statement::Instruction(instr) => {
                    if instr.mode == AddrMode::Relative {
                        check_branch(instr, address, &symbols, line.number)?;
                    }
                    let bytes = emitter
                        .emit(instr, &symbols)
                        .map_err(|e| encode_error(line.number, e))?;
                    address_map.entry(address).or_insert(idx);
                    bytes
                }
                Statement::Data(Data::Reserve(count)) => {
                    emitter.set_cursor(address.wrapping_add(*count));
                    Vec::new()
                }
                Statement::Data(data) => {
                    let bytes = data_bytes(data, &symbols, line.number)?;
                    emitter.write_bytes(&bytes);
                    bytes
                }
            };

            log::trace!("${:04X}: {:02X?} {}", address, bytes, line.text);
            listing.push(line.number, address, bytes, &line.text);
            addresses.push(address);
            let done = parsed.statement == Statement::End;
            statements.push(parsed.statement);
            if done {
                break;
            }
        }

        Ok(Assembly {
            origin: self.origin,
            symbols,
            statements,
            addresses,
            address_map,
            listing,
        })
    }
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new(crate::cpu::registers::RESET_PC)
    }
}

/// Uppercase names of every label up to `END`.
fn label_names(program: &Program) -> HashSet<String> {
    let mut names = HashSet::new();
    for line in &program.lines {
        let (label, end) = match source::parse_line(line) {
            Ok(parsed) => (parsed.label, parsed.statement == Statement::End),
            Err(_) => (decode::extract_label(&line.text), false),
        };
        names.extend(label);
        if end {
            break;
        }
    }
    names
}

fn bind_labels(statement: &mut Statement, is_label: impl Fn(&str) -> bool) {
    if let Statement::Instruction(instr) = statement {
        decode::bind_labels(instr, is_label);
    }
}

/// Verify a RELATIVE instruction's target exists and is in range.
fn check_branch(
    instr: &DecodedInstruction,
    address: u16,
    symbols: &SymbolTable,
    line: usize,
) -> Result<(), AsmError> {
    let target = match symbols.resolve(&instr.operand) {
        Ok(value) => value as u16,
        Err(ValueError::Undefined(label)) => return Err(AsmError::UndefinedLabel { line, label }),
        Err(ValueError::Decode(source)) => return Err(AsmError::Decode { line, source }),
    };
    let size = emit::instruction_size(instr).map_err(|e| encode_error(line, e))?;
    let width = opcodes::lookup(&instr.mnemonic)
        .map(|info| info.width)
        .unwrap_or(Width::Byte);

    let displacement = emit::branch_displacement(address, size, target);
    if !emit::displacement_fits(width, displacement) {
        return Err(AsmError::BranchOutOfRange {
            line,
            mnemonic: instr.mnemonic.clone(),
            displacement,
            limit: if width == Width::Word { 32767 } else { 127 },
        });
    }
    Ok(())
}

fn data_bytes(data: &Data, symbols: &SymbolTable, line: usize) -> Result<Vec<u8>, AsmError> {
    let value = |item: &str| -> Result<i32, AsmError> {
        symbols.resolve(item).map_err(|e| match e {
            ValueError::Undefined(label) => AsmError::UndefinedLabel { line, label },
            ValueError::Decode(source) => AsmError::Decode { line, source },
        })
    };

    let mut bytes = Vec::new();
    match data {
        Data::Bytes(items) => {
            for item in items {
                bytes.push(value(item)? as u8);
            }
        }
        Data::Words(items) => {
            for item in items {
                bytes.extend_from_slice(&(value(item)? as u16).to_be_bytes());
            }
        }
        Data::Text(text) => bytes.extend_from_slice(text),
        Data::Reserve(_) => {}
    }
    Ok(bytes)
}

fn encode_error(line: usize, e: EncodeError) -> AsmError {
    match e {
        EncodeError::UndefinedSymbol(label) => AsmError::UndefinedLabel { line, label },
        EncodeError::Decode(source) => AsmError::Decode { line, source },
        other => AsmError::Encode { line, source: other },
    }
}

/// Assemble source text with the default configuration.
///
/// Returns the assembly and the address space holding the code.
pub fn assemble(text: &str) -> Result<(Assembly, AddressSpace), AsmError> {
    assemble_with(text, &SimConfig::default())
}

/// Assemble source text into a fresh address space laid out by `config`.
pub fn assemble_with(text: &str, config: &SimConfig) -> Result<(Assembly, AddressSpace), AsmError> {
    let program = source::normalize(text)?;
    let mut mem = AddressSpace::with_regions(config.ram, config.rom);
    let assembly = Assembler::new(config.reset_pc).assemble(&program, &mut mem)?;
    Ok((assembly, mem))
}

/// Errors that can occur during assembly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AsmError {
    #[error("decode error on line {line}: {source}")]
    Decode { line: usize, source: DecodeError },

    #[error("undefined label on line {line}: {label}")]
    UndefinedLabel { line: usize, label: String },

    #[error("branch out of range on line {line}: {mnemonic} displacement {displacement} exceeds ±{limit}, use the long form")]
    BranchOutOfRange {
        line: usize,
        mnemonic: String,
        displacement: i32,
        limit: i32,
    },

    #[error("encoding error on line {line}: {source}")]
    Encode { line: usize, source: EncodeError },

    #[error("bad {directive} directive on line {line}: {reason}")]
    BadDirective {
        line: usize,
        directive: String,
        reason: String,
    },

    #[error("program is empty")]
    EmptyProgram,
}

impl AsmError {
    /// Source line the error refers to, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            AsmError::Decode { line, .. }
            | AsmError::UndefinedLabel { line, .. }
            | AsmError::BranchOutOfRange { line, .. }
            | AsmError::Encode { line, .. }
            | AsmError::BadDirective { line, .. } => Some(*line),
            AsmError::EmptyProgram => None,
        }
    }
}

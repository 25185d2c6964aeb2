//! Source-level execution control.
//!
//! The controller owns the CPU, the loaded program and its assembly, and
//! drives execution one source line at a time:
//! - `step` snapshots registers, executes the line at the cursor and
//!   moves the cursor to the line at the new PC
//! - `run` steps until `END`/`SWI`, an error, or the instruction ceiling
//! - `step_back` restores the last snapshot
//! - `reset` restores power-on registers without re-assembling

pub mod history;

use crate::asm::assembler::{Assembler, Assembly, AsmError};
use crate::asm::source::{self, Program, SourceLine, Statement};
use crate::config::SimConfig;
use crate::cpu::execute::{Cpu, CpuError, Flow};
use crate::cpu::registers::Registers;
use std::collections::BTreeMap;
use thiserror::Error;

pub use history::{CpuState, History};

/// What the line under the cursor is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStatus {
    /// An instruction ready to execute.
    Ready,
    /// `END`, `SWI`, `SWI2` or `SWI3`.
    Terminal,
    /// The cursor ran past the last line.
    Finished,
}

/// Loads, assembles and executes a program.
#[derive(Debug, Clone)]
pub struct ExecutionController {
    config: SimConfig,
    cpu: Cpu,
    program: Option<Program>,
    assembly: Option<Assembly>,
    current_line: usize,
    history: History,
}

impl ExecutionController {
    pub fn new(config: SimConfig) -> Self {
        Self {
            cpu: Cpu::with_config(&config),
            history: History::new(config.history_capacity),
            config,
            program: None,
            assembly: None,
            current_line: 0,
        }
    }

    // ==================== Program management ====================

    /// Load program text, replacing any previous program.
    ///
    /// The program is not assembled yet. On error the previous program
    /// stays loaded.
    pub fn load_program(&mut self, text: &str) -> Result<&Program, ExecError> {
        let program = source::normalize(text)?;
        if program.end_appended {
            log::info!("END added at line {}", program.len());
        }
        log::info!("loaded {} lines", program.len());
        self.assembly = None;
        self.reset();
        Ok(self.program.insert(program))
    }

    /// Assemble the loaded program into memory and reset the CPU.
    ///
    /// Assembly targets a copy of memory, so a failed assembly leaves the
    /// machine untouched.
    pub fn assemble(&mut self) -> Result<&Assembly, ExecError> {
        let program = self.program.as_ref().ok_or(ExecError::NotLoaded)?;
        let mut scratch = self.cpu.mem.clone();
        let assembly = Assembler::new(self.config.reset_pc).assemble(program, &mut scratch)?;
        self.cpu.mem = scratch;
        self.reset();
        Ok(self.assembly.insert(assembly))
    }

    /// Load and assemble in one call.
    pub fn load_and_assemble(&mut self, text: &str) -> Result<&Assembly, ExecError> {
        self.load_program(text)?;
        self.assemble()
    }

    pub fn is_program_loaded(&self) -> bool {
        self.program.is_some()
    }

    pub fn is_assembled(&self) -> bool {
        self.assembly.is_some()
    }

    // ==================== Execution ====================

    /// Execute one instruction.
    ///
    /// Returns `Ok(false)` without executing when the cursor is on a
    /// terminal line or past the end of the program.
    pub fn step(&mut self) -> Result<bool, ExecError> {
        self.execute_line(true)
    }

    /// Execute until a terminal line.
    ///
    /// Returns the number of instructions executed. Snapshots are not
    /// recorded while running.
    pub fn run(&mut self) -> Result<u64, ExecError> {
        let limit = self.config.run_limit;
        let mut count = 0;
        while count < limit {
            if !self.execute_line(false)? {
                log::info!("run stopped after {} instructions at line {}", count, self.current_line);
                return Ok(count);
            }
            count += 1;
        }
        if self.status()? != LineStatus::Ready {
            log::info!("run stopped after {} instructions at line {}", count, self.current_line);
            return Ok(count);
        }
        log::warn!("run aborted after {} instructions", limit);
        Err(ExecError::RunawayLimit { limit })
    }

    /// Undo the most recent step's register changes.
    ///
    /// Returns false if there is nothing to undo.
    pub fn step_back(&mut self) -> bool {
        match self.history.pop() {
            Some(state) => {
                self.cpu.regs = state.regs;
                self.current_line = state.line;
                self.cpu.executed = self.cpu.executed.saturating_sub(1);
                true
            }
            None => false,
        }
    }

    /// Power-on registers, empty history, cursor at the first line.
    /// Memory and the assembly are kept.
    pub fn reset(&mut self) {
        self.cpu.reset(self.config.reset_pc);
        self.history.clear();
        self.current_line = 0;
    }

    /// Status of the line under the cursor, after skipping lines that
    /// produce no instruction.
    pub fn status(&mut self) -> Result<LineStatus, ExecError> {
        self.ensure_assembled()?;
        Ok(self.settle())
    }

    fn ensure_assembled(&mut self) -> Result<(), ExecError> {
        if self.assembly.is_none() {
            self.assemble()?;
        }
        Ok(())
    }

    /// Move the cursor over label-only, `ORG` and data lines. `ORG` loads
    /// PC with the new origin.
    fn settle(&mut self) -> LineStatus {
        let Some(assembly) = &self.assembly else {
            return LineStatus::Finished;
        };
        loop {
            match assembly.statements.get(self.current_line) {
                None => return LineStatus::Finished,
                Some(Statement::End) => return LineStatus::Terminal,
                Some(Statement::Instruction(instr)) if instr.mnemonic.starts_with("SWI") => {
                    return LineStatus::Terminal;
                }
                Some(Statement::Instruction(_)) => return LineStatus::Ready,
                Some(Statement::Org(addr)) => {
                    self.cpu.regs.pc = *addr;
                    self.current_line += 1;
                }
                Some(Statement::Empty) | Some(Statement::Data(_)) => self.current_line += 1,
            }
        }
    }

    fn execute_line(&mut self, record: bool) -> Result<bool, ExecError> {
        self.ensure_assembled()?;
        if self.settle() != LineStatus::Ready {
            return Ok(false);
        }
        let Some(assembly) = &self.assembly else {
            return Err(ExecError::NotLoaded);
        };
        let idx = self.current_line;
        let Some(Statement::Instruction(instr)) = assembly.statements.get(idx) else {
            return Ok(false);
        };

        let snapshot = CpuState {
            regs: self.cpu.regs,
            line: idx,
        };
        self.cpu.regs.pc = assembly.addresses[idx];

        let flow = match self.cpu.execute(instr, &assembly.symbols) {
            Ok(flow) => flow,
            Err(source) => {
                self.cpu.regs = snapshot.regs;
                let line = self.program.as_ref().and_then(|p| p.lines.get(idx));
                return Err(ExecError::Cpu {
                    line: line.map_or(idx + 1, |l| l.number),
                    text: line.map(|l| l.text.clone()).unwrap_or_default(),
                    source,
                });
            }
        };
        if record {
            self.history.push(snapshot);
        }

        match flow {
            Flow::Next => self.current_line += 1,
            Flow::Jump(target) => match assembly.line_at(target) {
                Some(line) => self.current_line = line,
                None => return Err(ExecError::PcOutsideProgram { pc: target }),
            },
        }
        Ok(true)
    }

    // ==================== Inspection ====================

    /// Index of the line under the cursor.
    pub fn current_line(&self) -> usize {
        self.current_line
    }

    pub fn current_source_line(&self) -> Option<&SourceLine> {
        self.lines().get(self.current_line)
    }

    /// Normalized program lines (empty if nothing is loaded).
    pub fn lines(&self) -> &[SourceLine] {
        self.program.as_ref().map_or(&[], |p| p.lines.as_slice())
    }

    pub fn program(&self) -> Option<&Program> {
        self.program.as_ref()
    }

    pub fn assembly(&self) -> Option<&Assembly> {
        self.assembly.as_ref()
    }

    /// Address → line index of the current assembly.
    pub fn address_map(&self) -> Option<&BTreeMap<u16, usize>> {
        self.assembly.as_ref().map(|a| &a.address_map)
    }

    pub fn registers(&self) -> &Registers {
        &self.cpu.regs
    }

    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.cpu.regs
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn read_memory(&self, addr: u16) -> u8 {
        self.cpu.mem.read(addr)
    }

    pub fn write_memory(&mut self, addr: u16, value: u8) -> bool {
        self.cpu.mem.write(addr, value)
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }
}

impl Default for ExecutionController {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

/// Errors raised by the controller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecError {
    #[error("no program loaded")]
    NotLoaded,

    #[error(transparent)]
    Assembly(#[from] AsmError),

    #[error("execution error on line {line} ({text}): {source}")]
    Cpu {
        line: usize,
        text: String,
        source: CpuError,
    },

    #[error("PC ${pc:04X} is not the address of any instruction")]
    PcOutsideProgram { pc: u16 },

    #[error("run stopped after {limit} instructions (possible infinite loop)")]
    RunawayLimit { limit: u64 },
}

//! # M6809 Simulator
//!
//! A source-level simulator of the Motorola 6809 microprocessor.
//!
//! Programs are written in 6809 assembly, assembled by a two-pass
//! assembler into a 64K address space, and executed one source line at a
//! time with step, run, step-back and reset controls.

pub mod config;
pub mod cpu;
pub mod asm;
pub mod controller;

#[cfg(feature = "tui")]
pub mod tui;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use config::{ConfigError, Region, SimConfig};
pub use cpu::{AddressSpace, CcFlag, Cpu, CpuError, DecodedInstruction, Reg, Registers};
pub use asm::{assemble, AsmError, Assembler, Assembly, Listing, SymbolTable};
pub use controller::{CpuState, ExecError, ExecutionController, LineStatus};

#[cfg(feature = "tui")]
pub use tui::run_debugger;

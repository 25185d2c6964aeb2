//! CPU emulation for the Motorola 6809.
//!
//! This module implements the programmer-visible 6809:
//! - register file with the E F H I N Z V C condition codes
//! - a 64K address space backed by RAM and ROM regions
//! - decoder, addressing resolver, executor and code emitter driven by
//!   one instruction metadata table

pub mod registers;
pub mod memory;
pub mod decode;
pub mod opcodes;
pub mod addressing;
pub mod alu;
pub mod execute;
pub mod emit;

pub use memory::AddressSpace;
pub use registers::{CcFlag, Reg, Registers};
pub use decode::{AddrMode, DecodedInstruction, DecodeError};
pub use execute::{Cpu, CpuError, Flow};
pub use emit::{EncodeError, Emitter};

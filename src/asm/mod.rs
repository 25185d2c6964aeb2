//! Assembler for 6809 source programs.
//!
//! This module provides:
//! - source normalization and per-line parsing
//! - a symbol table for labels
//! - a two-pass assembler that emits machine code into an address space
//! - assembly listings (text and JSON)

pub mod source;
pub mod symbols;
pub mod assembler;
pub mod listing;

pub use assembler::{assemble, assemble_with, Assembler, Assembly, AsmError};
pub use listing::{Listing, ListingEntry, ListingError, load_listing, save_listing};
pub use source::{normalize, Program, SourceLine, Statement};
pub use symbols::{SymbolTable, ValueError};

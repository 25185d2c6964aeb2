//! TUI debugger for the 6809 simulator.
//!
//! Provides an interactive terminal-based debugger with:
//! - source view with the current line and breakpoints
//! - register and condition code display
//! - hex memory view
//! - step, step back, run and reset controls

mod app;
mod ui;

pub use app::{DebuggerApp, SourceRow, run_debugger};

//! WebAssembly bindings for the 6809 simulator.
//!
//! This module provides JavaScript-friendly wrappers around the execution
//! controller.

use wasm_bindgen::prelude::*;
use crate::asm::assemble;
use crate::controller::ExecutionController;

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(e: impl std::fmt::Display) -> JsError {
    JsError::new(&e.to_string())
}

/// WebAssembly-friendly machine wrapper.
#[wasm_bindgen]
pub struct WasmMachine {
    ctl: ExecutionController,
}

#[wasm_bindgen]
impl WasmMachine {
    /// Create a machine with the default configuration.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            ctl: ExecutionController::default(),
        }
    }

    /// Load and assemble a program. Returns the number of bytes emitted.
    #[wasm_bindgen]
    pub fn load_asm(&mut self, source: &str) -> Result<usize, JsError> {
        let assembly = self.ctl.load_and_assemble(source).map_err(js_error)?;
        Ok(assembly.byte_count())
    }

    #[wasm_bindgen]
    pub fn is_program_loaded(&self) -> bool {
        self.ctl.is_program_loaded()
    }

    /// Step one instruction. Returns false at END/SWI.
    #[wasm_bindgen]
    pub fn step(&mut self) -> Result<bool, JsError> {
        self.ctl.step().map_err(js_error)
    }

    #[wasm_bindgen]
    pub fn step_back(&mut self) -> bool {
        self.ctl.step_back()
    }

    /// Run to END/SWI. Returns the number of instructions executed.
    #[wasm_bindgen]
    pub fn run(&mut self) -> Result<u64, JsError> {
        self.ctl.run().map_err(js_error)
    }

    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.ctl.reset();
    }

    /// Index of the current source line.
    #[wasm_bindgen]
    pub fn current_line(&self) -> usize {
        self.ctl.current_line()
    }

    #[wasm_bindgen]
    pub fn line_count(&self) -> usize {
        self.ctl.lines().len()
    }

    #[wasm_bindgen]
    pub fn line_text(&self, index: usize) -> String {
        self.ctl.lines().get(index).map(|l| l.text.clone()).unwrap_or_default()
    }

    /// Address of a source line, or -1 if it has none.
    #[wasm_bindgen]
    pub fn line_address(&self, index: usize) -> i32 {
        self.ctl
            .assembly()
            .and_then(|a| a.addresses.get(index))
            .map_or(-1, |&addr| addr as i32)
    }

    #[wasm_bindgen]
    pub fn pc(&self) -> u16 {
        self.ctl.registers().pc
    }

    #[wasm_bindgen]
    pub fn a(&self) -> u8 {
        self.ctl.registers().a
    }

    #[wasm_bindgen]
    pub fn b(&self) -> u8 {
        self.ctl.registers().b
    }

    #[wasm_bindgen]
    pub fn d(&self) -> u16 {
        self.ctl.registers().d()
    }

    #[wasm_bindgen]
    pub fn x(&self) -> u16 {
        self.ctl.registers().x
    }

    #[wasm_bindgen]
    pub fn y(&self) -> u16 {
        self.ctl.registers().y
    }

    #[wasm_bindgen]
    pub fn s(&self) -> u16 {
        self.ctl.registers().s
    }

    #[wasm_bindgen]
    pub fn u(&self) -> u16 {
        self.ctl.registers().u
    }

    #[wasm_bindgen]
    pub fn dp(&self) -> u8 {
        self.ctl.registers().dp
    }

    #[wasm_bindgen]
    pub fn cc(&self) -> u8 {
        self.ctl.registers().cc
    }

    /// Flags as `EFHINZVC` with `.` for clear bits.
    #[wasm_bindgen]
    pub fn flags(&self) -> String {
        self.ctl.registers().flags_string()
    }

    #[wasm_bindgen]
    pub fn read_memory(&self, addr: u16) -> u8 {
        self.ctl.read_memory(addr)
    }

    #[wasm_bindgen]
    pub fn write_memory(&mut self, addr: u16, value: u8) -> bool {
        self.ctl.write_memory(addr, value)
    }

    /// `len` bytes starting at `start` (wrapping).
    #[wasm_bindgen]
    pub fn memory_range(&self, start: u16, len: usize) -> Vec<u8> {
        self.ctl
            .cpu()
            .mem
            .dump(start, len)
            .into_iter()
            .map(|(_, value)| value)
            .collect()
    }

    /// Registers as a JSON object.
    #[wasm_bindgen]
    pub fn registers_json(&self) -> Result<String, JsError> {
        serde_json::to_string(self.ctl.registers()).map_err(js_error)
    }

    /// Listing of the current assembly.
    #[wasm_bindgen]
    pub fn listing(&self) -> String {
        self.ctl
            .assembly()
            .map(|a| a.listing.to_text())
            .unwrap_or_default()
    }
}

impl Default for WasmMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Assemble source code and return its listing.
#[wasm_bindgen]
pub fn wasm_assemble(source: &str) -> Result<String, JsError> {
    let (assembly, _) = assemble(source).map_err(js_error)?;
    Ok(assembly.listing.to_text())
}

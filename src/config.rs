//! Simulator configuration.
//!
//! All fields have defaults matching the stock machine, so a JSON config
//! file only needs to list what it overrides:
//!
//! ```json
//! { "run_limit": 50000, "ram": { "start": 0, "end": 2047 } }
//! ```

use serde::{Serialize, Deserialize};
use std::path::Path;
use thiserror::Error;

use crate::cpu::registers::RESET_PC;

/// An inclusive address range backed by storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub start: u16,
    pub end: u16,
}

impl Region {
    pub const fn new(start: u16, end: u16) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn contains(&self, addr: u16) -> bool {
        addr >= self.start && addr <= self.end
    }

    /// Number of bytes in the region.
    pub fn len(&self) -> usize {
        (self.end as usize).saturating_sub(self.start as usize) + 1
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

/// Machine and debugger settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// PC after power-on and the assembler's default origin.
    pub reset_pc: u16,
    /// Low RAM region.
    pub ram: Region,
    /// High ROM/code region.
    pub rom: Region,
    /// Number of snapshots kept for step-back.
    pub history_capacity: usize,
    /// Instruction ceiling for `run()`.
    pub run_limit: u64,
}

impl SimConfig {
    /// Load a config from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(e.to_string()))?;
        let config: SimConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the memory model cannot represent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ram.is_empty() || self.rom.is_empty() {
            return Err(ConfigError::Invalid("memory regions must not be empty".into()));
        }
        if self.ram.contains(self.rom.start) || self.rom.contains(self.ram.start) {
            return Err(ConfigError::Invalid("RAM and ROM regions overlap".into()));
        }
        if self.history_capacity == 0 {
            return Err(ConfigError::Invalid("history_capacity must be at least 1".into()));
        }
        Ok(())
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            reset_pc: RESET_PC,
            ram: Region::new(0x0000, 0x03FF),
            rom: Region::new(0xFC00, 0xFFFF),
            history_capacity: 100,
            run_limit: 10_000,
        }
    }
}

/// Errors that can occur while loading a configuration.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("invalid config file: {0}")]
    Parse(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SimConfig::default();
        assert_eq!(config.reset_pc, 0xFC00);
        assert_eq!(config.ram.len(), 0x400);
        assert_eq!(config.rom.len(), 0x400);
        assert_eq!(config.run_limit, 10_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SimConfig = serde_json::from_str(r#"{ "run_limit": 500 }"#).unwrap();
        assert_eq!(config.run_limit, 500);
        assert_eq!(config.history_capacity, 100);
        assert_eq!(config.rom, Region::new(0xFC00, 0xFFFF));
    }

    #[test]
    fn test_overlap_rejected() {
        let config = SimConfig {
            ram: Region::new(0x0000, 0xFD00),
            ..SimConfig::default()
        };
        assert!(config.validate().is_err());
    }
}

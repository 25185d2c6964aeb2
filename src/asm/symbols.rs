//! Label → address table.

use crate::cpu::decode::{self, DecodeError};
use serde::{Serialize, Deserialize};
use std::collections::HashMap;
use thiserror::Error;

/// Case-insensitive symbol table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolTable {
    labels: HashMap<String, u16>,
}

/// Failure to turn operand text into a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("undefined symbol '{0}'")]
    Undefined(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a label. Redefinition overwrites the old address with a warning.
    pub fn add_label(&mut self, name: &str, address: u16) {
        let key = name.trim().to_ascii_uppercase();
        if let Some(old) = self.labels.insert(key.clone(), address) {
            if old != address {
                log::warn!("label {} redefined: ${:04X} -> ${:04X}", key, old, address);
            }
        }
    }

    pub fn address(&self, name: &str) -> Option<u16> {
        self.labels.get(&name.trim().to_ascii_uppercase()).copied()
    }

    pub fn is_label_name(&self, name: &str) -> bool {
        self.address(name).is_some()
    }

    pub fn clear(&mut self) {
        self.labels.clear();
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Labels sorted by address, then name.
    pub fn sorted(&self) -> Vec<(&str, u16)> {
        let mut out: Vec<(&str, u16)> = self.labels.iter().map(|(k, &v)| (k.as_str(), v)).collect();
        out.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(b.0)));
        out
    }

    /// Evaluate operand text: a defined label, otherwise a number.
    ///
    /// Labels win over bare hex, so a label named `ACE` shadows the
    /// number $ACE.
    pub fn resolve(&self, text: &str) -> Result<i32, ValueError> {
        let text = text.trim();
        if let Some(addr) = self.address(text) {
            return Ok(addr as i32);
        }
        match decode::parse_number(text) {
            Ok(value) => Ok(value),
            Err(_) if decode::is_label_name(text) => Err(ValueError::Undefined(text.to_ascii_uppercase())),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive() {
        let mut table = SymbolTable::new();
        table.add_label("Loop", 0xFC02);
        assert_eq!(table.address("LOOP"), Some(0xFC02));
        assert_eq!(table.address("loop"), Some(0xFC02));
        assert!(table.is_label_name("LoOp"));
        assert!(!table.is_label_name("DONE"));
    }

    #[test]
    fn test_redefinition_overwrites() {
        let mut table = SymbolTable::new();
        table.add_label("X1", 0x0010);
        table.add_label("x1", 0x0020);
        assert_eq!(table.address("X1"), Some(0x0020));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut table = SymbolTable::new();
        table.add_label("A1", 1);
        table.clear();
        assert!(table.is_empty());
    }

    #[test]
    fn test_resolve() {
        let mut table = SymbolTable::new();
        table.add_label("TABLE", 0xFD00);
        table.add_label("ACE", 0x0002);
        assert_eq!(table.resolve("TABLE").unwrap(), 0xFD00);
        assert_eq!(table.resolve("$10").unwrap(), 0x10);
        assert_eq!(table.resolve("ACE").unwrap(), 2);
        assert_eq!(table.resolve("BEEF").unwrap(), 0xBEEF);
        assert_eq!(table.resolve("NOPE"), Err(ValueError::Undefined("NOPE".into())));
        assert!(matches!(table.resolve("$ZZ"), Err(ValueError::Decode(_))));
    }

    #[test]
    fn test_sorted() {
        let mut table = SymbolTable::new();
        table.add_label("END_", 0xFC10);
        table.add_label("START", 0xFC00);
        let sorted = table.sorted();
        assert_eq!(sorted[0], ("START", 0xFC00));
        assert_eq!(sorted[1], ("END_", 0xFC10));
    }
}

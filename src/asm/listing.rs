//! Assembly listings.
//!
//! A listing records, per source line, the address it was assembled at
//! and the bytes it produced. It prints as a classic three-column text
//! listing and round-trips through JSON for `asm -o`.

use serde::{Serialize, Deserialize};
use std::path::Path;
use thiserror::Error;

/// One listing row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingEntry {
    /// 1-based source line number.
    pub line: usize,
    pub address: u16,
    pub bytes: Vec<u8>,
    pub source: String,
}

/// A complete listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub origin: u16,
    pub entries: Vec<ListingEntry>,
}

impl Listing {
    pub fn new(origin: u16) -> Self {
        Self { origin, entries: Vec::new() }
    }

    pub fn push(&mut self, line: usize, address: u16, bytes: Vec<u8>, source: &str) {
        self.entries.push(ListingEntry {
            line,
            address,
            bytes,
            source: source.to_string(),
        });
    }

    /// Total emitted bytes.
    pub fn byte_count(&self) -> usize {
        self.entries.iter().map(|e| e.bytes.len()).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as `ADDR  BYTES  SOURCE` rows.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            let bytes: Vec<String> = entry.bytes.iter().map(|b| format!("{:02X}", b)).collect();
            out.push_str(&format!(
                "{:04} {:04X}  {:<14} {}\n",
                entry.line,
                entry.address,
                bytes.join(" "),
                entry.source
            ));
        }
        out
    }
}

/// Save a listing as JSON.
pub fn save_listing<P: AsRef<Path>>(path: P, listing: &Listing) -> Result<(), ListingError> {
    let json = serde_json::to_string_pretty(listing)
        .map_err(|e| ListingError::Format(e.to_string()))?;
    std::fs::write(path.as_ref(), json).map_err(|e| ListingError::Io(e.to_string()))
}

/// Load a listing saved by [`save_listing`].
pub fn load_listing<P: AsRef<Path>>(path: P) -> Result<Listing, ListingError> {
    let text = std::fs::read_to_string(path.as_ref())
        .map_err(|e| ListingError::Io(e.to_string()))?;
    serde_json::from_str(&text).map_err(|e| ListingError::Format(e.to_string()))
}

/// Errors while reading or writing listing files.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListingError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("listing format error: {0}")]
    Format(String),
}

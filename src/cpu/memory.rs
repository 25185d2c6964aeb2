//! 6809 address space.
//!
//! The 64K address space is backed by two regions: low RAM
//! ($0000-$03FF) and the high ROM/code region ($FC00-$FFFF).
//! Anything outside them reads as zero and ignores writes.

use serde::{Serialize, Deserialize};

use crate::config::{Region, SimConfig};

/// Byte-addressable 64K space routed onto RAM and ROM backing stores.
#[derive(Clone, Serialize, Deserialize)]
pub struct AddressSpace {
    ram_region: Region,
    rom_region: Region,
    ram: Vec<u8>,
    rom: Vec<u8>,
}

impl AddressSpace {
    /// Create the stock memory map with all bytes zeroed.
    pub fn new() -> Self {
        let config = SimConfig::default();
        Self::with_regions(config.ram, config.rom)
    }

    /// Create a memory map with custom regions.
    pub fn with_regions(ram_region: Region, rom_region: Region) -> Self {
        Self {
            ram_region,
            rom_region,
            ram: vec![0; ram_region.len()],
            rom: vec![0; rom_region.len()],
        }
    }

    pub fn ram_region(&self) -> Region {
        self.ram_region
    }

    pub fn rom_region(&self) -> Region {
        self.rom_region
    }

    /// True if the address is backed by RAM or ROM.
    pub fn is_mapped(&self, addr: u16) -> bool {
        self.ram_region.contains(addr) || self.rom_region.contains(addr)
    }

    /// Read a byte. Unmapped addresses read as 0.
    pub fn read(&self, addr: u16) -> u8 {
        if self.ram_region.contains(addr) {
            self.ram[(addr - self.ram_region.start) as usize]
        } else if self.rom_region.contains(addr) {
            self.rom[(addr - self.rom_region.start) as usize]
        } else {
            log::warn!("read from unmapped address ${:04X}, returning 0", addr);
            0
        }
    }

    /// Write a byte. Returns false (and logs) if the address is unmapped.
    pub fn write(&mut self, addr: u16, value: u8) -> bool {
        if self.ram_region.contains(addr) {
            self.ram[(addr - self.ram_region.start) as usize] = value;
            true
        } else if self.rom_region.contains(addr) {
            self.rom[(addr - self.rom_region.start) as usize] = value;
            true
        } else {
            log::warn!("write of ${:02X} to unmapped address ${:04X} discarded", value, addr);
            false
        }
    }

    /// Read a big-endian word; the second byte address wraps.
    pub fn read_word(&self, addr: u16) -> u16 {
        let hi = self.read(addr);
        let lo = self.read(addr.wrapping_add(1));
        u16::from_be_bytes([hi, lo])
    }

    /// Write a big-endian word (high byte first).
    pub fn write_word(&mut self, addr: u16, value: u16) {
        let [hi, lo] = value.to_be_bytes();
        self.write(addr, hi);
        self.write(addr.wrapping_add(1), lo);
    }

    /// Zero the RAM region.
    pub fn clear_ram(&mut self) {
        self.ram.fill(0);
    }

    /// Fill the code region with a byte (the assembler erases with $FF).
    pub fn fill_rom(&mut self, value: u8) {
        self.rom.fill(value);
    }

    /// Dump a range of memory (for viewers and debugging).
    pub fn dump(&self, start: u16, count: usize) -> Vec<(u16, u8)> {
        (0..count)
            .map(|i| {
                let addr = start.wrapping_add(i as u16);
                (addr, self.peek(addr))
            })
            .collect()
    }

    /// Like `read`, but silent for unmapped addresses.
    pub fn peek(&self, addr: u16) -> u8 {
        if self.is_mapped(addr) {
            self.read(addr)
        } else {
            0
        }
    }
}

impl Default for AddressSpace {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AddressSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Only count non-zero bytes
        let ram_used = self.ram.iter().filter(|&&b| b != 0).count();
        let rom_used = self.rom.iter().filter(|&&b| b != 0 && b != 0xFF).count();

        f.debug_struct("AddressSpace")
            .field("ram", &format_args!("${:04X}-${:04X}", self.ram_region.start, self.ram_region.end))
            .field("rom", &format_args!("${:04X}-${:04X}", self.rom_region.start, self.rom_region.end))
            .field("ram_non_zero", &ram_used)
            .field("rom_used", &rom_used)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ram_read_write() {
        let mut mem = AddressSpace::new();
        assert!(mem.write(0x0010, 0x42));
        assert_eq!(mem.read(0x0010), 0x42);
        assert!(mem.write(0x03FF, 0x99));
        assert_eq!(mem.read(0x03FF), 0x99);
    }

    #[test]
    fn test_rom_read_write() {
        let mut mem = AddressSpace::new();
        assert!(mem.write(0xFC00, 0x86));
        assert!(mem.write(0xFFFF, 0x3F));
        assert_eq!(mem.read(0xFC00), 0x86);
        assert_eq!(mem.read(0xFFFF), 0x3F);
    }

    #[test]
    fn test_unmapped_access() {
        let mut mem = AddressSpace::new();
        assert!(!mem.write(0x0400, 0x12));
        assert_eq!(mem.read(0x0400), 0);
        assert!(!mem.write(0x8000, 0x12));
        assert_eq!(mem.read(0xFBFF), 0);
    }

    #[test]
    fn test_word_big_endian_and_wrap() {
        let mut mem = AddressSpace::new();
        mem.write_word(0x0020, 0xBEEF);
        assert_eq!(mem.read(0x0020), 0xBE);
        assert_eq!(mem.read(0x0021), 0xEF);
        assert_eq!(mem.read_word(0x0020), 0xBEEF);

        // $FFFF wraps to $0000 for the low byte
        mem.write_word(0xFFFF, 0x1234);
        assert_eq!(mem.read(0xFFFF), 0x12);
        assert_eq!(mem.read(0x0000), 0x34);
    }

    #[test]
    fn test_fill_rom() {
        let mut mem = AddressSpace::new();
        mem.fill_rom(0xFF);
        assert_eq!(mem.read(0xFD00), 0xFF);
        assert_eq!(mem.read(0x0000), 0x00);
    }
}

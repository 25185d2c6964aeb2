//! 6809 CPU registers.
//!
//! The 6809 has:
//! - PC, X, Y, U, S: 16-bit program counter, index registers and stack pointers
//! - A, B: 8-bit accumulators, concatenated as the 16-bit D register
//! - DP: 8-bit direct page register
//! - CC: 8-bit condition code register (E F H I N Z V C)

use serde::{Serialize, Deserialize};

/// Program counter value after power-on.
pub const RESET_PC: u16 = 0xFC00;

/// Condition code register value after power-on (Z set).
pub const RESET_CC: u8 = 0x04;

/// Condition code flag bits.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CcFlag {
    C = 0x01, // Carry
    V = 0x02, // Overflow
    Z = 0x04, // Zero
    N = 0x08, // Negative
    I = 0x10, // IRQ mask
    H = 0x20, // Half carry
    F = 0x40, // FIRQ mask
    E = 0x80, // Entire
}

impl CcFlag {
    /// All flags, most significant bit first (display order).
    pub const ALL: [CcFlag; 8] = [
        CcFlag::E, CcFlag::F, CcFlag::H, CcFlag::I,
        CcFlag::N, CcFlag::Z, CcFlag::V, CcFlag::C,
    ];

    /// Single-letter name of the flag.
    pub fn letter(self) -> char {
        match self {
            CcFlag::C => 'C',
            CcFlag::V => 'V',
            CcFlag::Z => 'Z',
            CcFlag::N => 'N',
            CcFlag::I => 'I',
            CcFlag::H => 'H',
            CcFlag::F => 'F',
            CcFlag::E => 'E',
        }
    }
}

/// The 6809 register file.
///
/// Every register is stored at its natural width, so writes are masked
/// by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    pub pc: u16,
    pub x: u16,
    pub y: u16,
    pub s: u16,
    pub u: u16,
    pub dp: u8,
    pub a: u8,
    pub b: u8,
    pub cc: u8,
}

impl Registers {
    /// Create a register file in the power-on state.
    pub fn new() -> Self {
        Self::with_reset_pc(RESET_PC)
    }

    /// Power-on state with a custom reset vector.
    pub fn with_reset_pc(pc: u16) -> Self {
        Self {
            pc,
            x: 0,
            y: 0,
            s: 0,
            u: 0,
            dp: 0,
            a: 0,
            b: 0,
            cc: RESET_CC,
        }
    }

    /// Restore the power-on state, keeping the given reset vector.
    pub fn reset(&mut self, pc: u16) {
        *self = Self::with_reset_pc(pc);
    }

    /// D = A:B
    #[inline]
    pub fn d(&self) -> u16 {
        u16::from_be_bytes([self.a, self.b])
    }

    #[inline]
    pub fn set_d(&mut self, value: u16) {
        let [hi, lo] = value.to_be_bytes();
        self.a = hi;
        self.b = lo;
    }

    #[inline]
    pub fn flag(&self, flag: CcFlag) -> bool {
        self.cc & flag as u8 != 0
    }

    #[inline]
    pub fn set_flag(&mut self, flag: CcFlag, set: bool) {
        if set {
            self.cc |= flag as u8;
        } else {
            self.cc &= !(flag as u8);
        }
    }

    /// Read a register by its assembler name (A, B, D, X, Y, U, S, PC, DP, CC).
    pub fn get(&self, reg: Reg) -> u16 {
        match reg {
            Reg::A => self.a as u16,
            Reg::B => self.b as u16,
            Reg::D => self.d(),
            Reg::X => self.x,
            Reg::Y => self.y,
            Reg::U => self.u,
            Reg::S => self.s,
            Reg::Pc => self.pc,
            Reg::Dp => self.dp as u16,
            Reg::Cc => self.cc as u16,
        }
    }

    /// Write a register, masking the value to the register's width.
    pub fn set(&mut self, reg: Reg, value: u16) {
        match reg {
            Reg::A => self.a = value as u8,
            Reg::B => self.b = value as u8,
            Reg::D => self.set_d(value),
            Reg::X => self.x = value,
            Reg::Y => self.y = value,
            Reg::U => self.u = value,
            Reg::S => self.s = value,
            Reg::Pc => self.pc = value,
            Reg::Dp => self.dp = value as u8,
            Reg::Cc => self.cc = value as u8,
        }
    }

    /// Render CC as `EFHINZVC` letters, `.` for clear bits.
    pub fn flags_string(&self) -> String {
        CcFlag::ALL
            .iter()
            .map(|&f| if self.flag(f) { f.letter() } else { '.' })
            .collect()
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

/// Programmer-visible registers, as named in operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reg {
    A,
    B,
    D,
    X,
    Y,
    U,
    S,
    Pc,
    Dp,
    Cc,
}

impl Reg {
    /// Parse an (uppercase or lowercase) register name.
    pub fn parse(name: &str) -> Option<Reg> {
        match name.trim().to_ascii_uppercase().as_str() {
            "A" => Some(Reg::A),
            "B" => Some(Reg::B),
            "D" => Some(Reg::D),
            "X" => Some(Reg::X),
            "Y" => Some(Reg::Y),
            "U" => Some(Reg::U),
            "S" => Some(Reg::S),
            "PC" => Some(Reg::Pc),
            "DP" => Some(Reg::Dp),
            "CC" | "CCR" => Some(Reg::Cc),
            _ => None,
        }
    }

    /// True for the 16-bit registers.
    pub fn is_wide(self) -> bool {
        matches!(self, Reg::D | Reg::X | Reg::Y | Reg::U | Reg::S | Reg::Pc)
    }

    /// TFR/EXG postbyte nibble.
    pub fn transfer_code(self) -> u8 {
        match self {
            Reg::D => 0x0,
            Reg::X => 0x1,
            Reg::Y => 0x2,
            Reg::U => 0x3,
            Reg::S => 0x4,
            Reg::Pc => 0x5,
            Reg::A => 0x8,
            Reg::B => 0x9,
            Reg::Cc => 0xA,
            Reg::Dp => 0xB,
        }
    }
}

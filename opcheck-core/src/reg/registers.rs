use core::fmt;
use std::{fmt::Display, str::FromStr};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

use num_derive::FromPrimitive;

use crate::utils::HexWidth;

/// The number of general purpose registers in the register file.
pub const GENERAL_REGISTER_COUNT: usize = 32;

#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, EnumIter, FromPrimitive,
)]
#[repr(u8)]
pub enum RegisterId {
    // [ General Purpose Registers ] //
    #[default]
    R0 = 0,
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
    R8,
    R9,
    R10,
    R11,
    R12,
    R13,
    R14,
    R15,
    R16,
    R17,
    R18,
    R19,
    R20,
    R21,
    R22,
    R23,
    R24,
    R25,
    /// The low byte of the X pointer.
    R26,
    /// The high byte of the X pointer.
    R27,
    /// The low byte of the Y pointer.
    R28,
    /// The high byte of the Y pointer.
    R29,
    /// The low byte of the Z pointer.
    R30,
    /// The high byte of the Z pointer.
    R31,

    // [ System Registers ] //
    /// Status register.
    SREG = 32,
    /// Stack pointer.
    SP = 33,
    /// Program counter, as a word address.
    PC = 34,

    // [ Extended Addressing Registers ] //
    /// Bits 16 to 23 of the extended Z pointer. Only present on parts with more than 64 KiB of flash.
    RAMPZ = 35,
}

/// The low byte of the Z pointer.
pub const Z_LOW: RegisterId = RegisterId::R30;
/// The high byte of the Z pointer.
pub const Z_HIGH: RegisterId = RegisterId::R31;

impl RegisterId {
    /// Get the general purpose register with the given index.
    ///
    /// # Arguments
    ///
    /// * `index` - The register index, in the range 0 to 31.
    ///
    /// # Returns
    ///
    /// An option containing the [`RegisterId`], or None if the index does not name a general purpose register.
    pub fn general(index: u8) -> Option<Self> {
        if (index as usize) < GENERAL_REGISTER_COUNT {
            num_traits::FromPrimitive::from_u8(index)
        } else {
            None
        }
    }

    /// Is this one of the 8-bit general purpose registers?
    #[inline(always)]
    pub fn is_general(&self) -> bool {
        (*self as u8) < GENERAL_REGISTER_COUNT as u8
    }

    /// The hexadecimal width used when printing values held by this register.
    pub fn hex_width(&self) -> HexWidth {
        match self {
            RegisterId::SP => HexWidth::Word,
            RegisterId::PC => HexWidth::Address,
            _ => HexWidth::Byte,
        }
    }
}

impl FromStr for RegisterId {
    type Err = ();

    fn from_str(input: &str) -> Result<RegisterId, Self::Err> {
        let upper = input.to_uppercase();
        match upper.as_str() {
            "SREG" => Ok(RegisterId::SREG),
            "SP" => Ok(RegisterId::SP),
            "PC" => Ok(RegisterId::PC),
            "RAMPZ" => Ok(RegisterId::RAMPZ),
            _ => upper
                .strip_prefix('R')
                .and_then(|index| index.parse::<u8>().ok())
                .and_then(RegisterId::general)
                .ok_or(()),
        }
    }
}

impl Display for RegisterId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            RegisterId::SREG => write!(f, "SREG"),
            RegisterId::SP => write!(f, "SP"),
            RegisterId::PC => write!(f, "PC"),
            RegisterId::RAMPZ => write!(f, "RAMPZ"),
            id => write!(f, "R{}", id as u8),
        }
    }
}

impl From<RegisterId> for u8 {
    fn from(m: RegisterId) -> u8 {
        m as u8
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Registers {
    /// The general purpose registers, R0 through R31.
    gpr: [u8; GENERAL_REGISTER_COUNT],
    /// The status register.
    sreg: u8,
    /// The stack pointer.
    sp: u16,
    /// The program counter, as a word address.
    pc: u32,
    /// The RAMPZ register, if the part implements one.
    rampz: Option<u8>,
}

impl Registers {
    /// Create a new register file.
    ///
    /// # Arguments
    ///
    /// * `has_rampz` - Should the register file contain a RAMPZ register?
    /// * `initial_sp` - The value of the stack pointer after reset.
    pub fn new(has_rampz: bool, initial_sp: u16) -> Self {
        Self {
            gpr: [0; GENERAL_REGISTER_COUNT],
            sreg: 0,
            sp: initial_sp,
            pc: 0,
            rampz: has_rampz.then_some(0),
        }
    }

    /// Does this register file contain the given register?
    #[inline(always)]
    pub fn contains(&self, id: RegisterId) -> bool {
        id != RegisterId::RAMPZ || self.rampz.is_some()
    }

    /// Read the value of a register.
    ///
    /// # Arguments
    ///
    /// * `id` - The [`RegisterId`] for the register in question.
    ///
    /// # Returns
    ///
    /// An option containing the value of the register, or None if the register is not implemented.
    #[inline(always)]
    pub fn read(&self, id: RegisterId) -> Option<u32> {
        match id {
            RegisterId::SREG => Some(self.sreg as u32),
            RegisterId::SP => Some(self.sp as u32),
            RegisterId::PC => Some(self.pc),
            RegisterId::RAMPZ => self.rampz.map(u32::from),
            id => Some(self.gpr[id as usize] as u32),
        }
    }

    /// Read the value of a general purpose register.
    #[inline(always)]
    pub fn read_general(&self, id: RegisterId) -> u8 {
        debug_assert!(id.is_general());
        self.gpr[id as usize]
    }

    /// Write the value of a general purpose register.
    #[inline(always)]
    pub fn write_general(&mut self, id: RegisterId, value: u8) {
        debug_assert!(id.is_general());
        self.gpr[id as usize] = value;
    }

    /// Read the RAMPZ register, if the part implements one.
    #[inline(always)]
    pub fn rampz(&self) -> Option<u8> {
        self.rampz
    }

    /// Write the RAMPZ register.
    ///
    /// # Returns
    ///
    /// A boolean, true if the register exists and was written, false otherwise.
    #[inline(always)]
    pub fn set_rampz(&mut self, value: u8) -> bool {
        match self.rampz.as_mut() {
            Some(rampz) => {
                *rampz = value;
                true
            }
            None => false,
        }
    }

    /// Get the program counter, as a word address.
    #[inline(always)]
    pub fn pc(&self) -> u32 {
        self.pc
    }

    /// Set the program counter, as a word address.
    #[inline(always)]
    pub fn set_pc(&mut self, value: u32) {
        self.pc = value;
    }

    /// Get the 16-bit Z pointer.
    #[inline(always)]
    pub fn z(&self) -> u16 {
        u16::from_le_bytes([self.read_general(Z_LOW), self.read_general(Z_HIGH)])
    }

    /// Set the 16-bit Z pointer.
    #[inline(always)]
    pub fn set_z(&mut self, value: u16) {
        let [low, high] = value.to_le_bytes();
        self.write_general(Z_LOW, low);
        self.write_general(Z_HIGH, high);
    }

    /// Iterate over every implemented register, in register order.
    pub fn iter(&self) -> impl Iterator<Item = (RegisterId, u32)> + '_ {
        RegisterId::iter().filter_map(|id| self.read(id).map(|value| (id, value)))
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new(false, 0)
    }
}

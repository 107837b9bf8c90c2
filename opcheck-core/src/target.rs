use core::fmt;
use enumflags2::{BitFlags, bitflags};
use std::str::FromStr;
use thiserror::Error;

/// The largest flash image a 24-bit extended address can reach.
pub const MAX_FLASH_SIZE: usize = 0x100_0000;

/// The number of bytes in a kibibyte.
const KIBIBYTE: usize = 1024;

#[bitflags]
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TargetFeature {
    /// The part implements the RAMPZ register, and with it the ELPM family.
    Rampz = 0b0000_0001,
    /// The part implements the EIND register for extended indirect jumps.
    Eind = 0b0000_0010,
}

impl fmt::Display for TargetFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetFeature::Rampz => write!(f, "RAMPZ"),
            TargetFeature::Eind => write!(f, "EIND"),
        }
    }
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum TargetError {
    #[error("unknown target `{0}`")]
    UnknownTarget(String),
    #[error("target `{name}` has an invalid flash size of {size} bytes")]
    InvalidFlashSize { name: String, size: usize },
}

/// A static description of a simulated part.
///
/// The fields are only reachable through [`Target::new`] and the presets, so the flash size is
/// always valid.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Target {
    /// The name of the part.
    name: String,
    /// The size of the flash (program memory), in bytes.
    flash_size: usize,
    /// The value of the stack pointer after reset.
    ram_end: u16,
    /// The capabilities of the part.
    features: BitFlags<TargetFeature>,
}

impl Target {
    /// Build a custom [`Target`].
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the part.
    /// * `flash_size` - The size of the flash, in bytes. Must be even, non-zero and reachable by a 24-bit address.
    /// * `ram_end` - The value of the stack pointer after reset.
    /// * `features` - The capabilities of the part.
    pub fn new(
        name: &str,
        flash_size: usize,
        ram_end: u16,
        features: BitFlags<TargetFeature>,
    ) -> Result<Self, TargetError> {
        if flash_size == 0 || flash_size % 2 != 0 || flash_size > MAX_FLASH_SIZE {
            return Err(TargetError::InvalidFlashSize {
                name: name.to_string(),
                size: flash_size,
            });
        }

        Ok(Self {
            name: name.to_string(),
            flash_size,
            ram_end,
            features,
        })
    }

    /// An 8 KiB part without extended addressing.
    pub fn atmega8() -> Self {
        Self {
            name: "atmega8".to_string(),
            flash_size: 8 * KIBIBYTE,
            ram_end: 0x045f,
            features: BitFlags::empty(),
        }
    }

    /// A 128 KiB part with a RAMPZ register.
    pub fn atmega128() -> Self {
        Self {
            name: "atmega128".to_string(),
            flash_size: 128 * KIBIBYTE,
            ram_end: 0x10ff,
            features: TargetFeature::Rampz.into(),
        }
    }

    /// A 256 KiB part with both RAMPZ and EIND registers.
    pub fn atmega2560() -> Self {
        Self {
            name: "atmega2560".to_string(),
            flash_size: 256 * KIBIBYTE,
            ram_end: 0x21ff,
            features: TargetFeature::Rampz | TargetFeature::Eind,
        }
    }

    /// The names of every built-in target.
    pub fn preset_names() -> &'static [&'static str] {
        &["atmega8", "atmega128", "atmega2560"]
    }

    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The size of the flash, in bytes. Always even and non-zero.
    #[inline(always)]
    pub fn flash_size(&self) -> usize {
        self.flash_size
    }

    /// The value of the stack pointer after reset.
    #[inline(always)]
    pub fn ram_end(&self) -> u16 {
        self.ram_end
    }

    #[inline(always)]
    pub fn features(&self) -> BitFlags<TargetFeature> {
        self.features
    }

    /// Does the part implement the given feature?
    #[inline(always)]
    pub fn has(&self, feature: TargetFeature) -> bool {
        self.features.contains(feature)
    }
}

impl Default for Target {
    fn default() -> Self {
        Self::atmega2560()
    }
}

impl FromStr for Target {
    type Err = TargetError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.to_lowercase().as_str() {
            "atmega8" => Ok(Target::atmega8()),
            "atmega128" => Ok(Target::atmega128()),
            "atmega2560" => Ok(Target::atmega2560()),
            _ => Err(TargetError::UnknownTarget(input.to_string())),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

use std::fmt::{self, Display, Formatter};

use crate::{
    cpu_error::{CpuError, CpuResult},
    reg::registers::RegisterId,
};

use super::op_codes::OpCode;

/// The size of every ELPM family instruction, in words.
pub const INSTRUCTION_SIZE_WORDS: u32 = 1;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Instruction {
    /// Load the byte at RAMPZ:Z into R0.
    Elpm,
    /// Load the byte at RAMPZ:Z into a register.
    ElpmZ(RegisterId),
    /// Load the byte at RAMPZ:Z into a register, then increment RAMPZ:Z.
    ElpmZInc(RegisterId),
}

impl Instruction {
    /// Decode a raw instruction word.
    ///
    /// # Arguments
    ///
    /// * `word` - The raw instruction word.
    ///
    /// # Returns
    ///
    /// The decoded [`Instruction`], or a [`CpuError`] if the word is not a (defined) member of the ELPM family.
    pub fn decode(word: u16) -> CpuResult<Self> {
        let (op, destination) = OpCode::split(word).ok_or(CpuError::IllegalOpcode(word))?;
        let rd = RegisterId::general(destination).ok_or(CpuError::IllegalOpcode(word))?;

        match op {
            OpCode::Elpm => Ok(Instruction::Elpm),
            OpCode::ElpmZ => Ok(Instruction::ElpmZ(rd)),
            // Loading into either half of the pointer being incremented is undefined.
            OpCode::ElpmZInc if matches!(rd, RegisterId::R30 | RegisterId::R31) => {
                Err(CpuError::UndefinedOperation(word))
            }
            OpCode::ElpmZInc => Ok(Instruction::ElpmZInc(rd)),
        }
    }

    /// Encode this instruction as a raw instruction word.
    pub fn encode(&self) -> u16 {
        match self {
            Instruction::Elpm => OpCode::Elpm.join(0),
            Instruction::ElpmZ(rd) => OpCode::ElpmZ.join(*rd as u8),
            Instruction::ElpmZInc(rd) => OpCode::ElpmZInc.join(*rd as u8),
        }
    }

    /// The register that receives the loaded byte.
    pub fn destination(&self) -> RegisterId {
        match self {
            Instruction::Elpm => RegisterId::R0,
            Instruction::ElpmZ(rd) | Instruction::ElpmZInc(rd) => *rd,
        }
    }

    /// Does this instruction post-increment RAMPZ:Z?
    pub fn post_increments(&self) -> bool {
        matches!(self, Instruction::ElpmZInc(_))
    }

    /// The size of this instruction, in words.
    #[inline(always)]
    pub fn size_words(&self) -> u32 {
        INSTRUCTION_SIZE_WORDS
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Instruction::Elpm => write!(f, "elpm"),
            Instruction::ElpmZ(rd) => write!(f, "elpm {}, Z", rd.to_string().to_lowercase()),
            Instruction::ElpmZInc(rd) => write!(f, "elpm {}, Z+", rd.to_string().to_lowercase()),
        }
    }
}

use thiserror::Error;

use crate::{ins::instruction::Instruction, reg::registers::RegisterId};

/// Result with internal [`CpuError`] type.
pub type CpuResult<T> = core::result::Result<T, CpuError>;

/// Errors reported by the simulated CPU.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum CpuError {
    /// The word does not encode an instruction the core implements.
    #[error("illegal opcode {0:04x}")]
    IllegalOpcode(u16),
    /// The word encodes an instruction whose behaviour is undefined.
    #[error("opcode {0:04x} has undefined behaviour")]
    UndefinedOperation(u16),
    /// The register is not one of the 8-bit general purpose registers.
    #[error("register {0} is not a general purpose register")]
    NotGeneralPurpose(RegisterId),
    /// The register is not implemented by the part.
    #[error("register {0} is not implemented by this part")]
    MissingRegister(RegisterId),
    /// The instruction needs a feature the part does not implement.
    #[error("instruction `{0}` is not supported by this part")]
    UnsupportedInstruction(Instruction),
}

use crate::{cpu_error::CpuResult, reg::registers::RegisterId};

use super::snapshot::RegisterSnapshot;

/// The surface a simulated CPU exposes to the harness.
///
/// Implementations are expected to be freshly built (or fully reset) for every case.
pub trait SimulatedCpu {
    /// The name of the simulated part, used in diagnostics.
    fn target_name(&self) -> &str;

    /// Does the part implement the RAMPZ extension register?
    fn target_has_extended_addressing(&self) -> bool;

    /// Write an 8-bit general purpose register.
    ///
    /// # Returns
    ///
    /// A [`CpuError::NotGeneralPurpose`](crate::cpu_error::CpuError::NotGeneralPurpose) if `id` is
    /// not one of R0 to R31.
    fn write_register(&mut self, id: RegisterId, value: u8) -> CpuResult<()>;

    /// Read an 8-bit general purpose register.
    ///
    /// # Returns
    ///
    /// The value, or a `NotGeneralPurpose` error if `id` is not one of R0 to R31.
    fn read_register(&self, id: RegisterId) -> CpuResult<u8>;

    /// Write the RAMPZ extension register.
    fn write_extension_register(&mut self, value: u8) -> CpuResult<()>;

    /// Read the RAMPZ extension register, if the part implements one.
    fn read_extension_register(&self) -> Option<u8>;

    /// Seed a word of program memory.
    ///
    /// # Arguments
    ///
    /// * `byte_address` - The byte address of the word. The lowest bit is ignored.
    /// * `word` - The word to be written.
    fn write_program_word(&mut self, byte_address: u32, word: u16);

    /// Capture the complete register file.
    fn snapshot(&self) -> RegisterSnapshot;

    /// Load and execute exactly one instruction.
    ///
    /// # Returns
    ///
    /// The complete register file after the instruction retired.
    fn execute_one_instruction(&mut self, opcode: u16) -> CpuResult<RegisterSnapshot>;
}

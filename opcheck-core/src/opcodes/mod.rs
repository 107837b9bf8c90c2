//! Concrete opcode tests for the ELPM family.
//!
//! Every test seeds the same word into program memory and checks which half of it the
//! instruction loaded.

pub mod elpm;
pub mod elpm_z;
pub mod elpm_z_incr;

use crate::{
    harness::{
        error::{HarnessError, HarnessResult},
        matrix::CaseParams,
        opcode_test::SetupState,
        simulator::SimulatedCpu,
    },
    reg::registers::{Z_HIGH, Z_LOW},
    target::TargetFeature,
    utils::WORD_ALIGN_MASK,
};

/// The word seeded into program memory. Odd addresses read the high byte, even addresses the low byte.
pub const PROGRAM_WORD: u16 = 0xaa55;

/// The byte an ELPM load from `address` must return.
#[inline(always)]
pub fn expected_byte(address: u32) -> u8 {
    let [low, high] = PROGRAM_WORD.to_le_bytes();
    if address & 0x1 == 0x1 { high } else { low }
}

/// Skip the case on parts without a RAMPZ register.
pub fn require_extended_addressing(cpu: &dyn SimulatedCpu) -> HarnessResult<()> {
    if cpu.target_has_extended_addressing() {
        return Ok(());
    }

    Err(HarnessError::UnsupportedFeature {
        target: cpu.target_name().to_string(),
        feature: TargetFeature::Rampz,
    })
}

/// Load RAMPZ:Z from the case parameters and seed the program word the pointer lands in.
pub fn setup_extended_pointer(params: &CaseParams, state: &mut SetupState) {
    let [low, high] = params.z.to_le_bytes();
    state.set_register(Z_LOW, low);
    state.set_register(Z_HIGH, high);
    state.set_extension_register(params.rampz);

    state.write_program_word(params.extended_address() & WORD_ALIGN_MASK, PROGRAM_WORD);
}

use std::ops::RangeInclusive;

use crate::{
    harness::{
        error::HarnessResult,
        matrix::CaseParams,
        opcode_test::{Analysis, OpcodeFamily, OpcodeTest, SetupState},
        simulator::SimulatedCpu,
    },
    ins::instruction::Instruction,
    utils::HexWidth,
};

use super::{expected_byte, require_extended_addressing, setup_extended_pointer};

/// ELPM Rd, Z - extended load from program memory without touching the pointer.
///
/// Operation: `Rd <- (RAMPZ:Z)`. Defined for every destination, including the pointer itself.
#[derive(Clone, Copy, Debug)]
pub struct ElpmZ {
    params: CaseParams,
}

impl OpcodeFamily for ElpmZ {
    const NAME: &'static str = "ELPM_Z";

    fn valid_destinations() -> RangeInclusive<u8> {
        0..=31
    }

    fn from_params(params: CaseParams) -> Self {
        Self { params }
    }
}

impl OpcodeTest for ElpmZ {
    fn ensure_target_supports_opcode(&self, cpu: &dyn SimulatedCpu) -> HarnessResult<()> {
        require_extended_addressing(cpu)
    }

    fn setup(&self, state: &mut SetupState) -> u16 {
        state.set_register(self.params.destination, 0);
        setup_extended_pointer(&self.params, state);

        Instruction::ElpmZ(self.params.destination).encode()
    }

    fn analyze_results(&self, analysis: &mut Analysis<'_>) -> HarnessResult<()> {
        let rd = self.params.destination;
        analysis.declare_changed([rd]);

        let expected = expected_byte(self.params.extended_address()) as u32;
        let got = analysis.result(rd)?;
        analysis.expect(Self::NAME, HexWidth::Byte, expected, got)?;

        Ok(())
    }
}

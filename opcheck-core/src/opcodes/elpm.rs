use std::ops::RangeInclusive;

use crate::{
    harness::{
        error::HarnessResult,
        matrix::CaseParams,
        opcode_test::{Analysis, OpcodeFamily, OpcodeTest, SetupState},
        simulator::SimulatedCpu,
    },
    ins::instruction::Instruction,
    reg::registers::RegisterId,
    utils::HexWidth,
};

use super::{expected_byte, require_extended_addressing, setup_extended_pointer};

/// ELPM - extended load from program memory into R0.
#[derive(Clone, Copy, Debug)]
pub struct Elpm {
    params: CaseParams,
}

impl OpcodeFamily for Elpm {
    const NAME: &'static str = "ELPM";

    fn valid_destinations() -> RangeInclusive<u8> {
        0..=0
    }

    fn from_params(params: CaseParams) -> Self {
        Self { params }
    }
}

impl OpcodeTest for Elpm {
    fn ensure_target_supports_opcode(&self, cpu: &dyn SimulatedCpu) -> HarnessResult<()> {
        require_extended_addressing(cpu)
    }

    fn setup(&self, state: &mut SetupState) -> u16 {
        state.set_register(RegisterId::R0, 0);
        setup_extended_pointer(&self.params, state);

        Instruction::Elpm.encode()
    }

    fn analyze_results(&self, analysis: &mut Analysis<'_>) -> HarnessResult<()> {
        analysis.declare_changed([RegisterId::R0]);

        let expected = expected_byte(self.params.extended_address()) as u32;
        let got = analysis.result(RegisterId::R0)?;
        analysis.expect(Self::NAME, HexWidth::Byte, expected, got)?;

        Ok(())
    }
}

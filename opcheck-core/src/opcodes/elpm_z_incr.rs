use std::ops::RangeInclusive;

use crate::{
    harness::{
        error::HarnessResult,
        matrix::CaseParams,
        opcode_test::{Analysis, OpcodeFamily, OpcodeTest, SetupState},
        simulator::SimulatedCpu,
    },
    ins::instruction::Instruction,
    reg::registers::{RegisterId, Z_HIGH, Z_LOW},
    utils::{self, HexWidth},
};

use super::{expected_byte, require_extended_addressing, setup_extended_pointer};

/// ELPM Rd, Z+ - extended load from program memory, then post-increment RAMPZ:Z.
///
/// Operation: `Rd <- (RAMPZ:Z)` then `RAMPZ:Z <- RAMPZ:Z + 1`.
///
/// Only Rd, the Z pointer and RAMPZ may change, and the program counter advances by one word.
/// The operation is undefined for r30 and r31.
#[derive(Clone, Copy, Debug)]
pub struct ElpmZIncr {
    params: CaseParams,
}

impl OpcodeFamily for ElpmZIncr {
    const NAME: &'static str = "ELPM_Z_incr";

    fn valid_destinations() -> RangeInclusive<u8> {
        0..=29
    }

    fn from_params(params: CaseParams) -> Self {
        Self { params }
    }
}

impl OpcodeTest for ElpmZIncr {
    fn ensure_target_supports_opcode(&self, cpu: &dyn SimulatedCpu) -> HarnessResult<()> {
        require_extended_addressing(cpu)
    }

    fn setup(&self, state: &mut SetupState) -> u16 {
        state.set_register(self.params.destination, 0);
        setup_extended_pointer(&self.params, state);

        Instruction::ElpmZInc(self.params.destination).encode()
    }

    fn analyze_results(&self, analysis: &mut Analysis<'_>) -> HarnessResult<()> {
        let rd = self.params.destination;
        analysis.declare_changed([rd, Z_LOW, Z_HIGH, RegisterId::RAMPZ]);

        let address = self.params.extended_address();

        let expected = expected_byte(address) as u32;
        let got = analysis.result(rd)?;
        analysis.expect(Self::NAME, HexWidth::Byte, expected, got)?;

        let expected = utils::increment_extended_address(address);
        let got = analysis.result_extended_z()?;
        analysis.expect(
            &format!("{} Z not incr", Self::NAME),
            HexWidth::Address,
            expected,
            got,
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests_elpm_z_incr {
    use proptest::prelude::*;
    use test_case::test_case;

    use crate::{
        harness::{
            config::HarnessConfig,
            error::HarnessError,
            matrix::{CaseId, CaseMatrix, CaseParams},
            opcode_test::OpcodeFamily,
            simulator::SimulatedCpu,
            test_case::{TestCase, Verdict},
        },
        reg::registers::RegisterId,
        target::Target,
        vm::VirtualMachine,
    };

    use super::ElpmZIncr;

    fn case(destination: u8, address: u32, rampz: u8) -> TestCase {
        let params = CaseParams::validate::<ElpmZIncr>(destination, address, rampz).expect("valid");
        TestCase::new(
            CaseId {
                family: ElpmZIncr::NAME,
                params,
            },
            Box::new(ElpmZIncr::from_params(params)),
        )
    }

    /// The worked example with a carry out of the Z pair.
    #[test]
    fn test_carry_into_rampz() {
        let mut vm = VirtualMachine::new(&Target::atmega2560());
        let verdict = case(5, 0xffff, 0x01).run(&mut vm, &HarnessConfig::default());

        assert_eq!(verdict, Verdict::Passed);
        assert_eq!(vm.mem.read_word(0x1fffe), 0xaa55);
        assert_eq!(vm.read_register(RegisterId::R5), Ok(0xaa));
        assert_eq!(vm.read_register(RegisterId::R30), Ok(0x00));
        assert_eq!(vm.read_register(RegisterId::R31), Ok(0x00));
        assert_eq!(vm.read_extension_register(), Some(0x02));
    }

    /// The worked example without a carry.
    #[test]
    fn test_low_page_even_address() {
        let mut vm = VirtualMachine::new(&Target::atmega2560());
        let verdict = case(0, 0x10, 0x00).run(&mut vm, &HarnessConfig::default());

        assert_eq!(verdict, Verdict::Passed);
        assert_eq!(vm.mem.read_word(0x10), 0xaa55);
        assert_eq!(vm.read_register(RegisterId::R0), Ok(0x55));
        assert_eq!(vm.read_register(RegisterId::R30), Ok(0x11));
        assert_eq!(vm.read_register(RegisterId::R31), Ok(0x00));
        assert_eq!(vm.read_extension_register(), Some(0x00));
    }

    #[test_case("atmega128"; "128 KiB flash wraps the third bank")]
    #[test_case("atmega2560"; "256 KiB flash")]
    fn test_full_matrix_passes(target: &str) {
        let target: Target = target.parse().expect("preset");
        let cases = CaseMatrix::for_family::<ElpmZIncr>()
            .generate::<ElpmZIncr>()
            .expect("valid matrix");

        for mut case in cases {
            let mut vm = VirtualMachine::new(&target);
            let verdict = case.run(&mut vm, &HarnessConfig::default());
            assert_eq!(verdict, Verdict::Passed, "{} on {target}", case.id());
        }
    }

    #[test]
    fn test_matrix_skips_without_rampz() {
        let cases = CaseMatrix::for_family::<ElpmZIncr>()
            .generate::<ElpmZIncr>()
            .expect("valid matrix");

        for mut case in cases {
            let mut vm = VirtualMachine::new(&Target::atmega8());
            let verdict = case.run(&mut vm, &HarnessConfig::default());
            assert!(matches!(
                verdict,
                Verdict::Skipped(HarnessError::UnsupportedFeature { .. })
            ));
        }
    }

    #[test]
    fn test_same_case_twice_same_verdict() {
        let config = HarnessConfig::default();
        let mut first = VirtualMachine::new(&Target::atmega2560());
        let mut second = VirtualMachine::new(&Target::atmega2560());

        let a = case(17, 0x101, 0x02).run(&mut first, &config);
        let b = case(17, 0x101, 0x02).run(&mut second, &config);

        assert_eq!(a, b);
        assert_eq!(first.snapshot(), second.snapshot());
    }

    proptest! {
        #[test]
        fn prop_load_and_post_increment(
            destination in 0u8..30,
            z in any::<u16>(),
            rampz in 0u8..4,
            seed in any::<u64>(),
        ) {
            let config = HarnessConfig::default().with_seed(seed);
            let mut vm = VirtualMachine::new(&Target::atmega2560());
            let before = vm.snapshot();

            let verdict = case(destination, z as u32, rampz).run(&mut vm, &config);
            prop_assert_eq!(verdict, Verdict::Passed);

            let address = ((rampz as u32) << 16) + z as u32;
            let rd = RegisterId::general(destination).expect("general register");
            let expected = if address & 1 == 1 { 0xaa } else { 0x55 };
            prop_assert_eq!(vm.read_register(rd), Ok(expected));

            let after = vm.snapshot();
            prop_assert_eq!(after.extended_z(), Some(address + 1));
            prop_assert_eq!(vm.read_extension_register() != Some(rampz), z == 0xffff);
            prop_assert_eq!(after.get(RegisterId::SREG), before.get(RegisterId::SREG));
            prop_assert_eq!(after.get(RegisterId::SP), before.get(RegisterId::SP));
        }
    }
}

use prettytable::{Table, row};
use tracing::info;

use crate::{target::Target, vm::VirtualMachine};

use super::{
    config::HarnessConfig,
    error::{CaseFailure, HarnessResult},
    matrix::{CaseId, CaseMatrix},
    opcode_test::OpcodeFamily,
    simulator::SimulatedCpu,
    test_case::{TestCase, Verdict},
};

/// The verdict of a single case within a suite run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CaseOutcome {
    pub id: CaseId,
    pub verdict: Verdict,
}

/// An ordered collection of generated cases.
#[derive(Debug, Default)]
pub struct Suite {
    cases: Vec<TestCase>,
    config: HarnessConfig,
}

impl Suite {
    pub fn new(config: HarnessConfig) -> Self {
        Self {
            cases: vec![],
            config,
        }
    }

    /// Generate the cases of an opcode family and append them to the suite.
    ///
    /// # Returns
    ///
    /// The number of cases added. If the matrix contains an invalid tuple nothing is added.
    pub fn add_family<F: OpcodeFamily>(&mut self, matrix: &CaseMatrix) -> HarnessResult<usize> {
        let cases = matrix.generate::<F>()?;
        let count = cases.len();
        self.cases.extend(cases);

        Ok(count)
    }

    pub fn add_case(&mut self, case: TestCase) {
        self.cases.push(case);
    }

    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Run every case, each against its own simulator.
    ///
    /// # Arguments
    ///
    /// * `make_cpu` - Builds a fresh [`SimulatedCpu`] for every case.
    ///
    /// A panic or simulator error raised by one case is recorded as its failure and does not stop
    /// the run.
    pub fn run<S, M>(&mut self, mut make_cpu: M) -> SuiteReport
    where
        S: SimulatedCpu,
        M: FnMut() -> S,
    {
        let config = &self.config;
        let mut outcomes = Vec::with_capacity(self.cases.len());
        let mut target = String::new();

        for case in &mut self.cases {
            let mut cpu = make_cpu();
            if target.is_empty() {
                target = cpu.target_name().to_string();
            }

            let verdict = case.run(&mut cpu, config);
            outcomes.push(CaseOutcome {
                id: *case.id(),
                verdict,
            });
        }

        let report = SuiteReport { target, outcomes };
        info!(
            "{} cases on {}: {} passed, {} failed, {} skipped",
            report.len(),
            report.target,
            report.passed(),
            report.failed(),
            report.skipped()
        );

        report
    }

    /// Run every case against the reference simulator for a target.
    pub fn run_on_target(&mut self, target: &Target) -> SuiteReport {
        self.run(|| VirtualMachine::new(target))
    }
}

/// The per-case verdicts of a suite run.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SuiteReport {
    /// The name of the target the suite ran on.
    pub target: String,
    outcomes: Vec<CaseOutcome>,
}

impl SuiteReport {
    pub fn outcomes(&self) -> &[CaseOutcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn passed(&self) -> usize {
        self.count(|verdict| matches!(verdict, Verdict::Passed))
    }

    pub fn failed(&self) -> usize {
        self.count(Verdict::is_failure)
    }

    pub fn skipped(&self) -> usize {
        self.count(|verdict| matches!(verdict, Verdict::Skipped(_)))
    }

    fn count<F: Fn(&Verdict) -> bool>(&self, predicate: F) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| predicate(&outcome.verdict))
            .count()
    }

    /// The failures, in suite order.
    pub fn failures(&self) -> impl Iterator<Item = &CaseFailure> {
        self.outcomes.iter().filter_map(|outcome| match &outcome.verdict {
            Verdict::Failed(failure) => Some(failure),
            _ => None,
        })
    }

    /// A run succeeds when no case failed. Skipped cases only reduce coverage.
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Build a table with one row per opcode family, in the order families first appear.
    pub fn summary_table(&self) -> Table {
        let mut families: Vec<&'static str> = vec![];
        for outcome in &self.outcomes {
            if !families.contains(&outcome.id.family) {
                families.push(outcome.id.family);
            }
        }

        let mut table = Table::new();
        table.add_row(row!["Family", "Passed", "Failed", "Skipped"]);

        for family in families {
            let verdicts = || {
                self.outcomes
                    .iter()
                    .filter(move |outcome| outcome.id.family == family)
                    .map(|outcome| &outcome.verdict)
            };

            table.add_row(row![
                family,
                verdicts().filter(|v| matches!(v, Verdict::Passed)).count(),
                verdicts().filter(|v| v.is_failure()).count(),
                verdicts().filter(|v| matches!(v, Verdict::Skipped(_))).count()
            ]);
        }

        table
    }

    /// Build a table listing every failed case and its diagnostic.
    pub fn failure_table(&self) -> Table {
        let mut table = Table::new();
        table.add_row(row!["Case", "Diagnostic"]);

        for failure in self.failures() {
            table.add_row(row![failure.id, failure.error]);
        }

        table
    }

    /// Print the summary, and the failures if there were any.
    pub fn print_summary(&self) {
        println!("----------[{}]----------", self.target);
        self.summary_table().printstd();

        if !self.is_success() {
            println!();
            println!("The following cases did not match their expected results:");
            self.failure_table().printstd();
        }
    }
}

#[cfg(test)]
mod tests_suite {
    use crate::{
        cpu_error::{CpuError, CpuResult},
        harness::{
            config::HarnessConfig,
            error::HarnessError,
            matrix::CaseMatrix,
            opcode_test::OpcodeFamily,
            simulator::SimulatedCpu,
            snapshot::RegisterSnapshot,
            test_case::Verdict,
        },
        opcodes::{elpm::Elpm, elpm_z::ElpmZ, elpm_z_incr::ElpmZIncr},
        reg::registers::RegisterId,
        target::Target,
        vm::VirtualMachine,
    };

    use super::Suite;

    #[derive(Clone, Copy)]
    enum Bug {
        /// The post-increment does not carry out of Z into RAMPZ.
        NoCarry,
        /// R7 is corrupted by every instruction.
        ClobberR7,
        /// The simulator panics when the pointer is at the top of a bank.
        PanicAtBankEnd,
        /// The simulator refuses to execute when the pointer is at the top of a bank.
        RejectAtBankEnd,
        /// The snapshot after execution has no program counter.
        DropProgramCounter,
    }

    /// A reference simulator with a deliberately injected defect.
    struct BuggyVm {
        vm: VirtualMachine,
        bug: Bug,
    }

    impl BuggyVm {
        fn new(bug: Bug) -> Self {
            Self {
                vm: VirtualMachine::new(&Target::atmega2560()),
                bug,
            }
        }
    }

    impl SimulatedCpu for BuggyVm {
        fn target_name(&self) -> &str {
            self.vm.target_name()
        }

        fn target_has_extended_addressing(&self) -> bool {
            self.vm.target_has_extended_addressing()
        }

        fn write_register(&mut self, id: RegisterId, value: u8) -> CpuResult<()> {
            self.vm.write_register(id, value)
        }

        fn read_register(&self, id: RegisterId) -> CpuResult<u8> {
            self.vm.read_register(id)
        }

        fn write_extension_register(&mut self, value: u8) -> CpuResult<()> {
            self.vm.write_extension_register(value)
        }

        fn read_extension_register(&self) -> Option<u8> {
            self.vm.read_extension_register()
        }

        fn write_program_word(&mut self, byte_address: u32, word: u16) {
            self.vm.write_program_word(byte_address, word);
        }

        fn snapshot(&self) -> RegisterSnapshot {
            self.vm.snapshot()
        }

        fn execute_one_instruction(&mut self, opcode: u16) -> CpuResult<RegisterSnapshot> {
            let rampz = self.vm.read_extension_register();

            let at_bank_end = self.vm.cpu.registers.z() == 0xffff;
            match self.bug {
                Bug::PanicAtBankEnd if at_bank_end => panic!("pointer out of range"),
                Bug::RejectAtBankEnd if at_bank_end => return Err(CpuError::IllegalOpcode(opcode)),
                _ => {}
            }

            let after = self.vm.execute_one_instruction(opcode)?;

            match self.bug {
                Bug::NoCarry => {
                    if let Some(rampz) = rampz {
                        self.vm.write_extension_register(rampz)?;
                    }
                }
                Bug::ClobberR7 => {
                    let value = self.vm.read_register(RegisterId::R7)?;
                    self.vm.write_register(RegisterId::R7, value ^ 0xff)?;
                }
                Bug::DropProgramCounter => {
                    return Ok(after.iter().filter(|(id, _)| *id != RegisterId::PC).collect());
                }
                Bug::PanicAtBankEnd | Bug::RejectAtBankEnd => {}
            }

            Ok(self.vm.snapshot())
        }
    }

    fn elpm_z_incr_suite() -> Suite {
        let mut suite = Suite::new(HarnessConfig::default());
        suite
            .add_family::<ElpmZIncr>(&CaseMatrix::for_family::<ElpmZIncr>())
            .expect("valid matrix");
        suite
    }

    #[test]
    fn test_all_families_pass_on_reference() {
        let mut suite = Suite::new(HarnessConfig::default());
        assert_eq!(
            suite.add_family::<ElpmZIncr>(&CaseMatrix::for_family::<ElpmZIncr>()),
            Ok(450)
        );
        assert_eq!(
            suite.add_family::<ElpmZ>(&CaseMatrix::for_family::<ElpmZ>()),
            Ok(480)
        );
        assert_eq!(
            suite.add_family::<Elpm>(&CaseMatrix::for_family::<Elpm>()),
            Ok(15)
        );

        let report = suite.run_on_target(&Target::atmega2560());

        assert_eq!(report.target, "atmega2560");
        assert_eq!(report.len(), 945);
        assert_eq!(report.passed(), 945);
        assert!(report.is_success());
        assert_eq!(report.failures().count(), 0);
    }

    #[test]
    fn test_all_skipped_without_rampz() {
        let report = elpm_z_incr_suite().run_on_target(&Target::atmega8());

        assert_eq!(report.skipped(), 450);
        assert_eq!(report.failed(), 0);
        assert!(report.is_success());
    }

    #[test]
    fn test_missing_carry_is_reported() {
        let report = elpm_z_incr_suite().run(|| BuggyVm::new(Bug::NoCarry));

        // Only Z = 0xffff carries: 30 destinations x 3 seeds.
        assert_eq!(report.failed(), 90);
        assert_eq!(report.passed(), 360);

        let failure = report
            .failures()
            .find(|failure| failure.id.to_string() == "ELPM_Z_incr_r05_Zffff_RZ01")
            .expect("the carry case should fail");
        assert_eq!(
            failure.error.to_string(),
            "ELPM_Z_incr Z not incr: expect=020000, got=010000"
        );
    }

    #[test]
    fn test_clobbered_register_is_reported() {
        let report = elpm_z_incr_suite().run(|| BuggyVm::new(Bug::ClobberR7));

        assert_eq!(report.failed(), report.len());

        let unexpected = report
            .failures()
            .filter(|failure| matches!(failure.error, HarnessError::UnexpectedChange(_)))
            .count();
        // When R7 is the destination the loaded value is wrong instead.
        assert_eq!(unexpected, 29 * 5 * 3);

        let failure = report
            .failures()
            .find(|failure| failure.id.to_string() == "ELPM_Z_incr_r00_Z0010_RZ00")
            .expect("every case should fail");
        match &failure.error {
            HarnessError::UnexpectedChange(deltas) => {
                assert_eq!(deltas.len(), 1);
                assert_eq!(deltas[0].id, RegisterId::R7);
            }
            e => panic!("unexpected error {e}"),
        }
    }

    #[test]
    fn test_panics_are_isolated() {
        let mut suite = elpm_z_incr_suite();
        let report = suite.run(|| BuggyVm::new(Bug::PanicAtBankEnd));

        assert_eq!(report.len(), 450);
        assert_eq!(report.failed(), 90);
        assert_eq!(report.passed(), 360);
        assert!(report.failures().all(|failure| matches!(
            &failure.error,
            HarnessError::SimulatorPanic(message) if message == "pointer out of range"
        )));

        // The panicking cases are finished, and are not executed again.
        assert!(suite.cases().iter().all(|case| case.state().is_terminal()));
    }

    #[test]
    fn test_simulator_errors_are_isolated() {
        let report = elpm_z_incr_suite().run(|| BuggyVm::new(Bug::RejectAtBankEnd));

        assert_eq!(report.len(), 450);
        assert_eq!(report.failed(), 90);
        assert_eq!(report.passed(), 360);
        assert!(report.failures().all(|failure| {
            failure.id.params.z == 0xffff
                && matches!(
                    failure.error,
                    HarnessError::Simulator(CpuError::IllegalOpcode(_))
                )
        }));

        let failure = report
            .failures()
            .find(|failure| failure.id.to_string() == "ELPM_Z_incr_r05_Zffff_RZ01")
            .expect("the bank end case should fail");
        assert_eq!(
            failure.to_string(),
            "ELPM_Z_incr_r05_Zffff_RZ01 failed: simulator error: illegal opcode 9057"
        );
    }

    #[test]
    fn test_missing_program_counter_is_reported() {
        let report = elpm_z_incr_suite().run(|| BuggyVm::new(Bug::DropProgramCounter));

        assert_eq!(report.failed(), report.len());
        assert!(report.failures().all(|failure| matches!(
            failure.error,
            HarnessError::Simulator(CpuError::MissingRegister(RegisterId::PC))
        )));
    }

    #[test]
    fn test_summary_table() {
        let mut suite = Suite::new(HarnessConfig::default());
        suite
            .add_family::<Elpm>(&CaseMatrix::for_family::<Elpm>())
            .expect("valid matrix");
        suite
            .add_family::<ElpmZ>(&CaseMatrix::new(&[30, 31], &[0x10], &[0x00]))
            .expect("valid matrix");

        let report = suite.run_on_target(&Target::atmega128());
        let table = report.summary_table();

        // The header, then one row per family in the order the families were added.
        assert_eq!(table.len(), 3);
        let row = table.get_row(1).expect("ELPM row");
        assert_eq!(row.get_cell(0).map(|cell| cell.get_content()), Some(Elpm::NAME.to_string()));
        assert_eq!(row.get_cell(1).map(|cell| cell.get_content()), Some("15".to_string()));
        let row = table.get_row(2).expect("ELPM_Z row");
        assert_eq!(row.get_cell(0).map(|cell| cell.get_content()), Some(ElpmZ::NAME.to_string()));
        assert_eq!(row.get_cell(1).map(|cell| cell.get_content()), Some("2".to_string()));
    }

    #[test]
    fn test_invalid_family_matrix_adds_nothing() {
        let mut suite = Suite::new(HarnessConfig::default());
        let result = suite.add_family::<ElpmZIncr>(&CaseMatrix::new(&[29, 30], &[0x10], &[0x00]));

        assert!(matches!(result, Err(HarnessError::Configuration(_))));
        assert!(suite.is_empty());
    }

    #[test]
    fn test_verdict_display() {
        let report = elpm_z_incr_suite().run(|| BuggyVm::new(Bug::NoCarry));
        let outcome = report
            .outcomes()
            .iter()
            .find(|outcome| outcome.id.to_string() == "ELPM_Z_incr_r00_Z0010_RZ00")
            .expect("case exists");

        assert_eq!(outcome.verdict, Verdict::Passed);
        assert_eq!(outcome.verdict.to_string(), "PASSED");
    }
}

use core::fmt;
use rand::Rng;
use rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
};
use tracing::{debug, warn};

use crate::reg::registers::{GENERAL_REGISTER_COUNT, RegisterId};

use super::{
    config::HarnessConfig,
    error::{CaseFailure, HarnessError, HarnessResult},
    matrix::CaseId,
    opcode_test::{Analysis, OpcodeTest, SetupState},
    simulator::SimulatedCpu,
};

/// The lifecycle state of a case.
///
/// `Pending -> (Skipped | Running -> (Passed | Failed))`
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CaseState {
    Pending,
    Running,
    Skipped,
    Passed,
    Failed,
}

impl CaseState {
    /// Is this a terminal state?
    pub fn is_terminal(&self) -> bool {
        matches!(self, CaseState::Skipped | CaseState::Passed | CaseState::Failed)
    }
}

/// The externally visible outcome of a case.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Verdict {
    Passed,
    Failed(CaseFailure),
    /// The target lacks a feature the opcode needs. Holds the [`HarnessError::UnsupportedFeature`].
    Skipped(HarnessError),
}

impl Verdict {
    /// The terminal [`CaseState`] this verdict corresponds to.
    pub fn state(&self) -> CaseState {
        match self {
            Verdict::Passed => CaseState::Passed,
            Verdict::Failed(_) => CaseState::Failed,
            Verdict::Skipped(_) => CaseState::Skipped,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Verdict::Failed(_))
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Passed => write!(f, "PASSED"),
            Verdict::Failed(failure) => write!(f, "FAILED ({})", failure.error),
            Verdict::Skipped(reason) => write!(f, "SKIPPED ({reason})"),
        }
    }
}

/// One generated instance of an opcode test.
pub struct TestCase {
    id: CaseId,
    test: Box<dyn OpcodeTest>,
    state: CaseState,
    verdict: Option<Verdict>,
}

impl TestCase {
    pub fn new(id: CaseId, test: Box<dyn OpcodeTest>) -> Self {
        Self {
            id,
            test,
            state: CaseState::Pending,
            verdict: None,
        }
    }

    pub fn id(&self) -> &CaseId {
        &self.id
    }

    pub fn state(&self) -> CaseState {
        self.state
    }

    /// The verdict, once the case has reached a terminal state.
    pub fn verdict(&self) -> Option<&Verdict> {
        self.verdict.as_ref()
    }

    /// Run this case against a simulator.
    ///
    /// # Arguments
    ///
    /// * `cpu` - A freshly built [`SimulatedCpu`]. It must not be shared with any other case.
    /// * `config` - The [`HarnessConfig`] for this run.
    ///
    /// # Returns
    ///
    /// The [`Verdict`]. A case only executes once: running a finished case again returns the
    /// recorded verdict without touching the simulator.
    pub fn run(&mut self, cpu: &mut dyn SimulatedCpu, config: &HarnessConfig) -> Verdict {
        if let Some(verdict) = &self.verdict {
            warn!("{} has already finished, returning its recorded verdict", self.id);
            return verdict.clone();
        }

        debug!("running {} on {}", self.id, cpu.target_name());

        let test = &self.test;
        let supported = guard(|| test.ensure_target_supports_opcode(&*cpu));

        let verdict = match supported {
            Err(reason @ HarnessError::UnsupportedFeature { .. }) => Verdict::Skipped(reason),
            supported => {
                self.state = CaseState::Running;
                match supported.and_then(|()| guard(|| self.execute(cpu, config))) {
                    Ok(()) => Verdict::Passed,
                    Err(error) => Verdict::Failed(CaseFailure { id: self.id, error }),
                }
            }
        };

        self.finish(verdict)
    }

    fn finish(&mut self, verdict: Verdict) -> Verdict {
        match &verdict {
            Verdict::Failed(failure) => warn!("{failure}"),
            verdict => debug!("{} {verdict}", self.id),
        }

        self.state = verdict.state();
        self.verdict = Some(verdict.clone());
        verdict
    }

    /// Fill the general purpose registers with values derived from the case identity.
    fn seed_background(
        &self,
        cpu: &mut dyn SimulatedCpu,
        config: &HarnessConfig,
    ) -> HarnessResult<()> {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(config.background_seed ^ self.id.seed());

        for index in 0..GENERAL_REGISTER_COUNT as u8 {
            if let Some(id) = RegisterId::general(index) {
                cpu.write_register(id, rng.random::<u8>())?;
            }
        }

        Ok(())
    }

    fn execute(&self, cpu: &mut dyn SimulatedCpu, config: &HarnessConfig) -> HarnessResult<()> {
        if config.randomize_background {
            self.seed_background(cpu, config)?;
        }

        let mut setup = SetupState::default();
        let opcode = self.test.setup(&mut setup);
        setup.apply(cpu)?;

        let before = cpu.snapshot();
        let after = cpu.execute_one_instruction(opcode)?;

        let mut analysis = Analysis::new(&before, &after);
        self.test.analyze_results(&mut analysis)?;
        analysis.verify_unchanged(self.test.instruction_words())?;

        Ok(())
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("verdict", &self.verdict)
            .finish()
    }
}

/// Run a step that calls into the simulator, converting a panic into a [`HarnessError::SimulatorPanic`].
fn guard<F: FnOnce() -> HarnessResult<()>>(step: F) -> HarnessResult<()> {
    panic::catch_unwind(AssertUnwindSafe(step))
        .unwrap_or_else(|payload| Err(HarnessError::SimulatorPanic(panic_message(payload.as_ref()))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        warn!("case panicked with a non-string payload");
        "unknown panic".to_string()
    }
}

use core::fmt;
use thiserror::Error;

use crate::{cpu_error::CpuError, target::TargetFeature, utils::HexWidth};

use super::{matrix::CaseId, snapshot::RegisterDelta};

/// Result with internal [`HarnessError`] type.
pub type HarnessResult<T> = core::result::Result<T, HarnessError>;

/// An expected value that did not match the value observed after execution.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AssertionMismatch {
    /// What was being checked, e.g. `ELPM_Z_incr Z not incr`.
    pub label: String,
    pub expected: u32,
    pub actual: u32,
    /// The width used to print both values.
    pub width: HexWidth,
}

impl fmt::Display for AssertionMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expect={}, got={}",
            self.label,
            self.width.format(self.expected),
            self.width.format(self.actual)
        )
    }
}

impl std::error::Error for AssertionMismatch {}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum HarnessError {
    /// The target lacks a feature the opcode needs. Cases ending here are skipped, not failed.
    #[error("target `{target}` does not implement {feature}")]
    UnsupportedFeature {
        target: String,
        feature: TargetFeature,
    },
    /// The instruction produced a value that differs from its documented result.
    #[error(transparent)]
    AssertionMismatch(#[from] AssertionMismatch),
    /// Registers outside the declared changed set were modified.
    #[error("unexpected register changes: {}", join_deltas(.0))]
    UnexpectedChange(Vec<RegisterDelta>),
    /// A parameter tuple lies outside the domain of the opcode family.
    #[error("invalid case configuration: {0}")]
    Configuration(String),
    /// The simulator refused the request.
    #[error("simulator error: {0}")]
    Simulator(#[from] CpuError),
    /// The simulator panicked while the case was running.
    #[error("simulator panicked: {0}")]
    SimulatorPanic(String),
}

fn join_deltas(deltas: &[RegisterDelta]) -> String {
    deltas
        .iter()
        .map(|delta| delta.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A failure, tagged with the identity of the case that produced it.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("{id} failed: {error}")]
pub struct CaseFailure {
    pub id: CaseId,
    pub error: HarnessError,
}

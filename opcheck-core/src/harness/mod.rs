//! The conformance harness: case generation, execution against a [`simulator::SimulatedCpu`]
//! and per-case verdicts.

pub mod config;
pub mod error;
pub mod matrix;
pub mod simulator;
pub mod snapshot;
pub mod suite;
pub mod test_case;

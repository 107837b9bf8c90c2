#![crate_name = "opcheck_terminal"]

use std::{env, process, time::Instant};

use opcheck_core::{
    harness::{
        config::HarnessConfig,
        error::HarnessResult,
        matrix::CaseMatrix,
        opcode_test::OpcodeFamily,
        suite::Suite,
    },
    opcodes::{elpm::Elpm, elpm_z::ElpmZ, elpm_z_incr::ElpmZIncr},
    target::Target,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// The environment variable naming the target part.
const TARGET_VAR: &str = "OPCHECK_TARGET";
/// The environment variable overriding the background register seed.
const SEED_VAR: &str = "OPCHECK_SEED";

fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Parse a seed, accepting either decimal or `0x` prefixed hexadecimal.
fn parse_seed(input: &str) -> Option<u64> {
    match input.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => input.parse().ok(),
    }
}

fn add_family<F: OpcodeFamily>(suite: &mut Suite) -> HarnessResult<()> {
    let count = suite.add_family::<F>(&CaseMatrix::for_family::<F>())?;
    info!("generated {count} {} cases", F::NAME);

    Ok(())
}

fn build_suite(config: HarnessConfig) -> HarnessResult<Suite> {
    let mut suite = Suite::new(config);
    add_family::<ElpmZIncr>(&mut suite)?;
    add_family::<ElpmZ>(&mut suite)?;
    add_family::<Elpm>(&mut suite)?;

    Ok(suite)
}

fn main() {
    setup_tracing();

    let target_name = env::args()
        .nth(1)
        .or_else(|| env::var(TARGET_VAR).ok())
        .unwrap_or_else(|| Target::default().name().to_string());

    let target: Target = match target_name.parse() {
        Ok(target) => target,
        Err(e) => {
            error!("{e}; known targets are {}", Target::preset_names().join(", "));
            process::exit(2);
        }
    };

    let mut config = HarnessConfig::default();
    if let Ok(value) = env::var(SEED_VAR) {
        match parse_seed(&value) {
            Some(seed) => config = config.with_seed(seed),
            None => {
                error!("{SEED_VAR} must be an integer, got `{value}`");
                process::exit(2);
            }
        }
    }

    let mut suite = match build_suite(config) {
        Ok(suite) => suite,
        Err(e) => {
            error!("{e}");
            process::exit(2);
        }
    };

    let now = Instant::now();
    let report = suite.run_on_target(&target);
    let elapsed = now.elapsed();

    report.print_summary();
    println!("Elapsed: {elapsed:.2?}");

    if !report.is_success() {
        process::exit(1);
    }
}

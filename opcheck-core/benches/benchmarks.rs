use criterion::{Criterion, criterion_group, criterion_main};

use opcheck_core::{
    harness::{config::HarnessConfig, matrix::CaseMatrix, suite::Suite},
    opcodes::elpm_z_incr::ElpmZIncr,
    target::Target,
    vm::VirtualMachine,
};

pub fn criterion_vm_creation(c: &mut Criterion) {
    let target = Target::atmega2560();

    c.bench_function("vm creation", |b| b.iter(|| VirtualMachine::new(&target)));
}

pub fn criterion_case_generation(c: &mut Criterion) {
    let matrix = CaseMatrix::for_family::<ElpmZIncr>();

    c.bench_function("case generation - ELPM Z+", |b| {
        b.iter(|| matrix.generate::<ElpmZIncr>())
    });
}

pub fn criterion_suite_run(c: &mut Criterion) {
    let target = Target::atmega2560();
    let matrix = CaseMatrix::for_family::<ElpmZIncr>();

    c.bench_function("suite run - ELPM Z+", |b| {
        b.iter(|| {
            let mut suite = Suite::new(HarnessConfig::default());
            suite
                .add_family::<ElpmZIncr>(&matrix)
                .expect("default matrix is valid");

            suite.run_on_target(&target)
        })
    });
}

criterion_group!(
    benches,
    criterion_vm_creation,
    criterion_case_generation,
    criterion_suite_run
);
criterion_main!(benches);

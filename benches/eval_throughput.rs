//! Raw eval dispatch throughput, and the cost of the `benchmark`
//! opcode's own nested re-entry into `eval`.

use std::collections::VecDeque;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use weft::form::{emit_sequence, EmitOptions};
use weft::reader::read_forms;
use weft::stdlib::install_standard_namespace;
use weft::vm::{Op, Vm};

fn compile(source: &str) -> Vm {
    let ns = install_standard_namespace();
    let mut vm = Vm::new();
    let forms = read_forms(source, "<bench>").unwrap();
    let mut forms: VecDeque<_> = forms.into_iter().collect();
    emit_sequence(&mut forms, &mut vm, &ns, EmitOptions::default()).unwrap();
    vm.emit(Op::Stop);
    vm
}

fn bench_raw_dispatch(c: &mut Criterion) {
    let mut source = String::new();
    for _ in 0..1000 {
        source.push_str("(+ 1 2) ");
    }

    c.bench_function("eval_dispatch_1000_calls", |b| {
        b.iter_batched(
            || compile(&source),
            |mut vm| {
                vm.eval(0).unwrap();
                black_box(vm.current_task().stack.last().unwrap().as_int())
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

fn bench_benchmark_opcode_reentry(c: &mut Criterion) {
    let source = "(benchmark 1000 (+ 1 2))";

    c.bench_function("benchmark_opcode_1000_iterations", |b| {
        b.iter_batched(
            || compile(source),
            |mut vm| {
                vm.eval(0).unwrap();
                black_box(vm.current_task().stack.last().unwrap().ty.name)
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_raw_dispatch, bench_benchmark_opcode_reentry);
criterion_main!(benches);

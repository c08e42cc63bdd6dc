//! The green-thread scheduler's standard-library surface: `task`,
//! `yield`, `benchmark`.

use std::collections::VecDeque;
use std::rc::Rc;

use crate::error::{EmitError, EvalError};
use crate::form::{emit_form, EmitOptions, Form};
use crate::namespace::NsRef;
use crate::span::Pos;
use crate::stdlib::{bind_fn, bind_macro};
use crate::vm::{Op, Vm};

fn emit_one(form: &Form, vm: &mut Vm, ns: &NsRef, opts: EmitOptions) -> Result<(), EmitError> {
    emit_form(form, vm, ns, &mut VecDeque::new(), opts)
}

/// `task(body)`: reserve `taskPc`, emit `body`, emit `stop`, backpatch
/// `taskPc ← task(emitPc)`.
fn task_macro(
    vm: &mut Vm,
    pos: &Pos,
    ns: &NsRef,
    args: &mut VecDeque<Form>,
    _opts: EmitOptions,
) -> Result<(), EmitError> {
    let body = args
        .pop_front()
        .ok_or_else(|| EmitError::MissingArgument(pos.clone()))?;
    let task_pc = vm.emit(Op::Nop);
    emit_one(&body, vm, ns, EmitOptions::default())?;
    vm.emit(Op::Stop);
    let end_pc = vm.emit_pc();
    vm.backpatch(task_pc, Op::Task(end_pc));
    Ok(())
}

/// `benchmark(count, body)`.
fn benchmark_macro(
    vm: &mut Vm,
    pos: &Pos,
    ns: &NsRef,
    args: &mut VecDeque<Form>,
    _opts: EmitOptions,
) -> Result<(), EmitError> {
    let count = args
        .pop_front()
        .ok_or_else(|| EmitError::MissingArgument(pos.clone()))?;
    emit_one(&count, vm, ns, EmitOptions::default())?;
    vm.emit(Op::Benchmark(pos.clone()));
    let body = args
        .pop_front()
        .ok_or_else(|| EmitError::MissingArgument(pos.clone()))?;
    emit_one(&body, vm, ns, EmitOptions::default())?;
    vm.emit(Op::Stop);
    Ok(())
}

/// The `yield` primitive: rotates the current task to the back of the
/// queue. Takes no arguments.
fn yield_fn(vm: &mut Vm, _pos: &Pos) -> Result<(), EvalError> {
    if let Some(t) = vm.tasks.pop_front() {
        vm.tasks.push_back(t);
    }
    Ok(())
}

pub fn install(ns: &NsRef) {
    bind_macro(ns, "task", task_macro);
    bind_macro(ns, "benchmark", benchmark_macro);
    bind_fn(ns, "yield", Vec::new(), yield_fn);
}

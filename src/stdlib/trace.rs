//! The `trace` macro: the VM's own logging surface (see the crate-level
//! docs on ambient tracing). Flipping it on at emit time makes every
//! subsequent `Vm::emit` call prepend a `Trace` op, which prints the
//! following instruction when it executes.

use std::collections::VecDeque;

use crate::error::EmitError;
use crate::form::{EmitOptions, Form};
use crate::namespace::NsRef;
use crate::span::Pos;
use crate::stdlib::bind_macro;
use crate::vm::Vm;

fn trace_macro(
    vm: &mut Vm,
    _pos: &Pos,
    _ns: &NsRef,
    _args: &mut VecDeque<Form>,
    _opts: EmitOptions,
) -> Result<(), EmitError> {
    vm.trace = true;
    Ok(())
}

pub fn install(ns: &NsRef) {
    bind_macro(ns, "trace", trace_macro);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{emit_form, Form};
    use crate::namespace::Namespace;

    #[test]
    fn trace_sets_vm_flag_and_affects_subsequent_emits() {
        let ns = Namespace::root();
        install(&ns);
        let mut vm = Vm::new();
        emit_form(
            &Form::Identifier(Pos::dummy(), "trace".to_string()),
            &mut vm,
            &ns,
            &mut VecDeque::new(),
            EmitOptions::default(),
        )
        .unwrap();
        assert!(vm.trace);
        let before = vm.code.len();
        vm.emit(crate::vm::Op::Nop);
        // One Trace op prepended, plus the Nop itself.
        assert_eq!(vm.code.len(), before + 2);
    }

    #[test]
    fn traced_program_still_evaluates_to_the_right_answer() {
        // Exercises the `Op::Trace` arm of `eval` itself (it prints to
        // stderr and falls through); the printed line isn't asserted
        // on here, just that tracing doesn't disturb the result.
        let ns = Namespace::root();
        install(&ns);
        crate::stdlib::arith::install(&ns);
        let mut vm = Vm::new();
        let mut args = VecDeque::new();
        emit_form(
            &Form::Identifier(Pos::dummy(), "trace".to_string()),
            &mut vm,
            &ns,
            &mut args,
            EmitOptions::default(),
        )
        .unwrap();
        let mut forms: VecDeque<Form> = vec![Form::List(
            Pos::dummy(),
            vec![
                Form::Identifier(Pos::dummy(), "+".to_string()),
                Form::Literal(Pos::dummy(), crate::form::Literal::Int(1)),
                Form::Literal(Pos::dummy(), crate::form::Literal::Int(2)),
            ],
        )]
        .into_iter()
        .collect();
        crate::form::emit_sequence(&mut forms, &mut vm, &ns, EmitOptions::default()).unwrap();
        vm.emit(crate::vm::Op::Stop);
        vm.eval(0).unwrap();
        assert_eq!(vm.current_task().stack.last().unwrap().as_int(), Some(3));
    }
}

//! A small, self-contained interpreter for an s-expression language: a
//! stack-based bytecode VM coupled to a direct-emission compiler, a
//! macro/function dispatch protocol resolved through lexical
//! namespaces, and a cooperatively-scheduled green-thread task model
//! sharing the bytecode.

pub mod diagnostic;
pub mod driver;
pub mod error;
pub mod form;
pub mod lexeme;
pub mod namespace;
pub mod reader;
pub mod repl;
pub mod span;
pub mod stdlib;
pub mod types;
pub mod value;
pub mod vm;

pub use error::Error;
pub use vm::Vm;

/// Read, emit, and run `source` to completion on a fresh VM/namespace,
/// appending a trailing `stop` after the parsed forms. Used by both
/// the batch driver and the integration tests.
pub fn run_source(
    machine: &mut vm::Vm,
    ns: &namespace::NsRef,
    source: &str,
    source_name: &str,
) -> Result<(), Error> {
    let forms = reader::read_forms(source, source_name)?;
    let mut forms: std::collections::VecDeque<form::Form> = forms.into_iter().collect();
    form::emit_sequence(&mut forms, machine, ns, form::EmitOptions::default())?;
    machine.emit(vm::Op::Stop);
    machine.eval(0)?;
    Ok(())
}

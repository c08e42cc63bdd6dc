//! The interactive REPL loop (an external collaborator to the core
//! language — see the crate-level docs): accumulate lines until a
//! blank one, then parse, emit, and evaluate everything accumulated so
//! far against the running VM and namespace.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use crate::error::Error;
use crate::form::{emit_sequence, EmitOptions};
use crate::namespace::NsRef;
use crate::reader::read_forms;
use crate::stdlib::install_standard_namespace;
use crate::vm::{Op, Vm};

/// Run the REPL to completion (EOF on `input`), writing prompts and
/// results to `output`. A single `Vm`/namespace persists across turns,
/// so definitions and running tasks carry over between lines.
pub fn run<R: BufRead, W: Write>(mut input: R, mut output: W) -> io::Result<()> {
    let ns = install_standard_namespace();
    let mut vm = Vm::new();
    let mut buffer = String::new();

    loop {
        write!(output, "{}", if buffer.is_empty() { "> " } else { "... " })?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(());
        }

        if line.trim().is_empty() {
            if buffer.trim().is_empty() {
                buffer.clear();
                continue;
            }
            match eval_turn(&mut vm, &ns, &buffer) {
                Ok(()) => match vm.current_task().stack.last() {
                    Some(value) => writeln!(output, "{}", value.display())?,
                    None => writeln!(output, "_")?,
                },
                Err(err) => err.to_diagnostic().render(&buffer),
            }
            buffer.clear();
        } else {
            buffer.push_str(&line);
        }
    }
}

fn eval_turn(vm: &mut Vm, ns: &NsRef, source: &str) -> Result<(), Error> {
    let from_pc = vm.emit_pc();
    let forms = read_forms(source, "<repl>")?;
    let mut forms: VecDeque<_> = forms.into_iter().collect();
    emit_sequence(&mut forms, vm, ns, EmitOptions::default())?;
    vm.emit(Op::Stop);
    vm.eval(from_pc)?;
    Ok(())
}

use std::rc::Rc;

use crate::span::Pos;
use crate::value::Value;
use crate::vm::FunctionDef;

/// A single bytecode instruction. `code` is a flat, append-only
/// `Vec<Op>`; macros backpatch a previously-reserved `Nop` slot by
/// overwriting it in place once the jump target is known.
#[derive(Clone)]
pub enum Op {
    /// Push `stack[current_call.stack_offset + i]`.
    Argument(usize),
    /// Pop a count, re-run the next instruction range that many times,
    /// timing it, then push the elapsed duration.
    Benchmark(Pos),
    /// Pop; jump to `else_pc` if falsy, else fall through.
    Branch(Pos, usize),
    /// Invoke a function, pushing a new call frame if it's user-defined.
    Call(Pos, Rc<FunctionDef>),
    /// Unconditional jump.
    Goto(usize),
    /// Advance past this slot. Used as a backpatch placeholder.
    Nop,
    /// Peek; if truthy, keep it and jump to `end_pc`; else pop and fall
    /// through to the right-hand side.
    Or(Pos, usize),
    /// Restore the parent call frame, drop the callee's argument slots,
    /// and jump to the saved return pc.
    PopCall(Rc<FunctionDef>),
    /// Push a literal value onto the current task's stack.
    Push(Value),
    /// Leave the eval loop.
    Stop,
    /// Invoke a function, reusing the current call frame when possible.
    TailCall(Pos, Rc<FunctionDef>),
    /// Fork a new task starting at `pc + 1`; the forking task jumps to
    /// `end_pc`, past the forked body.
    Task(usize),
    /// Print the following instruction before it executes.
    Trace,
}

impl std::fmt::Debug for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Op::Argument(i) => write!(f, "argument {i}"),
            Op::Benchmark(_) => write!(f, "benchmark"),
            Op::Branch(_, else_pc) => write!(f, "branch else={else_pc}"),
            Op::Call(_, def) => write!(f, "call {}", def.name),
            Op::Goto(target) => write!(f, "goto {target}"),
            Op::Nop => write!(f, "nop"),
            Op::Or(_, end_pc) => write!(f, "or end={end_pc}"),
            Op::PopCall(def) => write!(f, "popCall {}", def.name),
            Op::Push(value) => write!(f, "push {}", value.display()),
            Op::Stop => write!(f, "stop"),
            Op::TailCall(_, def) => write!(f, "tailCall {}", def.name),
            Op::Task(end_pc) => write!(f, "task end={end_pc}"),
            Op::Trace => write!(f, "trace"),
        }
    }
}

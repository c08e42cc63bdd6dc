mod eval;
mod op;
mod task;

pub use op::Op;
pub use task::{CallFrame, Task};

use std::collections::VecDeque;
use std::rc::Rc;

use crate::error::EvalError;
use crate::form::{EmitOptions, Form};
use crate::namespace::NsRef;
use crate::span::Pos;
use crate::value::Value;

/// A function value: primitives run their body inline; user-defined
/// functions install a call frame and jump to `start_pc`.
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<String>,
    pub start_pc: Option<usize>,
    pub body: FunctionBody,
}

pub enum FunctionBody {
    Primitive(Rc<dyn Fn(&mut Vm, &Pos) -> Result<(), EvalError>>),
    UserDefined,
}

impl FunctionDef {
    pub fn primitive(
        name: impl Into<String>,
        params: Vec<String>,
        body: impl Fn(&mut Vm, &Pos) -> Result<(), EvalError> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            params,
            start_pc: None,
            body: FunctionBody::Primitive(Rc::new(body)),
        }
    }
}

type MacroBody =
    Rc<dyn Fn(&mut Vm, &Pos, &NsRef, &mut VecDeque<Form>, EmitOptions) -> Result<(), crate::error::EmitError>>;

/// A macro value: an emit-time body that may consume forms off the
/// front of the remaining sibling sequence.
pub struct MacroDef {
    pub name: String,
    pub body: MacroBody,
}

/// Owns the shared bytecode buffer, the cooperatively-scheduled task
/// list, and the process-wide trace flag.
pub struct Vm {
    pub code: Vec<Op>,
    pub tasks: VecDeque<Task>,
    pub trace: bool,
    next_task_id: u64,
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}

impl Vm {
    pub fn new() -> Self {
        let mut tasks = VecDeque::new();
        tasks.push_back(Task::new(0, 0));
        Self {
            code: Vec::new(),
            tasks,
            trace: false,
            next_task_id: 1,
        }
    }

    /// Append an op to the code buffer, preceding it with a `Trace` op
    /// if tracing is on. Returns the pc of the appended op itself (not
    /// the preceding trace op, if any) — this is the pc macros record
    /// for later backpatching.
    pub fn emit(&mut self, op: Op) -> usize {
        if self.trace {
            self.code.push(Op::Trace);
        }
        let pc = self.code.len();
        self.code.push(op);
        pc
    }

    /// The pc the next `emit` call will land on, ignoring any trace
    /// op it might insert. Used by macros to compute jump targets
    /// after emitting a span of forms.
    pub fn emit_pc(&self) -> usize {
        self.code.len()
    }

    /// Overwrite a previously emitted slot (normally a reserved `Nop`)
    /// with its backpatched target.
    pub fn backpatch(&mut self, pc: usize, op: Op) {
        self.code[pc] = op;
    }

    pub fn current_task(&self) -> &Task {
        &self.tasks[0]
    }

    pub fn current_task_mut(&mut self) -> &mut Task {
        &mut self.tasks[0]
    }

    pub(crate) fn fresh_task_id(&mut self) -> u64 {
        let id = self.next_task_id;
        self.next_task_id += 1;
        id
    }

    /// Pop a value off the current task's stack, for use by primitive
    /// function bodies.
    pub fn pop(&mut self, pos: &Pos) -> Result<Value, EvalError> {
        self.current_task_mut()
            .stack
            .pop()
            .ok_or_else(|| EvalError::MissingValue(pos.clone()))
    }

    /// Push a value onto the current task's stack, for use by
    /// primitive function bodies.
    pub fn push(&mut self, value: Value) {
        self.current_task_mut().stack.push(value);
    }
}

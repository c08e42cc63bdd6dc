use std::rc::Rc;

use crate::span::Pos;
use crate::value::Value;
use crate::vm::FunctionDef;

/// Per-invocation record for a user-defined function call.
///
/// `stack_offset` points at the first argument slot on the owning
/// task's stack; while this frame is active, `stack[stack_offset ..
/// stack_offset + target.params.len()]` are that call's arguments,
/// addressable via the `argument` opcode. There is no explicit parent
/// pointer: frames live in `Task::call_stack`, a plain `Vec`, and the
/// parent of the top frame is simply the element below it.
#[derive(Clone)]
pub struct CallFrame {
    pub target: Rc<FunctionDef>,
    pub pos: Pos,
    pub stack_offset: usize,
    pub return_pc: usize,
}

/// A green thread: independent stack and program counter, sharing the
/// VM's single bytecode buffer with every other task.
pub struct Task {
    pub id: u64,
    pub pc: usize,
    pub stack: Vec<Value>,
    pub call_stack: Vec<CallFrame>,
}

impl Task {
    pub fn new(id: u64, pc: usize) -> Self {
        Self {
            id,
            pc,
            stack: Vec::new(),
            call_stack: Vec::new(),
        }
    }

    pub fn current_frame(&self) -> Option<&CallFrame> {
        self.call_stack.last()
    }
}

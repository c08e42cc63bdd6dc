use std::rc::Rc;
use std::time::Instant;

use crate::error::EvalError;
use crate::span::Pos;
use crate::types;
use crate::value::Value;
use crate::vm::task::{CallFrame, Task};
use crate::vm::{FunctionBody, FunctionDef, Op, Vm};

impl Vm {
    /// Run from `from_pc` until a `Stop` op is reached. Task rotation
    /// (`yield`) is handled by re-reading `current_task()` at the top
    /// of the loop rather than by recursing, so an arbitrarily long
    /// chain of yields does not grow the host call stack. `benchmark`
    /// is the one op that re-enters `eval` recursively, bounded by its
    /// iteration count.
    pub fn eval(&mut self, from_pc: usize) -> Result<(), EvalError> {
        self.current_task_mut().pc = from_pc;
        loop {
            let pc = self.current_task().pc;
            let op = self
                .code
                .get(pc)
                .cloned()
                .ok_or(EvalError::PcOutOfBounds)?;
            match op {
                Op::Stop => return Ok(()),

                Op::Nop => {
                    self.current_task_mut().pc = pc + 1;
                }

                Op::Trace => {
                    if let Some(next) = self.code.get(pc + 1) {
                        eprintln!("trace: {next:?}");
                    }
                    self.current_task_mut().pc = pc + 1;
                }

                Op::Push(value) => {
                    self.current_task_mut().stack.push(value);
                    self.current_task_mut().pc = pc + 1;
                }

                Op::Goto(target) => {
                    self.current_task_mut().pc = target;
                }

                Op::Argument(i) => {
                    let offset = self
                        .current_task()
                        .current_frame()
                        .expect("argument op requires an active call frame")
                        .stack_offset;
                    let value = self.current_task().stack[offset + i].clone();
                    self.current_task_mut().stack.push(value);
                    self.current_task_mut().pc = pc + 1;
                }

                Op::Branch(pos, else_pc) => {
                    let value = self.pop_value(&pos)?;
                    if value.to_bool() {
                        self.current_task_mut().pc = pc + 1;
                    } else {
                        self.current_task_mut().pc = else_pc;
                    }
                }

                Op::Or(pos, end_pc) => {
                    let truthy = self
                        .current_task()
                        .stack
                        .last()
                        .ok_or_else(|| EvalError::MissingValue(pos.clone()))?
                        .to_bool();
                    if truthy {
                        self.current_task_mut().pc = end_pc;
                    } else {
                        self.current_task_mut().stack.pop();
                        self.current_task_mut().pc = pc + 1;
                    }
                }

                Op::Call(pos, f) => {
                    self.current_task_mut().pc = pc + 1;
                    self.call(f, pos)?;
                }

                Op::TailCall(pos, f) => {
                    self.current_task_mut().pc = pc + 1;
                    self.tail_call(f, pos)?;
                }

                Op::PopCall(f) => {
                    self.pop_call(&f);
                }

                Op::Task(end_pc) => {
                    let new_pc = pc + 1;
                    let id = self.fresh_task_id();
                    self.tasks.push_back(Task::new(id, new_pc));
                    self.current_task_mut().pc = end_pc;
                }

                Op::Benchmark(pos) => {
                    self.eval_benchmark(pc, pos)?;
                }
            }
        }
    }

    fn pop_value(&mut self, pos: &Pos) -> Result<Value, EvalError> {
        self.pop(pos)
    }

    pub(crate) fn call(&mut self, f: Rc<FunctionDef>, pos: Pos) -> Result<(), EvalError> {
        if self.current_task().stack.len() < f.params.len() {
            return Err(EvalError::MissingValue(pos));
        }
        match &f.body {
            FunctionBody::Primitive(cb) => {
                let cb = Rc::clone(cb);
                cb(self, &pos)
            }
            FunctionBody::UserDefined => {
                let stack_offset = self.current_task().stack.len() - f.params.len();
                let return_pc = self.current_task().pc;
                let start_pc = f
                    .start_pc
                    .expect("user-defined function must have a start_pc");
                self.current_task_mut().call_stack.push(CallFrame {
                    target: f,
                    pos,
                    stack_offset,
                    return_pc,
                });
                self.current_task_mut().pc = start_pc;
                Ok(())
            }
        }
    }

    fn tail_call(&mut self, f: Rc<FunctionDef>, pos: Pos) -> Result<(), EvalError> {
        let reusable = self
            .current_task()
            .current_frame()
            .map(|frame| frame.target.start_pc.is_some())
            .unwrap_or(false);

        if !reusable {
            return self.call(f, pos);
        }

        if self.current_task().stack.len() < f.params.len() {
            return Err(EvalError::MissingValue(pos));
        }
        let stack_offset = self.current_task().stack.len() - f.params.len();
        let start_pc = f
            .start_pc
            .expect("tail-called function must be user-defined");

        let task = self.current_task_mut();
        let frame = task.call_stack.last_mut().expect("checked reusable above");
        frame.target = f;
        frame.pos = pos;
        frame.stack_offset = stack_offset;
        task.pc = start_pc;
        Ok(())
    }

    fn pop_call(&mut self, _f: &Rc<FunctionDef>) {
        let task = self.current_task_mut();
        let frame = task
            .call_stack
            .pop()
            .expect("popCall requires an active call frame");
        let arity = frame.target.params.len();
        task.stack
            .drain(frame.stack_offset..frame.stack_offset + arity);
        task.pc = frame.return_pc;
    }

    fn eval_benchmark(&mut self, benchmark_pc: usize, pos: Pos) -> Result<(), EvalError> {
        let count = self
            .pop_value(&pos)?
            .as_int()
            .ok_or_else(|| EvalError::MissingValue(pos.clone()))?;
        let body_start = benchmark_pc + 1;
        let stack_len_before = self.current_task().stack.len();

        let mut stop_pc = body_start;
        let start = Instant::now();
        for _ in 0..count.max(0) {
            self.eval(body_start)?;
            stop_pc = self.current_task().pc;
            self.current_task_mut().stack.truncate(stack_len_before);
        }
        let elapsed = start.elapsed();

        self.current_task_mut()
            .stack
            .push(Value::duration(types::time_type(), elapsed));
        self.current_task_mut().pc = stop_pc + 1;
        Ok(())
    }
}

//! Control-flow macros: `function`, `return`, `if`, `or`.

use std::collections::VecDeque;
use std::rc::Rc;

use crate::error::EmitError;
use crate::form::{emit_form, EmitOptions, Form};
use crate::namespace::{Namespace, NsRef};
use crate::span::Pos;
use crate::stdlib::bind_macro;
use crate::types;
use crate::value::Value;
use crate::vm::{FunctionBody, FunctionDef, Op, Vm};

fn emit_one(form: &Form, vm: &mut Vm, ns: &NsRef, opts: EmitOptions) -> Result<(), EmitError> {
    emit_form(form, vm, ns, &mut VecDeque::new(), opts)
}

/// `function(name, (p1 p2 ...), body)`: reserve a skip `nop`, record
/// `start_pc`, bind `name` to a function value before emitting the
/// body (so recursive calls resolve), emit the body in a child
/// namespace with params bound as `Argument` values, emit `popCall`,
/// then backpatch the skip to jump past the body.
fn function_macro(
    vm: &mut Vm,
    pos: &Pos,
    ns: &NsRef,
    args: &mut VecDeque<Form>,
    _opts: EmitOptions,
) -> Result<(), EmitError> {
    let name = match args.pop_front() {
        Some(Form::Identifier(_, name)) => name,
        Some(other) => return Err(EmitError::MissingArgument(other.pos().clone())),
        None => return Err(EmitError::MissingArgument(pos.clone())),
    };
    let params: Vec<String> = match args.pop_front() {
        Some(Form::List(_, items)) => items
            .into_iter()
            .map(|f| match f {
                Form::Identifier(_, n) => Ok(n),
                other => Err(EmitError::MissingArgument(other.pos().clone())),
            })
            .collect::<Result<_, _>>()?,
        Some(other) => return Err(EmitError::MissingArgument(other.pos().clone())),
        None => return Err(EmitError::MissingArgument(pos.clone())),
    };
    let body = args
        .pop_front()
        .ok_or_else(|| EmitError::MissingArgument(pos.clone()))?;

    let skip_pc = vm.emit(Op::Nop);
    let start_pc = vm.emit_pc();

    let def = Rc::new(FunctionDef {
        name: name.clone(),
        params: params.clone(),
        start_pc: Some(start_pc),
        body: FunctionBody::UserDefined,
    });
    Namespace::bind(
        ns,
        name,
        Value::function(types::function_type(), Rc::clone(&def)),
    );

    let body_ns = Namespace::child(ns);
    for (i, param) in params.iter().enumerate() {
        Namespace::bind(
            &body_ns,
            param.clone(),
            Value::argument(types::argument_type(), i),
        );
    }
    // Not `returning` — tail-call compilation only happens under an
    // explicit `return`.
    emit_one(&body, vm, &body_ns, EmitOptions::default())?;
    vm.emit(Op::PopCall(def));

    let end_pc = vm.emit_pc();
    vm.backpatch(skip_pc, Op::Goto(end_pc));
    Ok(())
}

/// `return(expr)`: the only route by which a `tailCall` is produced.
fn return_macro(
    vm: &mut Vm,
    pos: &Pos,
    ns: &NsRef,
    args: &mut VecDeque<Form>,
    _opts: EmitOptions,
) -> Result<(), EmitError> {
    let expr = args
        .pop_front()
        .ok_or_else(|| EmitError::MissingArgument(pos.clone()))?;
    emit_one(&expr, vm, ns, EmitOptions::returning())
}

/// `if(cond, then [, "else", alt])`.
fn if_macro(
    vm: &mut Vm,
    pos: &Pos,
    ns: &NsRef,
    args: &mut VecDeque<Form>,
    opts: EmitOptions,
) -> Result<(), EmitError> {
    let cond = args
        .pop_front()
        .ok_or_else(|| EmitError::MissingArgument(pos.clone()))?;
    emit_one(&cond, vm, ns, EmitOptions::default())?;

    let if_pc = vm.emit(Op::Nop);

    let then_form = args
        .pop_front()
        .ok_or_else(|| EmitError::MissingArgument(pos.clone()))?;
    emit_one(&then_form, vm, ns, opts)?;

    let is_else = matches!(args.front(), Some(Form::Identifier(_, name)) if name == "else");
    let else_pc = if is_else {
        args.pop_front();
        let skip_pc = vm.emit(Op::Nop);
        let else_pc = vm.emit_pc();
        let alt_form = args
            .pop_front()
            .ok_or_else(|| EmitError::MissingArgument(pos.clone()))?;
        emit_one(&alt_form, vm, ns, opts)?;
        let end_pc = vm.emit_pc();
        vm.backpatch(skip_pc, Op::Goto(end_pc));
        else_pc
    } else {
        vm.emit_pc()
    };

    vm.backpatch(if_pc, Op::Branch(pos.clone(), else_pc));
    Ok(())
}

/// `or(a, b)`: evaluates `a` exactly once.
fn or_macro(
    vm: &mut Vm,
    pos: &Pos,
    ns: &NsRef,
    args: &mut VecDeque<Form>,
    opts: EmitOptions,
) -> Result<(), EmitError> {
    let a = args
        .pop_front()
        .ok_or_else(|| EmitError::MissingArgument(pos.clone()))?;
    emit_one(&a, vm, ns, opts)?;

    let or_pc = vm.emit(Op::Nop);

    let b = args
        .pop_front()
        .ok_or_else(|| EmitError::MissingArgument(pos.clone()))?;
    emit_one(&b, vm, ns, opts)?;

    let end_pc = vm.emit_pc();
    vm.backpatch(or_pc, Op::Or(pos.clone(), end_pc));
    Ok(())
}

pub fn install(ns: &NsRef) {
    bind_macro(ns, "function", function_macro);
    bind_macro(ns, "return", return_macro);
    bind_macro(ns, "if", if_macro);
    bind_macro(ns, "or", or_macro);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{Form, Literal};
    use crate::stdlib::install_standard_namespace;
    use std::collections::VecDeque;

    fn pos() -> Pos {
        Pos::dummy()
    }

    fn int_lit(n: i64) -> Form {
        Form::Literal(pos(), Literal::Int(n))
    }

    fn ident(name: &str) -> Form {
        Form::Identifier(pos(), name.to_string())
    }

    fn list(items: Vec<Form>) -> Form {
        Form::List(pos(), items)
    }

    fn run(forms: Vec<Form>) -> Vm {
        let ns = install_standard_namespace();
        let mut vm = Vm::new();
        let mut deque: VecDeque<Form> = forms.into_iter().collect();
        crate::form::emit_sequence(&mut deque, &mut vm, &ns, EmitOptions::default()).unwrap();
        vm.emit(Op::Stop);
        vm.eval(0).unwrap();
        vm
    }

    #[test]
    fn if_true_branch() {
        let vm = run(vec![list(vec![
            ident("if"),
            list(vec![ident("<"), int_lit(1), int_lit(2)]),
            int_lit(10),
            ident("else"),
            int_lit(20),
        ])]);
        assert_eq!(vm.current_task().stack.last().unwrap().as_int(), Some(10));
    }

    #[test]
    fn if_false_branch() {
        let vm = run(vec![list(vec![
            ident("if"),
            list(vec![ident(">"), int_lit(1), int_lit(2)]),
            int_lit(10),
            ident("else"),
            int_lit(20),
        ])]);
        assert_eq!(vm.current_task().stack.last().unwrap().as_int(), Some(20));
    }

    #[test]
    fn if_without_else_falls_through() {
        let vm = run(vec![list(vec![
            ident("if"),
            list(vec![ident(">"), int_lit(1), int_lit(2)]),
            int_lit(10),
        ])]);
        assert!(vm.current_task().stack.is_empty());
    }

    #[test]
    fn or_short_circuits_left_truthy() {
        let vm = run(vec![list(vec![ident("or"), int_lit(7), int_lit(42)])]);
        assert_eq!(vm.current_task().stack.last().unwrap().as_int(), Some(7));
    }

    #[test]
    fn or_falls_through_on_falsy_left() {
        let vm = run(vec![list(vec![ident("or"), int_lit(0), int_lit(42)])]);
        assert_eq!(vm.current_task().stack.last().unwrap().as_int(), Some(42));
    }

    #[test]
    fn accumulator_factorial_is_tail_recursive_and_bounded_depth() {
        // Naive `n * fact(n - 1)` is not tail-recursive (the
        // multiplication happens after the recursive call returns), so
        // this uses the standard accumulator transform, which is:
        //   (function mul (a b) ...)            ; repeated-subtraction multiply
        //   (function fact_acc (n acc)
        //     (if (< n 2) acc else
        //       (return (fact_acc (- n 1) (mul n acc)))))
        //   (function fact (n) (return (fact_acc n 1)))
        let def_mul = list(vec![
            ident("function"),
            ident("mul"),
            list(vec![ident("a"), ident("b")]),
            list(vec![
                ident("if"),
                list(vec![ident("="), ident("b"), int_lit(0)]),
                int_lit(0),
                ident("else"),
                list(vec![
                    ident("+"),
                    ident("a"),
                    list(vec![ident("mul"), ident("a"), list(vec![ident("-"), ident("b"), int_lit(1)])]),
                ]),
            ]),
        ]);
        let def_fact_acc = list(vec![
            ident("function"),
            ident("fact_acc"),
            list(vec![ident("n"), ident("acc")]),
            list(vec![
                ident("if"),
                list(vec![ident("<"), ident("n"), int_lit(2)]),
                ident("acc"),
                ident("else"),
                list(vec![
                    ident("return"),
                    list(vec![
                        ident("fact_acc"),
                        list(vec![ident("-"), ident("n"), int_lit(1)]),
                        list(vec![ident("mul"), ident("n"), ident("acc")]),
                    ]),
                ]),
            ]),
        ]);
        let def_fact = list(vec![
            ident("function"),
            ident("fact"),
            list(vec![ident("n")]),
            list(vec![
                ident("return"),
                list(vec![ident("fact_acc"), ident("n"), int_lit(1)]),
            ]),
        ]);
        let call_fact = list(vec![ident("fact"), int_lit(5)]);
        let vm = run(vec![def_mul, def_fact_acc, def_fact, call_fact]);
        assert_eq!(vm.current_task().stack.last().unwrap().as_int(), Some(120));
        // Tail-call reuse means the call chain never grows past the
        // single active frame (the run() helper's top-level call into
        // `fact` itself having already popped by the time we inspect).
        assert!(vm.current_task().call_stack.is_empty());
    }
}

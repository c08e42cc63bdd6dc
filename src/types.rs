//! Type descriptors: the open set of behaviors a `Value` can carry.
//!
//! A `Type` is a record of three function pointers — `identifier_emit`,
//! `to_bool`, `display` — constructed once per type and shared by
//! reference. This is the flattened replacement for the source
//! language's inheritance-based type objects: no virtual dispatch
//! table beyond a plain struct of fn pointers, and defaults are just
//! the functions most types reuse unmodified.

use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::OnceLock;

use crate::error::EmitError;
use crate::form::{emit_form, Form};
use crate::namespace::NsRef;
use crate::span::Pos;
use crate::value::Value;
use crate::vm::{Op, Vm};

pub type IdentifierEmitFn = fn(
    &Value,
    &mut Vm,
    &Pos,
    &NsRef,
    &mut VecDeque<Form>,
    crate::form::EmitOptions,
) -> Result<(), EmitError>;

/// A named, open-ended descriptor of value behavior.
pub struct Type {
    pub name: &'static str,
    pub identifier_emit: IdentifierEmitFn,
    pub to_bool: fn(&Value) -> bool,
    pub display: fn(&Value) -> String,
}

fn push_self(
    value: &Value,
    vm: &mut Vm,
    _pos: &Pos,
    _ns: &NsRef,
    _args: &mut VecDeque<Form>,
    _opts: crate::form::EmitOptions,
) -> Result<(), EmitError> {
    vm.emit(Op::Push(value.clone()));
    Ok(())
}

fn always_true(_: &Value) -> bool {
    true
}

macro_rules! singleton {
    ($fn_name:ident, $static_name:ident) => {
        pub fn $fn_name() -> Rc<Type> {
            static CELL: OnceLock<Rc<Type>> = OnceLock::new();
            Rc::clone(CELL.get_or_init(|| Rc::new($static_name())))
        }
    };
}

fn meta_type_def() -> Type {
    Type {
        name: "Meta",
        identifier_emit: push_self,
        to_bool: always_true,
        display: |v| match &v.data {
            crate::value::Payload::Type(t) => format!("<type {}>", t.name),
            _ => "<type>".to_string(),
        },
    }
}
singleton!(meta_type, meta_type_def);

fn bool_type_def() -> Type {
    Type {
        name: "Bool",
        identifier_emit: push_self,
        to_bool: |v| matches!(v.data, crate::value::Payload::Bool(b) if b),
        display: |v| match v.data {
            crate::value::Payload::Bool(b) => b.to_string(),
            _ => "<bool>".to_string(),
        },
    }
}
singleton!(bool_type, bool_type_def);

fn int_type_def() -> Type {
    Type {
        name: "Int",
        identifier_emit: push_self,
        // 0 is falsy, matching the standard library's `or`/`if` usage.
        to_bool: |v| !matches!(v.data, crate::value::Payload::Int(0)),
        display: |v| match v.data {
            crate::value::Payload::Int(n) => n.to_string(),
            _ => "<int>".to_string(),
        },
    }
}
singleton!(int_type, int_type_def);

fn string_type_def() -> Type {
    Type {
        name: "String",
        identifier_emit: push_self,
        to_bool: always_true,
        display: |v| match &v.data {
            crate::value::Payload::Str(s) => s.to_string(),
            _ => "<string>".to_string(),
        },
    }
}
singleton!(string_type, string_type_def);

fn time_type_def() -> Type {
    Type {
        name: "Time",
        identifier_emit: push_self,
        to_bool: |v| matches!(&v.data, crate::value::Payload::Duration(d) if !d.is_zero()),
        display: |v| match &v.data {
            crate::value::Payload::Duration(d) => format!("{:?}", d),
            _ => "<time>".to_string(),
        },
    }
}
singleton!(time_type, time_type_def);

fn argument_identifier_emit(
    value: &Value,
    vm: &mut Vm,
    _pos: &Pos,
    _ns: &NsRef,
    _args: &mut VecDeque<Form>,
    _opts: crate::form::EmitOptions,
) -> Result<(), EmitError> {
    let index = value
        .as_argument_index()
        .expect("Argument-typed value must carry an index payload");
    vm.emit(Op::Argument(index));
    Ok(())
}

fn argument_type_def() -> Type {
    Type {
        name: "Argument",
        identifier_emit: argument_identifier_emit,
        to_bool: always_true,
        display: |v| format!("<argument {}>", v.as_argument_index().unwrap_or(0)),
    }
}
singleton!(argument_type, argument_type_def);

/// Identifier emission for a bound `Function` value: pull one sibling
/// form per declared parameter, emit each in call position (empty
/// options — arguments are never themselves in tail position), then
/// emit a `tailCall` if this call is in tail position and the target
/// is user-defined, otherwise a plain `call`.
fn function_identifier_emit(
    value: &Value,
    vm: &mut Vm,
    pos: &Pos,
    ns: &NsRef,
    args: &mut VecDeque<Form>,
    opts: crate::form::EmitOptions,
) -> Result<(), EmitError> {
    let f = Rc::clone(value.as_function().expect("Function-typed value"));
    for _ in 0..f.params.len() {
        let arg_form = args
            .pop_front()
            .ok_or_else(|| EmitError::MissingArgument(pos.clone()))?;
        emit_form(
            &arg_form,
            vm,
            ns,
            &mut VecDeque::new(),
            crate::form::EmitOptions::default(),
        )?;
    }
    if opts.returning && f.start_pc.is_some() {
        vm.emit(Op::TailCall(pos.clone(), f));
    } else {
        vm.emit(Op::Call(pos.clone(), f));
    }
    Ok(())
}

fn function_type_def() -> Type {
    Type {
        name: "Function",
        identifier_emit: function_identifier_emit,
        to_bool: always_true,
        display: |v| format!("<function {}>", v.as_function().map(|f| f.name.as_str()).unwrap_or("?")),
    }
}
singleton!(function_type, function_type_def);

/// Identifier emission for a bound `Macro` value: hand the remaining
/// sibling sequence straight to the macro's emit-time body.
fn macro_identifier_emit(
    value: &Value,
    vm: &mut Vm,
    pos: &Pos,
    ns: &NsRef,
    args: &mut VecDeque<Form>,
    opts: crate::form::EmitOptions,
) -> Result<(), EmitError> {
    let m = Rc::clone(value.as_macro().expect("Macro-typed value"));
    (m.body)(vm, pos, ns, args, opts)
}

fn macro_type_def() -> Type {
    Type {
        name: "Macro",
        identifier_emit: macro_identifier_emit,
        to_bool: always_true,
        display: |v| format!("<macro {}>", v.as_macro().map(|m| m.name.as_str()).unwrap_or("?")),
    }
}
singleton!(macro_type, macro_type_def);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn int_zero_is_falsy_nonzero_is_truthy() {
        assert!(!Value::int(int_type(), 0).to_bool());
        assert!(Value::int(int_type(), 1).to_bool());
        assert!(Value::int(int_type(), -1).to_bool());
    }

    #[test]
    fn bool_to_bool_matches_payload() {
        assert!(Value::bool(bool_type(), true).to_bool());
        assert!(!Value::bool(bool_type(), false).to_bool());
    }

    #[test]
    fn display_formats() {
        assert_eq!(Value::int(int_type(), 42).display(), "42");
        assert_eq!(Value::bool(bool_type(), true).display(), "true");
        assert_eq!(Value::string(string_type(), "hi").display(), "hi");
    }

    #[test]
    fn type_singletons_are_shared() {
        assert!(Rc::ptr_eq(&int_type(), &int_type()));
    }
}

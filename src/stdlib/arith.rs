//! Arithmetic and comparison primitives: `+ - = < >`. All take two
//! `Int`s and push an `Int` or `Bool` result.

use std::rc::Rc;

use crate::namespace::{Namespace, NsRef};
use crate::types;
use crate::value::Value;
use crate::vm::{FunctionDef, Vm};

fn binary_int(vm: &mut Vm, pos: &crate::span::Pos) -> Result<(i64, i64), crate::error::EvalError> {
    let b = vm.pop(pos)?.as_int().ok_or_else(|| crate::error::EvalError::MissingValue(pos.clone()))?;
    let a = vm.pop(pos)?.as_int().ok_or_else(|| crate::error::EvalError::MissingValue(pos.clone()))?;
    Ok((a, b))
}

pub fn install(ns: &NsRef) {
    bind_fn(ns, "+", |vm, pos| {
        let (a, b) = binary_int(vm, pos)?;
        vm.push(Value::int(types::int_type(), a + b));
        Ok(())
    });
    bind_fn(ns, "-", |vm, pos| {
        let (a, b) = binary_int(vm, pos)?;
        vm.push(Value::int(types::int_type(), a - b));
        Ok(())
    });
    bind_fn(ns, "=", |vm, pos| {
        let (a, b) = binary_int(vm, pos)?;
        vm.push(Value::bool(types::bool_type(), a == b));
        Ok(())
    });
    bind_fn(ns, "<", |vm, pos| {
        let (a, b) = binary_int(vm, pos)?;
        vm.push(Value::bool(types::bool_type(), a < b));
        Ok(())
    });
    bind_fn(ns, ">", |vm, pos| {
        let (a, b) = binary_int(vm, pos)?;
        vm.push(Value::bool(types::bool_type(), a > b));
        Ok(())
    });
}

fn bind_fn(
    ns: &NsRef,
    name: &str,
    body: impl Fn(&mut Vm, &crate::span::Pos) -> Result<(), crate::error::EvalError> + 'static,
) {
    let def = Rc::new(FunctionDef::primitive(
        name,
        vec!["a".to_string(), "b".to_string()],
        body,
    ));
    Namespace::bind(ns, name, Value::function(types::function_type(), def));
}

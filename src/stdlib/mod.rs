//! The standard namespace: type bindings, booleans, and every built-in
//! macro and primitive function. `install_standard_namespace` is the
//! single entry point the REPL, batch driver, and tests all call.

pub mod arith;
pub mod concurrency;
pub mod control;
pub mod trace;

use std::collections::VecDeque;
use std::rc::Rc;

use crate::error::{EmitError, EvalError};
use crate::form::{EmitOptions, Form};
use crate::namespace::{Namespace, NsRef};
use crate::span::Pos;
use crate::types;
use crate::value::Value;
use crate::vm::{FunctionDef, MacroDef, Vm};

/// Bind a primitive function under `name`, taking `params.len()`
/// arguments off the stack.
pub(crate) fn bind_fn(
    ns: &NsRef,
    name: &str,
    params: Vec<String>,
    body: impl Fn(&mut Vm, &Pos) -> Result<(), EvalError> + 'static,
) {
    let def = Rc::new(FunctionDef::primitive(name, params, body));
    Namespace::bind(ns, name, Value::function(types::function_type(), def));
}

/// Bind an emit-time macro under `name`.
pub(crate) fn bind_macro(
    ns: &NsRef,
    name: &str,
    body: impl Fn(&mut Vm, &Pos, &NsRef, &mut VecDeque<Form>, EmitOptions) -> Result<(), EmitError>
        + 'static,
) {
    let def = Rc::new(MacroDef {
        name: name.to_string(),
        body: Rc::new(body),
    });
    Namespace::bind(ns, name, Value::macro_(types::macro_type(), def));
}

/// Build a fresh root namespace with every standard binding installed:
/// the `true`/`false` constants, the type values, and the arithmetic,
/// control-flow, concurrency, and trace macros/primitives.
pub fn install_standard_namespace() -> NsRef {
    let ns = Namespace::root();

    Namespace::bind(&ns, "true", Value::bool(types::bool_type(), true));
    Namespace::bind(&ns, "false", Value::bool(types::bool_type(), false));

    Namespace::bind(&ns, "Bool", Value::type_(types::meta_type(), types::bool_type()));
    Namespace::bind(&ns, "Int", Value::type_(types::meta_type(), types::int_type()));
    Namespace::bind(
        &ns,
        "String",
        Value::type_(types::meta_type(), types::string_type()),
    );
    Namespace::bind(&ns, "Time", Value::type_(types::meta_type(), types::time_type()));
    Namespace::bind(
        &ns,
        "Function",
        Value::type_(types::meta_type(), types::function_type()),
    );
    Namespace::bind(
        &ns,
        "Macro",
        Value::type_(types::meta_type(), types::macro_type()),
    );
    Namespace::bind(
        &ns,
        "Meta",
        Value::type_(types::meta_type(), types::meta_type()),
    );

    arith::install(&ns);
    control::install(&ns);
    concurrency::install(&ns);
    trace::install(&ns);

    ns
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_namespace_binds_core_constants() {
        let ns = install_standard_namespace();
        assert!(Namespace::lookup(&ns, "true").unwrap().to_bool());
        assert!(!Namespace::lookup(&ns, "false").unwrap().to_bool());
        assert!(Namespace::lookup(&ns, "+").is_some());
        assert!(Namespace::lookup(&ns, "if").is_some());
        assert!(Namespace::lookup(&ns, "task").is_some());
        assert!(Namespace::lookup(&ns, "Meta").is_some());
        assert!(Namespace::lookup(&ns, "yield").is_some());
        assert!(Namespace::lookup(&ns, "trace").is_some());
    }
}

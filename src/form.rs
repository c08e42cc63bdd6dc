//! The AST produced by the reader, and the emission protocol that
//! walks it into bytecode.
//!
//! A `Form` knows how to emit itself given its namespace, the
//! remaining sibling forms in its enclosing sequence (so macros and
//! function calls can pull further forms off the front), and a set of
//! emit options. Identifiers delegate to the *type* of the value they
//! resolve to — that single indirection is the whole extensibility
//! story (see `crate::types`).

use std::collections::VecDeque;

use crate::error::EmitError;
use crate::namespace::{NsRef, Namespace};
use crate::span::Pos;
use crate::types;
use crate::value::Value;
use crate::vm::{Op, Vm};

/// A literal as read from source, before it's wrapped in a typed
/// `Value` at emit time.
#[derive(Clone, Debug)]
pub enum Literal {
    Int(i64),
    Str(String),
}

/// A parsed syntactic node.
#[derive(Clone, Debug)]
pub enum Form {
    Identifier(Pos, String),
    List(Pos, Vec<Form>),
    Literal(Pos, Literal),
}

impl Form {
    pub fn pos(&self) -> &Pos {
        match self {
            Form::Identifier(pos, _) => pos,
            Form::List(pos, _) => pos,
            Form::Literal(pos, _) => pos,
        }
    }
}

/// Emit options. Currently a single flag: "this emission sits in the
/// tail position of a function body". Propagated only to a form's own
/// tail position — macros decide, per arm, whether to pass it down.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmitOptions {
    pub returning: bool,
}

impl EmitOptions {
    pub fn returning() -> Self {
        Self { returning: true }
    }
}

/// Emit a single form. `args` is the mutable remaining-siblings
/// sequence of whatever enclosing sequence this form came from; an
/// identifier that resolves to a function or macro may pull further
/// forms off its front.
pub fn emit_form(
    form: &Form,
    vm: &mut Vm,
    ns: &NsRef,
    args: &mut VecDeque<Form>,
    opts: EmitOptions,
) -> Result<(), EmitError> {
    match form {
        Form::Literal(_pos, lit) => {
            let value = literal_value(lit);
            vm.emit(Op::Push(value));
            Ok(())
        }
        Form::List(_pos, items) => {
            let mut inner: VecDeque<Form> = items.iter().cloned().collect();
            emit_sequence(&mut inner, vm, ns, opts)
        }
        Form::Identifier(pos, name) => {
            let value = Namespace::lookup(ns, name)
                .ok_or_else(|| EmitError::UnknownIdentifier(pos.clone(), name.clone()))?;
            (value.ty.identifier_emit)(&value, vm, pos, ns, args, opts)
        }
    }
}

fn literal_value(lit: &Literal) -> Value {
    match lit {
        Literal::Int(n) => Value::int(types::int_type(), *n),
        Literal::Str(s) => Value::string(types::string_type(), s.clone()),
    }
}

/// Emit a sequence of sibling forms, consuming from the front. Each
/// form may itself pull further forms off the shared deque (a function
/// call pulling its arguments, or a macro pulling its sub-forms) —
/// the loop simply continues from whatever remains after each
/// `emit_form` call returns. `tail_opts.returning` is propagated only
/// to the very last form actually emitted at this sequence's top
/// level.
///
/// A bare identifier bound to a function pulls its own argument forms
/// off this same deque before the call is actually emitted, so "is
/// this the last form" can't simply mean "is the deque empty after
/// popping it" — a two-argument call as the final item of a three-item
/// list leaves two forms in the deque even though it's the whole
/// sequence's one and only call. A macro identifier is more extreme
/// still: it always pulls everything left in the deque as its own
/// sub-forms (an `if`'s condition/branches, a `task`'s body, and so
/// on), so whatever remains after popping it was never a sibling to
/// begin with. `tail_candidate_kind` tells the two cases apart from
/// "the deque is just plain empty".
pub fn emit_sequence(
    forms: &mut VecDeque<Form>,
    vm: &mut Vm,
    ns: &NsRef,
    tail_opts: EmitOptions,
) -> Result<(), EmitError> {
    loop {
        let Some(form) = forms.pop_front() else {
            return Ok(());
        };
        let is_last = match tail_candidate_kind(&form, ns) {
            Some(TailCandidateKind::Function(arity)) => forms.len() == arity,
            Some(TailCandidateKind::Macro) => true,
            None => forms.is_empty(),
        };
        let opts = if is_last {
            tail_opts
        } else {
            EmitOptions::default()
        };
        emit_form(&form, vm, ns, forms, opts)?;
    }
}

enum TailCandidateKind {
    /// Resolves to a function taking this many arguments, which it
    /// will pull off the same deque.
    Function(usize),
    /// Resolves to a macro, which consumes whatever remains in the
    /// deque as its own sub-forms.
    Macro,
}

fn tail_candidate_kind(form: &Form, ns: &NsRef) -> Option<TailCandidateKind> {
    let Form::Identifier(_, name) = form else {
        return None;
    };
    let value = Namespace::lookup(ns, name)?;
    if let Some(f) = value.as_function() {
        return Some(TailCandidateKind::Function(f.params.len()));
    }
    if value.as_macro().is_some() {
        return Some(TailCandidateKind::Macro);
    }
    None
}

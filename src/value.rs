use std::rc::Rc;
use std::time::Duration;

use crate::types::Type;
use crate::vm::{FunctionDef, MacroDef};

/// A value carries a reference to the `Type` that defines its behavior
/// plus an opaque payload. Values are immutable once constructed; all
/// "mutation" in the language happens by replacing a stack slot or a
/// namespace binding with a new `Value`.
#[derive(Clone)]
pub struct Value {
    pub ty: Rc<Type>,
    pub data: Payload,
}

/// The finite set of payload shapes a `Value` can carry.
#[derive(Clone)]
pub enum Payload {
    Int(i64),
    Bool(bool),
    Str(Rc<str>),
    Duration(Duration),
    Function(Rc<FunctionDef>),
    Macro(Rc<MacroDef>),
    Type(Rc<Type>),
    /// Index of a function parameter within the enclosing call frame.
    Argument(usize),
}

impl Value {
    pub fn int(ty: Rc<Type>, v: i64) -> Self {
        Self {
            ty,
            data: Payload::Int(v),
        }
    }

    pub fn bool(ty: Rc<Type>, v: bool) -> Self {
        Self {
            ty,
            data: Payload::Bool(v),
        }
    }

    pub fn string(ty: Rc<Type>, v: impl Into<Rc<str>>) -> Self {
        Self {
            ty,
            data: Payload::Str(v.into()),
        }
    }

    pub fn duration(ty: Rc<Type>, v: Duration) -> Self {
        Self {
            ty,
            data: Payload::Duration(v),
        }
    }

    pub fn function(ty: Rc<Type>, f: Rc<FunctionDef>) -> Self {
        Self {
            ty,
            data: Payload::Function(f),
        }
    }

    pub fn macro_(ty: Rc<Type>, m: Rc<MacroDef>) -> Self {
        Self {
            ty,
            data: Payload::Macro(m),
        }
    }

    pub fn type_(meta_ty: Rc<Type>, referenced: Rc<Type>) -> Self {
        Self {
            ty: meta_ty,
            data: Payload::Type(referenced),
        }
    }

    pub fn argument(ty: Rc<Type>, index: usize) -> Self {
        Self {
            ty,
            data: Payload::Argument(index),
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self.data {
            Payload::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Rc<FunctionDef>> {
        match &self.data {
            Payload::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_macro(&self) -> Option<&Rc<MacroDef>> {
        match &self.data {
            Payload::Macro(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_argument_index(&self) -> Option<usize> {
        match self.data {
            Payload::Argument(i) => Some(i),
            _ => None,
        }
    }

    /// Truthiness, delegated to the value's type.
    pub fn to_bool(&self) -> bool {
        (self.ty.to_bool)(self)
    }

    /// Display text, delegated to the value's type.
    pub fn display(&self) -> String {
        (self.ty.display)(self)
    }
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Value({}: {})", self.ty.name, self.display())
    }
}

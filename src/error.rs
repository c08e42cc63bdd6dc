use crate::diagnostic::Diagnostic;
use crate::span::Pos;

/// Errors raised while turning source text into forms.
#[derive(Clone, Debug)]
pub enum ReadError {
    /// A `(` was never matched by a closing `)`.
    OpenList(Pos),
    /// A `"` was never matched by a closing `"`.
    OpenString(Pos),
}

/// Errors raised while emitting forms into bytecode.
#[derive(Clone, Debug)]
pub enum EmitError {
    /// A function call had fewer sibling forms remaining than parameters.
    MissingArgument(Pos),
    /// An identifier has no binding in the current namespace.
    UnknownIdentifier(Pos, String),
}

/// Errors raised while executing bytecode.
#[derive(Clone, Debug)]
pub enum EvalError {
    /// An opcode required a value on the stack and found none.
    MissingValue(Pos),
    /// The program counter ran past the end of the code buffer.
    PcOutOfBounds,
}

/// The union of all three error families, as seen at a REPL turn or
/// batch-driver boundary.
#[derive(Clone, Debug)]
pub enum Error {
    Read(ReadError),
    Emit(EmitError),
    Eval(EvalError),
}

impl From<ReadError> for Error {
    fn from(e: ReadError) -> Self {
        Error::Read(e)
    }
}

impl From<EmitError> for Error {
    fn from(e: EmitError) -> Self {
        Error::Emit(e)
    }
}

impl From<EvalError> for Error {
    fn from(e: EvalError) -> Self {
        Error::Eval(e)
    }
}

impl Error {
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Error::Read(ReadError::OpenList(pos)) => {
                Diagnostic::error("unterminated list: missing ')'", pos.clone())
            }
            Error::Read(ReadError::OpenString(pos)) => {
                Diagnostic::error("unterminated string: missing closing '\"'", pos.clone())
            }
            Error::Emit(EmitError::MissingArgument(pos)) => {
                Diagnostic::error("missing argument for call", pos.clone())
            }
            Error::Emit(EmitError::UnknownIdentifier(pos, name)) => {
                Diagnostic::error(format!("unbound identifier '{name}'"), pos.clone())
            }
            Error::Eval(EvalError::MissingValue(pos)) => {
                Diagnostic::error("expected a value on the stack, found none", pos.clone())
            }
            Error::Eval(EvalError::PcOutOfBounds) => Diagnostic::error(
                "program counter ran past the end of code",
                Pos::dummy(),
            ),
        }
    }
}

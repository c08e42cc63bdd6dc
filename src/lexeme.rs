/// A single token produced by the reader's lexical scan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Lexeme {
    Ident(String),
    Int(i64),
    Str(String),
    LParen,
    RParen,
    Eof,
}

//! The textual reader: turns source bytes into `Form`s. This is an
//! external collaborator to the core VM/emitter — the core only cares
//! about the `Form` shapes it receives (see `crate::form`) — but it's
//! implemented here since something has to produce them.

use std::rc::Rc;

use crate::error::ReadError;
use crate::form::{Form, Literal};
use crate::lexeme::Lexeme;
use crate::span::{Pos, Spanned};

struct Lexer<'src> {
    source: &'src [u8],
    source_name: Rc<str>,
    pos: usize,
    line: u32,
    column: u32,
}

impl<'src> Lexer<'src> {
    fn new(source: &'src str, source_name: Rc<str>) -> Self {
        Self {
            source: source.as_bytes(),
            source_name,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn here(&self) -> Pos {
        Pos::new(Rc::clone(&self.source_name), self.line, self.column)
    }

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(b)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.advance();
        }
    }

    fn tokenize(mut self) -> Result<Vec<Spanned<Lexeme>>, ReadError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace();
            let start = self.here();
            let Some(b) = self.peek() else {
                tokens.push(Spanned::new(Lexeme::Eof, start));
                return Ok(tokens);
            };
            let tok = match b {
                b'(' => {
                    self.advance();
                    Lexeme::LParen
                }
                b')' => {
                    self.advance();
                    Lexeme::RParen
                }
                b'"' => self.scan_string(&start)?,
                b'-' if self.source.get(self.pos + 1).is_some_and(|c| c.is_ascii_digit()) => {
                    self.scan_int()
                }
                _ if b.is_ascii_digit() => self.scan_int(),
                _ => self.scan_ident(),
            };
            tokens.push(Spanned::new(tok, start));
        }
    }

    fn scan_string(&mut self, start: &Pos) -> Result<Lexeme, ReadError> {
        self.advance(); // opening quote
        let mut text = String::new();
        loop {
            match self.peek() {
                None => return Err(ReadError::OpenString(start.clone())),
                Some(b'"') => {
                    self.advance();
                    return Ok(Lexeme::Str(text));
                }
                Some(_) => {
                    // No escape processing: bytes are copied verbatim.
                    let b = self.advance().unwrap();
                    text.push(b as char);
                }
            }
        }
    }

    fn scan_int(&mut self) -> Lexeme {
        let mut text = String::new();
        if self.peek() == Some(b'-') {
            text.push('-');
            self.advance();
        }
        while matches!(self.peek(), Some(b) if b.is_ascii_digit()) {
            text.push(self.advance().unwrap() as char);
        }
        Lexeme::Int(text.parse().unwrap_or(0))
    }

    fn scan_ident(&mut self) -> Lexeme {
        let mut text = String::new();
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() || b == b'(' || b == b')' {
                break;
            }
            text.push(self.advance().unwrap() as char);
        }
        Lexeme::Ident(text)
    }
}

/// Parse a token stream into a flat list of top-level forms, building
/// nested `List` forms at matched parens.
struct FormReader {
    tokens: Vec<Spanned<Lexeme>>,
    pos: usize,
}

impl FormReader {
    fn peek(&self) -> &Lexeme {
        &self.tokens[self.pos].node
    }

    fn here(&self) -> Pos {
        self.tokens[self.pos].pos.clone()
    }

    fn advance(&mut self) -> Spanned<Lexeme> {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn read_all(&mut self) -> Result<Vec<Form>, ReadError> {
        let mut forms = Vec::new();
        loop {
            // A stray ')' with nothing open is skipped rather than
            // treated as a fatal read error (only a *missing* close
            // paren is, per `OpenList`).
            while matches!(self.peek(), Lexeme::RParen) {
                self.advance();
            }
            if matches!(self.peek(), Lexeme::Eof) {
                return Ok(forms);
            }
            forms.push(self.read_form()?);
        }
    }

    fn read_form(&mut self) -> Result<Form, ReadError> {
        let pos = self.here();
        match self.peek().clone() {
            Lexeme::LParen => {
                self.advance();
                let mut items = Vec::new();
                loop {
                    match self.peek() {
                        Lexeme::RParen => {
                            self.advance();
                            return Ok(Form::List(pos, items));
                        }
                        Lexeme::Eof => return Err(ReadError::OpenList(pos)),
                        _ => items.push(self.read_form()?),
                    }
                }
            }
            Lexeme::RParen => unreachable!("stray ')' is skipped by read_all"),
            Lexeme::Int(n) => {
                self.advance();
                Ok(Form::Literal(pos, Literal::Int(n)))
            }
            Lexeme::Str(s) => {
                self.advance();
                Ok(Form::Literal(pos, Literal::Str(s)))
            }
            Lexeme::Ident(name) => {
                self.advance();
                Ok(Form::Identifier(pos, name))
            }
            Lexeme::Eof => unreachable!("read_form called at Eof"),
        }
    }
}

/// Read every form out of `source`. `source_name` is recorded on every
/// position for diagnostics.
pub fn read_forms(source: &str, source_name: &str) -> Result<Vec<Form>, ReadError> {
    let name: Rc<str> = Rc::from(source_name);
    let tokens = Lexer::new(source, name).tokenize()?;
    FormReader { tokens, pos: 0 }.read_all()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_flat_ints() {
        let forms = read_forms("1 2 3", "<test>").unwrap();
        assert_eq!(forms.len(), 3);
    }

    #[test]
    fn reads_nested_list() {
        let forms = read_forms("(+ 1 (- 2 3))", "<test>").unwrap();
        assert_eq!(forms.len(), 1);
        match &forms[0] {
            Form::List(_, items) => assert_eq!(items.len(), 3),
            _ => panic!("expected a list"),
        }
    }

    #[test]
    fn negative_number_vs_identifier() {
        let forms = read_forms("-5 -foo", "<test>").unwrap();
        assert!(matches!(forms[0], Form::Literal(_, Literal::Int(-5))));
        assert!(matches!(&forms[1], Form::Identifier(_, name) if name == "-foo"));
    }

    #[test]
    fn unterminated_list_errors() {
        let err = read_forms("(+ 1 2", "<test>").unwrap_err();
        assert!(matches!(err, ReadError::OpenList(_)));
    }

    #[test]
    fn unterminated_string_errors() {
        let err = read_forms("\"hello", "<test>").unwrap_err();
        assert!(matches!(err, ReadError::OpenString(_)));
    }

    #[test]
    fn string_has_no_escape_processing() {
        let forms = read_forms("\"a\\nb\"", "<test>").unwrap();
        match &forms[0] {
            Form::Literal(_, Literal::Str(s)) => assert_eq!(s, "a\\nb"),
            _ => panic!("expected a string literal"),
        }
    }
}

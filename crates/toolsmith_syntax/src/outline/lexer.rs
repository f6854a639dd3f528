//! Tokenizer for the outline front end.
//!
//! Whitespace and `//` comments are dropped. Documentation lines (`# ...`)
//! are kept as [`TokenKind::Doc`] tokens so the parser can attach them to the
//! following member.

use crate::error::ParseError;
use crate::id::DocumentId;
use crate::span::{LineIndex, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Ident,
    Int,
    Float,
    Str,
    Template,
    Doc,
    Punct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) span: Span,
}

/// Multi-character punctuators, longest first. `>>` is never merged so that
/// nested type parameters close one `>` at a time.
const PUNCTUATORS: &[&str] = &[
    "...", "..<", "===", "!==", "=>", "==", "!=", "<=", ">=", "&&", "||", "{|", "|}",
];

pub(crate) fn tokenize(
    document: DocumentId,
    text: &str,
    line_index: &LineIndex,
) -> Result<Vec<Token>, ParseError> {
    let mut lexer = Lexer {
        document,
        text,
        line_index,
        pos: 0,
        tokens: Vec::new(),
    };
    lexer.run()?;
    Ok(lexer.tokens)
}

struct Lexer<'a> {
    document: DocumentId,
    text: &'a str,
    line_index: &'a LineIndex,
    pos: usize,
    tokens: Vec<Token>,
}

impl Lexer<'_> {
    fn run(&mut self) -> Result<(), ParseError> {
        while let Some(c) = self.peek() {
            let start = self.pos;
            match c {
                c if c.is_whitespace() => {
                    self.bump();
                }
                '/' if self.peek_nth(1) == Some('/') => self.eat_while(|c| c != '\n'),
                '#' => {
                    self.eat_while(|c| c != '\n');
                    self.push(TokenKind::Doc, start);
                }
                '"' => self.string(start)?,
                '`' => self.template(start)?,
                '\'' => {
                    self.bump();
                    self.identifier_tail();
                    self.push(TokenKind::Ident, start);
                }
                c if c.is_ascii_digit() => self.number(start),
                c if is_ident_start(c) => {
                    self.identifier_tail();
                    self.push(TokenKind::Ident, start);
                }
                _ => self.punct(start),
            }
        }
        Ok(())
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.text[self.pos..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        self.tokens.push(Token {
            kind,
            span: Span::new(start, self.pos),
        });
    }

    fn unterminated(&self, start: usize, what: &'static str) -> ParseError {
        ParseError::Unterminated {
            location: self
                .line_index
                .location(self.document, self.text, Span::new(start, self.pos)),
            what,
        }
    }

    fn identifier_tail(&mut self) {
        loop {
            match self.peek() {
                Some('\\') => {
                    self.bump();
                    self.bump();
                }
                Some(c) if is_ident_continue(c) => {
                    self.bump();
                }
                _ => break,
            }
        }
    }

    fn number(&mut self, start: usize) {
        let mut kind = TokenKind::Int;
        if self.peek() == Some('0') && matches!(self.peek_nth(1), Some('x' | 'X')) {
            self.bump();
            self.bump();
            self.eat_while(|c| c.is_ascii_hexdigit());
            self.push(kind, start);
            return;
        }
        self.eat_while(|c| c.is_ascii_digit());
        if self.peek() == Some('.') && self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
            kind = TokenKind::Float;
            self.bump();
            self.eat_while(|c| c.is_ascii_digit());
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let signed = matches!(self.peek_nth(1), Some('+' | '-'));
            let digit_at = if signed { 2 } else { 1 };
            if self.peek_nth(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                kind = TokenKind::Float;
                for _ in 0..digit_at {
                    self.bump();
                }
                self.eat_while(|c| c.is_ascii_digit());
            }
        }
        if matches!(self.peek(), Some('f' | 'F' | 'd' | 'D'))
            && !self.peek_nth(1).is_some_and(is_ident_continue)
        {
            kind = TokenKind::Float;
            self.bump();
        }
        self.push(kind, start);
    }

    fn string(&mut self, start: usize) -> Result<(), ParseError> {
        self.bump();
        loop {
            match self.bump() {
                None | Some('\n') => return Err(self.unterminated(start, "string literal")),
                Some('\\') => {
                    self.bump();
                }
                Some('"') => break,
                Some(_) => {}
            }
        }
        self.push(TokenKind::Str, start);
        Ok(())
    }

    fn template(&mut self, start: usize) -> Result<(), ParseError> {
        self.bump();
        loop {
            match self.bump() {
                None => return Err(self.unterminated(start, "template")),
                Some('\\') => {
                    self.bump();
                }
                Some('`') => break,
                Some(_) => {}
            }
        }
        self.push(TokenKind::Template, start);
        Ok(())
    }

    fn punct(&mut self, start: usize) {
        let rest = &self.text[self.pos..];
        match PUNCTUATORS.iter().find(|p| rest.starts_with(**p)) {
            Some(p) => self.pos += p.len(),
            None => {
                self.bump();
            }
        }
        self.push(TokenKind::Punct, start);
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// Resolves the escapes of a string literal token, quotes included.
pub(crate) fn unescape_string(literal: &str) -> String {
    let inner = literal
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(literal);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('u') => {
                let code: String = chars
                    .by_ref()
                    .skip_while(|c| *c == '{')
                    .take_while(|c| *c != '}')
                    .collect();
                if let Some(decoded) = u32::from_str_radix(&code, 16).ok().and_then(char::from_u32) {
                    out.push(decoded);
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Strips the quoting and escapes of an identifier token (`'type`, `a\-b`).
pub(crate) fn identifier_text(token: &str) -> String {
    let token = token.strip_prefix('\'').unwrap_or(token);
    let mut out = String::with_capacity(token.len());
    let mut chars = token.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}

//! Recursive-descent parser producing the outline of one source unit.
//!
//! Only module-level structure and class method signatures are parsed.
//! Function bodies, initializer expressions and default values are skipped by
//! balanced-delimiter scanning and kept as spans.

use super::lexer::{Token, TokenKind, identifier_text, unescape_string};
use crate::error::ParseError;
use crate::id::{DocumentId, NodeId};
use crate::span::{LineIndex, Location, Span};
use crate::syntax::{
    Annotation, ClassDef, Documentation, FunctionDef, ImportDecl, MappingConstructor, MappingField,
    Member, ModuleVarDecl, Param, QualifiedName, TypeDef,
};
use crate::types::{ModuleRef, RecordField, TypeArena, TypeId, TypeKind};
use hashbrown::HashMap;
use indexmap::IndexMap;
use serde_json::Value;

/// Words that may precede a module-level member without changing its kind.
const QUALIFIERS: &[&str] = &[
    "public",
    "private",
    "final",
    "configurable",
    "isolated",
    "transactional",
    "client",
    "distinct",
];

/// Words that may precede a class member.
const METHOD_QUALIFIERS: &[&str] = &[
    "public",
    "private",
    "final",
    "isolated",
    "transactional",
    "remote",
    "resource",
];

/// Type names declared by the documents of one module.
#[derive(Debug, Default)]
pub(crate) struct ModuleScope {
    names: HashMap<String, TypeId>,
}

impl ModuleScope {
    fn declare(&mut self, types: &mut TypeArena, token: &str) {
        let name = identifier_text(token);
        if self.names.contains_key(&name) {
            tracing::debug!(name = %name, "duplicate module-level type name");
            return;
        }
        let id = types.declare(name.clone(), None);
        self.names.insert(name, id);
    }
}

/// State shared by every document of a package.
#[derive(Debug, Default)]
pub(crate) struct PackageState {
    pub(crate) types: TypeArena,
    externals: HashMap<(String, String, String), TypeId>,
    next_node: u32,
}

impl PackageState {
    fn next_node(&mut self) -> NodeId {
        let id = NodeId::new(self.next_node);
        self.next_node += 1;
        id
    }

    /// Returns the one reference allocated for `name` of an imported module.
    fn external(&mut self, module: ModuleRef, name: &str) -> TypeId {
        let key = (module.org.clone(), module.name.clone(), name.to_string());
        if let Some(id) = self.externals.get(&key) {
            return *id;
        }
        let id = self.types.declare(name, Some(module));
        self.externals.insert(key, id);
        id
    }
}

/// Declares every module-level `type`, `enum`, `class` and `const` name of a
/// document, so that types can refer to each other in any order and across
/// documents of the same module.
pub(crate) fn declare_names(
    text: &str,
    tokens: &[Token],
    scope: &mut ModuleScope,
    types: &mut TypeArena,
) {
    let slice = |index: usize| tokens.get(index).map(|token| token.span.slice(text));
    let ident = |index: usize| {
        tokens
            .get(index)
            .filter(|token| token.kind == TokenKind::Ident)
            .map(|token| token.span.slice(text))
    };

    let mut depth = 0usize;
    for (index, token) in tokens.iter().enumerate() {
        let word = token.span.slice(text);
        if token.kind == TokenKind::Punct {
            match word {
                "(" | "[" | "{" | "{|" => depth += 1,
                ")" | "]" | "}" | "|}" => depth = depth.saturating_sub(1),
                _ => {}
            }
            continue;
        }
        if depth != 0 || token.kind != TokenKind::Ident {
            continue;
        }
        match word {
            "type" | "class" => {
                if let Some(name) = ident(index + 1) {
                    scope.declare(types, name);
                }
            }
            "enum" => {
                if let Some(name) = ident(index + 1) {
                    scope.declare(types, name);
                }
                if slice(index + 2) != Some("{") {
                    continue;
                }
                let mut expect_member = true;
                let mut inner = 0usize;
                for member in &tokens[index + 3..] {
                    match (member.kind, member.span.slice(text)) {
                        (TokenKind::Punct, "(" | "[" | "{") => inner += 1,
                        (TokenKind::Punct, ")" | "]" | "}") if inner == 0 => break,
                        (TokenKind::Punct, ")" | "]" | "}") => inner -= 1,
                        (TokenKind::Punct, ",") if inner == 0 => expect_member = true,
                        (TokenKind::Ident, name) if inner == 0 && expect_member => {
                            scope.declare(types, name);
                            expect_member = false;
                        }
                        _ => {}
                    }
                }
            }
            "const" => {
                let end = tokens[index + 1..]
                    .iter()
                    .position(|token| matches!(token.span.slice(text), "=" | ";"))
                    .map(|offset| index + 1 + offset);
                if let Some(end) = end.filter(|end| slice(*end) == Some("=") && *end > index + 1) {
                    if let Some(name) = ident(end - 1) {
                        scope.declare(types, name);
                    }
                }
            }
            _ => {}
        }
    }
}

/// The parsed outline of one document.
pub(crate) struct ParsedUnit {
    pub(crate) imports: Vec<ImportDecl>,
    pub(crate) members: Vec<Member>,
}

pub(crate) struct UnitParser<'a> {
    document: DocumentId,
    text: &'a str,
    line_index: &'a LineIndex,
    tokens: &'a [Token],
    pos: usize,
    last_end: usize,
    scope: &'a ModuleScope,
    state: &'a mut PackageState,
    imports: Vec<ImportDecl>,
}

impl<'a> UnitParser<'a> {
    pub(crate) fn new(
        document: DocumentId,
        text: &'a str,
        line_index: &'a LineIndex,
        tokens: &'a [Token],
        scope: &'a ModuleScope,
        state: &'a mut PackageState,
    ) -> Self {
        Self {
            document,
            text,
            line_index,
            tokens,
            pos: 0,
            last_end: 0,
            scope,
            state,
            imports: Vec::new(),
        }
    }

    pub(crate) fn parse(mut self) -> Result<ParsedUnit, ParseError> {
        let mut members = Vec::new();
        while !self.at_end() {
            let docs = self.doc_lines();
            if self.at_end() {
                break;
            }
            if self.at_ident("import") {
                self.import()?;
                continue;
            }
            if let Some(member) = self.member(docs)? {
                members.push(member);
            }
        }
        Ok(ParsedUnit {
            imports: self.imports,
            members,
        })
    }

    // ─── Token cursor ───

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn peek_nth(&self, n: usize) -> Option<Token> {
        self.tokens.get(self.pos + n).copied()
    }

    fn kind_at(&self, n: usize) -> Option<TokenKind> {
        self.peek_nth(n).map(|token| token.kind)
    }

    fn text_of(&self, token: Token) -> &'a str {
        token.span.slice(self.text)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn is_punct_at(&self, n: usize, punct: &str) -> bool {
        self.peek_nth(n)
            .is_some_and(|token| token.kind == TokenKind::Punct && self.text_of(token) == punct)
    }

    fn is_ident_at(&self, n: usize, word: &str) -> bool {
        self.peek_nth(n)
            .is_some_and(|token| token.kind == TokenKind::Ident && self.text_of(token) == word)
    }

    fn at_punct(&self, punct: &str) -> bool {
        self.is_punct_at(0, punct)
    }

    fn at_ident(&self, word: &str) -> bool {
        self.is_ident_at(0, word)
    }

    fn current_start(&self) -> usize {
        self.peek().map_or(self.text.len(), |token| token.span.start)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.peek()?;
        self.pos += 1;
        self.last_end = token.span.end;
        Some(token)
    }

    fn eat_punct(&mut self, punct: &str) -> bool {
        let matched = self.at_punct(punct);
        if matched {
            self.bump();
        }
        matched
    }

    fn eat_ident(&mut self, word: &str) -> bool {
        let matched = self.at_ident(word);
        if matched {
            self.bump();
        }
        matched
    }

    fn expect_punct(&mut self, punct: &str) -> Result<Token, ParseError> {
        if self.at_punct(punct) {
            if let Some(token) = self.bump() {
                return Ok(token);
            }
        }
        Err(self.expected(format!("`{punct}`")))
    }

    fn expect_name(&mut self) -> Result<(String, Span), ParseError> {
        match self.peek() {
            Some(token) if token.kind == TokenKind::Ident => {
                self.bump();
                Ok((identifier_text(self.text_of(token)), token.span))
            }
            _ => Err(self.expected("identifier")),
        }
    }

    fn location(&self, span: Span) -> Location {
        self.line_index.location(self.document, self.text, span)
    }

    fn expected(&self, expected: impl Into<String>) -> ParseError {
        match self.peek() {
            Some(token) => {
                ParseError::unexpected(self.location(token.span), expected, self.text_of(token))
            }
            None => ParseError::UnexpectedEof {
                document: self.document,
                expected: expected.into(),
            },
        }
    }

    fn is_open(&self, token: Token) -> bool {
        token.kind == TokenKind::Punct && matches!(self.text_of(token), "(" | "[" | "{" | "{|")
    }

    fn is_close(&self, token: Token) -> bool {
        token.kind == TokenKind::Punct && matches!(self.text_of(token), ")" | "]" | "}" | "|}")
    }

    /// Skips a delimited group starting at the current opener.
    fn skip_balanced(&mut self) -> Result<(), ParseError> {
        let Some(open) = self.bump() else {
            return Err(self.expected("`{`"));
        };
        let mut depth = 1usize;
        while depth > 0 {
            let Some(token) = self.bump() else {
                return Err(ParseError::Unterminated {
                    location: self.location(open.span),
                    what: "block",
                });
            };
            if self.is_open(token) {
                depth += 1;
            } else if self.is_close(token) {
                depth -= 1;
            }
        }
        Ok(())
    }

    /// Skips `<...>` type parameters.
    fn skip_angle(&mut self) -> Result<(), ParseError> {
        let open = self.expect_punct("<")?;
        let mut depth = 1usize;
        while depth > 0 {
            let Some(token) = self.bump() else {
                return Err(ParseError::Unterminated {
                    location: self.location(open.span),
                    what: "type parameter",
                });
            };
            match (token.kind, self.text_of(token)) {
                (TokenKind::Punct, "<") => depth += 1,
                (TokenKind::Punct, ">") => depth -= 1,
                _ => {}
            }
        }
        Ok(())
    }

    /// Skips an expression up to (not including) one of `stops` or an
    /// unmatched closer, and returns the span it covered.
    fn skip_expression(&mut self, stops: &[&str]) -> Result<Span, ParseError> {
        let start = self.current_start();
        let mut end = start;
        while let Some(token) = self.peek() {
            if token.kind == TokenKind::Punct {
                if stops.contains(&self.text_of(token)) || self.is_close(token) {
                    break;
                }
                if self.is_open(token) {
                    self.skip_balanced()?;
                    end = self.last_end;
                    continue;
                }
            }
            self.bump();
            end = token.span.end;
        }
        Ok(Span::new(start, end))
    }

    fn doc_lines(&mut self) -> Vec<&'a str> {
        let mut lines = Vec::new();
        while let Some(token) = self.peek().filter(|token| token.kind == TokenKind::Doc) {
            self.bump();
            let line = self.text_of(token);
            lines.push(line.strip_prefix('#').unwrap_or(line));
        }
        lines
    }

    // ─── Members ───

    fn import(&mut self) -> Result<(), ParseError> {
        let start = self.current_start();
        self.bump();
        let (first, _) = self.expect_name()?;
        let (org, mut module_name) = if self.eat_punct("/") {
            (Some(first), vec![self.expect_name()?.0])
        } else {
            (None, vec![first])
        };
        while self.eat_punct(".") {
            module_name.push(self.expect_name()?.0);
        }
        let prefix = if self.eat_ident("as") {
            Some(self.expect_name()?.0)
        } else {
            None
        };
        self.expect_punct(";")?;
        self.imports.push(ImportDecl {
            org,
            module_name,
            prefix,
            span: Span::new(start, self.last_end),
        });
        Ok(())
    }

    fn member(&mut self, docs: Vec<&'a str>) -> Result<Option<Member>, ParseError> {
        if self.eat_punct(";") {
            return Ok(None);
        }
        let start = self.current_start();
        let annotations = self.annotations()?;
        let qualifier_start = self.current_start();
        let qualifiers = self.qualifiers();
        let Some(token) = self.peek() else {
            return Err(self.expected("module member"));
        };
        let keyword = if token.kind == TokenKind::Ident {
            self.text_of(token)
        } else {
            ""
        };

        match keyword {
            "function" if self.kind_at(1) == Some(TokenKind::Ident) => self
                .function(start, docs, annotations)
                .map(|function| Some(Member::Function(function))),
            "type" => self.type_definition(start).map(Some),
            "enum" => self.enum_definition(start).map(Some),
            "const" => self.constant(start).map(Some),
            "class" => self.class(start).map(Some),
            "service" | "listener" | "annotation" | "xmlns" => self.skip_member(start).map(Some),
            _ => {
                let checkpoint = (self.pos, self.last_end);
                match self.module_var(qualifier_start, qualifiers) {
                    Ok(decl) => Ok(Some(Member::ModuleVar(decl))),
                    Err(err) => {
                        tracing::trace!(document = %self.document, error = %err, "member kept as opaque span");
                        (self.pos, self.last_end) = checkpoint;
                        self.skip_member(start).map(Some)
                    }
                }
            }
        }
    }

    fn qualifiers(&mut self) -> Vec<String> {
        let mut qualifiers = Vec::new();
        while let Some(token) = self.peek().filter(|token| token.kind == TokenKind::Ident) {
            let word = self.text_of(token);
            let class_follows = self.peek_nth(1).is_some_and(|next| {
                matches!(
                    self.text_of(next),
                    "class" | "client" | "isolated" | "distinct" | "readonly" | "service"
                )
            });
            let qualifier = QUALIFIERS.contains(&word)
                || (word == "readonly" && class_follows)
                || (word == "service" && self.is_ident_at(1, "class"));
            if !qualifier {
                break;
            }
            self.bump();
            qualifiers.push(word.to_string());
        }
        qualifiers
    }

    /// Skips a member this outline does not model.
    fn skip_member(&mut self, start: usize) -> Result<Member, ParseError> {
        if self.peek().is_none_or(|token| self.is_close(token)) {
            return Err(self.expected("module member"));
        }
        while let Some(token) = self.peek() {
            if token.kind == TokenKind::Punct && self.text_of(token) == ";" {
                self.bump();
                break;
            }
            if self.is_open(token) {
                let block = matches!(self.text_of(token), "{" | "{|");
                self.skip_balanced()?;
                if block {
                    match self.peek() {
                        Some(next) if next.kind == TokenKind::Punct && self.text_of(next) == ";" => {
                            self.bump();
                            break;
                        }
                        Some(next) if next.kind == TokenKind::Punct && self.text_of(next) != "@" => {}
                        _ => break,
                    }
                }
                continue;
            }
            if self.is_close(token) {
                break;
            }
            self.bump();
        }
        Ok(Member::Other(Span::new(start, self.last_end)))
    }

    fn function(
        &mut self,
        start: usize,
        docs: Vec<&'a str>,
        annotations: Vec<Annotation>,
    ) -> Result<FunctionDef, ParseError> {
        self.bump();
        let (name, name_span) = self.expect_name()?;
        self.expect_punct("(")?;
        let mut params = Vec::new();
        while !self.at_punct(")") {
            params.push(self.param()?);
            if !self.eat_punct(",") {
                break;
            }
        }
        self.expect_punct(")")?;
        let return_type = if self.eat_ident("returns") {
            self.annotations()?;
            Some(self.type_descriptor()?)
        } else {
            None
        };
        self.function_body()?;

        let documentation = (!docs.is_empty()).then(|| Documentation::from_lines(docs));
        Ok(FunctionDef {
            id: self.state.next_node(),
            span: Span::new(start, self.last_end),
            name,
            name_span,
            annotations,
            params,
            return_type,
            documentation,
        })
    }

    fn function_body(&mut self) -> Result<(), ParseError> {
        if self.at_punct("{") {
            return self.skip_balanced();
        }
        if self.eat_punct("=>") {
            self.skip_expression(&[";"])?;
            return self.expect_punct(";").map(drop);
        }
        if self.eat_punct("=") {
            self.annotations()?;
            if !self.eat_ident("external") {
                return Err(self.expected("`external`"));
            }
            return self.expect_punct(";").map(drop);
        }
        Err(self.expected("function body"))
    }

    fn param(&mut self) -> Result<Param, ParseError> {
        self.annotations()?;
        self.eat_punct("*");
        let mut ty = self.type_descriptor()?;
        if self.eat_punct("...") {
            ty = self.alloc(TypeKind::Array {
                element: ty,
                length: None,
            });
        }
        let (name, name_span) = self.expect_name()?;
        let has_default = self.eat_punct("=");
        if has_default {
            self.skip_expression(&[","])?;
        }
        Ok(Param {
            name,
            name_span,
            ty,
            has_default,
        })
    }

    fn annotations(&mut self) -> Result<Vec<Annotation>, ParseError> {
        let mut annotations = Vec::new();
        while self.at_punct("@") {
            let start = self.current_start();
            self.bump();
            let reference = self.qualified_name()?;
            let body = if self.at_punct("{") {
                Some(self.mapping_constructor()?)
            } else {
                None
            };
            annotations.push(Annotation {
                id: self.state.next_node(),
                span: Span::new(start, self.last_end),
                reference,
                body,
            });
        }
        Ok(annotations)
    }

    fn qualified_name(&mut self) -> Result<QualifiedName, ParseError> {
        let (first, first_span) = self.expect_name()?;
        if self.at_punct(":") && self.kind_at(1) == Some(TokenKind::Ident) {
            self.bump();
            let (identifier, span) = self.expect_name()?;
            return Ok(QualifiedName {
                prefix: Some(first),
                identifier,
                span: first_span.to(span),
            });
        }
        Ok(QualifiedName {
            prefix: None,
            identifier: first,
            span: first_span,
        })
    }

    fn mapping_constructor(&mut self) -> Result<MappingConstructor, ParseError> {
        let open = self.expect_punct("{")?;
        let mut fields = Vec::new();
        while !self.at_punct("}") {
            let start = self.current_start();
            if self.eat_punct("...") {
                self.skip_expression(&[","])?;
                fields.push(MappingField::Spread {
                    span: Span::new(start, self.last_end),
                });
            } else {
                if self.at_ident("readonly")
                    && matches!(self.kind_at(1), Some(TokenKind::Ident | TokenKind::Str))
                {
                    self.bump();
                }
                let name = match self.peek() {
                    Some(token) if token.kind == TokenKind::Ident => {
                        self.bump();
                        identifier_text(self.text_of(token))
                    }
                    Some(token) if token.kind == TokenKind::Str => {
                        self.bump();
                        unescape_string(self.text_of(token))
                    }
                    Some(token) if self.text_of(token) == "[" => {
                        self.skip_balanced()?;
                        self.text[token.span.start..self.last_end].to_string()
                    }
                    _ => return Err(self.expected("mapping field")),
                };
                let value = if self.eat_punct(":") {
                    let value = self.skip_expression(&[","])?;
                    if value.is_empty() {
                        return Err(self.expected("field value"));
                    }
                    Some(value)
                } else {
                    None
                };
                fields.push(MappingField::Specific {
                    name,
                    value,
                    span: Span::new(start, self.last_end),
                });
            }
            if !self.eat_punct(",") {
                break;
            }
        }
        let close = self.expect_punct("}")?;
        Ok(MappingConstructor {
            span: open.span.to(close.span),
            fields,
        })
    }

    fn module_var(
        &mut self,
        start: usize,
        qualifiers: Vec<String>,
    ) -> Result<ModuleVarDecl, ParseError> {
        let type_start = self.current_start();
        let type_name = self.plain_type_name();
        let ty = self.type_descriptor()?;
        let type_span = Span::new(type_start, self.last_end);
        let (name, name_span) = self.expect_name()?;
        let initializer = if self.eat_punct("=") {
            let span = self.skip_expression(&[";"])?;
            if span.is_empty() {
                return Err(self.expected("initializer expression"));
            }
            Some(span)
        } else {
            None
        };
        self.expect_punct(";")?;
        Ok(ModuleVarDecl {
            id: self.state.next_node(),
            span: Span::new(start, self.last_end),
            qualifiers,
            type_name,
            type_span,
            ty,
            name,
            name_span,
            initializer,
        })
    }

    /// Returns the type name as written when the type descriptor is a single
    /// (possibly qualified) identifier directly followed by the variable name.
    fn plain_type_name(&self) -> Option<QualifiedName> {
        let first = self
            .peek()
            .filter(|token| token.kind == TokenKind::Ident && self.text_of(*token) != "var")?;
        if self.is_punct_at(1, ":") {
            let second = self.peek_nth(2).filter(|token| token.kind == TokenKind::Ident)?;
            self.peek_nth(3).filter(|token| token.kind == TokenKind::Ident)?;
            return Some(QualifiedName {
                prefix: Some(identifier_text(self.text_of(first))),
                identifier: identifier_text(self.text_of(second)),
                span: first.span.to(second.span),
            });
        }
        self.peek_nth(1).filter(|token| token.kind == TokenKind::Ident)?;
        Some(QualifiedName {
            prefix: None,
            identifier: identifier_text(self.text_of(first)),
            span: first.span,
        })
    }

    fn type_definition(&mut self, start: usize) -> Result<Member, ParseError> {
        self.bump();
        let (name, name_span) = self.expect_name()?;
        let body = self.type_descriptor()?;
        self.expect_punct(";")?;
        let ty = self.bind_declared(&name, body);
        Ok(Member::TypeDef(TypeDef {
            span: Span::new(start, self.last_end),
            name,
            name_span,
            ty,
        }))
    }

    fn enum_definition(&mut self, start: usize) -> Result<Member, ParseError> {
        self.bump();
        let (name, name_span) = self.expect_name()?;
        self.expect_punct("{")?;
        let mut members = Vec::new();
        loop {
            self.doc_lines();
            self.annotations()?;
            if self.at_punct("}") {
                break;
            }
            let (member, _) = self.expect_name()?;
            let value = if self.eat_punct("=") {
                match self.peek() {
                    Some(token) if token.kind == TokenKind::Str && self.is_value_end(1) => {
                        self.bump();
                        unescape_string(self.text_of(token))
                    }
                    _ => {
                        self.skip_expression(&[","])?;
                        member.clone()
                    }
                }
            } else {
                member.clone()
            };
            let singleton = self.alloc(TypeKind::Singleton(Value::String(value)));
            members.push(self.bind_declared(&member, singleton));
            if !self.eat_punct(",") {
                break;
            }
        }
        self.expect_punct("}")?;
        self.eat_punct(";");
        let union = self.alloc(TypeKind::Union(members));
        let ty = self.bind_declared(&name, union);
        Ok(Member::TypeDef(TypeDef {
            span: Span::new(start, self.last_end),
            name,
            name_span,
            ty,
        }))
    }

    fn constant(&mut self, start: usize) -> Result<Member, ParseError> {
        self.bump();
        if !(self.kind_at(0) == Some(TokenKind::Ident) && self.is_punct_at(1, "=")) {
            self.type_descriptor()?;
        }
        let (name, _) = self.expect_name()?;
        self.expect_punct("=")?;
        let value = self.literal_value();
        self.skip_expression(&[";"])?;
        self.expect_punct(";")?;
        if let Some(value) = value {
            let singleton = self.alloc(TypeKind::Singleton(value));
            self.bind_declared(&name, singleton);
        }
        Ok(Member::Other(Span::new(start, self.last_end)))
    }

    fn class(&mut self, start: usize) -> Result<Member, ParseError> {
        self.bump();
        let (name, name_span) = self.expect_name()?;
        self.expect_punct("{")?;
        let mut methods = Vec::new();
        loop {
            let docs = self.doc_lines();
            if self.eat_punct("}") {
                break;
            }
            if self.at_end() {
                return Err(self.expected("`}`"));
            }
            if self.eat_punct(";") {
                continue;
            }
            if let Some(method) = self.class_member(docs)? {
                methods.push(method);
            }
        }
        let object = self.alloc(TypeKind::Object {
            name: Some(name.clone()),
        });
        self.bind_declared(&name, object);
        Ok(Member::Class(ClassDef {
            span: Span::new(start, self.last_end),
            name,
            name_span,
            methods,
        }))
    }

    /// Parses one class member, returning it when it is a method.
    fn class_member(&mut self, docs: Vec<&'a str>) -> Result<Option<FunctionDef>, ParseError> {
        let start = self.current_start();
        let annotations = self.annotations()?;
        let mut resource = false;
        while let Some(token) = self.peek().filter(|token| token.kind == TokenKind::Ident) {
            let word = self.text_of(token);
            if !METHOD_QUALIFIERS.contains(&word) {
                break;
            }
            resource |= word == "resource";
            self.bump();
        }

        if !resource && self.at_ident("function") && self.kind_at(1) == Some(TokenKind::Ident) {
            let checkpoint = (self.pos, self.last_end);
            match self.function(start, docs, annotations) {
                Ok(method) => return Ok(Some(method)),
                Err(err) => {
                    tracing::trace!(document = %self.document, error = %err, "method kept as opaque span");
                    (self.pos, self.last_end) = checkpoint;
                }
            }
        }
        self.skip_member(start)?;
        Ok(None)
    }

    /// Returns the literal value at the cursor when it is the whole expression.
    fn literal_value(&self) -> Option<Value> {
        let token = self.peek()?;
        let negative = token.kind == TokenKind::Punct && self.text_of(token) == "-";
        let (literal, next) = if negative {
            (self.peek_nth(1)?, 2)
        } else {
            (token, 1)
        };
        if !self.is_value_end(next) {
            return None;
        }
        let text = self.text_of(literal);
        match literal.kind {
            TokenKind::Str if !negative => Some(Value::String(unescape_string(text))),
            TokenKind::Int | TokenKind::Float => numeric_value(text, literal.kind, negative),
            TokenKind::Ident if !negative && matches!(text, "true" | "false") => {
                Some(Value::Bool(text == "true"))
            }
            _ => None,
        }
    }

    fn is_value_end(&self, n: usize) -> bool {
        self.peek_nth(n).is_none_or(|token| {
            token.kind == TokenKind::Punct && matches!(self.text_of(token), ";" | "," | "}")
        })
    }

    fn bind_declared(&mut self, name: &str, body: TypeId) -> TypeId {
        match self.scope.names.get(name) {
            Some(&declared) => {
                self.state.types.resolve(declared, body);
                declared
            }
            None => body,
        }
    }

    // ─── Type descriptors ───

    fn alloc(&mut self, kind: TypeKind) -> TypeId {
        self.state.types.alloc(kind)
    }

    fn type_descriptor(&mut self) -> Result<TypeId, ParseError> {
        let first = self.intersection_type()?;
        if !self.at_punct("|") {
            return Ok(first);
        }
        let mut members = Vec::new();
        self.push_union_member(&mut members, first);
        while self.eat_punct("|") {
            let next = self.intersection_type()?;
            self.push_union_member(&mut members, next);
        }
        Ok(self.alloc(TypeKind::Union(members)))
    }

    fn push_union_member(&self, members: &mut Vec<TypeId>, ty: TypeId) {
        match self.state.types.get(ty) {
            TypeKind::Union(inner) => members.extend(inner.iter().copied()),
            _ => members.push(ty),
        }
    }

    /// `A & readonly` keeps the first operand that is not `readonly`.
    fn intersection_type(&mut self) -> Result<TypeId, ParseError> {
        let mut chosen = None;
        let mut readonly = None;
        loop {
            let is_readonly = self.at_ident("readonly");
            let ty = self.postfix_type()?;
            if is_readonly {
                readonly.get_or_insert(ty);
            } else {
                chosen.get_or_insert(ty);
            }
            if !self.eat_punct("&") {
                break;
            }
        }
        match chosen.or(readonly) {
            Some(ty) => Ok(ty),
            None => Err(self.expected("type descriptor")),
        }
    }

    fn postfix_type(&mut self) -> Result<TypeId, ParseError> {
        let mut ty = self.primary_type()?;
        loop {
            if self.eat_punct("[") {
                let length = match self.peek() {
                    Some(token) if token.kind == TokenKind::Int => {
                        self.bump();
                        self.text_of(token).parse::<usize>().ok()
                    }
                    Some(token) if token.kind == TokenKind::Ident || self.text_of(token) == "*" => {
                        self.bump();
                        None
                    }
                    _ => None,
                };
                self.expect_punct("]")?;
                ty = self.alloc(TypeKind::Array {
                    element: ty,
                    length,
                });
            } else if self.eat_punct("?") {
                let nil = self.alloc(TypeKind::Nil);
                ty = self.alloc(TypeKind::Union(vec![ty, nil]));
            } else {
                return Ok(ty);
            }
        }
    }

    fn primary_type(&mut self) -> Result<TypeId, ParseError> {
        let Some(token) = self.peek() else {
            return Err(self.expected("type descriptor"));
        };
        let text = self.text_of(token);
        match token.kind {
            TokenKind::Str => {
                self.bump();
                Ok(self.alloc(TypeKind::Singleton(Value::String(unescape_string(text)))))
            }
            TokenKind::Int | TokenKind::Float => {
                self.bump();
                Ok(self.numeric_singleton(text, token.kind, false))
            }
            TokenKind::Ident => self.named_type(text),
            TokenKind::Punct => match text {
                "(" => {
                    self.bump();
                    if self.eat_punct(")") {
                        return Ok(self.alloc(TypeKind::Nil));
                    }
                    let ty = self.type_descriptor()?;
                    self.expect_punct(")")?;
                    Ok(ty)
                }
                "[" => self.tuple_type(),
                "-" => match self.peek_nth(1) {
                    Some(number) if matches!(number.kind, TokenKind::Int | TokenKind::Float) => {
                        self.bump();
                        self.bump();
                        Ok(self.numeric_singleton(self.text_of(number), number.kind, true))
                    }
                    _ => Err(self.expected("type descriptor")),
                },
                _ => Err(self.expected("type descriptor")),
            },
            TokenKind::Template | TokenKind::Doc => Err(self.expected("type descriptor")),
        }
    }

    fn numeric_singleton(&mut self, text: &str, kind: TokenKind, negative: bool) -> TypeId {
        let kind = match numeric_value(text, kind, negative) {
            Some(value) => TypeKind::Singleton(value),
            None => TypeKind::Unresolved(text.to_string()),
        };
        self.alloc(kind)
    }

    fn named_type(&mut self, text: &'a str) -> Result<TypeId, ParseError> {
        if self.is_punct_at(1, ":") && self.kind_at(2) == Some(TokenKind::Ident) {
            let name = self.qualified_name()?;
            return Ok(self.resolve_name(&name));
        }
        let simple = match text {
            "boolean" => Some(TypeKind::Boolean),
            "int" => Some(TypeKind::Int),
            "byte" => Some(TypeKind::Byte),
            "float" => Some(TypeKind::Float),
            "decimal" => Some(TypeKind::Decimal),
            "string" => Some(TypeKind::String),
            "json" => Some(TypeKind::Json),
            "anydata" => Some(TypeKind::Anydata),
            "any" | "readonly" | "var" => Some(TypeKind::Any),
            "handle" => Some(TypeKind::Handle),
            "never" => Some(TypeKind::Union(Vec::new())),
            "null" => Some(TypeKind::Nil),
            "true" | "false" => Some(TypeKind::Singleton(Value::Bool(text == "true"))),
            _ => None,
        };
        if let Some(kind) = simple {
            self.bump();
            return Ok(self.alloc(kind));
        }

        match text {
            "record" => self.record_type(),
            "map" => {
                self.bump();
                let element = self.type_parameter()?;
                Ok(self.alloc(TypeKind::Map(element)))
            }
            "table" => {
                self.bump();
                let row = self.type_parameter()?;
                if self.eat_ident("key") {
                    if self.at_punct("(") {
                        self.skip_balanced()?;
                    } else if self.at_punct("<") {
                        self.skip_angle()?;
                    }
                }
                Ok(self.alloc(TypeKind::Table(row)))
            }
            "error" | "xml" => {
                self.bump();
                if self.at_punct("<") {
                    self.skip_angle()?;
                }
                let kind = if text == "xml" {
                    TypeKind::Xml
                } else {
                    TypeKind::Error
                };
                Ok(self.alloc(kind))
            }
            "stream" | "future" | "typedesc" => {
                self.bump();
                if self.at_punct("<") {
                    self.skip_angle()?;
                }
                Ok(self.alloc(TypeKind::Object {
                    name: Some(text.to_string()),
                }))
            }
            "object" => {
                self.bump();
                if self.at_punct("{") {
                    self.skip_balanced()?;
                }
                Ok(self.alloc(TypeKind::Object { name: None }))
            }
            "function" => {
                self.bump();
                if self.at_punct("(") {
                    self.skip_balanced()?;
                    if self.eat_ident("returns") {
                        self.type_descriptor()?;
                    }
                }
                Ok(self.alloc(TypeKind::Function))
            }
            "isolated" | "client" | "service" | "distinct" | "transactional"
                if self.kind_at(1) == Some(TokenKind::Ident) =>
            {
                self.bump();
                self.primary_type()
            }
            _ => {
                let name = self.qualified_name()?;
                Ok(self.resolve_name(&name))
            }
        }
    }

    fn type_parameter(&mut self) -> Result<TypeId, ParseError> {
        self.expect_punct("<")?;
        let ty = self.type_descriptor()?;
        self.expect_punct(">")?;
        Ok(ty)
    }

    fn tuple_type(&mut self) -> Result<TypeId, ParseError> {
        self.expect_punct("[")?;
        let mut members = Vec::new();
        while !self.at_punct("]") {
            let ty = self.type_descriptor()?;
            if self.eat_punct("...") {
                let rest = self.alloc(TypeKind::Array {
                    element: ty,
                    length: None,
                });
                members.push(rest);
            } else {
                members.push(ty);
            }
            if !self.eat_punct(",") {
                break;
            }
        }
        self.expect_punct("]")?;
        Ok(self.alloc(TypeKind::Tuple(members)))
    }

    fn record_type(&mut self) -> Result<TypeId, ParseError> {
        self.bump();
        let closed = self.eat_punct("{|");
        if !closed {
            self.expect_punct("{")?;
        }
        let close = if closed { "|}" } else { "}" };

        let mut fields = IndexMap::new();
        let mut rest = None;
        loop {
            self.doc_lines();
            if self.eat_punct(close) {
                break;
            }
            if self.at_end() {
                return Err(self.expected(format!("`{close}`")));
            }
            self.annotations()?;
            if self.eat_punct("*") {
                let included = self.type_descriptor()?;
                self.expect_punct(";")?;
                self.include_fields(included, &mut fields);
                continue;
            }
            let readonly_field = self.at_ident("readonly")
                && self.kind_at(1) == Some(TokenKind::Ident)
                && !self
                    .peek_nth(2)
                    .is_some_and(|token| matches!(self.text_of(token), ";" | "?" | "="));
            if readonly_field {
                self.bump();
            }
            let ty = self.type_descriptor()?;
            if self.eat_punct("...") {
                self.expect_punct(";")?;
                rest = Some(ty);
                continue;
            }
            let (name, _) = self.expect_name()?;
            let optional = self.eat_punct("?");
            let has_default = self.eat_punct("=");
            if has_default {
                self.skip_expression(&[";"])?;
            }
            self.expect_punct(";")?;
            fields.insert(
                name,
                RecordField {
                    ty,
                    optional,
                    has_default,
                },
            );
        }

        if rest.is_none() && !closed {
            rest = Some(self.alloc(TypeKind::Anydata));
        }
        Ok(self.alloc(TypeKind::Record { fields, rest }))
    }

    /// Copies the fields of an included record type (`*T;`).
    fn include_fields(&self, included: TypeId, fields: &mut IndexMap<String, RecordField>) {
        let target = self.state.types.resolve_references(included);
        match self.state.types.get(target) {
            TypeKind::Record { fields: inner, .. } => {
                for (name, field) in inner {
                    fields.entry(name.clone()).or_insert_with(|| field.clone());
                }
            }
            _ => {
                tracing::debug!(
                    document = %self.document,
                    included = %self.state.types.display_name(included),
                    "included type is not a known record; fields skipped"
                );
            }
        }
    }

    fn resolve_name(&mut self, name: &QualifiedName) -> TypeId {
        let Some(prefix) = &name.prefix else {
            if let Some(&declared) = self.scope.names.get(&name.identifier) {
                return declared;
            }
            tracing::debug!(document = %self.document, name = %name.identifier, "unresolved type name");
            return self.alloc(TypeKind::Unresolved(name.identifier.clone()));
        };

        let import = self
            .imports
            .iter()
            .find(|import| import.effective_prefix() == prefix.as_str());
        if let Some(import) = import {
            let module = ModuleRef::new(import.org.clone().unwrap_or_default(), import.module_path());
            return self.state.external(module, &name.identifier);
        }
        let kind = match prefix.as_str() {
            "int" => TypeKind::Int,
            "string" | "regexp" => TypeKind::String,
            "float" => TypeKind::Float,
            "decimal" => TypeKind::Decimal,
            "boolean" => TypeKind::Boolean,
            "xml" => TypeKind::Xml,
            "error" => TypeKind::Error,
            "value" => TypeKind::Anydata,
            _ => TypeKind::Unresolved(format!("{prefix}:{}", name.identifier)),
        };
        self.alloc(kind)
    }
}

fn numeric_value(text: &str, kind: TokenKind, negative: bool) -> Option<Value> {
    if kind == TokenKind::Int {
        let magnitude = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
            Some(hex) => i64::from_str_radix(hex, 16).ok()?,
            None => text.parse::<i64>().ok()?,
        };
        return Some(Value::from(if negative { -magnitude } else { magnitude }));
    }
    let magnitude = text.trim_end_matches(['f', 'F', 'd', 'D']).parse::<f64>().ok()?;
    serde_json::Number::from_f64(if negative { -magnitude } else { magnitude }).map(Value::Number)
}

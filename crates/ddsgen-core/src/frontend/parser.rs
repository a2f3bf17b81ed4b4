//! Recursive-descent parser over the lexer's token stream.

use super::lexer::{Lexeme, Token, TokenStream};
use crate::annotation::RawAnnotation;
use crate::error::{IdlError, IdlResult};
use crate::tree::{
    ConstDecl, Definition, EnumDecl, Member, ModuleDecl, Origin, PrimitiveKind, ScopedName,
    Specification, StructDecl, TypeSpec, TypedefDecl,
};
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

pub(crate) struct Parser {
    lexemes: Vec<Lexeme>,
    files: Vec<PathBuf>,
    dependencies: BTreeSet<PathBuf>,
    pos: usize,
    /// Integer constants seen so far, usable as string/sequence/array bounds.
    bounds: HashMap<String, u32>,
}

type Declarator = (String, Vec<u32>);

impl Parser {
    pub(crate) fn new(stream: TokenStream) -> Self {
        Self {
            lexemes: stream.lexemes,
            files: stream.files,
            dependencies: stream.dependencies,
            pos: 0,
            bounds: HashMap::new(),
        }
    }

    pub(crate) fn parse_specification(mut self) -> IdlResult<Specification> {
        let mut definitions = Vec::new();
        while !self.at_end() {
            definitions.extend(self.parse_definition()?);
        }
        Ok(Specification {
            definitions,
            dependencies: self.dependencies,
        })
    }

    // ------------------------------------------------------------------
    // Definitions
    // ------------------------------------------------------------------

    fn parse_definition(&mut self) -> IdlResult<Vec<Definition>> {
        let annotations = self.parse_annotations()?;
        let Some(token) = self.peek() else {
            return Err(self.error("expected a definition after annotations"));
        };

        match token {
            Token::Module => self.parse_module(annotations).map(|m| vec![Definition::Module(m)]),
            Token::Struct => self.parse_struct(annotations).map(|s| vec![Definition::Struct(s)]),
            Token::Enum => self.parse_enum(annotations).map(|e| vec![Definition::Enum(e)]),
            Token::Typedef => Ok(self
                .parse_typedef()?
                .into_iter()
                .map(Definition::Typedef)
                .collect()),
            Token::Const => self.parse_const().map(|c| vec![Definition::Const(c)]),
            Token::Unsupported => {
                let keyword = self.current_text();
                Err(self.error(format!("'{keyword}' declarations are not supported")))
            }
            _ => {
                let found = self.current_text();
                Err(self.error(format!("expected a definition, found '{found}'")))
            }
        }
    }

    fn parse_module(&mut self, annotations: Vec<RawAnnotation>) -> IdlResult<ModuleDecl> {
        self.bump()?;
        let name = self.expect_ident("module name")?;
        self.expect(Token::LBrace, "'{'")?;

        let mut definitions = Vec::new();
        while !self.eat(Token::RBrace) {
            if self.at_end() {
                return Err(self.error(format!("unterminated module '{name}'")));
            }
            definitions.extend(self.parse_definition()?);
        }
        self.expect(Token::Semi, "';' after module")?;

        Ok(ModuleDecl {
            name,
            annotations,
            definitions,
        })
    }

    fn parse_struct(&mut self, annotations: Vec<RawAnnotation>) -> IdlResult<StructDecl> {
        let keyword = self.bump()?;
        let origin = self.origin(&keyword);
        let name = self.expect_ident("struct name")?;

        if self.eat(Token::Semi) {
            return Ok(StructDecl {
                name,
                annotations,
                base: None,
                members: Vec::new(),
                origin,
                forward: true,
            });
        }

        let base = if self.eat(Token::Colon) {
            Some(self.parse_scoped_name()?)
        } else {
            None
        };

        self.expect(Token::LBrace, "'{'")?;
        let mut members = Vec::new();
        while !self.eat(Token::RBrace) {
            if self.at_end() {
                return Err(self.error(format!("unterminated struct '{name}'")));
            }
            members.extend(self.parse_member()?);
        }
        self.expect(Token::Semi, "';' after struct")?;

        Ok(StructDecl {
            name,
            annotations,
            base,
            members,
            origin,
            forward: false,
        })
    }

    fn parse_member(&mut self) -> IdlResult<Vec<Member>> {
        let annotations = self.parse_annotations()?;
        let ty = self.parse_type_spec()?;
        let declarators = self.parse_declarators()?;
        self.expect(Token::Semi, "';' after member")?;

        Ok(declarators
            .into_iter()
            .map(|(name, dimensions)| Member {
                name,
                ty: with_dimensions(ty.clone(), dimensions),
                annotations: annotations.clone(),
            })
            .collect())
    }

    fn parse_enum(&mut self, annotations: Vec<RawAnnotation>) -> IdlResult<EnumDecl> {
        let keyword = self.bump()?;
        let origin = self.origin(&keyword);
        let name = self.expect_ident("enum name")?;
        self.expect(Token::LBrace, "'{'")?;

        let mut enumerators = Vec::new();
        loop {
            if self.peek() == Some(Token::RBrace) && !enumerators.is_empty() {
                break;
            }
            self.parse_annotations()?;
            enumerators.push(self.expect_ident("enumerator")?);
            if !self.eat(Token::Comma) {
                break;
            }
        }
        self.expect(Token::RBrace, "'}'")?;
        self.expect(Token::Semi, "';' after enum")?;

        Ok(EnumDecl {
            name,
            annotations,
            enumerators,
            origin,
        })
    }

    fn parse_typedef(&mut self) -> IdlResult<Vec<TypedefDecl>> {
        let keyword = self.bump()?;
        let origin = self.origin(&keyword);
        let ty = self.parse_type_spec()?;
        let declarators = self.parse_declarators()?;
        self.expect(Token::Semi, "';' after typedef")?;

        Ok(declarators
            .into_iter()
            .map(|(name, dimensions)| TypedefDecl {
                name,
                ty: with_dimensions(ty.clone(), dimensions),
                origin: origin.clone(),
            })
            .collect())
    }

    fn parse_const(&mut self) -> IdlResult<ConstDecl> {
        let keyword = self.bump()?;
        let origin = self.origin(&keyword);
        let ty = self.parse_type_spec()?;
        let name = self.expect_ident("constant name")?;
        self.expect(Token::Eq, "'='")?;

        let mut parts = Vec::new();
        while !self.eat(Token::Semi) {
            if self.at_end() {
                return Err(self.error(format!("unterminated constant '{name}'")));
            }
            parts.push(self.bump()?);
        }
        if parts.is_empty() {
            return Err(self.error(format!("constant '{name}' has no value")));
        }

        if let [single] = parts.as_slice()
            && single.token == Token::Integer
            && let Some(n) = parse_integer(&single.text)
        {
            self.bounds.insert(name.clone(), n);
        }

        let value = parts
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        Ok(ConstDecl {
            name,
            ty,
            value,
            origin,
        })
    }

    // ------------------------------------------------------------------
    // Annotations
    // ------------------------------------------------------------------

    fn parse_annotations(&mut self) -> IdlResult<Vec<RawAnnotation>> {
        let mut annotations = Vec::new();
        while self.eat(Token::At) {
            let mut annotation = RawAnnotation::new(self.expect_ident("annotation name")?);
            if self.eat(Token::LParen) && !self.eat(Token::RParen) {
                loop {
                    let named = self.peek() == Some(Token::Ident)
                        && self.peek_at(1) == Some(Token::Eq);
                    if named {
                        let name = self.bump()?.text;
                        self.bump()?;
                        let value = self.parse_annotation_value()?;
                        annotation = annotation.with_param(name, value);
                    } else {
                        let value = self.parse_annotation_value()?;
                        annotation = annotation.with_value(value);
                    }
                    if self.eat(Token::RParen) {
                        break;
                    }
                    self.expect(Token::Comma, "',' or ')'")?;
                }
            }
            annotations.push(annotation);
        }
        Ok(annotations)
    }

    /// Everything up to the next top-level `,` or `)`, concatenated.
    fn parse_annotation_value(&mut self) -> IdlResult<String> {
        let mut value = String::new();
        let mut depth = 0usize;
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated annotation parameters")),
                Some(Token::Comma | Token::RParen) if depth == 0 => break,
                Some(Token::LParen) => depth += 1,
                Some(Token::RParen) => depth -= 1,
                _ => {}
            }
            value.push_str(&self.bump()?.text);
        }
        if value.is_empty() {
            return Err(self.error("empty annotation parameter"));
        }
        Ok(value)
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    fn parse_type_spec(&mut self) -> IdlResult<TypeSpec> {
        let Some(token) = self.peek() else {
            return Err(self.error("expected a type"));
        };

        let primitive =
            |kind: PrimitiveKind| -> IdlResult<TypeSpec> { Ok(TypeSpec::Primitive(kind)) };
        match token {
            Token::Ident | Token::DoubleColon => {
                return Ok(TypeSpec::Named(self.parse_scoped_name()?));
            }
            Token::String | Token::WString => {
                self.bump()?;
                let bound = if self.eat(Token::LAngle) {
                    let bound = self.parse_bound()?;
                    self.expect(Token::RAngle, "'>'")?;
                    Some(bound)
                } else {
                    None
                };
                return Ok(TypeSpec::String {
                    wide: token == Token::WString,
                    bound,
                });
            }
            Token::Sequence => {
                self.bump()?;
                self.expect(Token::LAngle, "'<'")?;
                let element = self.parse_type_spec()?;
                let bound = if self.eat(Token::Comma) {
                    Some(self.parse_bound()?)
                } else {
                    None
                };
                self.expect(Token::RAngle, "'>'")?;
                return Ok(TypeSpec::Sequence {
                    element: Box::new(element),
                    bound,
                });
            }
            _ => {}
        }

        self.bump()?;
        match token {
            Token::Boolean => primitive(PrimitiveKind::Boolean),
            Token::Char => primitive(PrimitiveKind::Char),
            Token::WChar => primitive(PrimitiveKind::WChar),
            Token::Octet => primitive(PrimitiveKind::Octet),
            Token::Int8 => primitive(PrimitiveKind::Int8),
            Token::UInt8 => primitive(PrimitiveKind::UInt8),
            Token::Short | Token::Int16 => primitive(PrimitiveKind::Short),
            Token::UInt16 => primitive(PrimitiveKind::UShort),
            Token::Int32 => primitive(PrimitiveKind::Long),
            Token::UInt32 => primitive(PrimitiveKind::ULong),
            Token::Int64 => primitive(PrimitiveKind::LongLong),
            Token::UInt64 => primitive(PrimitiveKind::ULongLong),
            Token::Float => primitive(PrimitiveKind::Float),
            Token::Double => primitive(PrimitiveKind::Double),
            Token::Long if self.eat(Token::Long) => primitive(PrimitiveKind::LongLong),
            Token::Long if self.eat(Token::Double) => primitive(PrimitiveKind::LongDouble),
            Token::Long => primitive(PrimitiveKind::Long),
            Token::Unsigned if self.eat(Token::Short) => primitive(PrimitiveKind::UShort),
            Token::Unsigned if self.eat(Token::Long) => {
                if self.eat(Token::Long) {
                    primitive(PrimitiveKind::ULongLong)
                } else {
                    primitive(PrimitiveKind::ULong)
                }
            }
            Token::Unsigned => Err(self.error("expected 'short' or 'long' after 'unsigned'")),
            _ => {
                self.pos -= 1;
                let found = self.current_text();
                Err(self.error(format!("expected a type, found '{found}'")))
            }
        }
    }

    fn parse_scoped_name(&mut self) -> IdlResult<ScopedName> {
        let absolute = self.eat(Token::DoubleColon);
        let mut parts = vec![self.expect_ident("name")?];
        while self.eat(Token::DoubleColon) {
            parts.push(self.expect_ident("name")?);
        }
        Ok(ScopedName { absolute, parts })
    }

    /// `name`, `name[3]`, `name[N][4]`, comma separated.
    fn parse_declarators(&mut self) -> IdlResult<Vec<Declarator>> {
        let mut declarators = Vec::new();
        loop {
            let name = self.expect_ident("declarator")?;
            let mut dimensions = Vec::new();
            while self.eat(Token::LBracket) {
                dimensions.push(self.parse_bound()?);
                self.expect(Token::RBracket, "']'")?;
            }
            declarators.push((name, dimensions));
            if !self.eat(Token::Comma) {
                return Ok(declarators);
            }
        }
    }

    /// A positive integer literal or the name of an integer constant.
    fn parse_bound(&mut self) -> IdlResult<u32> {
        let lexeme = self.bump()?;
        let value = match lexeme.token {
            Token::Integer => parse_integer(&lexeme.text),
            Token::Ident => self.bounds.get(&lexeme.text).copied(),
            _ => None,
        };
        value.ok_or_else(|| {
            self.error_at(&lexeme, format!("'{}' is not a valid bound", lexeme.text))
        })
    }

    // ------------------------------------------------------------------
    // Cursor
    // ------------------------------------------------------------------

    fn at_end(&self) -> bool {
        self.pos >= self.lexemes.len()
    }

    fn peek(&self) -> Option<Token> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<Token> {
        self.lexemes.get(self.pos + offset).map(|l| l.token)
    }

    fn current_text(&self) -> String {
        self.lexemes
            .get(self.pos)
            .map(|l| l.text.clone())
            .unwrap_or_default()
    }

    fn bump(&mut self) -> IdlResult<Lexeme> {
        match self.lexemes.get(self.pos) {
            Some(lexeme) => {
                self.pos += 1;
                Ok(lexeme.clone())
            }
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn eat(&mut self, token: Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token, what: &str) -> IdlResult<Lexeme> {
        if self.peek() == Some(token) {
            self.bump()
        } else {
            Err(self.unexpected(what))
        }
    }

    fn expect_ident(&mut self, what: &str) -> IdlResult<String> {
        self.expect(Token::Ident, what).map(|l| l.text)
    }

    fn unexpected(&self, what: &str) -> IdlError {
        match self.lexemes.get(self.pos) {
            Some(l) => self.error_at(l, format!("expected {what}, found '{}'", l.text)),
            None => self.error(format!("expected {what}, found end of input")),
        }
    }

    fn origin(&self, lexeme: &Lexeme) -> Origin {
        match lexeme.file {
            0 => Origin::Unit,
            i => Origin::Included(self.files.get(i).cloned().unwrap_or_default()),
        }
    }

    /// Error at the current token, or at the last one past the end.
    fn error(&self, message: impl Into<String>) -> IdlError {
        let at = self
            .lexemes
            .get(self.pos)
            .or_else(|| self.lexemes.last());
        match at {
            Some(lexeme) => self.error_at(lexeme, message),
            None => IdlError::syntax(self.file_label(0), 1, message),
        }
    }

    fn error_at(&self, lexeme: &Lexeme, message: impl Into<String>) -> IdlError {
        IdlError::syntax(self.file_label(lexeme.file), lexeme.line, message)
    }

    fn file_label(&self, file: usize) -> String {
        self.files
            .get(file)
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    }
}

fn with_dimensions(ty: TypeSpec, dimensions: Vec<u32>) -> TypeSpec {
    if dimensions.is_empty() {
        ty
    } else {
        TypeSpec::Array {
            element: Box::new(ty),
            dimensions,
        }
    }
}

fn parse_integer(text: &str) -> Option<u32> {
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

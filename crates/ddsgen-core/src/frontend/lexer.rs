//! Token stream for the bundled IDL front-end.
//!
//! Scanning is done by `logos`. Directive lines are handled here rather than in
//! the parser: line markers move the current file and line, unexpanded
//! `#include` directives are spliced in, everything else is dropped. The parser
//! only ever sees [`Lexeme`]s tagged with the file they came from.

use crate::error::{IdlError, IdlResult};
use logos::Logos;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\f]+")]
#[logos(skip r"//[^\n]*")]
pub(crate) enum Token {
    #[token("\n")]
    Newline,

    #[token("/*", block_comment)]
    BlockComment,

    #[regex(r"#[^\n]*")]
    Directive,

    #[token("module")]
    Module,
    #[token("struct")]
    Struct,
    #[token("enum")]
    Enum,
    #[token("typedef")]
    Typedef,
    #[token("const")]
    Const,
    #[token("sequence")]
    Sequence,
    #[token("string")]
    String,
    #[token("wstring")]
    WString,
    #[token("unsigned")]
    Unsigned,
    #[token("short")]
    Short,
    #[token("long")]
    Long,
    #[token("float")]
    Float,
    #[token("double")]
    Double,
    #[token("char")]
    Char,
    #[token("wchar")]
    WChar,
    #[token("boolean")]
    Boolean,
    #[token("octet")]
    Octet,
    #[token("int8")]
    Int8,
    #[token("uint8")]
    UInt8,
    #[token("int16")]
    Int16,
    #[token("uint16")]
    UInt16,
    #[token("int32")]
    Int32,
    #[token("uint32")]
    UInt32,
    #[token("int64")]
    Int64,
    #[token("uint64")]
    UInt64,

    /// Keywords of constructs the bundled grammar does not cover.
    #[token("union")]
    #[token("interface")]
    #[token("exception")]
    #[token("bitset")]
    #[token("bitmask")]
    #[token("valuetype")]
    #[token("native")]
    Unsupported,

    #[regex("[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    #[regex("0[xX][0-9a-fA-F]+|[0-9]+")]
    Integer,

    #[regex(r"[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?[fFdD]?")]
    FloatLiteral,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    StringLiteral,

    #[regex(r"'([^'\\\n]|\\.)'")]
    CharLiteral,

    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("<")]
    LAngle,
    #[token(">")]
    RAngle,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,
    #[token("::")]
    DoubleColon,
    #[token(":")]
    Colon,
    #[token("=")]
    Eq,
    #[token("@")]
    At,

    #[regex(r"[-+*/%~|&^]")]
    Operator,
}

/// Consume a `/* ... */` comment. An unterminated comment is a lexing error.
fn block_comment(lex: &mut logos::Lexer<Token>) -> bool {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            true
        }
        None => false,
    }
}

/// A token with its text and position.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Lexeme {
    pub token: Token,
    pub text: String,
    pub line: u32,
    /// Index into [`TokenStream::files`]. `0` is the unit itself.
    pub file: usize,
}

/// Output of [`tokenize`].
#[derive(Debug, Default)]
pub(crate) struct TokenStream {
    pub lexemes: Vec<Lexeme>,
    pub files: Vec<PathBuf>,
    pub dependencies: BTreeSet<PathBuf>,
}

const UNIT: usize = 0;

/// Tokenize a unit's source text.
///
/// `unit_path` is the IDL file the text belongs to (the preprocessed text of
/// it, usually). Line markers naming any other file switch origin to that
/// file and add it to the dependency set.
pub(crate) fn tokenize(
    unit_path: &Path,
    source: &str,
    include_paths: &[PathBuf],
) -> IdlResult<TokenStream> {
    let mut stream = TokenStream {
        files: vec![unit_path.to_path_buf()],
        ..TokenStream::default()
    };
    let mut scanner = Scanner {
        unit_path,
        include_paths,
        stream: &mut stream,
        expanded: BTreeSet::new(),
    };
    scanner.scan(source, UNIT)?;
    Ok(stream)
}

struct Scanner<'a> {
    unit_path: &'a Path,
    include_paths: &'a [PathBuf],
    stream: &'a mut TokenStream,
    expanded: BTreeSet<PathBuf>,
}

impl Scanner<'_> {
    fn scan(&mut self, source: &str, start_file: usize) -> IdlResult<()> {
        let mut file = start_file;
        let mut line: u32 = 1;
        let mut lexer = Token::lexer(source);

        while let Some(result) = lexer.next() {
            let text = lexer.slice();
            let token = result.map_err(|_| {
                let message = if text.starts_with("/*") {
                    "unterminated comment".to_string()
                } else {
                    format!("unexpected character '{text}'")
                };
                IdlError::syntax(self.file_label(file), line, message)
            })?;

            match token {
                Token::Newline => line += 1,
                Token::BlockComment => line += newlines(text),
                Token::Directive => {
                    if let Some((marker_line, marker_file)) = parse_line_marker(text) {
                        file = self.intern_marker(&marker_file);
                        // The marker names the line that follows it.
                        line = marker_line.saturating_sub(1);
                    } else if let Some(target) = parse_include(text) {
                        self.expand_include(&target, file, line)?;
                    }
                }
                _ => self.stream.lexemes.push(Lexeme {
                    token,
                    text: text.to_string(),
                    line,
                    file,
                }),
            }
        }
        Ok(())
    }

    fn file_label(&self, file: usize) -> String {
        self.stream
            .files
            .get(file)
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    }

    fn intern(&mut self, path: PathBuf) -> usize {
        match self.stream.files.iter().position(|p| *p == path) {
            Some(i) => i,
            None => {
                self.stream.files.push(path);
                self.stream.files.len() - 1
            }
        }
    }

    fn intern_marker(&mut self, marker_file: &str) -> usize {
        let path = PathBuf::from(marker_file);
        if same_file(&path, self.unit_path) {
            return UNIT;
        }
        // Pseudo files such as `<built-in>` and `<command-line>`.
        if !marker_file.starts_with('<') {
            self.stream.dependencies.insert(path.clone());
        }
        self.intern(path)
    }

    /// Splice an unexpanded include into the stream. Each file is expanded at
    /// most once per unit.
    fn expand_include(&mut self, target: &str, from: usize, line: u32) -> IdlResult<()> {
        let including_dir = self
            .stream
            .files
            .get(from)
            .and_then(|p| p.parent())
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let found = std::iter::once(&including_dir)
            .chain(self.include_paths.iter())
            .map(|dir| dir.join(target))
            .find(|candidate| candidate.is_file());

        let Some(path) = found else {
            debug!(include = target, line, "include not found on search path, recorded only");
            self.stream.dependencies.insert(PathBuf::from(target));
            return Ok(());
        };

        self.stream.dependencies.insert(path.clone());
        if same_file(&path, self.unit_path) || !self.expanded.insert(path.clone()) {
            return Ok(());
        }

        let source = super::read_source(&path)?;
        let file = self.intern(path);
        self.scan(&source, file)
    }
}

fn newlines(text: &str) -> u32 {
    text.bytes().filter(|&b| b == b'\n').count() as u32
}

/// `# 12 "file.idl" 1` or `#line 12 "file.idl"`.
fn parse_line_marker(directive: &str) -> Option<(u32, String)> {
    let rest = directive.trim_start_matches('#').trim_start();
    let rest = rest.strip_prefix("line").map(str::trim_start).unwrap_or(rest);

    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }
    let line = rest[..digits_end].parse().ok()?;

    let quoted = rest[digits_end..].trim_start().strip_prefix('"')?;
    let end = quoted.find('"')?;
    Some((line, quoted[..end].to_string()))
}

/// `#include "x.idl"` or `#include <x.idl>`.
fn parse_include(directive: &str) -> Option<String> {
    let rest = directive
        .trim_start_matches('#')
        .trim_start()
        .strip_prefix("include")?
        .trim();
    let (open, close) = match rest.chars().next()? {
        '"' => ('"', '"'),
        '<' => ('<', '>'),
        _ => return None,
    };
    let inner = rest.strip_prefix(open)?;
    let end = inner.find(close)?;
    Some(inner[..end].to_string())
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        tokenize(Path::new("Unit.idl"), source, &[])
            .unwrap()
            .lexemes
            .into_iter()
            .map(|l| l.token)
            .collect()
    }

    #[test]
    fn tokenize___keywords_and_identifiers___are_distinguished() {
        assert_eq!(
            tokens("struct structure;"),
            vec![Token::Struct, Token::Ident, Token::Semi]
        );
    }

    #[test]
    fn tokenize___comments___are_dropped() {
        assert_eq!(
            tokens("// line\n/* block\n comment */ long"),
            vec![Token::Long]
        );
    }

    #[test]
    fn tokenize___block_comment___advances_line() {
        let stream = tokenize(Path::new("Unit.idl"), "/* a\nb\n*/ long", &[]).unwrap();

        assert_eq!(stream.lexemes[0].line, 3);
    }

    #[test]
    fn tokenize___stars_inside_block_comment___end_at_first_terminator() {
        assert_eq!(
            tokens("/** doc * with ** stars **/ long /* x */ short"),
            vec![Token::Long, Token::Short]
        );
    }

    #[test]
    fn tokenize___unterminated_block_comment___is_syntax_error() {
        let err = tokenize(Path::new("Unit.idl"), "long\n/* never closed", &[]).unwrap_err();

        match err {
            IdlError::Syntax { line, message, .. } => {
                assert_eq!(line, 2);
                assert_eq!(message, "unterminated comment");
            }
            other => panic!("expected a syntax error, got {other:?}"),
        }
    }

    #[test]
    fn tokenize___line_marker___switches_file_and_line() {
        let source = "# 1 \"Unit.idl\"\nlong\n# 7 \"Other.idl\" 1\nshort\n";

        let stream = tokenize(Path::new("Unit.idl"), source, &[]).unwrap();

        assert_eq!(stream.lexemes[0].file, UNIT);
        assert_eq!(stream.lexemes[1].file, 1);
        assert_eq!(stream.lexemes[1].line, 7);
        assert!(stream.dependencies.contains(Path::new("Other.idl")));
    }

    #[test]
    fn tokenize___builtin_marker___is_not_a_dependency() {
        let stream =
            tokenize(Path::new("Unit.idl"), "# 1 \"<built-in>\"\n# 1 \"Unit.idl\"\n", &[]).unwrap();

        assert!(stream.dependencies.is_empty());
    }

    #[test]
    fn tokenize___pragma___is_ignored() {
        assert_eq!(tokens("#pragma once\nlong"), vec![Token::Long]);
    }

    #[test]
    fn tokenize___missing_include___is_recorded() {
        let stream = tokenize(Path::new("Unit.idl"), "#include \"Nowhere.idl\"\n", &[]).unwrap();

        assert!(stream.dependencies.contains(Path::new("Nowhere.idl")));
        assert!(stream.lexemes.is_empty());
    }

    #[test]
    fn tokenize___stray_character___is_syntax_error() {
        let err = tokenize(Path::new("Unit.idl"), "long $x;", &[]).unwrap_err();

        assert!(matches!(err, IdlError::Syntax { line: 1, .. }));
    }

    #[test]
    fn parse_line_marker___line_directive___is_recognised() {
        assert_eq!(
            parse_line_marker("#line 42 \"a/b.idl\""),
            Some((42, "a/b.idl".to_string()))
        );
        assert_eq!(parse_line_marker("#pragma once"), None);
    }

    #[test]
    fn parse_include___both_forms___are_recognised() {
        assert_eq!(parse_include("#include \"a.idl\""), Some("a.idl".into()));
        assert_eq!(parse_include("# include <b.idl>"), Some("b.idl".into()));
        assert_eq!(parse_include("#define X"), None);
    }
}

//! IDL front-end.
//!
//! [`IdlFrontEnd`] is the seam between source text and the semantic model: it
//! turns one compilation unit into a [`Specification`] tree. The orchestrator
//! only talks to the trait, so another grammar implementation can be plugged
//! in. [`BuiltinFrontEnd`] covers the IDL subset the bundled templates know how
//! to render.

mod lexer;
mod parser;

use crate::error::{IdlError, IdlResult};
use crate::tree::Specification;
use std::io;
use std::path::{Path, PathBuf};

/// Parses IDL source text into a specification tree.
pub trait IdlFrontEnd: Send + Sync {
    /// Parse `source`, the (possibly preprocessed) text of the unit at
    /// `unit_path`.
    fn parse(&self, unit_path: &Path, source: &str) -> IdlResult<Specification>;

    /// Read `source_path` and parse it as the text of `unit_path`.
    fn parse_file(&self, unit_path: &Path, source_path: &Path) -> IdlResult<Specification> {
        let source = read_source(source_path)?;
        self.parse(unit_path, &source)
    }
}

/// Read a source file, reporting a missing file as [`IdlError::FileNotFound`].
pub fn read_source(path: &Path) -> IdlResult<String> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => IdlError::FileNotFound(path.to_path_buf()),
        _ => IdlError::Io(e),
    })
}

/// Recursive-descent front-end for the supported IDL subset.
#[derive(Debug, Clone, Default)]
pub struct BuiltinFrontEnd {
    include_paths: Vec<PathBuf>,
}

impl BuiltinFrontEnd {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directories searched for unexpanded `#include` directives, after the
    /// including file's own directory.
    pub fn with_include_paths(mut self, include_paths: Vec<PathBuf>) -> Self {
        self.include_paths = include_paths;
        self
    }
}

impl IdlFrontEnd for BuiltinFrontEnd {
    fn parse(&self, unit_path: &Path, source: &str) -> IdlResult<Specification> {
        let stream = lexer::tokenize(unit_path, source, &self.include_paths)?;
        parser::Parser::new(stream).parse_specification()
    }
}

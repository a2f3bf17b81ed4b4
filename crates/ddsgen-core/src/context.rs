//! Per-unit semantic context.
//!
//! A [`Context`] is created for every IDL compilation unit. While the
//! specification tree is walked it accumulates the unit's declarations and
//! picks the topic type; afterwards templates read it and use its synthetic
//! name allocators. It is dropped once the unit's artifacts are written.

use crate::allocator::{IdentifierStack, LoopVariables};
use crate::annotation::Annotation;
use crate::error::{IdlError, IdlResult};
use crate::tree::{
    ConstDecl, Definition, EnumDecl, ScopedName, Specification, StructDecl, TypeSpec, TypedefDecl,
};
use crate::typecode::{
    AliasTypeCode, Constant, EnumTypeCode, MemberTypeCode, StructTypeCode, TypeCode, join_scoped,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Target language binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Natively compiled binding.
    #[default]
    Cpp,
    /// Managed binding with a native-interface shim.
    Java,
}

impl Language {
    /// Parse a language from its command-line spelling.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "c++" | "cpp" => Some(Language::Cpp),
            "java" => Some(Language::Java),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Cpp => "c++",
            Language::Java => "java",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional generation features.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    /// Generate type-metadata (`TypeObject`) files.
    #[serde(default)]
    pub type_object: bool,

    /// Decorate public symbols for export from a shared library.
    #[serde(default)]
    pub export_symbols: bool,

    /// Alternate serialization mode.
    #[serde(default)]
    pub fusion: bool,
}

/// Dotted managed-binding package such as `com.example.shapes`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JavaPackage {
    dotted: String,
}

impl JavaPackage {
    pub fn new(dotted: impl Into<String>) -> Self {
        let dotted: String = dotted.into();
        Self {
            dotted: dotted.trim_matches('.').to_string(),
        }
    }

    pub fn dotted(&self) -> &str {
        &self.dotted
    }

    pub fn is_empty(&self) -> bool {
        self.dotted.is_empty()
    }

    /// Relative directory for the package, `com/example/shapes`.
    pub fn path(&self) -> PathBuf {
        self.dotted.split('.').filter(|s| !s.is_empty()).collect()
    }

    /// Prefix for fully qualified class names, `com.example.shapes.` (empty
    /// for the default package).
    pub fn prefix(&self) -> String {
        if self.dotted.is_empty() {
            String::new()
        } else {
            format!("{}.", self.dotted)
        }
    }

    /// Prefix for native method symbols, `com_example_shapes_`.
    pub fn symbol_prefix(&self) -> String {
        if self.dotted.is_empty() {
            String::new()
        } else {
            format!("{}_", self.dotted.replace('.', "_"))
        }
    }
}

/// Semantic state for one compilation unit.
#[derive(Debug, Clone)]
pub struct Context {
    filename: String,
    filename_upper: String,
    source_path: PathBuf,
    include_paths: Vec<PathBuf>,
    language: Language,
    package: JavaPackage,
    flags: FeatureFlags,

    scope: Vec<String>,
    types: Vec<TypeCode>,
    index: HashMap<String, usize>,
    forward: HashSet<String>,
    constants: Vec<Constant>,
    dependencies: BTreeSet<PathBuf>,
    topic: Option<usize>,

    identifiers: IdentifierStack,
    loop_vars: LoopVariables,
}

impl Context {
    /// Create the context for the unit at `source_path`. The unit name is the
    /// file stem.
    pub fn new(source_path: impl Into<PathBuf>) -> Self {
        let source_path = source_path.into();
        let filename = source_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let filename_upper = filename.to_uppercase();

        Self {
            filename,
            filename_upper,
            source_path,
            include_paths: Vec::new(),
            language: Language::default(),
            package: JavaPackage::default(),
            flags: FeatureFlags::default(),
            scope: Vec::new(),
            types: Vec::new(),
            index: HashMap::new(),
            forward: HashSet::new(),
            constants: Vec::new(),
            dependencies: BTreeSet::new(),
            topic: None,
            identifiers: IdentifierStack::default(),
            loop_vars: LoopVariables::default(),
        }
    }

    pub fn with_include_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.include_paths = paths;
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_package(mut self, package: JavaPackage) -> Self {
        self.package = package;
        self
    }

    pub fn with_flags(mut self, flags: FeatureFlags) -> Self {
        self.flags = flags;
        self
    }

    // ------------------------------------------------------------------
    // Naming
    // ------------------------------------------------------------------

    /// Unit name, the IDL file stem.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Upper-cased unit name, used for header guards.
    pub fn filename_upper(&self) -> &str {
        &self.filename_upper
    }

    /// Rename the unit. Keeps the upper-cased form in sync.
    pub fn set_filename(&mut self, filename: impl Into<String>) {
        self.filename = filename.into();
        self.filename_upper = self.filename.to_uppercase();
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn include_paths(&self) -> &[PathBuf] {
        &self.include_paths
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn is_java(&self) -> bool {
        self.language == Language::Java
    }

    pub fn package(&self) -> &JavaPackage {
        &self.package
    }

    pub fn flags(&self) -> FeatureFlags {
        self.flags
    }

    // ------------------------------------------------------------------
    // Scopes
    // ------------------------------------------------------------------

    pub fn push_scope(&mut self, name: impl Into<String>) {
        self.scope.push(name.into());
    }

    pub fn pop_scope(&mut self) -> Option<String> {
        self.scope.pop()
    }

    pub fn scope(&self) -> &[String] {
        &self.scope
    }

    /// Current scope as `a::b`, empty at file level.
    pub fn scope_string(&self) -> String {
        self.scope.join("::")
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Register every definition of a parsed unit and adopt its dependency set.
    pub fn register_specification(&mut self, spec: &Specification) -> IdlResult<()> {
        self.dependencies.extend(spec.dependencies.iter().cloned());
        for definition in &spec.definitions {
            self.register(definition)?;
        }
        let topic = self
            .topic()
            .map(StructTypeCode::scoped_name)
            .unwrap_or_else(|| "<none>".to_string());
        debug!(
            unit = %self.filename,
            types = self.types.len(),
            topic = %topic,
            "registered specification"
        );
        Ok(())
    }

    /// Register one definition in the current scope.
    pub fn register(&mut self, definition: &Definition) -> IdlResult<()> {
        match definition {
            Definition::Module(module) => {
                self.push_scope(module.name.clone());
                let result = module
                    .definitions
                    .iter()
                    .try_for_each(|inner| self.register(inner));
                self.pop_scope();
                result
            }
            Definition::Struct(decl) => self.register_struct(decl),
            Definition::Enum(decl) => self.register_enum(decl),
            Definition::Typedef(decl) => self.register_typedef(decl),
            Definition::Const(decl) => self.register_const(decl),
        }
    }

    fn register_struct(&mut self, decl: &StructDecl) -> IdlResult<()> {
        let scoped = join_scoped(&self.scope, &decl.name);

        if decl.forward {
            if !self.index.contains_key(&scoped) {
                self.forward.insert(scoped);
            }
            return Ok(());
        }

        self.ensure_unique(&scoped)?;

        let base = decl
            .base
            .as_ref()
            .map(|name| self.resolve(name))
            .transpose()?;

        let members = decl
            .members
            .iter()
            .map(|m| {
                Ok(MemberTypeCode {
                    name: m.name.clone(),
                    ty: self.resolve_type(&m.ty)?,
                    annotations: Annotation::resolve_all(&m.annotations),
                })
            })
            .collect::<IdlResult<Vec<_>>>()?;

        let mut struct_tc = StructTypeCode::new(
            self.scope.clone(),
            decl.name.clone(),
            members,
            Annotation::resolve_all(&decl.annotations),
            decl.origin.clone(),
        );
        if let Some(base) = base {
            struct_tc = struct_tc.with_base(base);
        }

        let eligible = struct_tc.origin().is_unit() && struct_tc.is_topic();
        let position = self.insert(scoped.clone(), TypeCode::Struct(struct_tc));
        self.forward.remove(&scoped);

        if eligible {
            if let Some(previous) = self.topic.and_then(|i| self.types.get(i)) {
                debug!(previous = %previous.scoped_name(), selected = %scoped, "topic replaced");
            }
            self.topic = Some(position);
        }
        Ok(())
    }

    fn register_enum(&mut self, decl: &EnumDecl) -> IdlResult<()> {
        let scoped = join_scoped(&self.scope, &decl.name);
        self.ensure_unique(&scoped)?;
        self.insert(
            scoped,
            TypeCode::Enum(EnumTypeCode {
                scope: self.scope.clone(),
                name: decl.name.clone(),
                enumerators: decl.enumerators.clone(),
                origin: decl.origin.clone(),
            }),
        );
        Ok(())
    }

    fn register_typedef(&mut self, decl: &TypedefDecl) -> IdlResult<()> {
        let scoped = join_scoped(&self.scope, &decl.name);
        self.ensure_unique(&scoped)?;
        let ty = self.resolve_type(&decl.ty)?;
        self.insert(
            scoped,
            TypeCode::Alias(AliasTypeCode {
                scope: self.scope.clone(),
                name: decl.name.clone(),
                ty,
                origin: decl.origin.clone(),
            }),
        );
        Ok(())
    }

    fn register_const(&mut self, decl: &ConstDecl) -> IdlResult<()> {
        let scoped = join_scoped(&self.scope, &decl.name);
        let clash = self.index.contains_key(&scoped)
            || self
                .constants
                .iter()
                .any(|c| join_scoped(&c.scope, &c.name) == scoped);
        if clash {
            return Err(IdlError::DuplicateDeclaration(scoped));
        }
        let ty = self.resolve_type(&decl.ty)?;
        self.constants.push(Constant {
            scope: self.scope.clone(),
            name: decl.name.clone(),
            ty,
            value: decl.value.clone(),
            origin: decl.origin.clone(),
        });
        Ok(())
    }

    fn ensure_unique(&self, scoped: &str) -> IdlResult<()> {
        if self.index.contains_key(scoped) {
            Err(IdlError::DuplicateDeclaration(scoped.to_string()))
        } else {
            Ok(())
        }
    }

    fn insert(&mut self, scoped: String, type_code: TypeCode) -> usize {
        let position = self.types.len();
        self.types.push(type_code);
        self.index.insert(scoped, position);
        position
    }

    // ------------------------------------------------------------------
    // Resolution
    // ------------------------------------------------------------------

    /// Resolve a type name from the current scope.
    ///
    /// Relative names are tried from the innermost enclosing scope outwards.
    /// Forward-declared structs resolve too. The result is always absolute.
    pub fn resolve(&self, name: &ScopedName) -> IdlResult<ScopedName> {
        let candidates: Vec<Vec<String>> = if name.absolute {
            vec![name.parts.clone()]
        } else {
            (0..=self.scope.len())
                .rev()
                .map(|depth| {
                    self.scope[..depth]
                        .iter()
                        .chain(name.parts.iter())
                        .cloned()
                        .collect()
                })
                .collect()
        };

        candidates
            .into_iter()
            .find(|parts| {
                let key = parts.join("::");
                self.index.contains_key(&key) || self.forward.contains(&key)
            })
            .map(|parts| ScopedName {
                absolute: true,
                parts,
            })
            .ok_or_else(|| IdlError::UnresolvedType {
                name: name.to_string(),
                scope: self.scope_string(),
            })
    }

    fn resolve_type(&self, ty: &TypeSpec) -> IdlResult<TypeSpec> {
        Ok(match ty {
            TypeSpec::Named(name) => TypeSpec::Named(self.resolve(name)?),
            TypeSpec::Sequence { element, bound } => TypeSpec::Sequence {
                element: Box::new(self.resolve_type(element)?),
                bound: *bound,
            },
            TypeSpec::Array {
                element,
                dimensions,
            } => TypeSpec::Array {
                element: Box::new(self.resolve_type(element)?),
                dimensions: dimensions.clone(),
            },
            other => other.clone(),
        })
    }

    // ------------------------------------------------------------------
    // Registry queries
    // ------------------------------------------------------------------

    /// All registered types in declaration order, included ones first where
    /// they appeared first.
    pub fn types(&self) -> &[TypeCode] {
        &self.types
    }

    /// Types declared in the unit's own file.
    pub fn unit_types(&self) -> impl Iterator<Item = &TypeCode> {
        self.types.iter().filter(|t| t.origin().is_unit())
    }

    /// Every registered struct.
    pub fn structs(&self) -> impl Iterator<Item = &StructTypeCode> {
        self.types.iter().filter_map(TypeCode::as_struct)
    }

    /// Look up a type by its scoped name (`a::b::Name`, no leading `::`).
    pub fn lookup(&self, scoped_name: &str) -> Option<&TypeCode> {
        let key = scoped_name.trim_start_matches("::");
        self.index.get(key).and_then(|&i| self.types.get(i))
    }

    pub fn constants(&self) -> &[Constant] {
        &self.constants
    }

    /// Files this unit depends on, as reported by the front-end.
    pub fn dependencies(&self) -> &BTreeSet<PathBuf> {
        &self.dependencies
    }

    /// The selected topic type, if any struct was eligible.
    pub fn topic(&self) -> Option<&StructTypeCode> {
        self.topic
            .and_then(|i| self.types.get(i))
            .and_then(TypeCode::as_struct)
    }

    pub fn has_topic(&self) -> bool {
        self.topic().is_some()
    }

    // ------------------------------------------------------------------
    // Synthetic names
    // ------------------------------------------------------------------

    /// Fresh synthetic identifier, pushed on the identifier stack.
    pub fn new_identifier(&mut self) -> String {
        self.identifiers.allocate()
    }

    /// Pop the most recent synthetic identifier.
    ///
    /// # Panics
    ///
    /// Panics if no identifier is outstanding.
    pub fn release_last_identifier(&mut self) -> String {
        self.identifiers.release()
    }

    /// Restart the loop-variable cursor and return `a`.
    pub fn new_loop_variable(&mut self) -> String {
        self.loop_vars.restart()
    }

    /// Advance the loop-variable cursor.
    pub fn next_loop_variable(&mut self) -> String {
        self.loop_vars.advance()
    }
}

#[cfg(test)]
#[path = "context/context_tests.rs"]
mod context_tests;

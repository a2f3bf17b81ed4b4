//! Specification tree produced by an IDL front-end.
//!
//! The tree is a plain description of what was written: names are unresolved,
//! annotations are raw, and every top-level declaration remembers which file
//! it came from. Interpreting it is the job of [`Context`](crate::Context).

use crate::annotation::RawAnnotation;
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

/// A parsed compilation unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Specification {
    /// Top-level definitions in file order.
    pub definitions: Vec<Definition>,

    /// Files the unit pulls in, transitively.
    pub dependencies: BTreeSet<PathBuf>,
}

/// A definition at module or file level.
#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    Module(ModuleDecl),
    Struct(StructDecl),
    Enum(EnumDecl),
    Typedef(TypedefDecl),
    Const(ConstDecl),
}

/// Where a declaration was written.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Origin {
    /// The unit's own file.
    Unit,
    /// A file pulled in through an include.
    Included(PathBuf),
}

impl Origin {
    pub fn is_unit(&self) -> bool {
        matches!(self, Origin::Unit)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDecl {
    pub name: String,
    pub annotations: Vec<RawAnnotation>,
    pub definitions: Vec<Definition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructDecl {
    pub name: String,
    pub annotations: Vec<RawAnnotation>,
    /// Inherited struct, if any.
    pub base: Option<ScopedName>,
    pub members: Vec<Member>,
    pub origin: Origin,
    /// `struct Foo;` without a body.
    pub forward: bool,
}

impl StructDecl {
    /// A struct with members and no annotations, declared in the unit itself.
    pub fn new(name: impl Into<String>, members: Vec<Member>) -> Self {
        Self {
            name: name.into(),
            annotations: Vec::new(),
            base: None,
            members,
            origin: Origin::Unit,
            forward: false,
        }
    }

    pub fn with_annotation(mut self, annotation: RawAnnotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub name: String,
    pub ty: TypeSpec,
    pub annotations: Vec<RawAnnotation>,
}

impl Member {
    pub fn new(name: impl Into<String>, ty: TypeSpec) -> Self {
        Self {
            name: name.into(),
            ty,
            annotations: Vec::new(),
        }
    }

    pub fn with_annotation(mut self, annotation: RawAnnotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub name: String,
    pub annotations: Vec<RawAnnotation>,
    pub enumerators: Vec<String>,
    pub origin: Origin,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedefDecl {
    pub name: String,
    pub ty: TypeSpec,
    pub origin: Origin,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstDecl {
    pub name: String,
    pub ty: TypeSpec,
    /// Literal expression text, tokens joined by single spaces.
    pub value: String,
    pub origin: Origin,
}

/// A possibly qualified name such as `geo::Point` or `::geo::Point`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopedName {
    pub absolute: bool,
    pub parts: Vec<String>,
}

impl ScopedName {
    /// A relative, single-segment name.
    pub fn simple(name: impl Into<String>) -> Self {
        Self {
            absolute: false,
            parts: vec![name.into()],
        }
    }

    /// Parse `a::b::c`, with an optional leading `::`.
    pub fn parse(text: &str) -> Self {
        let absolute = text.starts_with("::");
        let parts = text
            .trim_start_matches("::")
            .split("::")
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        Self { absolute, parts }
    }

    /// Last segment.
    pub fn name(&self) -> &str {
        self.parts.last().map(String::as_str).unwrap_or_default()
    }
}

impl fmt::Display for ScopedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.absolute {
            f.write_str("::")?;
        }
        f.write_str(&self.parts.join("::"))
    }
}

/// Type of a member, typedef or constant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSpec {
    Primitive(PrimitiveKind),
    String {
        wide: bool,
        bound: Option<u32>,
    },
    Sequence {
        element: Box<TypeSpec>,
        bound: Option<u32>,
    },
    Array {
        element: Box<TypeSpec>,
        dimensions: Vec<u32>,
    },
    /// Reference to a declared type. Absolute once resolved by the context.
    Named(ScopedName),
}

impl TypeSpec {
    /// Unbounded narrow string.
    pub fn string() -> Self {
        TypeSpec::String {
            wide: false,
            bound: None,
        }
    }

    pub fn named(text: &str) -> Self {
        TypeSpec::Named(ScopedName::parse(text))
    }

    /// Whether the type needs loop variables to walk (arrays and sequences).
    pub fn is_collection(&self) -> bool {
        matches!(self, TypeSpec::Sequence { .. } | TypeSpec::Array { .. })
    }
}

/// IDL primitive types. The sized integer aliases (`int16`, `uint32`, ..)
/// map onto the classic names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Boolean,
    Char,
    WChar,
    Octet,
    Int8,
    UInt8,
    Short,
    UShort,
    Long,
    ULong,
    LongLong,
    ULongLong,
    Float,
    Double,
    LongDouble,
}

impl PrimitiveKind {
    /// Keyword spelling in IDL.
    pub fn idl_name(&self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Char => "char",
            PrimitiveKind::WChar => "wchar",
            PrimitiveKind::Octet => "octet",
            PrimitiveKind::Int8 => "int8",
            PrimitiveKind::UInt8 => "uint8",
            PrimitiveKind::Short => "short",
            PrimitiveKind::UShort => "unsigned short",
            PrimitiveKind::Long => "long",
            PrimitiveKind::ULong => "unsigned long",
            PrimitiveKind::LongLong => "long long",
            PrimitiveKind::ULongLong => "unsigned long long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
            PrimitiveKind::LongDouble => "long double",
        }
    }
}

//! Resolved type model.
//!
//! A type code is what templates see: names are fully scoped, member type
//! references are absolute and annotations are typed. The struct variant also
//! carries the two derived flags that drive generation, whether the struct has
//! an identity key and whether it may be a topic.

use crate::annotation::Annotation;
use crate::tree::{Origin, ScopedName, TypeSpec};
use std::cell::OnceCell;

/// Any type registered in a [`Context`](crate::Context).
#[derive(Debug, Clone)]
pub enum TypeCode {
    Struct(StructTypeCode),
    Enum(EnumTypeCode),
    Alias(AliasTypeCode),
}

impl TypeCode {
    pub fn name(&self) -> &str {
        match self {
            TypeCode::Struct(t) => t.name(),
            TypeCode::Enum(t) => &t.name,
            TypeCode::Alias(t) => &t.name,
        }
    }

    pub fn scope(&self) -> &[String] {
        match self {
            TypeCode::Struct(t) => t.scope(),
            TypeCode::Enum(t) => &t.scope,
            TypeCode::Alias(t) => &t.scope,
        }
    }

    /// `a::b::Name`
    pub fn scoped_name(&self) -> String {
        join_scoped(self.scope(), self.name())
    }

    pub fn origin(&self) -> &Origin {
        match self {
            TypeCode::Struct(t) => t.origin(),
            TypeCode::Enum(t) => &t.origin,
            TypeCode::Alias(t) => &t.origin,
        }
    }

    pub fn as_struct(&self) -> Option<&StructTypeCode> {
        match self {
            TypeCode::Struct(t) => Some(t),
            _ => None,
        }
    }
}

/// A struct member with its annotations resolved.
#[derive(Debug, Clone)]
pub struct MemberTypeCode {
    pub name: String,
    pub ty: TypeSpec,
    pub annotations: Vec<Annotation>,
}

impl MemberTypeCode {
    /// Whether the member carries `@Key` with a true value.
    pub fn is_key(&self) -> bool {
        self.annotations.iter().any(Annotation::is_true_key)
    }
}

/// Struct type code with the topic and identity-key flags.
#[derive(Debug, Clone)]
pub struct StructTypeCode {
    scope: Vec<String>,
    name: String,
    base: Option<ScopedName>,
    members: Vec<MemberTypeCode>,
    annotations: Vec<Annotation>,
    origin: Origin,
    is_topic: bool,
    has_key: OnceCell<bool>,
}

impl StructTypeCode {
    /// Build a struct type code. The topic flag is decided here, once, from
    /// the struct's own annotations.
    pub fn new(
        scope: Vec<String>,
        name: impl Into<String>,
        members: Vec<MemberTypeCode>,
        annotations: Vec<Annotation>,
        origin: Origin,
    ) -> Self {
        let is_topic = !annotations.iter().any(Annotation::is_topic_suppression);
        Self {
            scope,
            name: name.into(),
            base: None,
            members,
            annotations,
            origin,
            is_topic,
            has_key: OnceCell::new(),
        }
    }

    pub fn with_base(mut self, base: ScopedName) -> Self {
        self.base = Some(base);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scope(&self) -> &[String] {
        &self.scope
    }

    /// `a::b::Name`
    pub fn scoped_name(&self) -> String {
        join_scoped(&self.scope, &self.name)
    }

    /// `a.b.Name`, used for managed-language class names.
    pub fn dotted_name(&self) -> String {
        self.scoped_name().replace("::", ".")
    }

    pub fn base(&self) -> Option<&ScopedName> {
        self.base.as_ref()
    }

    pub fn members(&self) -> &[MemberTypeCode] {
        &self.members
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Members marked as part of the identity key, in declaration order.
    pub fn key_members(&self) -> impl Iterator<Item = &MemberTypeCode> {
        self.members.iter().filter(|m| m.is_key())
    }

    /// Whether any member carries a true `@Key`.
    ///
    /// Scans members in declaration order and stops at the first key. The
    /// answer is computed on first use and cached.
    pub fn has_identity_key(&self) -> bool {
        *self
            .has_key
            .get_or_init(|| self.members.iter().any(MemberTypeCode::is_key))
    }

    /// Whether the struct may be selected as the unit's topic. False only when
    /// annotated `@Topic(false)`.
    pub fn is_topic(&self) -> bool {
        self.is_topic
    }
}

#[derive(Debug, Clone)]
pub struct EnumTypeCode {
    pub scope: Vec<String>,
    pub name: String,
    pub enumerators: Vec<String>,
    pub origin: Origin,
}

/// `typedef` target.
#[derive(Debug, Clone)]
pub struct AliasTypeCode {
    pub scope: Vec<String>,
    pub name: String,
    pub ty: TypeSpec,
    pub origin: Origin,
}

/// A resolved `const` declaration.
#[derive(Debug, Clone)]
pub struct Constant {
    pub scope: Vec<String>,
    pub name: String,
    pub ty: TypeSpec,
    pub value: String,
    pub origin: Origin,
}

pub(crate) fn join_scoped(scope: &[String], name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{}::{}", scope.join("::"), name)
    }
}

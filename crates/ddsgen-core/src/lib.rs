//! ddsgen-core - Semantic model for IDL compilation units
//!
//! This crate provides the pieces of ddsgen that interpret parsed IDL:
//! - [`Annotation`] typed view over the well-known `@Key` and `@Topic` annotations
//! - [`StructTypeCode`] and friends, the resolved type model handed to templates
//! - [`Context`] per-unit state: scopes, registered types, the selected topic,
//!   synthetic identifier allocators and feature flags
//! - [`Specification`] tree and the [`IdlFrontEnd`] trait with a bundled
//!   [`BuiltinFrontEnd`]

mod allocator;
mod annotation;
mod context;
mod error;
mod tree;
mod typecode;

pub mod frontend;

pub use allocator::{IdentifierStack, LoopVariables};
pub use annotation::{Annotation, AnnotationParam, RawAnnotation};
pub use context::{Context, FeatureFlags, JavaPackage, Language};
pub use error::{IdlError, IdlResult};
pub use frontend::{BuiltinFrontEnd, IdlFrontEnd};
pub use tree::{
    ConstDecl, Definition, EnumDecl, Member, ModuleDecl, Origin, PrimitiveKind, ScopedName,
    Specification, StructDecl, TypeSpec, TypedefDecl,
};
pub use typecode::{
    AliasTypeCode, Constant, EnumTypeCode, MemberTypeCode, StructTypeCode, TypeCode,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Annotation, BuiltinFrontEnd, Context, IdlError, IdlFrontEnd, IdlResult, Language,
        Specification, StructTypeCode, TypeCode,
    };
}

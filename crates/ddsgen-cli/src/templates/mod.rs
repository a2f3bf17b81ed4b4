//! Template groups for generated sources and build files.
//!
//! The generator never builds file contents itself: it asks a
//! [`TemplateEngine`] to render a named group with a bag of [`Attributes`].
//! [`BuiltinTemplates`] renders every group this tool emits by writing the
//! text directly; an engine loading templates from disk can replace it.
//!
//! # Groups
//!
//! | Group | Attributes | Output |
//! |-------|------------|--------|
//! | `TypesHeader`, `TypesSource` | unit | `<Unit>.h`, `<Unit>.cxx` |
//! | `TypeObjectHeader`, `TypeObjectSource` | unit | `<Unit>TypeObject.h/.cxx` |
//! | `PubSubTypeHeader`, `PubSubTypeSource` | unit | `<Unit>PubSubTypes.h/.cxx` |
//! | `PublisherHeader`, `PublisherSource` | unit | `<Unit>Publisher.h/.cxx` |
//! | `SubscriberHeader`, `SubscriberSource` | unit | `<Unit>Subscriber.h/.cxx` |
//! | `PubSubMain` | unit | `<Unit>PubSubMain.cxx` |
//! | `JavaType` | managed type | `<Type>.java` |
//! | `JavaSource` | unit | `<Unit>PubSub.java` |
//! | `JNIHeader`, `JNISource` | unit | `<Unit>PubSubJNII.h`, `<Unit>PubSubJNI.cxx` |
//! | `makecxx` | build | `makefile_<platform>` |
//! | `cmakelists` | build | `CMakeLists.txt` |
//! | `solution` | build | `solution-<platform>.sln` |
//! | `project`, `projectFiles` | project | `<Unit><Kind>-<platform>.vcxproj(.filters)` |

mod cmake;
mod cpp;
mod java;
mod makefile;
mod naming;
mod pubsub;
mod visual_studio;

use crate::config::ProductConfig;
use crate::error::{GenerateError, GenerateResult};
use ddsgen_core::{Context, TypeCode};
use ddsgen_solution::{Backend, GuidKind, Platform, Project, Solution};

pub use java::managed_package;
pub use naming::{cpp_type, java_type};
pub use visual_studio::{project_file_name, project_kinds};

/// Group names understood by [`BuiltinTemplates`].
pub mod group {
    pub const TYPES_HEADER: &str = "TypesHeader";
    pub const TYPES_SOURCE: &str = "TypesSource";
    pub const TYPE_OBJECT_HEADER: &str = "TypeObjectHeader";
    pub const TYPE_OBJECT_SOURCE: &str = "TypeObjectSource";
    pub const PUBSUB_TYPE_HEADER: &str = "PubSubTypeHeader";
    pub const PUBSUB_TYPE_SOURCE: &str = "PubSubTypeSource";
    pub const PUBLISHER_HEADER: &str = "PublisherHeader";
    pub const PUBLISHER_SOURCE: &str = "PublisherSource";
    pub const SUBSCRIBER_HEADER: &str = "SubscriberHeader";
    pub const SUBSCRIBER_SOURCE: &str = "SubscriberSource";
    pub const PUBSUB_MAIN: &str = "PubSubMain";
    pub const JAVA_TYPE: &str = "JavaType";
    pub const JAVA_SOURCE: &str = "JavaSource";
    pub const JNI_HEADER: &str = "JNIHeader";
    pub const JNI_SOURCE: &str = "JNISource";
    pub const MAKEFILE: &str = "makecxx";
    pub const CMAKE_LISTS: &str = "cmakelists";
    pub const VS_SOLUTION: &str = "solution";
    pub const VS_PROJECT: &str = "project";
    pub const VS_PROJECT_FILES: &str = "projectFiles";
}

/// Attributes for templates rendered once per unit.
#[derive(Debug, Clone, Copy)]
pub struct UnitAttributes<'a> {
    pub ctx: &'a Context,
    /// Requested example platform, if any.
    pub example: Option<&'a Platform>,
    pub product: &'a ProductConfig,
}

/// Attributes for build-backend templates.
#[derive(Debug, Clone, Copy)]
pub struct BuildAttributes<'a> {
    pub solution: &'a Solution,
    pub platform: &'a Platform,
    pub backend: Backend,
    pub product: &'a ProductConfig,
}

/// The attribute bag handed to a template group.
#[derive(Debug, Clone, Copy)]
pub enum Attributes<'a> {
    Unit(UnitAttributes<'a>),
    /// One declared type of the unit, for the managed binding.
    ManagedType {
        unit: UnitAttributes<'a>,
        ty: &'a TypeCode,
    },
    Build(BuildAttributes<'a>),
    /// One IDE project of a unit.
    Project {
        build: BuildAttributes<'a>,
        project: &'a Project,
        kind: GuidKind,
    },
}

/// Renders a template group with the given attributes.
pub trait TemplateEngine: Send + Sync {
    /// Fails with [`GenerateError::Template`] when the group cannot be
    /// loaded or does not accept the attributes.
    fn render(&self, group: &str, attributes: &Attributes<'_>) -> GenerateResult<String>;
}

/// Engine with every group compiled in.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTemplates;

impl TemplateEngine for BuiltinTemplates {
    fn render(&self, name: &str, attributes: &Attributes<'_>) -> GenerateResult<String> {
        match (name, attributes) {
            (group::TYPES_HEADER, Attributes::Unit(unit)) => Ok(cpp::types_header(unit)),
            (group::TYPES_SOURCE, Attributes::Unit(unit)) => Ok(cpp::types_source(unit)),
            (group::TYPE_OBJECT_HEADER, Attributes::Unit(unit)) => {
                Ok(cpp::type_object_header(unit))
            }
            (group::TYPE_OBJECT_SOURCE, Attributes::Unit(unit)) => {
                Ok(cpp::type_object_source(unit))
            }
            (group::PUBSUB_TYPE_HEADER, Attributes::Unit(unit)) => pubsub::pubsub_type_header(unit),
            (group::PUBSUB_TYPE_SOURCE, Attributes::Unit(unit)) => pubsub::pubsub_type_source(unit),
            (group::PUBLISHER_HEADER, Attributes::Unit(unit)) => pubsub::publisher_header(unit),
            (group::PUBLISHER_SOURCE, Attributes::Unit(unit)) => pubsub::publisher_source(unit),
            (group::SUBSCRIBER_HEADER, Attributes::Unit(unit)) => pubsub::subscriber_header(unit),
            (group::SUBSCRIBER_SOURCE, Attributes::Unit(unit)) => pubsub::subscriber_source(unit),
            (group::PUBSUB_MAIN, Attributes::Unit(unit)) => pubsub::pubsub_main(unit),
            (group::JAVA_TYPE, Attributes::ManagedType { unit, ty }) => {
                java::java_type_source(unit, ty)
            }
            (group::JAVA_SOURCE, Attributes::Unit(unit)) => java::pubsub_wrapper(unit),
            (group::JNI_HEADER, Attributes::Unit(unit)) => Ok(java::jni_header(unit)),
            (group::JNI_SOURCE, Attributes::Unit(unit)) => Ok(java::jni_source(unit)),
            (group::MAKEFILE, Attributes::Build(build)) => makefile::makefile(build),
            (group::CMAKE_LISTS, Attributes::Build(build)) => Ok(cmake::cmake_lists(build)),
            (group::VS_SOLUTION, Attributes::Build(build)) => visual_studio::solution(build),
            (group::VS_PROJECT, Attributes::Project { build, project, kind }) => {
                visual_studio::project(build, project, *kind)
            }
            (group::VS_PROJECT_FILES, Attributes::Project { project, kind, .. }) => {
                Ok(visual_studio::project_filters(project, *kind))
            }
            (name, _) if is_known(name) => Err(GenerateError::Template(format!(
                "template group {name} does not accept these attributes"
            ))),
            (name, _) => Err(GenerateError::Template(format!(
                "cannot load the template group {name}"
            ))),
        }
    }
}

fn is_known(name: &str) -> bool {
    [
        group::TYPES_HEADER,
        group::TYPES_SOURCE,
        group::TYPE_OBJECT_HEADER,
        group::TYPE_OBJECT_SOURCE,
        group::PUBSUB_TYPE_HEADER,
        group::PUBSUB_TYPE_SOURCE,
        group::PUBLISHER_HEADER,
        group::PUBLISHER_SOURCE,
        group::SUBSCRIBER_HEADER,
        group::SUBSCRIBER_SOURCE,
        group::PUBSUB_MAIN,
        group::JAVA_TYPE,
        group::JAVA_SOURCE,
        group::JNI_HEADER,
        group::JNI_SOURCE,
        group::MAKEFILE,
        group::CMAKE_LISTS,
        group::VS_SOLUTION,
        group::VS_PROJECT,
        group::VS_PROJECT_FILES,
    ]
    .contains(&name)
}

/// The unit's topic, for groups that only make sense with one.
fn require_topic<'a>(
    unit: &UnitAttributes<'a>,
    group: &str,
) -> GenerateResult<&'a ddsgen_core::StructTypeCode> {
    unit.ctx.topic().ok_or_else(|| {
        GenerateError::Template(format!("template group {group} needs a topic type"))
    })
}

/// Banner written at the top of every generated source.
fn banner(out: &mut String, comment: &str, file: &str) {
    out.push_str(&format!(
        "{comment} This file was generated by ddsgen from the IDL file {file}.\n"
    ));
    out.push_str(&format!(
        "{comment} Edits are kept when regenerating unless files are replaced.\n\n"
    ));
}

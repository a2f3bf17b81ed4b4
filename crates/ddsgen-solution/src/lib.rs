//! ddsgen-solution - Project and solution model for generated build files
//!
//! This crate describes what was generated and how to build it:
//! - [`Project`] one IDL unit, its generated files grouped by [`FileRole`] and
//!   its IDL dependencies
//! - [`Solution`] every project of a run plus accumulated include paths and
//!   libraries, with dependency ordering across projects
//! - [`Platform`] and [`PlatformRegistry`] the known build targets, and the
//!   [`Backend`] each one selects
//!
//! # Example
//!
//! ```
//! use ddsgen_core::Language;
//! use ddsgen_solution::{FileRole, PlatformRegistry, Project, Solution};
//!
//! let platform = PlatformRegistry::builtin().parse("x64Linux2.6gcc")?;
//! let mut solution = Solution::new(Language::Cpp, Some(platform), "1.5");
//!
//! let mut project = Project::new("Shapes", "Shapes.idl");
//! project.add_header(FileRole::Common, "Shapes.h");
//! solution.add_project(project);
//! solution.add_library("fastrtps");
//!
//! assert_eq!(solution.dependency_order()[0].name(), "Shapes");
//! # Ok::<(), ddsgen_solution::SolutionError>(())
//! ```

mod error;
mod platform;
mod project;
mod solution;

pub use error::SolutionError;
pub use platform::{
    Arch, BUILTIN_PLATFORMS, Backend, LinkVariant, Platform, PlatformRegistry, VsConfiguration,
    VsTarget, VsToolset,
};
pub use project::{FileRole, GuidKind, Project, RoleFiles, stable_guid};
pub use solution::Solution;

/// Result type for solution operations.
pub type SolutionResult<T> = Result<T, SolutionError>;

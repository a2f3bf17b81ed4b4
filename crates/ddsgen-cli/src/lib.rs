//! ddsgen - IDL to publish/subscribe code generator
//!
//! The library half of the `ddsgen` binary:
//! - [`config`]: configuration file, command-line overrides and validation
//! - [`generate`]: the per-unit pipeline and build-file emission
//! - [`templates`]: template groups and the built-in engine
//! - [`writer`]: idempotent file output

pub mod config;
pub mod error;
pub mod generate;
pub mod logging;
pub mod templates;
pub mod writer;

pub use config::{ConfigFile, GeneratorConfig, GeneratorSection, PreprocessorSetting, ProductConfig};
pub use error::{GenerateError, GenerateResult};
pub use generate::{Generator, RunSummary, Stage, UnitFailure};
pub use templates::{Attributes, BuiltinTemplates, TemplateEngine};
pub use writer::{ArtifactWriter, WriteOutcome};

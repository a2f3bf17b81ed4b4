//! ddsgen-toolchain - external tools driven by the generator
//!
//! Runs the C preprocessor ahead of parsing and the managed-language
//! compiler and native-header generator after the managed binding is
//! written. Every tool runs through [`ToolInvoker`], which drains standard
//! output and standard error concurrently and reports the exit code.

mod command;
mod error;
mod invoker;
mod managed;
mod preprocessor;

pub use command::{CommandLine, HostOs, RunOptions};
pub use error::{ToolchainError, ToolchainResult};
pub use invoker::{ToolInvoker, rewrite_line_marker};
pub use managed::{ManagedToolchain, NativeHeaderJob};
pub use preprocessor::Preprocessor;

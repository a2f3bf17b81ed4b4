//! C preprocessor invocation.
//!
//! On Windows `cl.exe /E /C` writes the expanded source to standard output,
//! which is captured into the output file with `#line` markers rewritten.
//! Elsewhere `cpp` takes the output file as its last argument.

use crate::command::{CommandLine, HostOs, RunOptions};
use crate::error::ToolchainResult;
use crate::invoker::ToolInvoker;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Preprocessor {
    host: HostOs,
    program: Option<PathBuf>,
    include_paths: Vec<PathBuf>,
}

impl Preprocessor {
    pub fn new(host: HostOs) -> Self {
        Self {
            host,
            program: None,
            include_paths: Vec::new(),
        }
    }

    /// Use a specific preprocessor executable instead of the host default.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = Some(program.into());
        self
    }

    pub fn with_include_paths(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.include_paths.extend(paths);
        self
    }

    #[must_use]
    pub fn program(&self) -> PathBuf {
        match (&self.program, self.host) {
            (Some(program), _) => program.clone(),
            (None, HostOs::Windows) => PathBuf::from("cl.exe"),
            (None, HostOs::Unix) => PathBuf::from("cpp"),
        }
    }

    /// Command line and run options that preprocess `input` into `output`.
    #[must_use]
    pub fn command(&self, input: &Path, output: &Path) -> (CommandLine, RunOptions) {
        let mut cmd = CommandLine::new(self.program());
        let flag = match self.host {
            HostOs::Windows => "/I",
            HostOs::Unix => "-I",
        };
        for path in &self.include_paths {
            cmd = cmd.arg(format!("{flag}{}", path.display()));
        }

        match self.host {
            HostOs::Windows => {
                let cmd = cmd.arg("/E").arg("/C").path_arg(input);
                (cmd, RunOptions::default().with_redirect(output))
            }
            HostOs::Unix => {
                let cmd = cmd.path_arg(input).path_arg(output);
                (cmd, RunOptions::default())
            }
        }
    }

    /// Preprocess `input` into `output`. A non-zero exit code is an error.
    pub fn run(&self, invoker: &ToolInvoker, input: &Path, output: &Path) -> ToolchainResult<()> {
        let (cmd, options) = self.command(input, output);
        debug!(input = %input.display(), output = %output.display(), "Preprocessing");

        invoker.run_checked(&cmd, &options)
    }
}

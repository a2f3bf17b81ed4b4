//! Managed-language compiler and native-header generator.

use crate::command::{CommandLine, HostOs, RunOptions};
use crate::error::ToolchainResult;
use crate::invoker::ToolInvoker;
use std::path::PathBuf;
use tracing::info;

/// What to compile for one unit's managed binding.
#[derive(Debug, Clone)]
pub struct NativeHeaderJob {
    /// Unit name; the entry class is `<unit>PubSub`.
    pub unit: String,
    /// Dotted package, empty for the default package.
    pub package: String,
    /// Root the managed sources were written under.
    pub output_dir: PathBuf,
    /// Where compiled classes go, when not next to the sources.
    pub class_dir: Option<PathBuf>,
}

impl NativeHeaderJob {
    /// `<output>/<package path>/<unit>PubSub.java`
    #[must_use]
    pub fn source_file(&self) -> PathBuf {
        let mut path = self.output_dir.clone();
        for part in self.package.split('.').filter(|p| !p.is_empty()) {
            path.push(part);
        }
        path.push(format!("{}PubSub.java", self.unit));
        path
    }

    /// `<output>/<unit>PubSubJNI.h`
    #[must_use]
    pub fn header_file(&self) -> PathBuf {
        self.output_dir.join(format!("{}PubSubJNI.h", self.unit))
    }

    /// Fully qualified entry class name.
    #[must_use]
    pub fn class_name(&self) -> String {
        if self.package.is_empty() {
            format!("{}PubSub", self.unit)
        } else {
            format!("{}.{}PubSub", self.package, self.unit)
        }
    }
}

#[derive(Debug, Clone)]
pub struct ManagedToolchain {
    javac: PathBuf,
    javah: PathBuf,
}

impl ManagedToolchain {
    /// Host default tool names.
    #[must_use]
    pub fn for_host(host: HostOs) -> Self {
        Self {
            javac: PathBuf::from(host.executable("javac")),
            javah: PathBuf::from(host.executable("javah")),
        }
    }

    pub fn with_javac(mut self, program: impl Into<PathBuf>) -> Self {
        self.javac = program.into();
        self
    }

    pub fn with_javah(mut self, program: impl Into<PathBuf>) -> Self {
        self.javah = program.into();
        self
    }

    #[must_use]
    pub fn compile_command(&self, job: &NativeHeaderJob) -> CommandLine {
        let mut cmd = CommandLine::new(&self.javac);
        if let Some(dir) = &job.class_dir {
            cmd = cmd.arg("-d").path_arg(dir);
        }
        cmd.arg("-sourcepath")
            .path_arg(&job.output_dir)
            .path_arg(&job.source_file())
    }

    #[must_use]
    pub fn header_command(&self, job: &NativeHeaderJob) -> CommandLine {
        let mut cmd = CommandLine::new(&self.javah).arg("-jni");
        if let Some(dir) = &job.class_dir {
            cmd = cmd.arg("-cp").path_arg(dir);
        }
        cmd.arg("-o")
            .path_arg(&job.header_file())
            .arg(job.class_name())
    }

    /// Compile the managed sources, then derive the native header from the
    /// compiled entry class. Returns the header path.
    pub fn generate_native_header(
        &self,
        invoker: &ToolInvoker,
        job: &NativeHeaderJob,
    ) -> ToolchainResult<PathBuf> {
        let options = RunOptions::default();

        invoker.run_checked(&self.compile_command(job), &options)?;
        invoker.run_checked(&self.header_command(job), &options)?;

        let header = job.header_file();
        info!(header = %header.display(), "Generated native header");
        Ok(header)
    }
}

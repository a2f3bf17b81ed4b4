//! Running external tools with both output streams drained concurrently.
//!
//! A child that fills one pipe while the parent blocks on the other never
//! finishes, so standard output and standard error are each read by their
//! own task until end of stream, and only then is the exit code reported.

use crate::command::{CommandLine, RunOptions};
use crate::error::{ToolchainError, ToolchainResult};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader, BufWriter};
use tokio::process::Command;
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info, warn};

/// Runs external tools to completion from synchronous code.
pub struct ToolInvoker {
    runtime: Runtime,
}

impl ToolInvoker {
    pub fn new() -> ToolchainResult<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ToolchainError::Runtime(format!("Failed to create runtime: {e}")))?;

        Ok(Self { runtime })
    }

    /// Run `cmd` and return its exit code. A process killed by a signal
    /// reports `-1`.
    pub fn run(&self, cmd: &CommandLine, options: &RunOptions) -> ToolchainResult<i32> {
        self.runtime.block_on(run_async(cmd, options))
    }

    /// Like [`run`](Self::run), but a non-zero exit code is an error.
    pub fn run_checked(&self, cmd: &CommandLine, options: &RunOptions) -> ToolchainResult<()> {
        match self.run(cmd, options)? {
            0 => Ok(()),
            code => Err(ToolchainError::NonZeroExit {
                program: cmd.tool_name(),
                code,
            }),
        }
    }
}

/// Rewrite a `#line N "file"` marker to the `# N "file"` form and collapse
/// doubled backslashes in it. Other lines pass through untouched.
#[must_use]
pub fn rewrite_line_marker(line: &str) -> Cow<'_, str> {
    match line.strip_prefix("#line") {
        Some(rest) => Cow::Owned(format!("#{rest}").replace("\\\\", "\\")),
        None => Cow::Borrowed(line),
    }
}

async fn run_async(cmd: &CommandLine, options: &RunOptions) -> ToolchainResult<i32> {
    let tool = cmd.tool_name();
    debug!(command = %cmd, "Running external tool");

    let mut command = Command::new(cmd.program());
    command
        .args(cmd.arguments())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = &options.working_dir {
        command.current_dir(dir);
    }

    let mut child = command.spawn().map_err(|source| ToolchainError::Launch {
        program: cmd.program().display().to_string(),
        source,
    })?;

    // Only touch the redirect target once the tool is running. On error the
    // child is killed when dropped.
    let sink = match &options.redirect {
        Some(path) => Some(RedirectSink::create(path).await?),
        None => None,
    };

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| ToolchainError::Runtime("stdout was not captured".to_string()))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| ToolchainError::Runtime("stderr was not captured".to_string()))?;

    let out_task = tokio::spawn(drain_stdout(stdout, sink, tool.clone()));
    let err_task = tokio::spawn(drain_stderr(stderr, tool.clone()));

    let status = child.wait().await?;

    let out_result = out_task
        .await
        .map_err(|e| ToolchainError::Runtime(format!("stdout reader failed: {e}")))?;
    let err_result = err_task
        .await
        .map_err(|e| ToolchainError::Runtime(format!("stderr reader failed: {e}")))?;
    out_result?;
    err_result?;

    let code = status.code().unwrap_or(-1);
    debug!(tool = %tool, code, "External tool finished");
    Ok(code)
}

struct RedirectSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl RedirectSink {
    async fn create(path: &Path) -> ToolchainResult<Self> {
        let file = File::create(path)
            .await
            .map_err(|source| ToolchainError::Redirect {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    async fn write_line(&mut self, line: &str) -> ToolchainResult<()> {
        let result = async {
            self.writer.write_all(line.as_bytes()).await?;
            self.writer.write_all(b"\n").await
        }
        .await;
        result.map_err(|source| self.error(source))
    }

    async fn finish(mut self) -> ToolchainResult<()> {
        match self.writer.flush().await {
            Ok(()) => Ok(()),
            Err(source) => Err(self.error(source)),
        }
    }

    fn error(&self, source: std::io::Error) -> ToolchainError {
        ToolchainError::Redirect {
            path: self.path.clone(),
            source,
        }
    }
}

async fn drain_stdout<R>(stdout: R, sink: Option<RedirectSink>, tool: String) -> ToolchainResult<()>
where
    R: AsyncRead + Unpin,
{
    let mut segments = BufReader::new(stdout).split(b'\n');

    match sink {
        Some(mut sink) => {
            while let Some(segment) = segments.next_segment().await? {
                let line = String::from_utf8_lossy(&segment);
                sink.write_line(&rewrite_line_marker(line.trim_end_matches('\r')))
                    .await?;
            }
            sink.finish().await
        }
        None => {
            while let Some(segment) = segments.next_segment().await? {
                let line = String::from_utf8_lossy(&segment);
                info!(tool = %tool, "{}", line.trim_end_matches('\r'));
            }
            Ok(())
        }
    }
}

async fn drain_stderr<R>(stderr: R, tool: String) -> ToolchainResult<()>
where
    R: AsyncRead + Unpin,
{
    let mut segments = BufReader::new(stderr).split(b'\n');
    while let Some(segment) = segments.next_segment().await? {
        let line = String::from_utf8_lossy(&segment);
        warn!(tool = %tool, "{}", line.trim_end_matches('\r'));
    }
    Ok(())
}

#[cfg(test)]
#[path = "invoker/invoker_tests.rs"]
mod invoker_tests;

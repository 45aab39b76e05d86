//! External process execution for the packager and renderer collaborators.

use crate::bundler::{Error, Result};
use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
    process::{ExitStatus, Stdio},
    time::Duration,
};
use tokio::{
    io::{AsyncBufReadExt, AsyncReadExt, BufReader},
    process::Command,
};

/// Result of a streamed process run.
#[derive(Debug)]
pub struct StreamedRun {
    /// Exit status of the process.
    pub status: ExitStatus,
    /// Captured stderr lines.
    pub stderr_lines: Vec<String>,
}

/// Result of a captured process run.
#[derive(Debug)]
pub struct CapturedRun {
    /// Exit status of the process.
    pub status: ExitStatus,
    /// Raw stdout bytes.
    pub stdout: Vec<u8>,
    /// Raw stderr, lossily decoded.
    pub stderr: String,
}

/// Resolves `program` to an executable path.
///
/// Paths containing a separator are used as given; bare names are looked up
/// in `PATH`.
pub fn resolve_program(program: &Path) -> Result<PathBuf> {
    if program.components().count() > 1 {
        if program.is_file() {
            return Ok(program.to_path_buf());
        }
        return Err(Error::ToolNotFound(program.display().to_string()));
    }

    match which::which(program) {
        Ok(path) => {
            log::debug!("Found {} at: {}", program.display(), path.display());
            Ok(path)
        }
        Err(e) => {
            log::debug!("{} not found in PATH: {}", program.display(), e);
            Err(Error::ToolNotFound(program.display().to_string()))
        }
    }
}

/// Runs `program`, logging stdout line by line and capturing stderr.
///
/// The process is killed when `timeout` elapses.
pub async fn run_streaming<I, S>(program: &Path, args: I, timeout: Duration) -> Result<StreamedRun>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| spawn_error(program, e))?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let label = display_name(program);

    // Both streams must be drained before the exit status is meaningful.
    let outcome = tokio::time::timeout(timeout, async {
        let (_, stderr_lines) = tokio::join!(
            async {
                if let Some(stdout) = stdout {
                    let mut lines = BufReader::new(stdout).lines();
                    while let Ok(Some(line)) = lines.next_line().await {
                        log::info!("[{label}] {line}");
                    }
                }
            },
            async {
                let mut captured = Vec::new();
                if let Some(stderr) = stderr {
                    let mut lines = BufReader::new(stderr).lines();
                    while let Ok(Some(line)) = lines.next_line().await {
                        log::debug!("[{label}] {line}");
                        captured.push(line);
                    }
                }
                captured
            }
        );
        (child.wait().await, stderr_lines)
    })
    .await;

    match outcome {
        Ok((Ok(status), stderr_lines)) => Ok(StreamedRun {
            status,
            stderr_lines,
        }),
        Ok((Err(e), _)) => Err(spawn_error(program, e)),
        Err(_elapsed) => Err(terminate(&mut child, program, timeout).await),
    }
}

/// Runs `program` and collects its raw stdout.
///
/// The process is killed when `timeout` elapses.
pub async fn run_captured<I, S>(program: &Path, args: I, timeout: Duration) -> Result<CapturedRun>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| spawn_error(program, e))?;

    let stdout_pipe = child.stdout.take();
    let stderr_pipe = child.stderr.take();

    let outcome = tokio::time::timeout(timeout, async {
        let (stdout, stderr) = tokio::join!(
            async {
                let mut buf = Vec::new();
                if let Some(mut pipe) = stdout_pipe {
                    let _ = pipe.read_to_end(&mut buf).await;
                }
                buf
            },
            async {
                let mut buf = Vec::new();
                if let Some(mut pipe) = stderr_pipe {
                    let _ = pipe.read_to_end(&mut buf).await;
                }
                String::from_utf8_lossy(&buf).into_owned()
            }
        );
        (child.wait().await, stdout, stderr)
    })
    .await;

    match outcome {
        Ok((Ok(status), stdout, stderr)) => Ok(CapturedRun {
            status,
            stdout,
            stderr,
        }),
        Ok((Err(e), _, _)) => Err(spawn_error(program, e)),
        Err(_elapsed) => Err(terminate(&mut child, program, timeout).await),
    }
}

async fn terminate(child: &mut tokio::process::Child, program: &Path, timeout: Duration) -> Error {
    log::warn!(
        "{} timed out after {}s, terminating...",
        program.display(),
        timeout.as_secs()
    );
    if let Err(e) = child.kill().await {
        log::warn!("Failed to kill {}: {}", program.display(), e);
    }
    Error::GenericError(format!(
        "{} timed out after {}s",
        program.display(),
        timeout.as_secs()
    ))
}

fn spawn_error(program: &Path, error: std::io::Error) -> Error {
    Error::GenericError(format!("failed to execute {}: {}", program.display(), error))
}

fn display_name(program: &Path) -> String {
    program
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.display().to_string())
}

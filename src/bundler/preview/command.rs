//! Renderer backed by an external program.

use super::PreviewRenderer;
use crate::bundler::{Error, Result, utils::process};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

/// Default time allowed for one preview.
pub const RENDER_TIMEOUT: Duration = Duration::from_secs(60);

/// Runs `<program> [args...] <staged asset>` and reads the image from stdout.
#[derive(Clone, Debug)]
pub struct CommandRenderer {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandRenderer {
    /// Renderer running `program`, resolved through `PATH` when it is a bare name.
    pub fn new(program: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            program: process::resolve_program(program.as_ref())?,
            args: Vec::new(),
            timeout: RENDER_TIMEOUT,
        })
    }

    /// Extra arguments placed before the asset path.
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Time allowed for one preview.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl PreviewRenderer for CommandRenderer {
    async fn render_preview(&self, staged_asset: &Path) -> Result<Vec<u8>> {
        let mut args: Vec<std::ffi::OsString> = self.args.iter().map(Into::into).collect();
        args.push(staged_asset.as_os_str().to_owned());

        let run = process::run_captured(&self.program, &args, self.timeout).await?;
        if !run.status.success() {
            return Err(Error::GenericError(format!(
                "{} exited with {:?}: {}",
                self.program.display(),
                run.status.code(),
                run.stderr.trim()
            )));
        }
        Ok(run.stdout)
    }
}

//! Packager backed by an external program.

use super::{PackageRequest, Packager};
use crate::bundler::{Error, Result, utils::process};
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    time::Duration,
};

/// Default time allowed for one packager run (20 minutes).
pub const PACKAGER_TIMEOUT: Duration = Duration::from_secs(1200);

/// Runs an external packager once over the whole staged tree.
///
/// The program is invoked as
///
/// ```text
/// <program> [args...] --source <asset folder> --output <export folder>
///           --platform <id> --extension <ext> [option flags...]
/// ```
///
/// with one flag per enabled packaging option plus `--lower-case-names`.
/// Stdout is logged line by line; stderr is captured into the failure. A
/// non-zero exit is retried up to `retries` times.
#[derive(Clone, Debug)]
pub struct CommandPackager {
    program: PathBuf,
    label: String,
    args: Vec<String>,
    timeout: Duration,
    retries: u32,
}

impl CommandPackager {
    /// Packager running `program`, resolved through `PATH` when it is a bare name.
    pub fn new(program: impl AsRef<Path>) -> Result<Self> {
        let program = program.as_ref();
        Ok(Self {
            label: program.display().to_string(),
            program: process::resolve_program(program)?,
            args: Vec::new(),
            timeout: PACKAGER_TIMEOUT,
            retries: 0,
        })
    }

    /// Extra arguments placed before the generated flags.
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Time allowed for one attempt.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Extra attempts after a failed run.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Full argument list for `request`.
    pub fn command_args(&self, request: &PackageRequest) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.args.iter().map(Into::into).collect();
        args.push("--source".into());
        args.push(request.source_root.clone().into_os_string());
        args.push("--output".into());
        args.push(request.output_root.clone().into_os_string());
        args.push("--platform".into());
        args.push(request.platform.as_str().into());
        args.push("--extension".into());
        args.push(request.bundle_extension.clone().into());
        args.extend(request.options.flags().into_iter().map(Into::into));
        if request.lower_case_names {
            args.push("--lower-case-names".into());
        }
        args
    }

    async fn attempt(&self, args: &[OsString]) -> Result<()> {
        let run = process::run_streaming(&self.program, args, self.timeout).await?;
        if run.status.success() {
            return Ok(());
        }

        let stderr = run.stderr_lines.join("\n");
        let error_output = if stderr.is_empty() {
            "No error output captured".to_string()
        } else {
            format!("stderr:\n{stderr}")
        };
        Err(Error::GenericError(format!(
            "exit code {:?}\n{error_output}",
            run.status.code()
        )))
    }
}

impl Packager for CommandPackager {
    fn name(&self) -> &str {
        &self.label
    }

    async fn build_bundles(&self, request: &PackageRequest) -> Result<()> {
        let args = self.command_args(request);
        let attempts = self.retries.saturating_add(1);

        let mut last_error = None;
        for attempt in 1..=attempts {
            log::info!(
                "Running packager {} (attempt {}/{})",
                self.program.display(),
                attempt,
                attempts
            );
            match self.attempt(&args).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    if attempt < attempts {
                        log::warn!("Packager attempt {attempt} failed: {e}; retrying");
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(Error::PackagerFailed {
            program: self.label.clone(),
            reason: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no attempt was made".to_string()),
        })
    }
}

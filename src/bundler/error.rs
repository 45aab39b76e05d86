//! Error types for the asset bundle pipeline.
//!
//! Structural failures abort a build and are wrapped in [`Error::Stage`] so the
//! caller can tell which stage failed. Recoverable problems never surface here;
//! they are collected as warnings on the build report instead.

use std::{
    fmt::Display,
    io,
    path::{Path, PathBuf},
};
use thiserror::Error as DeriveError;

use super::builder::BuildStage;

/// Result type alias for bundler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the bundle pipeline.
#[derive(Debug, DeriveError)]
#[non_exhaustive]
pub enum Error {
    /// Error with a free-form message.
    #[error("{0}")]
    GenericError(String),

    /// Filesystem error with the action and path that caused it.
    #[error("{context} {}: {error}", .path.display())]
    Fs {
        /// What was being attempted.
        context: &'static str,
        /// Path involved.
        path: PathBuf,
        /// Underlying error.
        error: io::Error,
    },

    /// Plain I/O error.
    #[error(transparent)]
    IoError(#[from] io::Error),

    /// JSON serialization error.
    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    /// Directory traversal error.
    #[error(transparent)]
    WalkdirError(#[from] walkdir::Error),

    /// Path prefix error while computing relative paths.
    #[error(transparent)]
    StripError(#[from] std::path::StripPrefixError),

    /// Image decoding or encoding error.
    #[error(transparent)]
    ImageError(#[from] image::ImageError),

    /// Settings file could not be parsed.
    #[error("invalid settings file: {0}")]
    SettingsParse(#[from] toml::de::Error),

    /// Settings could not be serialized.
    #[error("failed to serialize settings: {0}")]
    SettingsSerialize(#[from] toml::ser::Error),

    /// Invalid settings value.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// A source item could not be staged.
    #[error("failed to stage {}: {reason}", .path.display())]
    StageFailure {
        /// Source item path.
        path: PathBuf,
        /// Why staging failed.
        reason: String,
    },

    /// The external packager reported failure.
    #[error("packager `{program}` failed: {reason}")]
    PackagerFailed {
        /// Packager program or name.
        program: String,
        /// Failure details, including captured stderr when available.
        reason: String,
    },

    /// A preview could not be rendered.
    #[error("preview capture failed for {name}: {reason}")]
    CaptureFailure {
        /// Bundle name the preview was requested for.
        name: String,
        /// Failure details.
        reason: String,
    },

    /// An external tool could not be found.
    #[error("`{0}` not found in PATH")]
    ToolNotFound(String),

    /// A structural failure that aborted the build at the given stage.
    #[error("{stage} failed: {source}")]
    Stage {
        /// Stage that failed.
        stage: BuildStage,
        /// Underlying failure.
        #[source]
        source: Box<Error>,
    },

    /// The build was cancelled before the given stage started.
    #[error("build cancelled before {0}")]
    Cancelled(BuildStage),

    /// Another build holds the build lock.
    #[error("another build is already running for {}", .0.display())]
    BuildInProgress(PathBuf),
}

impl Error {
    /// Wraps this error as a structural failure of `stage`.
    ///
    /// Cancellation and lock errors pass through unchanged.
    pub fn at_stage(self, stage: BuildStage) -> Self {
        match self {
            Self::Stage { .. } | Self::Cancelled(_) | Self::BuildInProgress(_) => self,
            other => Self::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// Returns the stage a structural failure happened in, if any.
    pub fn stage(&self) -> Option<BuildStage> {
        match self {
            Self::Stage { stage, .. } | Self::Cancelled(stage) => Some(*stage),
            _ => None,
        }
    }
}

/// Attach a message to an `Option` or `Result`.
pub trait Context<T> {
    /// Converts `None`/`Err` into [`Error::GenericError`] carrying `context`.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    /// Lazily evaluated variant of [`Context::context`].
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T> Context<T> for Option<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| Error::GenericError(f().to_string()))
    }
}

impl<T, E: Display> Context<T> for std::result::Result<T, E> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| Error::GenericError(format!("{context}: {e}")))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| Error::GenericError(format!("{}: {e}", f())))
    }
}

/// Filesystem context for I/O results.
pub trait ErrorExt<T> {
    /// Tags an I/O failure with the action being attempted and the path.
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, io::Error> {
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.as_ref().to_path_buf(),
            error,
        })
    }
}

/// Returns early with a [`Error::GenericError`] built from a format string.
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::bundler::Error::GenericError(format!($msg)))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::bundler::Error::GenericError(format!($fmt, $($arg)*)))
    };
}

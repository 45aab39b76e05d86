//! Asset bundle pipeline.
//!
//! Source items found under `<asset folder>/source/` are staged one per
//! directory, previewed, handed to a [`Packager`] in a single call, and the
//! produced bundles are relocated into per-bundle output directories under the
//! export folder. The version and content manifests written by the packager
//! are then reconciled into a [`BundleManifest`].
//!
//! The main entry point is [`BundleBuildOrchestrator`]. [`ManifestReconciler`]
//! offers a read-only view of an earlier build's output.

pub mod builder;
pub mod control_file;
pub mod error;
pub mod manifest;
pub mod naming;
pub mod packager;
pub mod preview;
pub mod settings;
pub mod staging;
pub mod utils;

pub use builder::{
    BuildLock, BuildReport, BuildStage, BuildState, BuildWarning, BundleBuildOrchestrator,
    ProducedBundle,
};
pub use error::{Context, Error, ErrorExt, Result};
pub use manifest::{BundleManifest, BundleRecord, ManifestDiff, ManifestReconciler};
pub use packager::{ArchivePackager, CommandPackager, PackageRequest, Packager};
pub use preview::{
    CommandRenderer, PlaceholderRenderer, PreviewBytes, PreviewCache, PreviewCapturer,
    PreviewRenderer,
};
pub use settings::{
    BundleSettings, PackagingOptions, SettingsBuilder, SettingsStore, TargetPlatform,
};
pub use staging::{ItemStager, SourceItem, StagedItem};

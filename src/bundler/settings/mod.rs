//! Configuration structures for bundle builds.
//!
//! This module provides the settings a build runs with, the packaging option
//! flags and target platform forwarded to the packager, a builder for
//! constructing settings, and the store that persists them between runs.

mod builder;
mod core;
mod options;
mod platform;
mod store;

// Re-export all public types
pub use builder::SettingsBuilder;
pub use core::{
    BUNDLE_FILE_STEM, BundleSettings, CONTENTS_FILE_NAME, CONTROL_FILE_NAME,
    DESCRIPTOR_FILE_NAME, PREVIEW_FILE_NAME, RESERVED_BUNDLE_NAME, SOURCE_DIR_NAME,
    STAGED_FILE_STEM,
};
pub use options::PackagingOptions;
pub use platform::TargetPlatform;
pub use store::SettingsStore;

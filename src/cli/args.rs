//! Command line argument parsing and validation.
//!
//! This module provides CLI argument parsing using clap. Every build setting
//! can be overridden per invocation; overrides are persisted after a
//! successful build unless `--no-save` is given.

use crate::bundler::{BundleSettings, PackagingOptions, SettingsBuilder, TargetPlatform};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Asset bundle pipeline
#[derive(Parser, Debug)]
#[command(
    name = "kodegen_bundler_assets",
    version,
    about = "Stages prefabs, drives a bundle packager and maintains bundle manifests",
    long_about = "Stages every source item under <asset folder>/source into its own directory, \
runs the packager once over the staged tree, relocates each produced bundle into \
<export folder>/<name>/ with a config.json descriptor and a preview.png, and re-reads the \
version and content manifests.

Usage:
  kodegen_bundler_assets build --asset-folder Assets/AssetBundles --export-folder AssetBundles
  kodegen_bundler_assets build --packager ./tools/pack --packager-retries 2
  kodegen_bundler_assets list
  kodegen_bundler_assets reset

Exit code 0 = every stage succeeded. Warnings do not affect the exit code."
)]
pub struct Args {
    /// Settings file (default: <config dir>/kodegen/bundler-assets.toml)
    #[arg(
        long,
        global = true,
        value_name = "PATH",
        env = "KODEGEN_BUNDLER_ASSETS_SETTINGS"
    )]
    pub settings: Option<PathBuf>,

    /// Print detailed progress
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print errors and requested data
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a full build
    Build(BuildArgs),
    /// Restore default settings and reload the manifests
    Reset,
    /// Print the bundles recorded in the manifests
    List(ListArgs),
}

/// Arguments of `build`.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct BuildArgs {
    /// Asset folder; source items are read from its `source` subfolder
    #[arg(long, value_name = "DIR")]
    pub asset_folder: Option<PathBuf>,

    /// Export folder; cleared at the start of every build
    #[arg(long, value_name = "DIR")]
    pub export_folder: Option<PathBuf>,

    /// Extension of produced bundles (e.g. .unity3d)
    #[arg(long, value_name = "EXT")]
    pub extension: Option<String>,

    /// Extension of source items (e.g. .prefab)
    #[arg(long, value_name = "EXT")]
    pub source_extension: Option<String>,

    /// Lower-case bundle names
    #[arg(long, value_name = "BOOL")]
    pub lower_case_names: Option<bool>,

    /// Strip " variant" from bundle names
    #[arg(long, value_name = "BOOL")]
    pub strip_variant: Option<bool>,

    /// Forward the packaging option flags (all cleared when false)
    #[arg(long, value_name = "BOOL")]
    pub apply_options: Option<bool>,

    /// Packaging option: collect dependencies
    #[arg(long, value_name = "BOOL")]
    pub collect_dependencies: Option<bool>,

    /// Packaging option: complete assets
    #[arg(long, value_name = "BOOL")]
    pub complete_assets: Option<bool>,

    /// Packaging option: disable type tree
    #[arg(long, value_name = "BOOL")]
    pub disable_type_tree: Option<bool>,

    /// Packaging option: deterministic bundles
    #[arg(long, value_name = "BOOL")]
    pub deterministic: Option<bool>,

    /// Packaging option: uncompressed bundles
    #[arg(long, value_name = "BOOL")]
    pub uncompressed: Option<bool>,

    /// Target platform
    #[arg(long, value_enum, value_name = "PLATFORM")]
    pub platform: Option<TargetPlatform>,

    /// External packager program (default: built-in archive packager)
    #[arg(long, value_name = "PROGRAM")]
    pub packager: Option<PathBuf>,

    /// Extra argument for the external packager (repeatable)
    #[arg(
        long = "packager-arg",
        value_name = "ARG",
        allow_hyphen_values = true,
        requires = "packager"
    )]
    pub packager_args: Vec<String>,

    /// Extra attempts when the external packager fails
    #[arg(long, value_name = "N", default_value_t = 0, requires = "packager")]
    pub packager_retries: u32,

    /// Seconds allowed for one packager run
    #[arg(long, value_name = "SECS", requires = "packager")]
    pub packager_timeout: Option<u64>,

    /// External preview renderer (default: built-in placeholder renderer)
    #[arg(long, value_name = "PROGRAM")]
    pub renderer: Option<PathBuf>,

    /// Extra argument for the external renderer (repeatable)
    #[arg(
        long = "renderer-arg",
        value_name = "ARG",
        allow_hyphen_values = true,
        requires = "renderer"
    )]
    pub renderer_args: Vec<String>,

    /// Seconds allowed for one preview
    #[arg(long, value_name = "SECS", requires = "renderer")]
    pub renderer_timeout: Option<u64>,

    /// Do not persist the settings after a successful build
    #[arg(long)]
    pub no_save: bool,

    /// Print the build report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments of `list`.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct ListArgs {
    /// Export folder to read instead of the saved one
    #[arg(long, value_name = "DIR")]
    pub export_folder: Option<PathBuf>,

    /// Print the manifest as JSON
    #[arg(long)]
    pub json: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if let Command::Build(build) = &self.command {
            for (label, ext) in [
                ("--extension", &build.extension),
                ("--source-extension", &build.source_extension),
            ] {
                if ext.as_deref().is_some_and(|e| e.trim_start_matches('.').is_empty()) {
                    return Err(format!("{label} cannot be empty"));
                }
            }
            if build.packager_timeout == Some(0) || build.renderer_timeout == Some(0) {
                return Err("timeouts must be at least 1 second".to_string());
            }
        }
        Ok(())
    }
}

impl BuildArgs {
    /// Applies the overrides given on the command line to `settings`.
    pub fn apply(&self, settings: BundleSettings) -> crate::bundler::Result<BundleSettings> {
        let mut options: PackagingOptions = settings.options;
        override_flag(&mut options.collect_dependencies, self.collect_dependencies);
        override_flag(&mut options.complete_assets, self.complete_assets);
        override_flag(&mut options.disable_type_tree, self.disable_type_tree);
        override_flag(&mut options.deterministic, self.deterministic);
        override_flag(&mut options.uncompressed, self.uncompressed);

        let mut builder = SettingsBuilder::from_settings(settings).options(options);
        if let Some(dir) = &self.asset_folder {
            builder = builder.asset_folder(dir);
        }
        if let Some(dir) = &self.export_folder {
            builder = builder.export_folder(dir);
        }
        if let Some(ext) = &self.extension {
            builder = builder.bundle_extension(ext.as_str());
        }
        if let Some(ext) = &self.source_extension {
            builder = builder.source_extension(ext.as_str());
        }
        if let Some(enabled) = self.lower_case_names {
            builder = builder.lower_case_names(enabled);
        }
        if let Some(enabled) = self.strip_variant {
            builder = builder.strip_variant(enabled);
        }
        if let Some(enabled) = self.apply_options {
            builder = builder.apply_options(enabled);
        }
        if let Some(platform) = self.platform {
            builder = builder.platform(platform);
        }
        builder.build()
    }
}

fn override_flag(flag: &mut bool, value: Option<bool>) {
    if let Some(value) = value {
        *flag = value;
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        let output = super::OutputManager::new(args.verbose, args.quiet);
        Self { output }
    }
}

impl RuntimeConfig {
    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Print verbose message if in verbose mode
    pub fn verbose_println(&self, message: &str) -> std::io::Result<()> {
        self.output.verbose(message)
    }

    /// Print success message if not in quiet mode
    pub fn success(&self, message: &str) -> std::io::Result<()> {
        self.output.success(message)
    }

    /// Print warning message if not in quiet mode
    pub fn warn(&self, message: &str) -> std::io::Result<()> {
        self.output.warn(message)
    }

    /// Print progress message
    pub fn progress(&self, message: &str) -> std::io::Result<()> {
        self.output.progress(message)
    }

    /// Print section header
    pub fn section(&self, title: &str) -> std::io::Result<()> {
        self.output.section(title)
    }

    /// Print indented text
    pub fn indent(&self, message: &str) -> std::io::Result<()> {
        self.output.indent(message)
    }

    /// Print requested data, regardless of quiet mode
    pub fn println(&self, message: &str) -> std::io::Result<()> {
        self.output.println(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_overrides_replace_saved_values() {
        let args = Args::try_parse_from([
            "kodegen_bundler_assets",
            "build",
            "--asset-folder",
            "/work/assets",
            "--export-folder",
            "/work/out",
            "--extension",
            "bundle",
            "--strip-variant",
            "true",
            "--deterministic",
            "true",
            "--collect-dependencies",
            "false",
            "--platform",
            "android",
        ])
        .unwrap();
        let Command::Build(build) = &args.command else {
            panic!("expected build");
        };

        let settings = build.apply(BundleSettings::default()).unwrap();
        assert_eq!(settings.asset_folder, PathBuf::from("/work/assets"));
        assert_eq!(settings.bundle_extension, ".bundle");
        assert!(settings.strip_variant);
        assert!(settings.lower_case_names);
        assert!(settings.options.deterministic);
        assert!(!settings.options.collect_dependencies);
        assert!(settings.options.complete_assets);
        assert_eq!(settings.platform, TargetPlatform::Android);
    }

    #[test]
    fn packager_flags_require_packager() {
        assert!(
            Args::try_parse_from(["kodegen_bundler_assets", "build", "--packager-retries", "2"])
                .is_err()
        );
        assert!(
            Args::try_parse_from([
                "kodegen_bundler_assets",
                "build",
                "--packager",
                "pack",
                "--packager-arg",
                "--fast",
                "--packager-retries",
                "2",
            ])
            .is_ok()
        );
    }

    #[test]
    fn empty_extension_is_rejected() {
        let args =
            Args::try_parse_from(["kodegen_bundler_assets", "build", "--extension", "."]).unwrap();
        assert!(args.validate().is_err());
    }
}

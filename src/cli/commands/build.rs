//! `build` command.

use crate::{
    bundler::{
        ArchivePackager, BuildReport, BundleBuildOrchestrator, CommandPackager, CommandRenderer,
        PackageRequest, Packager, PlaceholderRenderer, PreviewRenderer, Result as PipelineResult,
        SettingsStore,
    },
    cli::{BuildArgs, RuntimeConfig},
    error::Result,
};
use std::{path::Path, time::Duration};

/// Packager selected on the command line.
#[derive(Debug)]
pub enum SelectedPackager {
    /// Built-in tar packager.
    Archive(ArchivePackager),
    /// External program.
    Command(CommandPackager),
}

impl SelectedPackager {
    /// Packager for `args`: the external program when one is given.
    pub fn from_args(args: &BuildArgs) -> PipelineResult<Self> {
        let Some(program) = &args.packager else {
            return Ok(Self::Archive(ArchivePackager::new()));
        };

        let mut packager = CommandPackager::new(program)?
            .with_args(args.packager_args.clone())
            .with_retries(args.packager_retries);
        if let Some(secs) = args.packager_timeout {
            packager = packager.with_timeout(Duration::from_secs(secs));
        }
        Ok(Self::Command(packager))
    }
}

impl Packager for SelectedPackager {
    fn name(&self) -> &str {
        match self {
            Self::Archive(packager) => packager.name(),
            Self::Command(packager) => packager.name(),
        }
    }

    async fn build_bundles(&self, request: &PackageRequest) -> PipelineResult<()> {
        match self {
            Self::Archive(packager) => packager.build_bundles(request).await,
            Self::Command(packager) => packager.build_bundles(request).await,
        }
    }
}

/// Preview renderer selected on the command line.
#[derive(Debug)]
pub enum SelectedRenderer {
    /// Built-in placeholder renderer.
    Placeholder(PlaceholderRenderer),
    /// External program.
    Command(CommandRenderer),
}

impl SelectedRenderer {
    /// Renderer for `args`: the external program when one is given.
    pub fn from_args(args: &BuildArgs) -> PipelineResult<Self> {
        let Some(program) = &args.renderer else {
            return Ok(Self::Placeholder(PlaceholderRenderer::default()));
        };

        let mut renderer = CommandRenderer::new(program)?.with_args(args.renderer_args.clone());
        if let Some(secs) = args.renderer_timeout {
            renderer = renderer.with_timeout(Duration::from_secs(secs));
        }
        Ok(Self::Command(renderer))
    }
}

impl PreviewRenderer for SelectedRenderer {
    async fn render_preview(&self, staged_asset: &Path) -> PipelineResult<Vec<u8>> {
        match self {
            Self::Placeholder(renderer) => renderer.render_preview(staged_asset).await,
            Self::Command(renderer) => renderer.render_preview(staged_asset).await,
        }
    }
}

/// Runs a build with the saved settings plus the overrides in `args`.
///
/// Ctrl-C cancels the build before its next stage. Settings are saved only
/// when the build succeeds.
pub async fn execute(args: &BuildArgs, store: &SettingsStore, config: &RuntimeConfig) -> Result<i32> {
    let settings = args.apply(store.load().await?)?;
    let resolved = settings.clone().resolve(&std::env::current_dir()?)?;
    resolved.validate()?;

    let packager = SelectedPackager::from_args(args)?;
    let renderer = SelectedRenderer::from_args(args)?;

    config.progress(&format!(
        "Building bundles from {} into {}",
        resolved.source_folder().display(),
        resolved.export_folder.display()
    ))?;
    config.verbose_println(&format!(
        "Packager: {}, platform: {}, options: {}",
        packager.name(),
        resolved.platform,
        resolved.effective_options().flags().join(" ")
    ))?;

    let mut orchestrator = BundleBuildOrchestrator::new(resolved, packager, renderer);
    let token = orchestrator.cancellation_token();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupt received, cancelling before the next stage");
            token.cancel();
        }
    });

    let result = orchestrator.build().await;
    interrupt.abort();
    let report = result?;

    print_report(&report, config, args.json)?;

    if !args.no_save {
        store.save(&settings).await?;
        config.verbose_println(&format!("Saved settings to {}", store.path().display()))?;
    }
    Ok(0)
}

fn print_report(report: &BuildReport, config: &RuntimeConfig, json: bool) -> Result<()> {
    if json {
        config.println(&serde_json::to_string_pretty(report)?)?;
        return Ok(());
    }

    config.section("Bundles")?;
    if report.bundles.is_empty() {
        config.indent("(none)")?;
    }
    for bundle in &report.bundles {
        let short = bundle.checksum.get(..12).unwrap_or(&bundle.checksum);
        let preview = if bundle.has_preview { "" } else { ", no preview" };
        config.indent(&format!(
            "{} ({} bytes, sha256 {short}{preview})",
            bundle.name, bundle.size
        ))?;
    }

    if !report.diff.is_empty() {
        config.section("Changes")?;
        for name in &report.diff.added {
            config.indent(&format!("+ {name}"))?;
        }
        for name in &report.diff.updated {
            config.indent(&format!("~ {name}"))?;
        }
        for name in &report.diff.removed {
            config.indent(&format!("- {name}"))?;
        }
    }

    for warning in &report.warnings {
        config.warn(&warning.to_string())?;
    }

    config.success(&format!(
        "Built {} bundle(s) in {}ms ({} warning(s))",
        report.bundles.len(),
        report.duration().num_milliseconds(),
        report.warnings.len()
    ))?;
    Ok(())
}

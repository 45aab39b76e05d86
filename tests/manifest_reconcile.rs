//! Integration tests for ManifestReconciler
//!
//! Reloads manifests from hand-written export folders and from real builds.

mod common;

use common::Project;
use kodegen_bundler_assets::bundler::{
    ArchivePackager, BuildWarning, BundleBuildOrchestrator, ManifestReconciler,
    PlaceholderRenderer, control_file,
};

#[tokio::test]
async fn test_missing_control_files_read_as_empty() {
    let project = Project::new();

    let manifest = ManifestReconciler::reload(&project.settings).await.unwrap();
    assert!(manifest.is_empty());
    assert!(manifest.contents.is_empty());
    assert!(manifest.sizes.is_empty());

    let versions = control_file::read_versions(&project.settings.control_file_path())
        .await
        .unwrap();
    assert!(versions.is_empty());
}

#[tokio::test]
async fn test_sizes_follow_lookup_order() {
    let project = Project::new();
    let export = project.export_folder();
    std::fs::create_dir_all(export.join("chair")).unwrap();
    std::fs::write(export.join("chair/source.unity3d"), vec![0u8; 3000]).unwrap();
    // Flat file next to the relocated one: the relocated file wins.
    std::fs::write(export.join("chair.unity3d"), vec![0u8; 9000]).unwrap();
    std::fs::write(export.join("lamp.unity3d"), vec![0u8; 2048]).unwrap();
    std::fs::write(export.join("rug"), vec![0u8; 1500]).unwrap();
    std::fs::write(export.join("empty.unity3d"), b"").unwrap();
    std::fs::write(
        project.settings.control_file_path(),
        "chair\t1\nlamp\t2\nrug\t1\nempty\t4\nghost\t3\nsource\t1\n",
    )
    .unwrap();
    std::fs::write(
        project.settings.contents_file_path(),
        "chair\tchair/model.prefab\tchair/mesh.fbx\n",
    )
    .unwrap();

    let manifest = ManifestReconciler::reload(&project.settings).await.unwrap();

    assert_eq!(manifest.sizes.get("chair"), Some(&2));
    assert_eq!(manifest.sizes.get("lamp"), Some(&2));
    assert_eq!(manifest.sizes.get("rug"), Some(&1));
    assert_eq!(manifest.sizes.get("empty"), None);
    assert_eq!(manifest.sizes.get("ghost"), None);
    assert_eq!(manifest.stale, vec!["ghost"]);
    assert!(!manifest.versions.contains_key("source"));

    let chair = manifest.record("chair").unwrap();
    assert_eq!(chair.version, 1);
    assert_eq!(chair.contents, vec!["chair/model.prefab", "chair/mesh.fbx"]);
    assert!(manifest.record("lamp").unwrap().contents.is_empty());
}

#[tokio::test]
async fn test_deleted_bundle_is_reported_stale() {
    let project = Project::new();
    project.add_source("chair.prefab", b"chair");
    project.add_source("lamp.prefab", b"lamp");

    let mut orchestrator = BundleBuildOrchestrator::new(
        project.settings.clone(),
        ArchivePackager::new(),
        PlaceholderRenderer::default(),
    );
    orchestrator.build().await.unwrap();
    assert!(orchestrator.manifest().sizes.contains_key("lamp"));

    std::fs::remove_file(project.export_folder().join("lamp/source.unity3d")).unwrap();
    let manifest = orchestrator.refresh().await.unwrap();

    assert_eq!(manifest.versions.get("lamp"), Some(&1));
    assert_eq!(manifest.sizes.get("lamp"), None);
    assert_eq!(manifest.stale, vec!["lamp"]);
    assert!(manifest.sizes.contains_key("chair"));
}

#[tokio::test]
async fn test_build_reports_stale_entries_from_custom_packager() {
    use kodegen_bundler_assets::bundler::{PackageRequest, Packager, Result};

    /// Records a bundle it never produces.
    struct PhantomPackager;

    impl Packager for PhantomPackager {
        fn name(&self) -> &str {
            "phantom"
        }

        async fn build_bundles(&self, request: &PackageRequest) -> Result<()> {
            ArchivePackager::new().build_bundles(request).await?;
            let path = request.output_root.join("bundleControl.txt");
            let mut versions = control_file::read_versions(&path).await?;
            versions.insert("phantom".into(), 7);
            control_file::write_versions(&path, &versions).await
        }
    }

    let project = Project::new();
    project.add_source("chair.prefab", b"chair");

    let mut orchestrator = BundleBuildOrchestrator::new(
        project.settings.clone(),
        PhantomPackager,
        PlaceholderRenderer::default(),
    );
    let report = orchestrator.build().await.unwrap();

    assert_eq!(
        report.warnings,
        vec![BuildWarning::StaleManifestEntry {
            name: "phantom".into()
        }]
    );
    assert_eq!(orchestrator.manifest().stale, vec!["phantom"]);
}

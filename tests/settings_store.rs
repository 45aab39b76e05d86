//! Integration tests for SettingsStore persistence.

use kodegen_bundler_assets::bundler::{
    BundleSettings, Error, PackagingOptions, SettingsBuilder, SettingsStore, TargetPlatform,
};
use tempfile::TempDir;

#[tokio::test]
async fn test_missing_file_loads_defaults() {
    let dir = TempDir::new().unwrap();
    let store = SettingsStore::new(dir.path().join("nested/settings.toml"));

    let settings = store.load().await.unwrap();
    assert_eq!(settings, BundleSettings::default());
}

#[tokio::test]
async fn test_save_then_load() {
    let dir = TempDir::new().unwrap();
    let store = SettingsStore::new(dir.path().join("nested/settings.toml"));

    let settings = SettingsBuilder::new()
        .asset_folder("Game/Assets/Bundles")
        .export_folder("Out")
        .bundle_extension("bundle")
        .strip_variant(true)
        .lower_case_names(false)
        .apply_options(false)
        .options(PackagingOptions {
            uncompressed: true,
            ..PackagingOptions::none()
        })
        .platform(TargetPlatform::WebGl)
        .build()
        .unwrap();

    store.save(&settings).await.unwrap();
    assert!(store.path().is_file());

    let loaded = store.load().await.unwrap();
    assert_eq!(loaded, settings);
    assert_eq!(loaded.bundle_extension, ".bundle");
    assert_eq!(loaded.effective_options(), PackagingOptions::none());

    let text = std::fs::read_to_string(store.path()).unwrap();
    assert!(text.contains("WebGL"), "{text}");
}

#[tokio::test]
async fn test_partial_file_fills_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(&path, "strip_variant = true\n").unwrap();

    let settings = SettingsStore::new(&path).load().await.unwrap();
    assert!(settings.strip_variant);
    assert_eq!(settings.bundle_extension, ".unity3d");
    assert_eq!(settings.platform, TargetPlatform::StandaloneWindows64);
}

#[tokio::test]
async fn test_malformed_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(&path, "strip_variant = [unterminated").unwrap();

    let err = SettingsStore::new(&path).load().await.unwrap_err();
    assert!(matches!(err, Error::SettingsParse(_)));
}

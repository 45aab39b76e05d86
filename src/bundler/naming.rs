//! Bundle name derivation.
//!
//! A bundle name is the source file's base name without its extension,
//! optionally with the variant marker removed and optionally lower-cased. It is
//! used as the staging directory name, the manifest key, the bundle directory
//! name and (lower-cased) the preview lookup key. No other sanitization is
//! applied, so names may contain any character a file name can.

use std::path::Path;

/// Marker removed from names when variant stripping is on.
pub const VARIANT_MARKER: &str = " variant";

/// Derives the canonical bundle name for a source file.
///
/// The marker is removed before lower-casing and only in its literal
/// lower-case spelling, so `"Chair Variant"` is kept as `"chair variant"`.
///
/// ```
/// use kodegen_bundler_assets::bundler::naming::normalize;
///
/// assert_eq!(normalize("Assets/source/Chair variant.prefab", true, true), "chair");
/// assert_eq!(normalize("Chair variant.prefab", false, false), "Chair variant");
/// ```
pub fn normalize(path: impl AsRef<Path>, strip_variant: bool, lower_case: bool) -> String {
    let mut name = base_name(path.as_ref());

    if strip_variant {
        name = name.replace(VARIANT_MARKER, "");
    }
    if lower_case {
        name = name.to_lowercase();
    }

    name
}

/// Base name of `path` without its final extension.
///
/// Both `/` and `\` count as separators so names recorded on one platform
/// resolve the same on another.
pub fn base_name(path: &Path) -> String {
    let raw = path.to_string_lossy();
    let file_name = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    strip_extension(file_name).to_string()
}

/// Removes the final extension of a file name, if it has one.
///
/// A leading dot alone (as in `.hidden`) is not treated as an extension.
pub fn strip_extension(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(0) | None => file_name,
        Some(idx) => &file_name[..idx],
    }
}

/// Bundle name of a produced bundle file, given the configured extension.
///
/// Returns `None` when the file name does not end with `extension`.
pub fn bundle_name_from_file(path: &Path, extension: &str) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    let name = file_name.strip_suffix(extension)?;
    (!name.is_empty()).then(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_name_is_base_name_without_extension() {
        assert_eq!(normalize("/a/b/Table Lamp.prefab", false, false), "Table Lamp");
        assert_eq!(normalize("C:\\proj\\source\\Crate.prefab", false, false), "Crate");
        assert_eq!(normalize("Chair.prefab", false, false), "Chair");
    }

    #[test]
    fn normalize_is_idempotent_on_bare_names() {
        for name in ["Chair", "table lamp", "a.b", "crate variant", "X variant 2"] {
            for (strip, lower) in [(false, false), (true, false), (false, true), (true, true)] {
                let once = normalize(format!("{name}.prefab"), strip, lower);
                let twice = normalize(format!("{once}.prefab"), strip, lower);
                assert_eq!(once, twice, "{name} strip={strip} lower={lower}");
            }
        }
    }

    #[test]
    fn strips_variant_and_lower_cases() {
        assert_eq!(normalize("Chair variant.prefab", true, true), "chair");
        assert_eq!(normalize("A variant.prefab", true, true), "a");
        assert_eq!(normalize("a.prefab", true, true), "a");
        assert_eq!(normalize("Chair Variant.prefab", true, true), "chair variant");
        assert_eq!(normalize("Lamp VARIANT.prefab", true, true), "lamp variant");
    }

    #[test]
    fn variant_marker_is_literal_without_lower_case() {
        assert_eq!(normalize("Chair variant.prefab", true, false), "Chair");
        assert_eq!(normalize("Chair Variant.prefab", true, false), "Chair Variant");
        assert_eq!(normalize("Chair variant.prefab", false, true), "chair variant");
    }

    #[test]
    fn keeps_unusual_characters() {
        assert_eq!(normalize("my  (old) chair!.prefab", false, false), "my  (old) chair!");
    }

    #[test]
    fn only_final_extension_is_removed() {
        assert_eq!(normalize("chair.v2.prefab", false, false), "chair.v2");
        assert_eq!(strip_extension(".hidden"), ".hidden");
        assert_eq!(strip_extension("noext"), "noext");
    }

    #[test]
    fn bundle_names_from_produced_files() {
        assert_eq!(
            bundle_name_from_file(Path::new("/out/chair.unity3d"), ".unity3d").as_deref(),
            Some("chair")
        );
        assert_eq!(bundle_name_from_file(Path::new("/out/chair.zip"), ".unity3d"), None);
        assert_eq!(bundle_name_from_file(Path::new("/out/.unity3d"), ".unity3d"), None);
    }
}

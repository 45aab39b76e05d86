//! Packaging option flags forwarded to the packager.

/// Option flags controlling how the packager builds each bundle.
///
/// The flags mirror the switches the packager understands. Their meaning is
/// owned by the packager; this crate only forwards them.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PackagingOptions {
    /// Include the dependencies of every staged asset in its bundle.
    ///
    /// Default: true
    pub collect_dependencies: bool,

    /// Include complete assets rather than only the referenced parts.
    ///
    /// Default: true
    pub complete_assets: bool,

    /// Omit type information from the bundle.
    ///
    /// Default: false
    pub disable_type_tree: bool,

    /// Produce byte-identical output for identical input.
    ///
    /// Default: false
    pub deterministic: bool,

    /// Skip compression of the bundle payload.
    ///
    /// Default: false
    pub uncompressed: bool,
}

impl Default for PackagingOptions {
    fn default() -> Self {
        Self {
            collect_dependencies: true,
            complete_assets: true,
            disable_type_tree: false,
            deterministic: false,
            uncompressed: false,
        }
    }
}

impl PackagingOptions {
    /// All flags cleared.
    pub const fn none() -> Self {
        Self {
            collect_dependencies: false,
            complete_assets: false,
            disable_type_tree: false,
            deterministic: false,
            uncompressed: false,
        }
    }

    /// Command line switches for the enabled flags, in a fixed order.
    pub fn flags(&self) -> Vec<&'static str> {
        [
            (self.collect_dependencies, "--collect-dependencies"),
            (self.complete_assets, "--complete-assets"),
            (self.disable_type_tree, "--disable-type-tree"),
            (self.deterministic, "--deterministic"),
            (self.uncompressed, "--uncompressed"),
        ]
        .into_iter()
        .filter_map(|(enabled, flag)| enabled.then_some(flag))
        .collect()
    }
}

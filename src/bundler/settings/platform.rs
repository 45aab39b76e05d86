//! Target platform identifiers passed to the packager.

use std::fmt;

/// Platform the bundles are packaged for.
///
/// The identifier is forwarded verbatim to the packager, which decides how
/// (and whether) the platform changes the produced bundle.
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_assets::bundler::TargetPlatform;
///
/// let platform: TargetPlatform = "android".parse().unwrap();
/// assert_eq!(platform.as_str(), "Android");
/// ```
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    PartialEq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    clap::ValueEnum,
)]
pub enum TargetPlatform {
    /// 32-bit Windows standalone player
    StandaloneWindows,
    /// 64-bit Windows standalone player
    #[default]
    StandaloneWindows64,
    /// macOS standalone player
    #[serde(rename = "StandaloneOSX")]
    #[value(name = "standalone-osx")]
    StandaloneOsx,
    /// 64-bit Linux standalone player
    StandaloneLinux64,
    /// Android devices
    Android,
    /// iOS devices
    #[serde(rename = "iOS")]
    #[value(name = "ios")]
    Ios,
    /// Browser builds
    #[serde(rename = "WebGL")]
    #[value(name = "webgl")]
    WebGl,
}

impl TargetPlatform {
    /// Canonical identifier, as written to settings files and packager flags.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StandaloneWindows => "StandaloneWindows",
            Self::StandaloneWindows64 => "StandaloneWindows64",
            Self::StandaloneOsx => "StandaloneOSX",
            Self::StandaloneLinux64 => "StandaloneLinux64",
            Self::Android => "Android",
            Self::Ios => "iOS",
            Self::WebGl => "WebGL",
        }
    }
}

impl fmt::Display for TargetPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TargetPlatform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as clap::ValueEnum>::from_str(s, true)
            .or_else(|_| {
                <Self as clap::ValueEnum>::value_variants()
                    .iter()
                    .find(|p| p.as_str().eq_ignore_ascii_case(s))
                    .copied()
                    .ok_or(())
            })
            .map_err(|_| format!("unknown target platform: {s}"))
    }
}

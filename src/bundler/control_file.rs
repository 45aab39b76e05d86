//! Version and content manifests.
//!
//! Both files are line oriented, one record per bundle, fields separated by a
//! TAB:
//!
//! ```text
//! # bundleControl.txt
//! chair	3
//! table	1
//!
//! # bundleContents.txt
//! chair	chair/model.prefab
//! table	table/model.prefab	table/legs.mat
//! ```
//!
//! Blank lines and `#` comments are ignored. Malformed lines are skipped with a
//! warning, and when a name appears twice the later record wins. A missing
//! file reads as an empty mapping.

use super::{Result, error::ErrorExt, utils::fs};
use std::{collections::BTreeMap, io, path::Path};

/// Bundle name to version.
pub type VersionMap = BTreeMap<String, u32>;

/// Bundle name to ordered list of contained assets.
pub type ContentMap = BTreeMap<String, Vec<String>>;

const FIELD_SEPARATOR: char = '\t';

/// Reads the versions manifest at `path`.
pub async fn read_versions(path: &Path) -> Result<VersionMap> {
    Ok(match read_optional(path).await? {
        Some(text) => parse_versions(&text, path),
        None => VersionMap::new(),
    })
}

/// Reads the contents manifest at `path`.
pub async fn read_contents(path: &Path) -> Result<ContentMap> {
    Ok(match read_optional(path).await? {
        Some(text) => parse_contents(&text, path),
        None => ContentMap::new(),
    })
}

/// Writes the versions manifest, records sorted by name.
pub async fn write_versions(path: &Path, versions: &VersionMap) -> Result<()> {
    fs::write_atomic(path, format_versions(versions).as_bytes()).await
}

/// Writes the contents manifest, records sorted by name.
pub async fn write_contents(path: &Path, contents: &ContentMap) -> Result<()> {
    fs::write_atomic(path, format_contents(contents).as_bytes()).await
}

async fn read_optional(path: &Path) -> Result<Option<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::debug!("{} does not exist, treating as empty", path.display());
            Ok(None)
        }
        Err(e) => Err(e).fs_context("reading manifest", path),
    }
}

/// Parses versions manifest text. `origin` is only used in warnings.
pub fn parse_versions(text: &str, origin: &Path) -> VersionMap {
    let mut versions = VersionMap::new();

    for (line_no, fields) in records(text) {
        let parsed = match fields.as_slice() {
            [name, version] if !name.is_empty() => version.trim().parse::<u32>().ok().map(|v| (*name, v)),
            _ => None,
        };

        match parsed {
            Some((name, version)) => {
                if versions.insert(name.to_string(), version).is_some() {
                    log::debug!(
                        "{}:{}: duplicate entry for {}, later record wins",
                        origin.display(),
                        line_no,
                        name
                    );
                }
            }
            None => log::warn!(
                "{}:{}: skipping malformed version record",
                origin.display(),
                line_no
            ),
        }
    }

    versions
}

/// Parses contents manifest text. `origin` is only used in warnings.
pub fn parse_contents(text: &str, origin: &Path) -> ContentMap {
    let mut contents = ContentMap::new();

    for (line_no, fields) in records(text) {
        let Some((name, assets)) = fields.split_first().filter(|(name, _)| !name.is_empty())
        else {
            log::warn!(
                "{}:{}: skipping malformed content record",
                origin.display(),
                line_no
            );
            continue;
        };

        let assets = assets
            .iter()
            .filter(|a| !a.is_empty())
            .map(|a| a.to_string())
            .collect();
        if contents.insert(name.to_string(), assets).is_some() {
            log::debug!(
                "{}:{}: duplicate entry for {}, later record wins",
                origin.display(),
                line_no,
                name
            );
        }
    }

    contents
}

/// Formats a versions manifest.
pub fn format_versions(versions: &VersionMap) -> String {
    versions
        .iter()
        .map(|(name, version)| format!("{name}{FIELD_SEPARATOR}{version}\n"))
        .collect()
}

/// Formats a contents manifest.
pub fn format_contents(contents: &ContentMap) -> String {
    contents
        .iter()
        .map(|(name, assets)| {
            let mut line = name.clone();
            for asset in assets {
                line.push(FIELD_SEPARATOR);
                line.push_str(asset);
            }
            line.push('\n');
            line
        })
        .collect()
}

/// Non-empty, non-comment lines split into fields, with 1-based line numbers.
fn records(text: &str) -> impl Iterator<Item = (usize, Vec<&str>)> {
    text.lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim_end_matches('\r')))
        .filter(|(_, line)| !line.trim().is_empty() && !line.starts_with('#'))
        .map(|(line_no, line)| (line_no, line.split(FIELD_SEPARATOR).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_versions_and_skips_noise() {
        let text = "# generated\nchair\t3\n\nbroken line\ntable\tx\nlamp\t1\r\nchair\t4\n";
        let versions = parse_versions(text, Path::new("bundleControl.txt"));

        assert_eq!(versions.len(), 2);
        assert_eq!(versions["chair"], 4);
        assert_eq!(versions["lamp"], 1);
    }

    #[test]
    fn parses_contents_in_order() {
        let text = "table\ttable/model.prefab\ttable/legs.mat\nempty\n";
        let contents = parse_contents(text, Path::new("bundleContents.txt"));

        assert_eq!(
            contents["table"],
            vec!["table/model.prefab".to_string(), "table/legs.mat".to_string()]
        );
        assert!(contents["empty"].is_empty());
    }

    #[test]
    fn names_keep_spaces_and_colons() {
        let versions = parse_versions("old: chair\t2\n", Path::new("x"));
        assert_eq!(versions["old: chair"], 2);
    }

    #[test]
    fn format_then_parse_preserves_records() {
        let mut contents = ContentMap::new();
        contents.insert("b".into(), vec!["b/model.prefab".into()]);
        contents.insert("a".into(), vec![]);

        let text = format_contents(&contents);
        assert_eq!(text, "a\nb\tb/model.prefab\n");
        assert_eq!(parse_contents(&text, Path::new("x")), contents);
    }
}

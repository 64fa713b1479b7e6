use crate::error::{ChangelogError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Qualified package name (`name` or `name:arch`) to version, ordered by name.
pub type PackageManifest = BTreeMap<String, String>;

#[derive(Debug, Deserialize)]
struct ManifestDocument {
    packages: Vec<String>,
}

/// ManifestLoader reads the dpkg manifest of a build
pub struct ManifestLoader;

impl ManifestLoader {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<PackageManifest> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ChangelogError::ManifestParse(format!(
                "Failed to read '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::parse(&content).map_err(|e| match e {
            ChangelogError::ManifestParse(msg) => {
                ChangelogError::ManifestParse(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Parse a YAML document whose `packages` key lists `name=version` items.
    pub fn parse(content: &str) -> Result<PackageManifest> {
        let document: ManifestDocument = serde_yaml::from_str(content)
            .map_err(|e| ChangelogError::ManifestParse(format!("Failed to parse YAML: {}", e)))?;

        let mut manifest = PackageManifest::new();
        for entry in document.packages {
            let Some((name, version)) = entry.split_once('=') else {
                return Err(ChangelogError::ManifestParse(format!(
                    "Expected 'name=version', found '{}'",
                    entry
                )));
            };

            let (name, version) = (name.trim(), version.trim());
            if name.is_empty() || version.is_empty() {
                return Err(ChangelogError::ManifestParse(format!(
                    "Incomplete package entry '{}'",
                    entry
                )));
            }

            manifest.insert(name.to_string(), version.to_string());
        }

        Ok(manifest)
    }
}

/// Strips the architecture qualifier: `libc6:amd64` becomes `libc6`.
pub fn package_name(qualified: &str) -> &str {
    qualified
        .split_once(':')
        .map_or(qualified, |(name, _)| name)
}

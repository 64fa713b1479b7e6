use crate::agents::manifest_loader::package_name;
use crate::error::{ChangelogError, Result};
use crate::repository::ChangelogSource;
use crate::utils::{PathValidator, verbose_enabled};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// Archive names looked up inside `<docs>/<package>/`, in order.
const ARCHIVE_NAMES: [&str; 2] = ["changelog.Debian.gz", "changelog.gz"];

/// Reads gzip-compressed changelogs shipped under the image's doc directory.
pub struct LocalArchiveSource {
    docs_dir: PathBuf,
}

impl LocalArchiveSource {
    pub fn new<P: AsRef<Path>>(docs_dir: P) -> Self {
        Self {
            docs_dir: docs_dir.as_ref().to_path_buf(),
        }
    }

    fn read_archive(path: &Path) -> Result<String> {
        let file = File::open(path)?;
        let mut decoder = GzDecoder::new(BufReader::new(file));
        let mut bytes = Vec::new();
        decoder.read_to_end(&mut bytes).map_err(|e| {
            ChangelogError::ChangelogParse(format!(
                "Failed to decompress '{}': {}",
                path.display(),
                e
            ))
        })?;

        String::from_utf8(bytes).map_err(|e| {
            ChangelogError::ChangelogParse(format!(
                "'{}' is not valid UTF-8: {}",
                path.display(),
                e
            ))
        })
    }
}

impl ChangelogSource for LocalArchiveSource {
    fn label(&self) -> &str {
        "local archive"
    }

    fn fetch(&self, package: &str, _new_version: &str) -> Result<Option<String>> {
        let name = PathValidator::validate_package_component(package_name(package))?;
        let package_dir = self.docs_dir.join(name);

        for archive in ARCHIVE_NAMES {
            let path = package_dir.join(archive);
            if path.exists() {
                if verbose_enabled() {
                    eprintln!("[VERBOSE] Reading {}", path.display());
                }
                return Self::read_archive(&path).map(Some);
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::fs;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_gz(path: &Path, content: &str) {
        write_gz_bytes(path, content.as_bytes());
    }

    fn write_gz_bytes(path: &Path, content: &[u8]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let file = File::create(path).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(content).unwrap();
        encoder.finish().unwrap();
    }

    #[test]
    fn prefers_debian_changelog() {
        let dir = tempdir().unwrap();
        write_gz(&dir.path().join("foo/changelog.Debian.gz"), "debian");
        write_gz(&dir.path().join("foo/changelog.gz"), "upstream");

        let source = LocalArchiveSource::new(dir.path());
        assert_eq!(
            source.fetch("foo", "1.0").unwrap(),
            Some("debian".to_string())
        );
    }

    #[test]
    fn falls_back_to_plain_changelog() {
        let dir = tempdir().unwrap();
        write_gz(&dir.path().join("foo/changelog.gz"), "upstream");

        let source = LocalArchiveSource::new(dir.path());
        assert_eq!(
            source.fetch("foo", "1.0").unwrap(),
            Some("upstream".to_string())
        );
    }

    #[test]
    fn strips_architecture_qualifier() {
        let dir = tempdir().unwrap();
        write_gz(&dir.path().join("libc6/changelog.Debian.gz"), "glibc");

        let source = LocalArchiveSource::new(dir.path());
        assert_eq!(
            source.fetch("libc6:amd64", "2.39-0ubuntu8").unwrap(),
            Some("glibc".to_string())
        );
    }

    #[test]
    fn missing_archive_is_none() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("foo")).unwrap();

        let source = LocalArchiveSource::new(dir.path());
        assert_eq!(source.fetch("foo", "1.0").unwrap(), None);
        assert_eq!(source.fetch("bar", "1.0").unwrap(), None);
    }

    #[test]
    fn corrupt_archive_is_an_error() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("foo")).unwrap();
        fs::write(dir.path().join("foo/changelog.Debian.gz"), "not gzip").unwrap();

        let source = LocalArchiveSource::new(dir.path());
        let err = source.fetch("foo", "1.0").unwrap_err();
        assert!(matches!(err, ChangelogError::ChangelogParse(_)));
        assert!(err.to_string().contains("Failed to decompress"));
    }

    #[test]
    fn non_utf8_changelog_is_a_decoding_error() {
        let dir = tempdir().unwrap();
        write_gz_bytes(&dir.path().join("foo/changelog.Debian.gz"), &[0xff, 0xfe, 0xfd]);

        let source = LocalArchiveSource::new(dir.path());
        let err = source.fetch("foo", "1.0").unwrap_err();
        assert!(matches!(err, ChangelogError::ChangelogParse(_)));
        assert!(err.to_string().contains("is not valid UTF-8"));
        assert!(!err.to_string().contains("decompress"));
    }

    #[test]
    fn rejects_unsafe_package_names() {
        let dir = tempdir().unwrap();
        let source = LocalArchiveSource::new(dir.path());
        assert!(source.fetch("..", "1.0").is_err());
    }
}

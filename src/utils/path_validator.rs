use crate::error::{ChangelogError, Result};
use std::path::{Component, Path, PathBuf};

/// Path checks for the directories and package names the tool reads from.
pub struct PathValidator;

impl PathValidator {
    /// Validates and canonicalises a directory given on the command line.
    pub fn validate_directory(path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();

        let canonical = path.canonicalize().map_err(|e| {
            ChangelogError::PathValidation(format!("Invalid path '{}': {e}", path.display()))
        })?;

        if !canonical.is_dir() {
            return Err(ChangelogError::PathValidation(format!(
                "Path '{}' is not a directory",
                canonical.display()
            )));
        }

        Ok(canonical)
    }

    /// Ensures a package name can be joined onto the docs directory without
    /// escaping it.
    pub fn validate_package_component(name: &str) -> Result<&str> {
        if name.is_empty() {
            return Err(ChangelogError::PathValidation(
                "Package name is empty".to_string(),
            ));
        }

        if name.contains('\0') || name.contains('\\') {
            return Err(ChangelogError::PathValidation(format!(
                "Package name '{}' contains a forbidden character",
                name
            )));
        }

        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(name),
            _ => Err(ChangelogError::PathValidation(format!(
                "Package name '{}' is not a single path component",
                name
            ))),
        }
    }
}

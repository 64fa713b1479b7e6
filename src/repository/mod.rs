use crate::error::{ChangelogError, Result};
use crate::utils::verbose_enabled;

pub mod factory;
pub mod local;
pub mod remote;

pub use factory::ResolverFactory;
pub use local::LocalArchiveSource;
pub use remote::{RemoteArchiveSource, RemoteSettings};

/// A place a package's raw changelog can come from.
pub trait ChangelogSource {
    /// Short label used in diagnostics.
    fn label(&self) -> &str;

    /// Returns `Ok(None)` when this source has nothing for the package, so the
    /// next source gets a chance. Errors abort the resolution.
    fn fetch(&self, package: &str, new_version: &str) -> Result<Option<String>>;
}

/// Tries each source in order; the first one that has the changelog wins.
pub struct ChangelogResolver {
    sources: Vec<Box<dyn ChangelogSource>>,
}

impl ChangelogResolver {
    pub fn new(sources: Vec<Box<dyn ChangelogSource>>) -> Self {
        Self { sources }
    }

    pub fn resolve(&self, package: &str, new_version: &str) -> Result<String> {
        for source in &self.sources {
            if let Some(text) = source.fetch(package, new_version)? {
                if verbose_enabled() {
                    eprintln!(
                        "[VERBOSE] Resolved changelog for {} from {}",
                        package,
                        source.label()
                    );
                }
                return Ok(text);
            }
        }

        Err(ChangelogError::ChangelogNotFound(package.to_string()))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashMap;

    /// In-memory source keyed by qualified package name.
    #[derive(Default)]
    pub struct MemorySource {
        pub changelogs: HashMap<String, String>,
    }

    impl MemorySource {
        pub fn with(mut self, package: &str, changelog: &str) -> Self {
            self.changelogs
                .insert(package.to_string(), changelog.to_string());
            self
        }
    }

    impl ChangelogSource for MemorySource {
        fn label(&self) -> &str {
            "memory"
        }

        fn fetch(&self, package: &str, _new_version: &str) -> Result<Option<String>> {
            Ok(self.changelogs.get(package).cloned())
        }
    }

    pub struct FailingSource;

    impl ChangelogSource for FailingSource {
        fn label(&self) -> &str {
            "failing"
        }

        fn fetch(&self, package: &str, _new_version: &str) -> Result<Option<String>> {
            Err(ChangelogError::NotAllowListed(package.to_string()))
        }
    }
}

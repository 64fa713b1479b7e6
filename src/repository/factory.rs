use crate::error::Result;
use crate::repository::{
    ChangelogResolver, ChangelogSource, LocalArchiveSource, RemoteArchiveSource, RemoteSettings,
};
use crate::utils::PathValidator;
use std::path::Path;

pub struct ResolverFactory;

impl ResolverFactory {
    /// Local archives under `docs_dir` first, then the remote archive.
    pub fn create_default(docs_dir: &Path, settings: RemoteSettings) -> Result<ChangelogResolver> {
        let docs_dir = PathValidator::validate_directory(docs_dir)?;
        let local = LocalArchiveSource::new(docs_dir);
        let remote = RemoteArchiveSource::new(settings)?;
        let sources: Vec<Box<dyn ChangelogSource>> = vec![Box::new(local), Box::new(remote)];
        Ok(ChangelogResolver::new(sources))
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChangelogError {
    #[error("Manifest parsing failed: {0}")]
    ManifestParse(String),

    #[error("Invalid Debian version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    #[error("Changelog parsing failed: {0}")]
    ChangelogParse(String),

    #[error("no supported changelog found for package {0}")]
    ChangelogNotFound(String),

    #[error("{0} has not been whitelisted for changelog retrieval")]
    NotAllowListed(String),

    #[error("No changelog found in {url} - status: {status}")]
    RemoteNotFound { url: String, status: u16 },

    #[error("{0} was not found in the changelog, aborting")]
    Truncated(String),

    #[error("Path validation failed: {0}")]
    PathValidation(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Git operation failed: {0}")]
    GitOperation(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ChangelogError>;

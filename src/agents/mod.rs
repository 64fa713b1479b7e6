pub mod manifest_differ;
pub mod manifest_loader;
pub mod version_control;

pub use manifest_differ::{ChangeReport, ManifestDiffer};
pub use manifest_loader::ManifestLoader;
pub use version_control::VersionControlAgent;

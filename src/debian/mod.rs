pub mod changelog;
pub mod version;

pub use changelog::Changelog;
pub use version::DebianVersion;

pub mod path_validator;

pub use path_validator::PathValidator;

/// Environment variable toggled by `--verbose`.
pub const VERBOSE_ENV: &str = "SNAP_CHANGELOG_VERBOSE";

pub fn verbose_enabled() -> bool {
    std::env::var(VERBOSE_ENV).is_ok()
}

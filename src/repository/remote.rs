use crate::agents::manifest_loader::package_name;
use crate::error::{ChangelogError, Result};
use crate::repository::ChangelogSource;
use crate::utils::verbose_enabled;
use colored::Colorize;
use reqwest::blocking::Client;
use std::time::Duration;
use url::Url;

pub const DEFAULT_CHANGELOG_URL: &str = "https://changelogs.ubuntu.com/changelogs/binary/";

/// Packages with a legitimate reason for missing a local changelog. Kept
/// short since every entry may cost a network round trip.
pub const DEFAULT_ALLOWED_PACKAGES: &[&str] = &[
    "apt",             // removed during hook
    "debconf",         // removed during hook
    "ca-certificates", // no changelog in folder
];

/// Settings for the changelog archive fallback.
#[derive(Debug, Clone)]
pub struct RemoteSettings {
    pub base_url: String,
    pub allowed_packages: Vec<String>,
    /// Set on Launchpad builds, where every package may be downloaded.
    pub ignore_allow_list: bool,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CHANGELOG_URL.to_string(),
            allowed_packages: DEFAULT_ALLOWED_PACKAGES
                .iter()
                .map(|p| p.to_string())
                .collect(),
            ignore_allow_list: false,
        }
    }
}

impl RemoteSettings {
    pub fn with_extra_allowed<I>(mut self, packages: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        for package in packages {
            if !self.allowed_packages.contains(&package) {
                self.allowed_packages.push(package);
            }
        }
        self
    }

    pub fn is_allowed(&self, name: &str) -> bool {
        self.ignore_allow_list || self.allowed_packages.iter().any(|p| p == name)
    }
}

/// Downloads changelogs from the distribution's changelog archive.
pub struct RemoteArchiveSource {
    client: Client,
    settings: RemoteSettings,
}

impl RemoteArchiveSource {
    pub fn new(settings: RemoteSettings) -> Result<Self> {
        Self::validate_base_url(&settings.base_url)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("snap-changelog/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, settings })
    }

    fn validate_base_url(url: &str) -> Result<()> {
        let parsed = Url::parse(url).map_err(|_| {
            ChangelogError::Configuration(format!("Invalid changelog archive URL: {url}"))
        })?;

        match parsed.scheme() {
            "https" | "http" => Ok(()),
            scheme => Err(ChangelogError::Configuration(format!(
                "Unsupported changelog archive scheme: {scheme}"
            ))),
        }
    }

    /// Archive paths are sharded like the pool: `libfoo` under `libf/`,
    /// everything else under its first letter.
    pub fn changelog_url(&self, name: &str, new_version: &str) -> String {
        let take = if name.starts_with("lib") { 4 } else { 1 };
        let shard: String = name.chars().take(take).collect();

        let base = self.settings.base_url.trim_end_matches('/');
        format!("{base}/{shard}/{name}/{new_version}/changelog")
    }
}

impl ChangelogSource for RemoteArchiveSource {
    fn label(&self) -> &str {
        "changelog archive"
    }

    fn fetch(&self, package: &str, new_version: &str) -> Result<Option<String>> {
        println!(
            "{}",
            format!(
                "failed to resolve changelog for {} locally, downloading from official repo",
                package
            )
            .yellow()
        );

        let name = package_name(package);
        if !self.settings.is_allowed(name) {
            return Err(ChangelogError::NotAllowListed(package.to_string()));
        }

        let url = self.changelog_url(name, new_version);
        if verbose_enabled() {
            eprintln!("[VERBOSE] Fetching: {}", url);
        }

        let response = self.client.get(&url).send()?;
        if !response.status().is_success() {
            return Err(ChangelogError::RemoteNotFound {
                url,
                status: response.status().as_u16(),
            });
        }

        Ok(Some(response.text()?))
    }
}

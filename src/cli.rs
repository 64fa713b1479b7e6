use crate::repository::RemoteSettings;
use crate::repository::remote::DEFAULT_CHANGELOG_URL;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "snap-changelog",
    about = "Generate snap changelog entries from the Debian changelogs of primed packages",
    version,
    author
)]
pub struct Cli {
    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write the primed-package changes between two dpkg manifests
    Diff {
        /// Manifest of the previous build
        #[arg(value_name = "OLD_MANIFEST")]
        old: PathBuf,

        /// Manifest of the new build
        #[arg(value_name = "NEW_MANIFEST")]
        new: PathBuf,

        /// Directory holding one sub-directory of docs per package
        #[arg(short, long, value_name = "DIR")]
        docs: PathBuf,

        /// File to write the report to (overwritten)
        #[arg(short, long, value_name = "PATH")]
        output: PathBuf,

        #[command(flatten)]
        resolver: ResolverArgs,
    },

    /// Prepend a release entry to the ChangeLog of a built snap
    Snap {
        /// Root of the previous snap
        #[arg(value_name = "PREVIOUS_SNAP_ROOT")]
        old_root: PathBuf,

        /// Root of the new snap
        #[arg(value_name = "NEW_SNAP_ROOT")]
        new_root: PathBuf,

        /// The name of the snap
        name: String,

        /// Git checkout the snap is built from
        #[arg(long, value_name = "DIR", default_value = ".")]
        repo: PathBuf,

        #[command(flatten)]
        resolver: ResolverArgs,
    },
}

#[derive(Args, Debug)]
pub struct ResolverArgs {
    /// Building on Launchpad: download any missing changelog, ignoring the allow-list
    #[arg(long)]
    pub launchpad: bool,

    /// Also allow downloading the changelog of this package (repeatable)
    #[arg(long = "allow", value_name = "PACKAGE")]
    pub allow: Vec<String>,

    /// Base URL of the binary changelog archive
    #[arg(long, value_name = "URL", default_value = DEFAULT_CHANGELOG_URL)]
    pub changelog_url: String,
}

impl ResolverArgs {
    pub fn into_settings(self) -> RemoteSettings {
        RemoteSettings {
            base_url: self.changelog_url,
            ignore_allow_list: self.launchpad,
            ..RemoteSettings::default()
        }
        .with_extra_allowed(self.allow)
    }
}

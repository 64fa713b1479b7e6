use crate::agents::{ChangeReport, ManifestDiffer, ManifestLoader, VersionControlAgent};
use crate::error::Result;
use crate::repository::{RemoteSettings, ResolverFactory};
use crate::utils::PathValidator;
use colored::Colorize;
use jiff::Zoned;
use std::fs;
use std::path::Path;

const DOC_DIR: &str = "usr/share/doc";
const CHANGELOG_FILE: &str = "usr/share/doc/ChangeLog";
const MANIFEST_FILE: &str = "usr/share/snappy/dpkg.yaml";

/// Write the primed-packages changelog for two manifests
pub fn execute_diff(
    old_manifest: &Path,
    new_manifest: &Path,
    docs_dir: &Path,
    output: &Path,
    settings: RemoteSettings,
) -> Result<()> {
    println!(
        "{}",
        "Generating changelog for primed packages...".cyan().bold()
    );

    println!("\n{}", "1. Comparing package manifests...".yellow());
    let report = build_report(old_manifest, new_manifest, docs_dir, settings)?;
    print_report_summary(&report);

    println!("\n{}", "2. Writing changelog...".yellow());
    fs::write(output, primed_packages_section(&report))?;
    println!(
        "{}",
        format!("✓ Changelog written to {}", output.display()).green()
    );

    Ok(())
}

/// Prepend a new release entry to the snap's ChangeLog
pub fn execute_snap(
    old_root: &Path,
    new_root: &Path,
    name: &str,
    repo_path: &Path,
    settings: RemoteSettings,
) -> Result<()> {
    println!(
        "{}",
        format!("Generating changelog for the {} snap...", name)
            .cyan()
            .bold()
    );

    println!("\n{}", "1. Validating snap roots...".yellow());
    let old_root = PathValidator::validate_directory(old_root)?;
    let new_root = PathValidator::validate_directory(new_root)?;
    let old_changelog = old_root.join(CHANGELOG_FILE);
    let new_changelog = new_root.join(CHANGELOG_FILE);
    println!("{}", "✓ Snap roots are valid".green());

    println!("\n{}", "2. Reading Git metadata...".yellow());
    let git = VersionControlAgent::new(repo_path)?;
    let previous_commit = VersionControlAgent::find_commit_in_changelog(&old_changelog)?;
    let current_commit = git.read_commit_hash()?;
    let remote_url = git.read_remote_url()?;
    println!("   Current commit: {}", current_commit.bright_cyan());

    let snap_changes = if !previous_commit.is_empty() && previous_commit != current_commit {
        println!("   Previous commit: {}", previous_commit.bright_cyan());
        git.log_between_commits(name, &previous_commit, &current_commit)
    } else {
        no_snap_changes(name)
    };

    println!("\n{}", "3. Comparing package manifests...".yellow());
    let report = build_report(
        &old_root.join(MANIFEST_FILE),
        &new_root.join(MANIFEST_FILE),
        &new_root.join(DOC_DIR),
        settings,
    )?;
    print_report_summary(&report);

    println!("\n{}", "4. Writing changelog...".yellow());
    let previous = if old_changelog.exists() {
        fs::read_to_string(&old_changelog)?
    } else {
        String::new()
    };

    let document = SnapChangelog {
        name,
        date: Zoned::now().strftime("%d/%m/%Y").to_string(),
        remote_url: &remote_url,
        commit: &current_commit,
        snap_changes: &snap_changes,
        primed_packages: &primed_packages_section(&report),
        previous: &previous,
    }
    .render();

    fs::write(&new_changelog, document)?;
    println!(
        "{}",
        format!("✓ Changelog written to {}", new_changelog.display()).green()
    );

    println!("\n{}", "✨ Changelog generated successfully!".green().bold());
    Ok(())
}

fn build_report(
    old_manifest: &Path,
    new_manifest: &Path,
    docs_dir: &Path,
    settings: RemoteSettings,
) -> Result<ChangeReport> {
    let old = ManifestLoader::load(old_manifest)?;
    let new = ManifestLoader::load(new_manifest)?;
    println!(
        "   {} packages before, {} packages after",
        old.len(),
        new.len()
    );

    let resolver = ResolverFactory::create_default(docs_dir, settings)?;
    ManifestDiffer::new(&resolver).diff(&old, &new)
}

fn print_report_summary(report: &ChangeReport) {
    if report.is_empty() {
        println!("{}", "✓ No changes for primed packages".green());
        return;
    }

    for group in &report.groups {
        println!(
            "   • {} {} → {}",
            group.source.bright_cyan(),
            group.old_version.dimmed(),
            group.new_version.green()
        );
    }
    println!(
        "{}",
        format!(
            "✓ {} source packages updated, {} added, {} removed",
            report.groups.len(),
            report.added.len(),
            report.removed.len()
        )
        .green()
    );
}

fn primed_packages_section(report: &ChangeReport) -> String {
    let mut text = String::from("[ Changes in primed packages ]\n\n");
    if report.is_empty() {
        text.push_str("No changes for primed packages\n\n");
    } else {
        text.push_str(&report.render());
    }
    text
}

fn no_snap_changes(name: &str) -> String {
    format!("No detected changes for the {} snap\n\n", name)
}

/// A release entry followed by the previous changelog.
struct SnapChangelog<'a> {
    name: &'a str,
    date: String,
    remote_url: &'a str,
    commit: &'a str,
    snap_changes: &'a str,
    primed_packages: &'a str,
    previous: &'a str,
}

impl SnapChangelog<'_> {
    fn render(&self) -> String {
        let mut text = format!(
            "{}, commit {}/tree/{}\n\n",
            self.date, self.remote_url, self.commit
        );
        text.push_str(&format!("[ Changes in the {} snap ]\n\n", self.name));
        text.push_str(self.snap_changes);
        text.push_str(self.primed_packages);
        text.push_str(self.previous);
        text
    }
}

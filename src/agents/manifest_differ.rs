use crate::agents::manifest_loader::PackageManifest;
use crate::debian::{Changelog, DebianVersion};
use crate::error::Result;
use crate::repository::ChangelogResolver;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::collections::BTreeMap;

const DEFAULT_INDENT: &str = "  ";

/// A package present in both manifests with a different version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDelta {
    pub package: String,
    pub old_version: String,
    pub new_version: String,
}

/// Binary packages built from one source, reported as a single transition.
#[derive(Debug, Clone)]
pub struct SourceGroup {
    pub source: String,
    pub old_version: String,
    pub new_version: String,
    pub packages: Vec<String>,
    pub changes: String,
}

#[derive(Debug, Clone, Default)]
pub struct ChangeReport {
    /// Sorted by source package name.
    pub groups: Vec<SourceGroup>,
    /// `(package, version)` pairs only present in the new manifest.
    pub added: Vec<(String, String)>,
    /// Packages only present in the old manifest.
    pub removed: Vec<String>,
}

impl ChangeReport {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.added.is_empty() && self.removed.is_empty()
    }

    pub fn render(&self) -> String {
        let mut text = String::new();

        for group in &self.groups {
            text.push_str(&format!(
                "{} (built from {}) updated from {} to {}:\n\n",
                group.packages.join(", "),
                group.source,
                group.old_version,
                group.new_version
            ));
            text.push_str(&group.changes);
        }

        for (package, version) in &self.added {
            text.push_str(&format!("{} ({}): new primed package\n\n", package, version));
        }

        for package in &self.removed {
            text.push_str(&format!("{}: not primed anymore\n\n", package));
        }

        text
    }
}

/// ManifestDiffer turns two manifests into a changelog report
pub struct ManifestDiffer<'a> {
    resolver: &'a ChangelogResolver,
    indent: String,
    show_progress: bool,
}

impl<'a> ManifestDiffer<'a> {
    pub fn new(resolver: &'a ChangelogResolver) -> Self {
        Self {
            resolver,
            indent: DEFAULT_INDENT.to_string(),
            show_progress: true,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Packages whose version changed, in name order.
    pub fn deltas(old: &PackageManifest, new: &PackageManifest) -> Vec<PackageDelta> {
        new.iter()
            .filter_map(|(package, new_version)| {
                let old_version = old.get(package)?;
                (old_version != new_version).then(|| PackageDelta {
                    package: package.clone(),
                    old_version: old_version.clone(),
                    new_version: new_version.clone(),
                })
            })
            .collect()
    }

    pub fn diff(&self, old: &PackageManifest, new: &PackageManifest) -> Result<ChangeReport> {
        let deltas = Self::deltas(old, new);
        let mut groups: BTreeMap<String, SourceGroup> = BTreeMap::new();

        let pb = ProgressBar::new(deltas.len() as u64);
        if !self.show_progress {
            pb.set_draw_target(ProgressDrawTarget::hidden());
        }
        if let Ok(style) = ProgressStyle::default_bar().template("  [{bar:40}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("=>-"));
        }

        for delta in deltas {
            pb.set_message(format!("Checking {}", delta.package));
            // Suspended so resolver output does not tear the bar.
            if let Err(err) = pb.suspend(|| self.record_delta(&mut groups, delta)) {
                pb.abandon();
                return Err(err);
            }
            pb.inc(1);
        }
        pb.finish_and_clear();

        let added = new
            .iter()
            .filter(|(package, _)| !old.contains_key(*package))
            .map(|(package, version)| (package.clone(), version.clone()))
            .collect();

        let removed = old
            .keys()
            .filter(|package| !new.contains_key(*package))
            .cloned()
            .collect();

        Ok(ChangeReport {
            groups: groups.into_values().collect(),
            added,
            removed,
        })
    }

    /// The first delta seen for a source decides the versions and the
    /// changelog chunk of the whole group; later binaries only add their name.
    fn record_delta(
        &self,
        groups: &mut BTreeMap<String, SourceGroup>,
        delta: PackageDelta,
    ) -> Result<()> {
        let text = self.resolver.resolve(&delta.package, &delta.new_version)?;
        let changelog = Changelog::parse(text)?;

        if let Some(group) = groups.get_mut(changelog.source()) {
            if group.old_version != delta.old_version || group.new_version != delta.new_version {
                println!(
                    "{}",
                    format!(
                        "⚠ {} moved from {} to {}, reported with {} as {} to {}",
                        delta.package,
                        delta.old_version,
                        delta.new_version,
                        group.source,
                        group.old_version,
                        group.new_version
                    )
                    .yellow()
                );
            }
            group.packages.push(delta.package);
            return Ok(());
        }

        let old_version = DebianVersion::parse(&delta.old_version)?;
        let changes = changelog.changes_since(&old_version, &self.indent)?;
        let source = changelog.source().to_string();

        groups.insert(
            source.clone(),
            SourceGroup {
                source,
                old_version: delta.old_version,
                new_version: delta.new_version,
                packages: vec![delta.package],
                changes,
            },
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChangelogError;
    use crate::repository::testing::MemorySource;

    const FOO_CHANGELOG: &str = "\
foo (1.0-2) noble; urgency=medium

  * Fix the frobnicator.

 -- Jane Doe <jane@example.com>  Tue, 02 Jan 2024 10:00:00 +0000

foo (1.0-1) noble; urgency=medium

  * Packaging fix.

 -- Jane Doe <jane@example.com>  Mon, 01 Jan 2024 10:00:00 +0000
";

    fn manifest(entries: &[(&str, &str)]) -> PackageManifest {
        entries
            .iter()
            .map(|(name, version)| (name.to_string(), version.to_string()))
            .collect()
    }

    fn resolver(source: MemorySource) -> ChangelogResolver {
        ChangelogResolver::new(vec![Box::new(source)])
    }

    #[test]
    fn identical_manifests_produce_empty_report() {
        let resolver = resolver(MemorySource::default());
        let packages = manifest(&[("foo", "1.0-1"), ("bar:amd64", "2.0")]);

        let report = ManifestDiffer::new(&resolver)
            .with_progress(false)
            .diff(&packages, &packages)
            .unwrap();

        assert!(report.is_empty());
        assert_eq!(report.render(), "");
    }

    #[test]
    fn new_package_is_added() {
        let resolver = resolver(MemorySource::default());
        let old = manifest(&[]);
        let new = manifest(&[("foo", "1.0-1")]);

        let report = ManifestDiffer::new(&resolver)
            .with_progress(false)
            .diff(&old, &new)
            .unwrap();

        assert!(report.groups.is_empty());
        assert_eq!(report.render(), "foo (1.0-1): new primed package\n\n");
    }

    #[test]
    fn dropped_package_is_removed() {
        let resolver = resolver(MemorySource::default());
        let old = manifest(&[("foo", "1.0-1")]);
        let new = manifest(&[]);

        let report = ManifestDiffer::new(&resolver)
            .with_progress(false)
            .diff(&old, &new)
            .unwrap();

        assert_eq!(report.removed, vec!["foo".to_string()]);
        assert_eq!(report.render(), "foo: not primed anymore\n\n");
    }

    #[test]
    fn architecture_change_is_add_and_remove() {
        let resolver = resolver(MemorySource::default());
        let old = manifest(&[("libc6", "2.39")]);
        let new = manifest(&[("libc6:amd64", "2.39")]);

        let report = ManifestDiffer::new(&resolver)
            .with_progress(false)
            .diff(&old, &new)
            .unwrap();

        assert_eq!(report.added, vec![("libc6:amd64".to_string(), "2.39".to_string())]);
        assert_eq!(report.removed, vec!["libc6".to_string()]);
    }

    #[test]
    fn version_change_reports_changelog_chunk() {
        let resolver = resolver(MemorySource::default().with("foo", FOO_CHANGELOG));
        let old = manifest(&[("foo", "1.0-1")]);
        let new = manifest(&[("foo", "1.0-2")]);

        let report = ManifestDiffer::new(&resolver)
            .with_progress(false)
            .diff(&old, &new)
            .unwrap();

        let text = report.render();
        assert!(text.starts_with("foo (built from foo) updated from 1.0-1 to 1.0-2:\n\n"));
        assert!(text.contains("  foo (1.0-2) noble; urgency=medium\n"));
        assert!(text.contains("    * Fix the frobnicator.\n"));
        assert!(!text.contains("Packaging fix"));
    }

    #[test]
    fn binaries_from_one_source_are_merged() {
        // Slicing the second binary's changelog would fail, so it must not happen.
        let source = MemorySource::default().with("foo", FOO_CHANGELOG).with(
            "foo-data",
            "foo (1.0-2) noble; urgency=medium\n\nfoo-data (1.0-1) noble; urgency=low\n",
        );
        let resolver = resolver(source);
        let old = manifest(&[("foo", "1.0-1"), ("foo-data", "1.0-1")]);
        let new = manifest(&[("foo", "1.0-2"), ("foo-data", "1.0-2")]);

        let report = ManifestDiffer::new(&resolver)
            .with_progress(false)
            .diff(&old, &new)
            .unwrap();

        assert_eq!(report.groups.len(), 1);
        let group = &report.groups[0];
        assert_eq!(group.packages, vec!["foo", "foo-data"]);
        assert!(group.changes.contains("Fix the frobnicator"));
        assert!(
            report
                .render()
                .starts_with("foo, foo-data (built from foo) updated from 1.0-1 to 1.0-2:")
        );
    }

    #[test]
    fn first_delta_decides_group_versions() {
        let source = MemorySource::default()
            .with("foo", FOO_CHANGELOG)
            .with("foo-extra", FOO_CHANGELOG);
        let resolver = resolver(source);
        let old = manifest(&[("foo", "1.0-1"), ("foo-extra", "0.9-1")]);
        let new = manifest(&[("foo", "1.0-2"), ("foo-extra", "1.0-2")]);

        let report = ManifestDiffer::new(&resolver)
            .with_progress(false)
            .diff(&old, &new)
            .unwrap();

        let group = &report.groups[0];
        assert_eq!(group.old_version, "1.0-1");
        assert_eq!(group.packages, vec!["foo", "foo-extra"]);
    }

    #[test]
    fn report_orders_groups_then_added_then_removed() {
        let bar_changelog = FOO_CHANGELOG.replace("foo (", "bar (");
        let source = MemorySource::default()
            .with("foo", FOO_CHANGELOG)
            .with("zbar", &bar_changelog);
        let resolver = resolver(source);
        let old = manifest(&[("foo", "1.0-1"), ("zbar", "1.0-1"), ("gone", "3")]);
        let new = manifest(&[("foo", "1.0-2"), ("zbar", "1.0-2"), ("aaa", "1")]);

        let report = ManifestDiffer::new(&resolver)
            .with_progress(false)
            .diff(&old, &new)
            .unwrap();
        let text = report.render();

        let bar = text.find("zbar (built from bar)").unwrap();
        let foo = text.find("foo (built from foo)").unwrap();
        let added = text.find("aaa (1): new primed package").unwrap();
        let removed = text.find("gone: not primed anymore").unwrap();
        assert!(bar < foo && foo < added && added < removed);
    }

    #[test]
    fn missing_changelog_fails() {
        let resolver = resolver(MemorySource::default());
        let old = manifest(&[("foo", "1.0-1")]);
        let new = manifest(&[("foo", "1.0-2")]);

        let err = ManifestDiffer::new(&resolver)
            .with_progress(false)
            .diff(&old, &new)
            .unwrap_err();
        assert!(matches!(err, ChangelogError::ChangelogNotFound(_)));
    }

    #[test]
    fn deltas_are_sorted_by_name() {
        let old = manifest(&[("b", "1"), ("a", "1"), ("c", "1")]);
        let new = manifest(&[("c", "1"), ("b", "2"), ("a", "2")]);

        let deltas = ManifestDiffer::deltas(&old, &new);
        let names: Vec<&str> = deltas.iter().map(|d| d.package.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}

use crate::error::{ChangelogError, Result};
use crate::utils::PathValidator;
use colored::Colorize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// VersionControlAgent reads the git metadata recorded in the snap changelog.
pub struct VersionControlAgent {
    repo_path: PathBuf,
}

impl VersionControlAgent {
    pub fn new<P: AsRef<Path>>(repo_path: P) -> Result<Self> {
        let repo_path = Self::validate_git_path(repo_path.as_ref())?;
        Ok(Self { repo_path })
    }

    /// Hash of the commit currently checked out
    pub fn read_commit_hash(&self) -> Result<String> {
        let output = self.run_git(&["rev-parse", "HEAD"])?;
        Self::ensure_success(&output, "git rev-parse")?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Browsable URL of the `origin` remote
    pub fn read_remote_url(&self) -> Result<String> {
        let output = self.run_git(&["remote", "get-url", "origin"])?;
        Self::ensure_success(&output, "git remote get-url")?;
        Ok(Self::normalize_remote_url(
            String::from_utf8_lossy(&output.stdout).trim(),
        ))
    }

    /// Shortlog of the snap's own commits between two releases. Falls back to a
    /// "no changes" paragraph when the range cannot be walked.
    pub fn log_between_commits(&self, name: &str, start: &str, end: &str) -> String {
        let no_changes = format!("No detected changes for the {} snap\n\n", name);

        if !Self::is_safe_revision(start) || !Self::is_safe_revision(end) {
            println!(
                "{}",
                format!("⚠ Refusing to walk unexpected revision range {start}..{end}").yellow()
            );
            return no_changes;
        }

        let range = format!("{start}..{end}");
        match self.run_git(&["shortlog", "--pretty=short", &range]) {
            Ok(output) if output.status.success() => {
                String::from_utf8_lossy(&output.stdout).into_owned()
            }
            _ => {
                // The previous release commit is missing from this fork.
                println!(
                    "{}",
                    format!(
                        "⚠ Failed to run 'git log' for the current repo starting at commit {}, has branch diverged to much?",
                        start
                    )
                    .yellow()
                );
                no_changes
            }
        }
    }

    /// Commit recorded on the first line of a previous changelog, e.g.
    /// `01/02/2024, commit https://github.com/org/repo/tree/<hash>`.
    pub fn find_commit_in_changelog(path: &Path) -> Result<String> {
        if path.as_os_str().is_empty() || !path.exists() {
            println!(
                "No previous changelog existed at {}, skipping changelog generation for local repo",
                path.display()
            );
            return Ok(String::new());
        }

        let mut first_line = String::new();
        BufReader::new(File::open(path)?).read_line(&mut first_line)?;
        let first_line = first_line.trim();

        if !first_line.contains("commit") {
            return Ok(String::new());
        }

        Ok(first_line
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string())
    }

    pub fn normalize_remote_url(url: &str) -> String {
        let url = match url.strip_prefix("git@github.com:") {
            Some(path) => format!("https://github.com/{path}"),
            None => url.to_string(),
        };

        match url.strip_suffix(".git") {
            Some(stripped) => stripped.to_string(),
            None => url,
        }
    }

    fn is_safe_revision(revision: &str) -> bool {
        !revision.is_empty()
            && !revision.starts_with('-')
            && !revision.contains("..")
            && revision
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '/' | '.'))
    }

    fn run_git(&self, args: &[&str]) -> Result<Output> {
        Command::new("git")
            .current_dir(&self.repo_path)
            .args(args)
            .output()
            .map_err(|e| {
                ChangelogError::GitOperation(format!(
                    "Failed to execute git command '{}': {e}",
                    args.join(" ")
                ))
            })
    }

    fn ensure_success(output: &Output, command: &str) -> Result<()> {
        if output.status.success() {
            return Ok(());
        }

        Err(ChangelogError::GitOperation(format!(
            "{} failed: {}",
            command,
            String::from_utf8_lossy(&output.stderr)
        )))
    }

    fn validate_git_path(path: &Path) -> Result<PathBuf> {
        let dangerous = [';', '|', '&', '$', '`', '\n', '\r'];
        let path_str = path.to_string_lossy();
        if let Some(ch) = dangerous.iter().find(|c| path_str.contains(**c)) {
            return Err(ChangelogError::GitOperation(format!(
                "Path contains dangerous character: '{}'",
                ch
            )));
        }

        PathValidator::validate_directory(path)
            .map_err(|err| ChangelogError::GitOperation(format!("Invalid Git path: {}", err)))
    }
}

/// Throwaway git repositories for tests.
#[cfg(test)]
pub(crate) mod testing {
    use std::path::Path;
    use std::process::Command;

    pub(crate) const ORIGIN: &str = "git@github.com:org/repo.git";

    pub(crate) fn git(dir: &Path, args: &[&str]) -> String {
        let output = Command::new("git")
            .current_dir(dir)
            .args(["-c", "user.name=Jane Doe", "-c", "user.email=jane@example.com"])
            .args(["-c", "commit.gpgsign=false"])
            .args(args)
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// `git init` with an SSH-style `origin`.
    pub(crate) fn init_repo(dir: &Path) {
        git(dir, &["init", "-q"]);
        git(dir, &["remote", "add", "origin", ORIGIN]);
    }

    /// Commits nothing with `message` and returns the new HEAD.
    pub(crate) fn commit(dir: &Path, message: &str) -> String {
        git(dir, &["commit", "-q", "--allow-empty", "-m", message]);
        git(dir, &["rev-parse", "HEAD"])
    }
}

use crate::debian::version::DebianVersion;
use crate::error::{ChangelogError, Result};
use colored::Colorize;
use regex::Regex;

/// Matches an entry header such as `foo (1.0-2) noble; urgency=medium`.
const ENTRY_HEADER_PATTERN: &str = r"(?i)^(\w[-+0-9a-z.]*) \(([^() \t]+)\)((\s+[-+0-9a-z.]+)+);";

/// A Debian changelog, newest entry first.
#[derive(Debug, Clone)]
pub struct Changelog {
    text: String,
    source: String,
    versions: Vec<DebianVersion>,
}

impl Changelog {
    pub fn parse(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        let source = Self::read_source_name(&text)?;

        let header = Regex::new(ENTRY_HEADER_PATTERN)
            .map_err(|e| ChangelogError::ChangelogParse(format!("Regex error: {}", e)))?;

        let mut versions = Vec::new();
        for line in text.lines() {
            if let Some(caps) = header.captures(line) {
                versions.push(DebianVersion::parse(&caps[2])?);
            }
        }

        if versions.is_empty() {
            return Err(ChangelogError::ChangelogParse(format!(
                "no entries found in the changelog of {}",
                source
            )));
        }

        Ok(Self {
            text,
            source,
            versions,
        })
    }

    /// The source package name is the token before the first space of the top line.
    fn read_source_name(text: &str) -> Result<String> {
        let first_line = text.lines().next().unwrap_or_default();
        match first_line.split_once(' ') {
            Some((source, _)) if !source.is_empty() => Ok(source.to_string()),
            _ => Err(ChangelogError::ChangelogParse(format!(
                "cannot read the source package from '{}'",
                first_line
            ))),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn versions(&self) -> &[DebianVersion] {
        &self.versions
    }

    /// First entry that `old` is the same as or newer than. `None` when every
    /// entry is newer than `old`.
    pub fn baseline(&self, old: &DebianVersion) -> Option<&DebianVersion> {
        self.versions().iter().find(|version| old >= *version)
    }

    /// Every line above the baseline entry, each prefixed with `indent`.
    /// Empty lines are kept bare.
    pub fn changes_since(&self, old: &DebianVersion, indent: &str) -> Result<String> {
        let Some(baseline) = self.baseline(old) else {
            println!("{}", self.predates_history_warning(old).yellow());
            let mut chunk = String::new();
            for line in self.text.lines() {
                Self::push_line(&mut chunk, line, indent);
            }
            return Ok(chunk);
        };

        let header = format!("{} ({})", self.source, baseline.original);
        let mut chunk = String::new();
        for line in self.text.lines() {
            if line.starts_with(&header) {
                return Ok(chunk);
            }
            Self::push_line(&mut chunk, line, indent);
        }

        Err(ChangelogError::Truncated(header))
    }

    fn predates_history_warning(&self, old: &DebianVersion) -> String {
        format!(
            "⚠ {} predates every entry in the {} changelog, keeping all of it",
            old, self.source
        )
    }

    fn push_line(chunk: &mut String, line: &str, indent: &str) {
        if !line.is_empty() {
            chunk.push_str(indent);
            chunk.push_str(line);
        }
        chunk.push('\n');
    }
}

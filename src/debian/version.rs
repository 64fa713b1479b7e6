use crate::error::{ChangelogError, Result};
use std::cmp::Ordering;
use std::fmt;

/// Debian package version: `[epoch:]upstream_version[-debian_revision]`
#[derive(Debug, Clone)]
pub struct DebianVersion {
    pub original: String,
    pub epoch: u64,
    pub upstream: String,
    pub revision: String,
}

impl DebianVersion {
    pub fn parse(version: &str) -> Result<Self> {
        let trimmed = version.trim();
        if trimmed.is_empty() {
            return Err(Self::invalid(version, "version string is empty"));
        }

        let (epoch, rest) = match trimmed.split_once(':') {
            Some((epoch, rest)) => {
                let epoch = epoch
                    .parse::<u64>()
                    .map_err(|_| Self::invalid(version, "epoch is not a number"))?;
                (epoch, rest)
            }
            None => (0, trimmed),
        };

        // The revision starts after the last hyphen; the upstream part may contain more.
        let (upstream, revision) = match rest.rsplit_once('-') {
            Some((upstream, revision)) => {
                if revision.is_empty() {
                    return Err(Self::invalid(version, "debian revision is empty"));
                }
                (upstream, revision)
            }
            None => (rest, ""),
        };

        if upstream.is_empty() {
            return Err(Self::invalid(version, "upstream version is empty"));
        }

        if let Some(ch) = upstream
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '~' | '-' | ':')))
        {
            return Err(Self::invalid(
                version,
                &format!("invalid character '{ch}' in upstream version"),
            ));
        }

        if let Some(ch) = revision
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '~')))
        {
            return Err(Self::invalid(
                version,
                &format!("invalid character '{ch}' in debian revision"),
            ));
        }

        Ok(DebianVersion {
            original: trimmed.to_string(),
            epoch,
            upstream: upstream.to_string(),
            revision: revision.to_string(),
        })
    }

    fn invalid(version: &str, reason: &str) -> ChangelogError {
        ChangelogError::InvalidVersion {
            version: version.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Weight of a single character in the non-digit part of a fragment.
    /// Tilde sorts before everything, even the end of the fragment; letters
    /// sort before the remaining punctuation.
    fn order(c: Option<u8>) -> i32 {
        match c {
            None => 0,
            Some(c) if c.is_ascii_digit() => 0,
            Some(c) if c.is_ascii_alphabetic() => i32::from(c),
            Some(b'~') => -1,
            Some(c) => i32::from(c) + 256,
        }
    }

    /// dpkg's `verrevcmp`: alternate between non-digit and digit runs.
    fn compare_fragment(a: &str, b: &str) -> Ordering {
        let a = a.as_bytes();
        let b = b.as_bytes();
        let (mut i, mut j) = (0, 0);

        while i < a.len() || j < b.len() {
            while (i < a.len() && !a[i].is_ascii_digit()) || (j < b.len() && !b[j].is_ascii_digit())
            {
                let ac = Self::order(a.get(i).copied());
                let bc = Self::order(b.get(j).copied());
                if ac != bc {
                    return ac.cmp(&bc);
                }
                i += 1;
                j += 1;
            }

            while a.get(i) == Some(&b'0') {
                i += 1;
            }
            while b.get(j) == Some(&b'0') {
                j += 1;
            }

            let mut first_diff = Ordering::Equal;
            while i < a.len() && j < b.len() && a[i].is_ascii_digit() && b[j].is_ascii_digit() {
                if first_diff == Ordering::Equal {
                    first_diff = a[i].cmp(&b[j]);
                }
                i += 1;
                j += 1;
            }

            if a.get(i).is_some_and(u8::is_ascii_digit) {
                return Ordering::Greater;
            }
            if b.get(j).is_some_and(u8::is_ascii_digit) {
                return Ordering::Less;
            }
            if first_diff != Ordering::Equal {
                return first_diff;
            }
        }

        Ordering::Equal
    }
}

impl fmt::Display for DebianVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl PartialEq for DebianVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DebianVersion {}

impl PartialOrd for DebianVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DebianVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| Self::compare_fragment(&self.upstream, &other.upstream))
            .then_with(|| Self::compare_fragment(&self.revision, &other.revision))
    }
}

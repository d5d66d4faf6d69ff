//! Ownership manifest (CODEOWNERS-style) parsing.

use serde::{Deserialize, Serialize};

/// Ordered owner handles parsed from an ownership manifest.
///
/// Invariant: every entry is non-empty and contains neither whitespace nor `@`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerManifest {
    owners: Vec<String>,
}

impl OwnerManifest {
    /// Parse manifest text.
    ///
    /// Per line:
    /// - blank lines are dropped
    /// - lines starting with `#` (after leading whitespace) are dropped
    /// - the handle is the text after the first `@`, up to the next
    ///   whitespace or `@`; a line without one yields nothing
    pub fn parse(text: &str) -> Self {
        let owners = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(extract_handle)
            .map(str::to_string)
            .collect();
        Self { owners }
    }

    /// Build from already-extracted handles, dropping empty ones.
    pub fn from_owners<I, S>(owners: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            owners: owners
                .into_iter()
                .map(Into::into)
                .filter(|o: &String| !o.is_empty())
                .collect(),
        }
    }

    /// The owner tickets are assigned to.
    pub fn primary(&self) -> Option<&str> {
        self.owners.first().map(String::as_str)
    }

    pub fn owners(&self) -> &[String] {
        &self.owners
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

fn extract_handle(line: &str) -> Option<&str> {
    let (_, rest) = line.split_once('@')?;
    let end = rest
        .find(|c: char| c.is_whitespace() || c == '@')
        .unwrap_or(rest.len());
    let handle = &rest[..end];
    (!handle.is_empty()).then_some(handle)
}

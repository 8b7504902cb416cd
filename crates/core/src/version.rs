// SPDX-License-Identifier: MIT

//! Version strings: the dash-joined short-id encoding that names `auto/*`
//! branches and round-trips back into the commits an unmerge must resolve.
//!
//! The original implementation hashed the sorted commit ids with SHA-1 and
//! named the branch `auto/<sha1>`. That encoding is opaque: an operator (or
//! the unmerge algorithm) cannot recover the contributing commits from the
//! branch name alone. This redesign dash-joins the first 8 hex characters
//! of each sorted commit id instead, so `auto-<version>` is both a stable
//! fold over the input set and a legible manifest of what it contains.

use crate::commit::CommitId;

/// A resolved version string: `<c1>-<c2>-...-<cn>`, built from the first 8
/// hex characters of each commit id, commits sorted lexicographically by
/// their full id so the result is permutation-invariant over the input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Version(pub String);

impl Version {
    /// Build a version string from a non-empty set of commits. Sorting by
    /// full commit id (not the truncated short id) keeps the result
    /// deterministic even if two commits happen to share an 8-char prefix.
    pub fn from_commits(commits: &[CommitId]) -> Option<Self> {
        if commits.is_empty() {
            return None;
        }
        let mut sorted: Vec<&CommitId> = commits.iter().collect();
        sorted.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        let joined = sorted
            .iter()
            .map(|c| c.short8())
            .collect::<Vec<_>>()
            .join("-");
        Some(Self(joined))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name of the branch this version deploys to: `auto/<version>`.
    pub fn branch_name(&self) -> String {
        format!("auto/{}", self.0)
    }

    /// The deployed tag for this version: `auto-<version>`.
    pub fn tag(&self) -> String {
        format!("auto-{}", self.0)
    }

    /// Split a deployed tag (`auto-<c1>-<c2>-...`) back into its short ids.
    ///
    /// Returns `None` if the tag doesn't start with `auto-`, matching the
    /// "Version format not recognized" failure in the unmerge algorithm.
    pub fn short_ids_from_tag(tag: &str) -> Option<Vec<&str>> {
        let remainder = tag.strip_prefix("auto-")?;
        if remainder.is_empty() {
            return None;
        }
        Some(remainder.split('-').collect())
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[path = "version_tests.rs"]
mod tests;

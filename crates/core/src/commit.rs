// SPDX-License-Identifier: MIT

//! Commit identity and the record shape published in branch snapshots.

use serde::{Deserialize, Serialize};

/// A full commit id, always 40 lowercase hex characters once resolved from
/// a real repository. Kept as a plain `String` newtype rather than an
/// `id::define_id!` type: commit ids come from git, not from an internal
/// generator, and callers frequently need the raw string for subprocess
/// argument building.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CommitId(pub String);

impl CommitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 8 hex characters, as used to build version strings.
    pub fn short8(&self) -> &str {
        if self.0.len() <= 8 {
            &self.0
        } else {
            &self.0[..8]
        }
    }
}

impl std::fmt::Display for CommitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CommitId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for CommitId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One entry in a branch snapshot: metadata for a single commit, as
/// surfaced through the external `branches` interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub commit_id: CommitId,
    pub author: String,
    /// ISO-8601 timestamp, as produced by `git log --format=%aI`.
    pub iso_timestamp: String,
    pub message: String,
}

impl CommitRecord {
    pub fn new(
        commit_id: impl Into<CommitId>,
        author: impl Into<String>,
        iso_timestamp: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            commit_id: commit_id.into(),
            author: author.into(),
            iso_timestamp: iso_timestamp.into(),
            message: message.into(),
        }
    }
}

/// Maximum number of commits kept per branch in a published snapshot.
pub const BRANCH_SNAPSHOT_LIMIT: usize = 10;

/// Trims a branch's commit history (newest first) down to the published
/// snapshot limit, and excludes `auto/*` branches entirely (they are
/// machine-generated merge targets, not source-of-truth history).
pub fn snapshot_eligible(branch_name: &str) -> bool {
    !branch_name.starts_with("auto/")
}

pub fn truncate_snapshot(mut commits: Vec<CommitRecord>) -> Vec<CommitRecord> {
    commits.truncate(BRANCH_SNAPSHOT_LIMIT);
    commits
}

#[cfg(test)]
#[path = "commit_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT

//! Branch-tip bookkeeping shared by the merge and unmerge planners.

use crate::commit::CommitId;
use indexmap::IndexMap;

/// A remote branch's current tip, as enumerated from a working copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchTip {
    pub name: String,
    pub commit_id: CommitId,
}

impl BranchTip {
    pub fn new(name: impl Into<String>, commit_id: impl Into<CommitId>) -> Self {
        Self {
            name: name.into(),
            commit_id: commit_id.into(),
        }
    }
}

/// The set of known branch tips, in enumeration order (stable, so
/// tie-breaking between branches pointed at the same commit is
/// deterministic: first encountered wins).
#[derive(Debug, Clone, Default)]
pub struct BranchTips {
    tips: Vec<BranchTip>,
}

impl BranchTips {
    pub fn new(tips: Vec<BranchTip>) -> Self {
        Self { tips }
    }

    pub fn iter(&self) -> impl Iterator<Item = &BranchTip> {
        self.tips.iter()
    }

    /// First branch (in enumeration order) whose tip equals `commit_id`.
    pub fn find_at(&self, commit_id: &CommitId) -> Option<&BranchTip> {
        self.tips.iter().find(|b| &b.commit_id == commit_id)
    }

    /// Groups branch names by their tip commit, preserving first-seen
    /// branch order within each group.
    pub fn by_commit(&self) -> IndexMap<CommitId, Vec<&str>> {
        let mut map: IndexMap<CommitId, Vec<&str>> = IndexMap::new();
        for tip in &self.tips {
            map.entry(tip.commit_id.clone())
                .or_default()
                .push(tip.name.as_str());
        }
        map
    }
}

#[cfg(test)]
#[path = "branch_tests.rs"]
mod tests;

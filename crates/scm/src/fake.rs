// SPDX-License-Identifier: MIT

//! `FakeSourceControl`: an in-memory commit graph used by engine unit
//! tests that need `SourceControlOps` without a real git subprocess. The
//! merge/unmerge *algorithm* tests exercise real repositories through
//! [`crate::git::GitSourceControl`] (§8); this fake only supports the
//! step-plumbing tests that don't care about actual git semantics.

use crate::error::ScmError;
use crate::ops::SourceControlOps;
use async_trait::async_trait;
use indexmap::IndexMap;
use oj_ci_core::{BranchTip, BranchTips, CommitGraph, CommitId, CommitRecord};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct FakeCommit {
    pub id: CommitId,
    pub parents: Vec<CommitId>,
    pub author: String,
    pub iso_timestamp: String,
    pub message: String,
}

#[derive(Default)]
struct State {
    commits: HashMap<CommitId, FakeCommit>,
    branches: IndexMap<String, CommitId>,
    /// Commits merged by `merge_no_ff` that should fail with a conflict.
    conflicting: std::collections::HashSet<(CommitId, CommitId)>,
    head: Option<CommitId>,
    pushed: Vec<String>,
}

/// A builder-friendly fake standing in for a real git working copy.
#[derive(Default)]
pub struct FakeSourceControl {
    state: Mutex<State>,
}

impl FakeSourceControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_commit(&self, commit: FakeCommit) -> &Self {
        self.state.lock().commits.insert(commit.id.clone(), commit);
        self
    }

    pub fn set_branch(&self, name: impl Into<String>, commit_id: CommitId) -> &Self {
        self.state.lock().branches.insert(name.into(), commit_id);
        self
    }

    pub fn mark_conflicting(&self, base: CommitId, incoming: CommitId) -> &Self {
        self.state.lock().conflicting.insert((base, incoming));
        self
    }

    pub fn pushed_branches(&self) -> Vec<String> {
        self.state.lock().pushed.clone()
    }
}

#[async_trait]
impl SourceControlOps for FakeSourceControl {
    async fn clone_or_fetch(
        &self,
        _path: &Path,
        _repo: &str,
        _branch_prefix: Option<&str>,
    ) -> Result<(), ScmError> {
        Ok(())
    }

    async fn enumerate_branches(
        &self,
        _path: &Path,
        prefix: Option<&str>,
        limit: usize,
    ) -> Result<IndexMap<String, Vec<CommitRecord>>, ScmError> {
        let state = self.state.lock();
        let mut out = IndexMap::new();
        for (name, tip) in &state.branches {
            if !oj_ci_core::snapshot_eligible(name) {
                continue;
            }
            if let Some(p) = prefix {
                if !name.starts_with(p) {
                    continue;
                }
            }
            let mut history = Vec::new();
            let mut cursor = Some(tip.clone());
            while let Some(id) = cursor {
                if history.len() >= limit {
                    break;
                }
                let Some(commit) = state.commits.get(&id) else {
                    break;
                };
                history.push(CommitRecord::new(
                    commit.id.clone(),
                    commit.author.clone(),
                    commit.iso_timestamp.clone(),
                    commit.message.clone(),
                ));
                cursor = commit.parents.first().cloned();
            }
            out.insert(name.clone(), history);
        }
        Ok(out)
    }

    async fn resolve_head(&self, _path: &Path, branch_name: &str) -> Result<CommitId, ScmError> {
        self.state
            .lock()
            .branches
            .get(branch_name)
            .cloned()
            .ok_or_else(|| ScmError::UnresolvedRef {
                ref_name: branch_name.to_string(),
            })
    }

    /// Resolves an exact or abbreviated (prefix) commit id, mirroring
    /// `git rev-parse --verify`'s acceptance of short hashes.
    async fn resolve_commit(&self, _path: &Path, commit_id: &str) -> Result<CommitId, ScmError> {
        let state = self.state.lock();
        if let Some(exact) = state.commits.get(&CommitId::new(commit_id)) {
            return Ok(exact.id.clone());
        }
        state
            .commits
            .keys()
            .find(|id| id.as_str().starts_with(commit_id))
            .cloned()
            .ok_or_else(|| ScmError::UnresolvedRef {
                ref_name: commit_id.to_string(),
            })
    }

    async fn branch_tips(&self, _path: &Path) -> Result<BranchTips, ScmError> {
        let state = self.state.lock();
        let tips = state
            .branches
            .iter()
            .filter(|(name, _)| oj_ci_core::snapshot_eligible(name))
            .map(|(name, id)| BranchTip::new(name.clone(), id.clone()))
            .collect();
        Ok(BranchTips::new(tips))
    }

    async fn commit_graph(&self, _path: &Path) -> Result<CommitGraph, ScmError> {
        let state = self.state.lock();
        let parents = state
            .commits
            .values()
            .map(|c| (c.id.clone(), c.parents.clone()))
            .collect();
        Ok(CommitGraph::new(parents))
    }

    async fn checkout_commit(&self, _path: &Path, commit_id: &CommitId) -> Result<(), ScmError> {
        self.state.lock().head = Some(commit_id.clone());
        Ok(())
    }

    async fn force_create_branch(
        &self,
        _path: &Path,
        branch_name: &str,
        commit_id: &CommitId,
    ) -> Result<(), ScmError> {
        let mut state = self.state.lock();
        state.branches.insert(branch_name.to_string(), commit_id.clone());
        state.head = Some(commit_id.clone());
        Ok(())
    }

    async fn checkout_branch(&self, _path: &Path, branch_name: &str) -> Result<(), ScmError> {
        let tip = self
            .state
            .lock()
            .branches
            .get(branch_name)
            .cloned()
            .ok_or_else(|| ScmError::UnresolvedRef {
                ref_name: branch_name.to_string(),
            })?;
        self.state.lock().head = Some(tip);
        Ok(())
    }

    async fn force_push(&self, _path: &Path, branch_name: &str) -> Result<(), ScmError> {
        self.state.lock().pushed.push(branch_name.to_string());
        Ok(())
    }

    async fn merge_no_ff(&self, _path: &Path, commit_id: &CommitId) -> Result<CommitId, ScmError> {
        let mut state = self.state.lock();
        let base = state.head.clone().ok_or_else(|| ScmError::UnresolvedRef {
            ref_name: "HEAD".to_string(),
        })?;
        if state.conflicting.contains(&(base.clone(), commit_id.clone())) {
            return Err(ScmError::MergeConflict {
                commit_id: commit_id.to_string(),
                message: format!("Merge conflict merging {commit_id}"),
            });
        }
        let merge_id = CommitId::new(format!("merge-{}-{}", base.short8(), commit_id.short8()));
        state.commits.insert(
            merge_id.clone(),
            FakeCommit {
                id: merge_id.clone(),
                parents: vec![base, commit_id.clone()],
                author: "auto-merge".to_string(),
                iso_timestamp: "1970-01-01T00:00:00Z".to_string(),
                message: format!("Merge {commit_id}"),
            },
        );
        state.head = Some(merge_id.clone());
        Ok(merge_id)
    }

    async fn current_commit(&self, _path: &Path) -> Result<CommitId, ScmError> {
        self.state.lock().head.clone().ok_or_else(|| ScmError::UnresolvedRef {
            ref_name: "HEAD".to_string(),
        })
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;

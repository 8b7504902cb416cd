// SPDX-License-Identifier: MIT

//! `SourceControlOps`: the contract steps use against a working copy.
//! Implementations live in [`crate::git`] (a real `git` subprocess wrapper)
//! and [`crate::fake`] (an in-memory graph for engine unit tests).

use crate::error::ScmError;
use async_trait::async_trait;
use indexmap::IndexMap;
use oj_ci_core::{BranchTips, CommitGraph, CommitId, CommitRecord};
use std::path::{Path, PathBuf};

/// A resolved `(branch, pin)` pair: the literal commit a `MergeCheckout`
/// or `SourceClone` operates on once `HEAD` has been resolved to a tip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBranch {
    pub branch_name: String,
    pub commit_id: CommitId,
}

#[async_trait]
pub trait SourceControlOps: Send + Sync {
    /// Ensure a working copy at `path` exists and has an up-to-date
    /// `origin`, cloning it if necessary. `branch_prefix` narrows the
    /// fetched refspec to `refs/heads/<prefix>/*` when set.
    async fn clone_or_fetch(
        &self,
        path: &Path,
        repo: &str,
        branch_prefix: Option<&str>,
    ) -> Result<(), ScmError>;

    /// The branch snapshot (§3): up to `limit` most recent commits per
    /// branch, excluding `origin/HEAD` and `auto/*` branches, honoring an
    /// optional name prefix.
    async fn enumerate_branches(
        &self,
        path: &Path,
        prefix: Option<&str>,
        limit: usize,
    ) -> Result<IndexMap<String, Vec<CommitRecord>>, ScmError>;

    /// Resolve `HEAD` on `branch_name` to its current tip commit.
    async fn resolve_head(&self, path: &Path, branch_name: &str) -> Result<CommitId, ScmError>;

    /// Confirm `commit_id` exists in the working copy's object database.
    async fn resolve_commit(&self, path: &Path, commit_id: &str) -> Result<CommitId, ScmError>;

    /// The current tips of every remote branch, excluding `origin/HEAD`
    /// and `auto/*` branches.
    async fn branch_tips(&self, path: &Path) -> Result<BranchTips, ScmError>;

    /// The derived parent→children commit graph over every commit
    /// reachable from the working copy's known remote refs.
    async fn commit_graph(&self, path: &Path) -> Result<CommitGraph, ScmError>;

    /// Check out `commit_id` in detached form.
    async fn checkout_commit(&self, path: &Path, commit_id: &CommitId) -> Result<(), ScmError>;

    /// Force-create (or move) a local branch named `branch_name` at
    /// `commit_id` and check it out.
    async fn force_create_branch(
        &self,
        path: &Path,
        branch_name: &str,
        commit_id: &CommitId,
    ) -> Result<(), ScmError>;

    /// Check out an existing branch (remote-tracking or local).
    async fn checkout_branch(&self, path: &Path, branch_name: &str) -> Result<(), ScmError>;

    /// Force-push the current `branch_name` to `origin`.
    async fn force_push(&self, path: &Path, branch_name: &str) -> Result<(), ScmError>;

    /// Merge `commit_id` into the currently checked-out branch with
    /// `--no-ff`. On conflict, the merge is aborted and `ScmError::MergeConflict`
    /// is returned naming the offending commit.
    async fn merge_no_ff(&self, path: &Path, commit_id: &CommitId) -> Result<CommitId, ScmError>;

    /// Current `HEAD` commit of the working copy.
    async fn current_commit(&self, path: &Path) -> Result<CommitId, ScmError>;
}

/// Resolves an environment's configured `(branch, pin)` pairs to commits,
/// shared by `MergeCheckout` step construction (§4.4 step 1).
pub async fn resolve_branches(
    scm: &dyn SourceControlOps,
    path: &Path,
    pairs: &[(String, oj_ci_core::Pin)],
) -> Result<Vec<ResolvedBranch>, ScmError> {
    let mut resolved = Vec::with_capacity(pairs.len());
    for (branch_name, pin) in pairs {
        let commit_id = match pin {
            oj_ci_core::Pin::Head => scm.resolve_head(path, branch_name).await?,
            oj_ci_core::Pin::Commit(id) => scm.resolve_commit(path, id).await?,
        };
        resolved.push(ResolvedBranch {
            branch_name: branch_name.clone(),
            commit_id,
        });
    }
    Ok(resolved)
}

pub fn repository_marker(path: &Path) -> PathBuf {
    path.join(".git")
}

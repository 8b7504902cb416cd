// SPDX-License-Identifier: MIT

//! The merge planner (§4.4): the algorithmic heart of the engine. Given a
//! resolved commit-set, reuse an existing merge-descendant branch where
//! one exists; otherwise synthesise `auto/<version>` by sequential
//! `--no-ff` merge.

use oj_ci_core::{CommitId, Environment, Pin, StepFailure, Version};
use oj_ci_scm::{ScmError, SourceControlOps};
use std::path::Path;

/// `MergeCheckout`'s output (§4.1): the branch checked out, the commit it
/// points at, and the version string that names it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MergeCheckoutResult {
    pub branch_name: String,
    pub commit_id: String,
    pub version: String,
}

fn to_step_failure(err: ScmError) -> StepFailure {
    match err {
        ScmError::MergeConflict { commit_id, message } => {
            StepFailure::merge_conflict(message, Some(commit_id))
        }
        ScmError::FetchFailed { .. } | ScmError::Timeout { .. } => {
            StepFailure::transient_io(err.to_string())
        }
        other => StepFailure::other(other.to_string()),
    }
}

/// Runs the full algorithm against a working copy that `SourceClone`
/// already prepared.
pub async fn plan_merge(
    scm: &dyn SourceControlOps,
    working_copy: &Path,
    branches: &[(String, Pin)],
    push: bool,
) -> Result<MergeCheckoutResult, StepFailure> {
    if branches.is_empty() {
        return Err(StepFailure::configuration("Empty branches set"));
    }

    // Step 1: resolve every (branch, pin) to a commit.
    let resolved = oj_ci_scm::resolve_branches(scm, working_copy, branches)
        .await
        .map_err(to_step_failure)?;
    let commits: Vec<CommitId> = resolved.iter().map(|r| r.commit_id.clone()).collect();
    let version =
        Version::from_commits(&commits).ok_or_else(|| StepFailure::configuration("Empty branches set"))?;

    // Step 2: common merge-descendant, if any.
    let graph = scm.commit_graph(working_copy).await.map_err(to_step_failure)?;
    if let Some(descendant) = graph.common_descendant(&commits) {
        let tips = scm.branch_tips(working_copy).await.map_err(to_step_failure)?;

        // Step 3: reuse an existing branch at the descendant if one exists.
        if let Some(branch) = tips.find_at(&descendant) {
            scm.checkout_branch(working_copy, &branch.name)
                .await
                .map_err(to_step_failure)?;
            return Ok(MergeCheckoutResult {
                branch_name: branch.name.clone(),
                commit_id: descendant.to_string(),
                version: version.to_string(),
            });
        }

        let branch_name = version.branch_name();
        scm.force_create_branch(working_copy, &branch_name, &descendant)
            .await
            .map_err(to_step_failure)?;
        if push {
            scm.force_push(working_copy, &branch_name)
                .await
                .map_err(to_step_failure)?;
        }
        return Ok(MergeCheckoutResult {
            branch_name,
            commit_id: descendant.to_string(),
            version: version.to_string(),
        });
    }

    // Step 4: no common descendant — synthesise one by sequential merge,
    // in the order the caller listed the branches.
    scm.checkout_commit(working_copy, &commits[0])
        .await
        .map_err(to_step_failure)?;
    let mut tip = commits[0].clone();
    for commit in &commits[1..] {
        tip = scm
            .merge_no_ff(working_copy, commit)
            .await
            .map_err(to_step_failure)?;
    }

    let branch_name = version.branch_name();
    scm.force_create_branch(working_copy, &branch_name, &tip)
        .await
        .map_err(to_step_failure)?;
    if push {
        scm.force_push(working_copy, &branch_name)
            .await
            .map_err(to_step_failure)?;
    }
    Ok(MergeCheckoutResult {
        branch_name,
        commit_id: tip.to_string(),
        version: version.to_string(),
    })
}

/// Convenience wrapper reading the branch-set straight off an
/// [`Environment`], as `MergeCheckout` does in practice.
pub async fn plan_merge_for_environment(
    scm: &dyn SourceControlOps,
    working_copy: &Path,
    env: &Environment,
    push: bool,
) -> Result<MergeCheckoutResult, StepFailure> {
    let pairs: Vec<(String, Pin)> = env
        .branches
        .iter()
        .map(|b| (b.branch_name.clone(), b.pin.clone()))
        .collect();
    plan_merge(scm, working_copy, &pairs, push).await
}

#[cfg(test)]
#[path = "merge_planner_tests.rs"]
mod tests;

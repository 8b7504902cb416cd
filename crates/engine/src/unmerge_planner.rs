// SPDX-License-Identifier: MIT

//! The unmerge planner (§4.5): given a running deployment's version tag,
//! recover the `{(branch, commit)}` set that produced it.

use oj_ci_core::{DeploymentSnapshot, StepFailure, Version};
use oj_ci_scm::{ScmError, SourceControlOps};
use std::path::Path;

/// One recovered `(branch, commit)` pair.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UnmergedBranch {
    pub branch_name: String,
    pub commit_id: String,
}

fn to_step_failure(err: ScmError) -> StepFailure {
    match err {
        ScmError::FetchFailed { .. } | ScmError::Timeout { .. } => {
            StepFailure::transient_io(err.to_string())
        }
        other => StepFailure::other(other.to_string()),
    }
}

pub async fn plan_unmerge(
    scm: &dyn SourceControlOps,
    working_copy: &Path,
    snapshot: &DeploymentSnapshot,
) -> Result<Vec<UnmergedBranch>, StepFailure> {
    let version_tag = snapshot
        .single_version()
        .ok_or_else(|| StepFailure::configuration("Expected exactly one version"))?;
    let short_ids = Version::short_ids_from_tag(version_tag)
        .ok_or_else(|| StepFailure::configuration("Version format not recognized"))?;

    let graph = scm.commit_graph(working_copy).await.map_err(to_step_failure)?;
    let tips = scm.branch_tips(working_copy).await.map_err(to_step_failure)?;

    let mut result = Vec::new();
    for short in short_ids {
        let full = scm
            .resolve_commit(working_copy, short)
            .await
            .map_err(to_step_failure)?;

        let mut matched = false;

        // Step 2: branches whose tip equals the resolved commit directly.
        for tip in tips.iter() {
            if tip.commit_id == full {
                result.push(UnmergedBranch {
                    branch_name: tip.name.clone(),
                    commit_id: full.to_string(),
                });
                matched = true;
            }
        }

        // Step 3: forward BFS until some reached commit has a qualifying
        // branch; the emitted commit stays `full`, not the descendant.
        if !matched {
            if let Some(descendant) =
                graph.bfs_forward_until(&full, |id| tips.iter().any(|t| &t.commit_id == id))
            {
                for tip in tips.iter().filter(|t| t.commit_id == descendant) {
                    result.push(UnmergedBranch {
                        branch_name: tip.name.clone(),
                        commit_id: full.to_string(),
                    });
                    matched = true;
                }
            }
        }

        // Ancestor-interior fallback (§4.5): `ci` may sit inside a
        // still-existing branch's history rather than at its tip or a
        // forward-reachable merge. Walk backward from every branch tip to
        // see if `full` is an ancestor of it.
        if !matched {
            for tip in tips.iter() {
                if graph.is_ancestor(&tip.commit_id, &full) {
                    result.push(UnmergedBranch {
                        branch_name: tip.name.clone(),
                        commit_id: full.to_string(),
                    });
                    matched = true;
                }
            }
        }

        if !matched {
            return Err(StepFailure::other("Unable to unmerge version"));
        }
    }

    Ok(result)
}

#[cfg(test)]
#[path = "unmerge_planner_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT

//! The external snapshot shapes (§6) and the generic merge rule federation
//! uses to fold a peer's snapshot into the local one (§4.6): key-wise
//! union, recursing into nested mappings, remote wins on scalar leaves.

use crate::commit::CommitRecord;
use crate::environment::EnvironmentId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::hash::Hash;

/// A single step's outcome for one pass, as surfaced externally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Ok { value: serde_json::Value },
    Failed {
        message: String,
        #[serde(default)]
        trace: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepView {
    pub name: String,
    #[serde(flatten)]
    pub status: StepStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentView {
    pub id: EnvironmentId,
    pub repo: String,
    pub dry: bool,
    pub branches: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentEntry {
    pub env: EnvironmentView,
    pub steps: Vec<StepView>,
}

/// `env_id → branch_name → last-N commits`.
pub type BranchesSnapshot = IndexMap<EnvironmentId, IndexMap<String, Vec<CommitRecord>>>;

/// `env_id → (env_view, steps_view)`.
pub type EnvironmentsSnapshot = IndexMap<EnvironmentId, EnvironmentEntry>;

/// Everything one peer publishes: the full external interface in one
/// structural copy, safe to hand to a transport without holding any lock.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub branches: BranchesSnapshot,
    pub environments: EnvironmentsSnapshot,
}

/// Key-wise union of two maps: every key present in either side survives;
/// overlapping keys resolve to the `remote` value, and are also reported
/// so the caller can surface a conflict without blocking either side.
pub fn merge_union<K, V>(local: IndexMap<K, V>, remote: IndexMap<K, V>) -> (IndexMap<K, V>, Vec<K>)
where
    K: Eq + Hash + Clone,
{
    let mut merged = local;
    let mut conflicts = Vec::new();
    for (key, value) in remote {
        if merged.contains_key(&key) {
            conflicts.push(key.clone());
        }
        merged.insert(key, value);
    }
    (merged, conflicts)
}

/// Merge a peer's `branches` snapshot into the local one: key-wise union
/// at the environment level, recursing into the nested `branch_name →
/// commits` mapping, remote wins on the commit-list leaf. No conflict
/// reporting here — only the `environments` snapshot's overlapping ids
/// are a federation conflict (§4.6).
pub fn merge_branches(local: BranchesSnapshot, remote: BranchesSnapshot) -> BranchesSnapshot {
    let mut merged = local;
    for (env_id, remote_branches) in remote {
        match merged.shift_remove(&env_id) {
            Some(local_branches) => {
                let (inner, _conflicts) = merge_union(local_branches, remote_branches);
                merged.insert(env_id, inner);
            }
            None => {
                merged.insert(env_id, remote_branches);
            }
        }
    }
    merged
}

/// A federation conflict: an environment id present in both the local and
/// the inbound remote `environments` snapshot. Reported out-of-band;
/// neither peer disables itself, and the remote value still wins for
/// display purposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederationConflict {
    pub environment_id: EnvironmentId,
}

/// Merge a peer's `environments` snapshot into the local one, returning
/// the merged map plus any conflicts found on overlapping ids.
pub fn merge_environments(
    local: EnvironmentsSnapshot,
    remote: EnvironmentsSnapshot,
) -> (EnvironmentsSnapshot, Vec<FederationConflict>) {
    let (merged, conflicting_ids) = merge_union(local, remote);
    let conflicts = conflicting_ids
        .into_iter()
        .map(|environment_id| FederationConflict { environment_id })
        .collect();
    (merged, conflicts)
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;

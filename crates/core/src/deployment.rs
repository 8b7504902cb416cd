// SPDX-License-Identifier: MIT

//! Deployment snapshots: the per-service view produced by `StackInspect`
//! and consumed by `StackDeploy`'s diff and by the unmerge algorithm.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One service's observed deployment state within a stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDeployment {
    pub name: String,
    pub image: String,
    pub stack_namespace: String,
    pub version: String,
}

/// A full stack's deployment snapshot: one record per running service.
///
/// All services in a stack are expected to share `version`; a snapshot
/// with more than one distinct version is a hard error surfaced by
/// `StackInspect`, and the unmerge algorithm refuses to resolve against it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeploymentSnapshot {
    pub services: Vec<ServiceDeployment>,
}

impl DeploymentSnapshot {
    pub fn new(services: Vec<ServiceDeployment>) -> Self {
        Self { services }
    }

    /// The distinct version values across every service in the snapshot.
    pub fn distinct_versions(&self) -> BTreeSet<&str> {
        self.services.iter().map(|s| s.version.as_str()).collect()
    }

    /// The single shared version, or `None` if zero or more than one
    /// distinct version is present.
    pub fn single_version(&self) -> Option<&str> {
        let versions = self.distinct_versions();
        if versions.len() == 1 {
            versions.into_iter().next()
        } else {
            None
        }
    }
}

#[cfg(test)]
#[path = "deployment_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT

//! Environment: the unit of configuration the control loop drives forward.

use crate::id::define_id;
use serde::{Deserialize, Serialize};

define_id!(EnvironmentId);

/// A branch pin: either the moving `HEAD` of a branch, or a fixed commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pin {
    Head,
    Commit(String),
}

impl Pin {
    pub fn is_head(&self) -> bool {
        matches!(self, Pin::Head)
    }
}

/// An ordered `(branch_name, pin)` pair as configured on an environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchPin {
    pub branch_name: String,
    pub pin: Pin,
}

impl BranchPin {
    pub fn new(branch_name: impl Into<String>, pin: Pin) -> Self {
        Self {
            branch_name: branch_name.into(),
            pin,
        }
    }

    pub fn head(branch_name: impl Into<String>) -> Self {
        Self::new(branch_name, Pin::Head)
    }
}

/// Pre-resolved basic-auth credentials for an environment's repo URL.
///
/// The core never reads process environment itself; callers resolve
/// `<PREFIX>_USERNAME`/`<PREFIX>_PASSWORD` and hand the result in, so the
/// SCM contract stays testable without environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// An environment: identity, upstream repo, mutable branch set, and the
/// ordered sequence of step names the engine evaluates each pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Environment {
    pub id: EnvironmentId,
    pub repo: String,
    pub branches: Vec<BranchPin>,
    pub dry: bool,
    pub credentials: Option<Credentials>,
    /// Optional prefix narrowing which remote branches are considered by
    /// branch enumeration and unmerge resolution (e.g. only `feature/*`).
    pub branch_name_prefix: Option<String>,
}

impl Environment {
    pub fn new(id: impl Into<EnvironmentId>, repo: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            repo: repo.into(),
            branches: Vec::new(),
            dry: false,
            credentials: None,
            branch_name_prefix: None,
        }
    }

    pub fn with_branches(mut self, branches: Vec<BranchPin>) -> Self {
        self.branches = branches;
        self
    }

    pub fn with_dry(mut self, dry: bool) -> Self {
        self.dry = dry;
        self
    }

    /// Empty `branches` is legal: it signals that this environment is
    /// awaiting unmerge-based recovery and should not attempt a merge pass.
    pub fn awaiting_unmerge(&self) -> bool {
        self.branches.is_empty()
    }

    /// Replace `branches` wholesale, the PipelineEngine's special hook for
    /// a completed `UnmergeResolve` on a recovering environment.
    pub fn replace_branches(&mut self, resolved: Vec<BranchPin>) {
        self.branches = resolved;
    }
}

#[cfg(test)]
#[path = "environment_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! oj-ci-core: domain types shared by every `oj-ci` crate — environments,
//! commits, versions, the derived commit graph, deployment snapshots, the
//! step failure taxonomy, and the external snapshot shapes federation
//! publishes.
//!
//! Nothing in this crate talks to git, docker, or the network — those are
//! the concern of `oj-ci-scm` and `oj-ci-orchestrator`. This crate only
//! models the data those adapters produce and consume.

pub mod branch;
pub mod clock;
pub mod commit;
pub mod commit_graph;
pub mod deployment;
pub mod environment;
pub mod failure;
pub mod id;
pub mod snapshot;
pub mod version;

pub use branch::{BranchTip, BranchTips};
pub use clock::{Clock, FakeClock, SystemClock};
pub use commit::{snapshot_eligible, CommitId, CommitRecord, BRANCH_SNAPSHOT_LIMIT};
pub use commit_graph::CommitGraph;
pub use deployment::{DeploymentSnapshot, ServiceDeployment};
pub use environment::{BranchPin, Credentials, Environment, EnvironmentId, Pin};
pub use failure::{FailureKind, StepFailure};
pub use id::{IdGen, SequentialIdGen, ShortId, UuidIdGen};
pub use snapshot::{
    merge_branches, merge_environments, merge_union, BranchesSnapshot, EnvironmentEntry,
    EnvironmentView, EnvironmentsSnapshot, FederationConflict, Snapshot, StepStatus, StepView,
};
pub use version::Version;

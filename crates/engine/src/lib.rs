// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! oj-ci-engine: the step abstraction, the named step kinds, the
//! merge/unmerge planners (§4.4, §4.5), and the `PipelineEngine` (§4.2)
//! that drives one environment's steps through a single pass.
//!
//! This crate owns the algorithmic heart of the system. It depends on
//! `oj-ci-scm` and `oj-ci-orchestrator` only through their trait
//! contracts (`SourceControlOps`, `OrchestratorOps`), never their
//! concrete subprocess implementations, so every step is unit-testable
//! against the fakes those crates expose under `test-support`.

pub mod merge_planner;
pub mod pipeline;
pub mod step;
pub mod steps;
pub mod unmerge_planner;

pub use merge_planner::{plan_merge, plan_merge_for_environment, MergeCheckoutResult};
pub use pipeline::{Pipeline, PipelineBuilder};
pub use step::{ErasedStep, PassStatus, StepCache, TypedStep};
pub use unmerge_planner::{plan_unmerge, UnmergedBranch};

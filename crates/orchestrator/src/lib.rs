// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! oj-ci-orchestrator: `OrchestratorOps`, the contract the engine's
//! `StackInspect`/`StackDeploy`/`ImageBuild` steps use against the
//! container orchestrator and its registry, plus compose document
//! handling (`${VAR}` substitution, build-key stripping, version-label
//! stamping).

pub mod compose;
pub mod docker;
pub mod error;
pub mod ops;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use compose::ComposeDocument;
pub use docker::{DockerOrchestrator, STACK_NAMESPACE_LABEL};
pub use error::OrchestratorError;
pub use ops::OrchestratorOps;

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeOrchestrator;

// SPDX-License-Identifier: MIT

//! `OrchestratorOps`: the contract `StackInspect`/`StackDeploy`/`ImageBuild`
//! use against the container orchestrator and its registry. Implementations
//! live in [`crate::docker`] (a real `docker compose`/registry subprocess
//! wrapper) and [`crate::fake`] (in-memory, for engine unit tests).

use crate::error::OrchestratorError;
use async_trait::async_trait;
use oj_ci_core::DeploymentSnapshot;
use std::path::Path;

#[async_trait]
pub trait OrchestratorOps: Send + Sync {
    /// The current deployment snapshot for `stack`, filtered by the
    /// orchestrator's stack-namespace label.
    async fn inspect_stack(&self, stack: &str) -> Result<DeploymentSnapshot, OrchestratorError>;

    /// Whether `tag` already exists in the local image store.
    async fn image_exists_local(&self, tag: &str) -> Result<bool, OrchestratorError>;

    /// Whether `tag` already exists in the remote registry.
    async fn image_exists_remote(&self, tag: &str) -> Result<bool, OrchestratorError>;

    /// Authenticate against the registry hosting `tag`, if credentials
    /// are configured for it.
    async fn registry_login(&self, tag: &str) -> Result<(), OrchestratorError>;

    /// Build `tag` from the `build:` context declared at `context_path`.
    async fn build_image(&self, tag: &str, context_path: &Path) -> Result<(), OrchestratorError>;

    /// Push `tag` to its registry.
    async fn push_image(&self, tag: &str) -> Result<(), OrchestratorError>;

    /// Deploy `compose_path` as `stack`, pruning services no longer
    /// declared. A non-zero exit becomes `OrchestratorError::DeployFailed`
    /// carrying the captured stderr.
    async fn deploy_stack(&self, stack: &str, compose_path: &Path) -> Result<(), OrchestratorError>;
}

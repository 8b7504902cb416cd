// SPDX-License-Identifier: MIT

//! `FakeOrchestrator`: an in-memory stand-in for engine unit tests that
//! need `OrchestratorOps` without a real docker daemon.

use crate::error::OrchestratorError;
use crate::ops::OrchestratorOps;
use async_trait::async_trait;
use oj_ci_core::DeploymentSnapshot;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::Path;

#[derive(Default)]
struct State {
    stacks: std::collections::HashMap<String, DeploymentSnapshot>,
    local_images: HashSet<String>,
    remote_images: HashSet<String>,
    built: Vec<String>,
    pushed: Vec<String>,
    deployed: Vec<(String, String)>,
    fail_deploy: bool,
}

#[derive(Default)]
pub struct FakeOrchestrator {
    state: Mutex<State>,
}

impl FakeOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_stack(&self, stack: impl Into<String>, snapshot: DeploymentSnapshot) -> &Self {
        self.state.lock().stacks.insert(stack.into(), snapshot);
        self
    }

    pub fn mark_local(&self, tag: impl Into<String>) -> &Self {
        self.state.lock().local_images.insert(tag.into());
        self
    }

    pub fn mark_remote(&self, tag: impl Into<String>) -> &Self {
        self.state.lock().remote_images.insert(tag.into());
        self
    }

    pub fn fail_next_deploy(&self) -> &Self {
        self.state.lock().fail_deploy = true;
        self
    }

    pub fn built_images(&self) -> Vec<String> {
        self.state.lock().built.clone()
    }

    pub fn pushed_images(&self) -> Vec<String> {
        self.state.lock().pushed.clone()
    }

    pub fn deployed_stacks(&self) -> Vec<(String, String)> {
        self.state.lock().deployed.clone()
    }
}

#[async_trait]
impl OrchestratorOps for FakeOrchestrator {
    async fn inspect_stack(&self, stack: &str) -> Result<DeploymentSnapshot, OrchestratorError> {
        let snapshot = self
            .state
            .lock()
            .stacks
            .get(stack)
            .cloned()
            .unwrap_or_default();
        let versions = snapshot.distinct_versions();
        if versions.len() > 1 {
            return Err(OrchestratorError::VersionMismatch {
                stack: stack.to_string(),
                versions: versions.into_iter().map(str::to_string).collect(),
            });
        }
        Ok(snapshot)
    }

    async fn image_exists_local(&self, tag: &str) -> Result<bool, OrchestratorError> {
        Ok(self.state.lock().local_images.contains(tag))
    }

    async fn image_exists_remote(&self, tag: &str) -> Result<bool, OrchestratorError> {
        Ok(self.state.lock().remote_images.contains(tag))
    }

    async fn registry_login(&self, _tag: &str) -> Result<(), OrchestratorError> {
        Ok(())
    }

    async fn build_image(&self, tag: &str, _context_path: &Path) -> Result<(), OrchestratorError> {
        let mut state = self.state.lock();
        state.built.push(tag.to_string());
        state.local_images.insert(tag.to_string());
        Ok(())
    }

    async fn push_image(&self, tag: &str) -> Result<(), OrchestratorError> {
        let mut state = self.state.lock();
        state.pushed.push(tag.to_string());
        state.remote_images.insert(tag.to_string());
        Ok(())
    }

    async fn deploy_stack(&self, stack: &str, compose_path: &Path) -> Result<(), OrchestratorError> {
        let mut state = self.state.lock();
        if state.fail_deploy {
            state.fail_deploy = false;
            return Err(OrchestratorError::DeployFailed {
                exit_code: Some(1),
                stderr: "fake deploy failure".to_string(),
            });
        }
        state
            .deployed
            .push((stack.to_string(), compose_path.display().to_string()));
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT

//! `StackInspect` (§4.1): the deployment snapshot (§3) for a named stack,
//! filtered by the orchestrator's stack-namespace label.

use crate::step::{StepCache, TypedStep};
use async_trait::async_trait;
use oj_ci_core::{DeploymentSnapshot, StepFailure};
use oj_ci_orchestrator::OrchestratorOps;
use std::sync::Arc;

pub struct StackInspectStep {
    name: String,
    stack: String,
    orchestrator: Arc<dyn OrchestratorOps>,
    cache: StepCache<DeploymentSnapshot>,
}

impl StackInspectStep {
    pub fn new(stack: impl Into<String>, orchestrator: Arc<dyn OrchestratorOps>) -> Self {
        Self {
            name: "stack_inspect".to_string(),
            stack: stack.into(),
            orchestrator,
            cache: StepCache::default(),
        }
    }
}

#[async_trait]
impl TypedStep for StackInspectStep {
    type Output = DeploymentSnapshot;

    fn step_name(&self) -> &str {
        &self.name
    }

    async fn evaluate(&self) -> Result<DeploymentSnapshot, StepFailure> {
        self.cache
            .get_or_compute(|| async {
                self.orchestrator
                    .inspect_stack(&self.stack)
                    .await
                    .map_err(|e| {
                        if e.is_transient() {
                            StepFailure::transient_io(e.to_string())
                        } else {
                            StepFailure::other(e.to_string())
                        }
                    })
            })
            .await
    }

    fn reset_cache(&self) {
        self.cache.reset();
    }
}

#[cfg(test)]
#[path = "stack_inspect_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT

//! `UnmergeResolve` (§4.1): recovers the branch set a running deployment
//! was built from, via the algorithm in [`crate::unmerge_planner`].
//!
//! The engine (§4.2) special-cases this step kind: when an environment's
//! `branches` set is empty, the control loop runs this step first and
//! feeds its result back into the environment before the rest of the
//! pipeline runs.

use crate::step::{StepCache, TypedStep};
use crate::steps::source_clone::SourceCloneStep;
use crate::steps::stack_inspect::StackInspectStep;
use crate::unmerge_planner::{plan_unmerge, UnmergedBranch};
use async_trait::async_trait;
use oj_ci_core::StepFailure;
use oj_ci_scm::SourceControlOps;
use std::sync::Arc;

pub struct UnmergeResolveStep {
    name: String,
    source_clone: Arc<SourceCloneStep>,
    stack_inspect: Arc<StackInspectStep>,
    scm: Arc<dyn SourceControlOps>,
    cache: StepCache<Vec<UnmergedBranch>>,
}

impl UnmergeResolveStep {
    pub fn new(
        source_clone: Arc<SourceCloneStep>,
        stack_inspect: Arc<StackInspectStep>,
        scm: Arc<dyn SourceControlOps>,
    ) -> Self {
        Self {
            name: "unmerge_resolve".to_string(),
            source_clone,
            stack_inspect,
            scm,
            cache: StepCache::default(),
        }
    }
}

#[async_trait]
impl TypedStep for UnmergeResolveStep {
    type Output = Vec<UnmergedBranch>;

    fn step_name(&self) -> &str {
        &self.name
    }

    async fn evaluate(&self) -> Result<Vec<UnmergedBranch>, StepFailure> {
        self.cache
            .get_or_compute(|| async {
                let path = self.source_clone.evaluate().await?;
                let snapshot = self.stack_inspect.evaluate().await?;
                plan_unmerge(self.scm.as_ref(), &path, &snapshot).await
            })
            .await
    }

    fn reset_cache(&self) {
        self.cache.reset();
    }
}

#[cfg(test)]
#[path = "unmerge_resolve_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT

//! `MergeCheckout` (§4.1): runs the merge planner (§4.4) against the
//! working copy `SourceClone` produced.

use crate::merge_planner::{plan_merge, MergeCheckoutResult};
use crate::step::{StepCache, TypedStep};
use crate::steps::source_clone::SourceCloneStep;
use async_trait::async_trait;
use oj_ci_core::{Pin, StepFailure};
use oj_ci_scm::SourceControlOps;
use std::sync::Arc;

pub struct MergeCheckoutStep {
    name: String,
    source_clone: Arc<SourceCloneStep>,
    scm: Arc<dyn SourceControlOps>,
    branches: Vec<(String, Pin)>,
    push: bool,
    cache: StepCache<MergeCheckoutResult>,
}

impl MergeCheckoutStep {
    pub fn new(
        source_clone: Arc<SourceCloneStep>,
        scm: Arc<dyn SourceControlOps>,
        branches: Vec<(String, Pin)>,
        push: bool,
    ) -> Self {
        Self {
            name: "merge_checkout".to_string(),
            source_clone,
            scm,
            branches,
            push,
            cache: StepCache::default(),
        }
    }
}

#[async_trait]
impl TypedStep for MergeCheckoutStep {
    type Output = MergeCheckoutResult;

    fn step_name(&self) -> &str {
        &self.name
    }

    async fn evaluate(&self) -> Result<MergeCheckoutResult, StepFailure> {
        self.cache
            .get_or_compute(|| async {
                let path = self.source_clone.evaluate().await?;
                plan_merge(self.scm.as_ref(), &path, &self.branches, self.push).await
            })
            .await
    }

    fn reset_cache(&self) {
        self.cache.reset();
    }
}

#[cfg(test)]
#[path = "merge_checkout_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT

//! The PipelineEngine (§4.2): resets every step, evaluates each in
//! declared order inside a failure barrier, and feeds a completed
//! `UnmergeResolve`'s result back into an environment awaiting recovery —
//! the special hook that lets a freshly-started controller adopt a
//! running deployment instead of starting from an empty branch set.

use crate::step::ErasedStep;
use crate::unmerge_planner::UnmergedBranch;
use oj_ci_core::{BranchPin, Environment, Pin, StepStatus, StepView};
use std::sync::Arc;

/// Builds a [`Pipeline`] in declared order. Steps refer to each other by
/// construction order (§9): the builder only records *which* step, if
/// any, is the environment's `UnmergeResolve`, so the engine knows where
/// to apply the recovery hook without open-world dispatch over step kinds.
#[derive(Default)]
pub struct PipelineBuilder {
    steps: Vec<Arc<dyn ErasedStep>>,
    unmerge_resolve_index: Option<usize>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a step in declared order.
    pub fn step(mut self, step: Arc<dyn ErasedStep>) -> Self {
        self.steps.push(step);
        self
    }

    /// Appends the pipeline's `UnmergeResolve` step and marks it as the
    /// one whose result, on success, replaces an empty `branches` set.
    pub fn unmerge_resolve_step(mut self, step: Arc<dyn ErasedStep>) -> Self {
        self.unmerge_resolve_index = Some(self.steps.len());
        self.steps.push(step);
        self
    }

    pub fn build(self) -> Pipeline {
        Pipeline {
            steps: self.steps,
            unmerge_resolve_index: self.unmerge_resolve_index,
        }
    }
}

/// The ordered sequence of steps attached to an environment (§2, §4.2).
pub struct Pipeline {
    steps: Vec<Arc<dyn ErasedStep>>,
    unmerge_resolve_index: Option<usize>,
}

impl Pipeline {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Runs one pass: reset every step's cache, then evaluate each in
    /// declared order inside a failure barrier, calling `on_step_finished`
    /// after every step so the driver can publish the snapshot
    /// incrementally (§4.2). A step's failure never aborts the pass;
    /// later steps still run and will themselves fail if they read the
    /// failed step's cached result through its `evaluate()` accessor.
    pub async fn run_pass<F>(&self, env: &mut Environment, mut on_step_finished: F) -> Vec<StepView>
    where
        F: FnMut(&StepView),
    {
        for step in &self.steps {
            step.reset();
        }

        let mut views = Vec::with_capacity(self.steps.len());
        for (index, step) in self.steps.iter().enumerate() {
            let name = step.name().to_string();
            let outcome = step.evaluate_erased().await;

            if Some(index) == self.unmerge_resolve_index && env.awaiting_unmerge() {
                apply_unmerge_recovery(env, &outcome);
            }

            let status = match &outcome {
                Ok(value) => StepStatus::Ok {
                    value: value.clone(),
                },
                Err(failure) => StepStatus::Failed {
                    message: failure.message().to_string(),
                    trace: failure.trace().to_vec(),
                },
            };
            let view = StepView { name, status };
            on_step_finished(&view);
            views.push(view);
        }

        views
    }
}

/// Deserialises a successful `UnmergeResolve` outcome and replaces the
/// environment's `branches` with the recovered set. Any other outcome
/// (failure, or a value that doesn't decode as the expected shape) leaves
/// `branches` empty — the next pass simply retries recovery.
fn apply_unmerge_recovery(
    env: &mut Environment,
    outcome: &Result<serde_json::Value, oj_ci_core::StepFailure>,
) {
    let Ok(value) = outcome else {
        return;
    };
    let Ok(resolved) = serde_json::from_value::<Vec<UnmergedBranch>>(value.clone()) else {
        return;
    };
    env.replace_branches(
        resolved
            .into_iter()
            .map(|b| BranchPin::new(b.branch_name, Pin::Commit(b.commit_id)))
            .collect(),
    );
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT

//! `Annotate` (§4.1): returns a caller-supplied constant, unconditionally.
//! Used to attach operator-facing links (dashboards, runbooks) to an
//! environment's steps view without the step doing any real work.

use crate::step::TypedStep;
use async_trait::async_trait;
use oj_ci_core::StepFailure;

pub struct AnnotateStep {
    name: String,
    value: serde_json::Value,
}

impl AnnotateStep {
    pub fn new(name: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

#[async_trait]
impl TypedStep for AnnotateStep {
    type Output = serde_json::Value;

    fn step_name(&self) -> &str {
        &self.name
    }

    async fn evaluate(&self) -> Result<serde_json::Value, StepFailure> {
        Ok(self.value.clone())
    }

    /// Nothing to memoise: the constant never changes between passes, so
    /// `reset()` is a no-op rather than a cache the step re-reads.
    fn reset_cache(&self) {}
}

#[cfg(test)]
#[path = "annotate_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT

//! The step abstraction (§4.1): `evaluate()` memoises its result for the
//! current pass, `reset()` discards the cache. Dependencies are plain
//! typed fields (`Arc<SourceCloneStep>`, ...) read through `evaluate()` —
//! never through a private field directly — which is what makes
//! dependency-driven failure propagation fall out for free: a dependent
//! simply forwards whatever its dependency's `evaluate()` returned.
//!
//! Steps are tagged node kinds (one concrete struct per kind in
//! [`crate::steps`]), not an open-world trait-object graph. [`ErasedStep`]
//! exists only so the [`crate::pipeline::Pipeline`] can reset/evaluate/name
//! every step in an environment uniformly, independent of each step's
//! result type.

use async_trait::async_trait;
use oj_ci_core::StepFailure;
use parking_lot::Mutex;
use serde::Serialize;

/// Per-pass memoisation cell for one step's typed result.
pub struct StepCache<T> {
    slot: Mutex<Option<Result<T, StepFailure>>>,
}

impl<T> Default for StepCache<T> {
    fn default() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }
}

impl<T: Clone> StepCache<T> {
    /// Returns the cached result if present, otherwise runs `compute`,
    /// caches it, and returns it. Concurrent callers within the same pass
    /// may both run `compute` once each (the memoisation guarantee is
    /// "same pass, same step, same result once settled", not mutual
    /// exclusion) — no step in this engine is ever evaluated concurrently
    /// with itself by the single-pass driver, so this is not observable.
    pub async fn get_or_compute<F, Fut>(&self, compute: F) -> Result<T, StepFailure>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, StepFailure>>,
    {
        if let Some(cached) = self.slot.lock().clone() {
            return cached;
        }
        let result = compute().await;
        *self.slot.lock() = Some(result.clone());
        result
    }

    pub fn cached(&self) -> Option<Result<T, StepFailure>> {
        self.slot.lock().clone()
    }

    pub fn reset(&self) {
        *self.slot.lock() = None;
    }

    /// `Pending` until the first `evaluate()` of the pass settles it.
    pub fn status(&self) -> PassStatus {
        match &*self.slot.lock() {
            None => PassStatus::Pending,
            Some(Ok(_)) => PassStatus::Ok,
            Some(Err(_)) => PassStatus::Failed,
        }
    }
}

/// The three observable per-pass states a step moves through (§3 Step).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassStatus {
    Pending,
    Ok,
    Failed,
}

/// Type-erased handle the [`crate::pipeline::Pipeline`] drives uniformly:
/// reset every step, then evaluate each in declared order regardless of
/// its typed result.
#[async_trait]
pub trait ErasedStep: Send + Sync {
    fn name(&self) -> &str;
    fn reset(&self);
    /// Evaluates (or returns the memoised result of) this step, erasing
    /// its typed output to JSON for the external snapshot (§6).
    async fn evaluate_erased(&self) -> Result<serde_json::Value, StepFailure>;
}

/// Blanket erasure for any typed step whose output serialises.
#[async_trait]
pub trait TypedStep: Send + Sync {
    type Output: Serialize + Send + Sync + Clone;

    fn step_name(&self) -> &str;
    async fn evaluate(&self) -> Result<Self::Output, StepFailure>;
    fn reset_cache(&self);
}

#[async_trait]
impl<S> ErasedStep for S
where
    S: TypedStep,
{
    fn name(&self) -> &str {
        self.step_name()
    }

    fn reset(&self) {
        self.reset_cache();
    }

    async fn evaluate_erased(&self) -> Result<serde_json::Value, StepFailure> {
        let value = self.evaluate().await?;
        serde_json::to_value(value)
            .map_err(|e| StepFailure::other(format!("failed to serialise step result: {e}")))
    }
}

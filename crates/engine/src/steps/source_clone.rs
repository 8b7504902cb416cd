// SPDX-License-Identifier: MIT

//! `SourceClone` (§4.1): a deterministic working copy, synchronised with
//! `origin` on every evaluation.

use crate::step::{StepCache, TypedStep};
use async_trait::async_trait;
use oj_ci_core::StepFailure;
use oj_ci_scm::SourceControlOps;
use std::path::PathBuf;
use std::sync::Arc;

pub struct SourceCloneStep {
    name: String,
    env_id: String,
    repo: String,
    branch_prefix: Option<String>,
    base_dir: PathBuf,
    scm: Arc<dyn SourceControlOps>,
    cache: StepCache<PathBuf>,
}

impl SourceCloneStep {
    pub fn new(
        env_id: impl Into<String>,
        repo: impl Into<String>,
        branch_prefix: Option<String>,
        base_dir: PathBuf,
        scm: Arc<dyn SourceControlOps>,
    ) -> Self {
        Self {
            name: "source_clone".to_string(),
            env_id: env_id.into(),
            repo: repo.into(),
            branch_prefix,
            base_dir,
            scm,
            cache: StepCache::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Non-step accessor (§4.1): enumerates the branch snapshot for an
    /// already-synchronised working copy. Runs `evaluate()` first so it
    /// never reads a stale or absent checkout.
    pub async fn enumerate_branches(
        &self,
        limit: usize,
    ) -> Result<indexmap::IndexMap<String, Vec<oj_ci_core::CommitRecord>>, StepFailure> {
        let path = self.evaluate().await?;
        self.scm
            .enumerate_branches(&path, self.branch_prefix.as_deref(), limit)
            .await
            .map_err(|e| StepFailure::transient_io(e.to_string()))
    }

    pub fn working_copy_path(&self) -> PathBuf {
        oj_ci_scm::working_copy_path(&self.base_dir, &self.env_id, &self.repo)
    }
}

#[async_trait]
impl TypedStep for SourceCloneStep {
    type Output = PathBuf;

    fn step_name(&self) -> &str {
        &self.name
    }

    async fn evaluate(&self) -> Result<PathBuf, StepFailure> {
        self.cache
            .get_or_compute(|| async {
                let path = self.working_copy_path();
                self.scm
                    .clone_or_fetch(&path, &self.repo, self.branch_prefix.as_deref())
                    .await
                    .map_err(|e| StepFailure::transient_io(e.to_string()))?;
                Ok(path)
            })
            .await
    }

    fn reset_cache(&self) {
        self.cache.reset();
    }
}

#[cfg(test)]
#[path = "source_clone_tests.rs"]
mod tests;

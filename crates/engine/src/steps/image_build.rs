// SPDX-License-Identifier: MIT

//! `ImageBuild` (§4.1): reads the compose document, substitutes `${VAR}`
//! tokens, and builds each service's declared `build:` context unless an
//! equivalent image already exists (locally, or remotely when `publish`).

use crate::step::{StepCache, TypedStep};
use crate::steps::source_clone::SourceCloneStep;
use async_trait::async_trait;
use oj_ci_core::StepFailure;
use oj_ci_orchestrator::{ComposeDocument, OrchestratorOps};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ImageBuildResult {
    pub built: Vec<String>,
}

pub struct ImageBuildStep {
    name: String,
    source_clone: Arc<SourceCloneStep>,
    orchestrator: Arc<dyn OrchestratorOps>,
    compose_relative_path: String,
    vars: HashMap<String, String>,
    publish: bool,
    cache: StepCache<ImageBuildResult>,
}

impl ImageBuildStep {
    pub fn new(
        source_clone: Arc<SourceCloneStep>,
        orchestrator: Arc<dyn OrchestratorOps>,
        compose_relative_path: impl Into<String>,
        vars: HashMap<String, String>,
        publish: bool,
    ) -> Self {
        Self {
            name: "image_build".to_string(),
            source_clone,
            orchestrator,
            compose_relative_path: compose_relative_path.into(),
            vars,
            publish,
            cache: StepCache::default(),
        }
    }
}

fn to_step_failure(err: oj_ci_orchestrator::OrchestratorError) -> StepFailure {
    if err.is_transient() {
        StepFailure::transient_io(err.to_string())
    } else {
        StepFailure::other(err.to_string())
    }
}

#[async_trait]
impl TypedStep for ImageBuildStep {
    type Output = ImageBuildResult;

    fn step_name(&self) -> &str {
        &self.name
    }

    async fn evaluate(&self) -> Result<ImageBuildResult, StepFailure> {
        self.cache
            .get_or_compute(|| async {
                let working_copy = self.source_clone.evaluate().await?;
                let compose_path = working_copy.join(&self.compose_relative_path);
                let raw = tokio::fs::read_to_string(&compose_path)
                    .await
                    .map_err(|e| StepFailure::configuration(format!(
                        "could not read compose document at {}: {e}",
                        compose_path.display()
                    )))?;

                let mut doc = ComposeDocument::parse(&raw, &self.compose_relative_path)
                    .map_err(|e| StepFailure::configuration(e.to_string()))?;
                doc.substitute_vars(&self.vars);

                if self.publish {
                    self.orchestrator
                        .registry_login(&self.compose_relative_path)
                        .await
                        .map_err(to_step_failure)?;
                }

                let mut built = Vec::new();
                for service in doc.service_names() {
                    let Some(tag) = doc.image_tag(&service) else {
                        continue;
                    };
                    if doc.build_context(&service).is_none() {
                        continue;
                    }

                    let exists = if self.publish {
                        self.orchestrator
                            .image_exists_remote(&tag)
                            .await
                            .map_err(to_step_failure)?
                    } else {
                        self.orchestrator
                            .image_exists_local(&tag)
                            .await
                            .map_err(to_step_failure)?
                    };
                    if exists {
                        continue;
                    }

                    self.orchestrator
                        .build_image(&tag, &working_copy)
                        .await
                        .map_err(to_step_failure)?;
                    if self.publish {
                        self.orchestrator
                            .push_image(&tag)
                            .await
                            .map_err(to_step_failure)?;
                    }
                    built.push(tag);
                }

                Ok(ImageBuildResult { built })
            })
            .await
    }

    fn reset_cache(&self) {
        self.cache.reset();
    }
}

#[cfg(test)]
#[path = "image_build_tests.rs"]
mod tests;

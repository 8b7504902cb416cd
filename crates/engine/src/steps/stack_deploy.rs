// SPDX-License-Identifier: MIT

//! `StackDeploy` (§4.1): desired vs. running diff against `StackInspect`.
//! The desired compose is the same substitution `ImageBuild` performs,
//! plus dropping every `build:` key and stamping a `version` label derived
//! from `MergeCheckout`'s result — the label `UnmergeResolve` later reads
//! back to recover the branch set a running deployment came from. Dry-run
//! environments only summarise the diff; all others write a temporary
//! compose next to the original and invoke `docker compose up`, which
//! prunes services no longer declared.

use crate::step::{StepCache, TypedStep};
use crate::steps::image_build::ImageBuildStep;
use crate::steps::merge_checkout::MergeCheckoutStep;
use crate::steps::source_clone::SourceCloneStep;
use crate::steps::stack_inspect::StackInspectStep;
use async_trait::async_trait;
use oj_ci_core::StepFailure;
use oj_ci_orchestrator::{ComposeDocument, OrchestratorOps};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StackDeployResult {
    /// Services whose desired image differs from the one currently running.
    pub changed: Vec<String>,
    /// Services already running their desired image.
    pub ok: Vec<String>,
    /// Services running but no longer declared; pruned unless dry-run.
    pub pruned: Vec<String>,
    pub applied: bool,
}

pub struct StackDeployStep {
    name: String,
    stack: String,
    compose_relative_path: String,
    vars: HashMap<String, String>,
    source_clone: Arc<SourceCloneStep>,
    merge_checkout: Arc<MergeCheckoutStep>,
    image_build: Arc<ImageBuildStep>,
    stack_inspect: Arc<StackInspectStep>,
    orchestrator: Arc<dyn OrchestratorOps>,
    dry_run: bool,
    cache: StepCache<StackDeployResult>,
}

impl StackDeployStep {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        stack: impl Into<String>,
        compose_relative_path: impl Into<String>,
        vars: HashMap<String, String>,
        source_clone: Arc<SourceCloneStep>,
        merge_checkout: Arc<MergeCheckoutStep>,
        image_build: Arc<ImageBuildStep>,
        stack_inspect: Arc<StackInspectStep>,
        orchestrator: Arc<dyn OrchestratorOps>,
        dry_run: bool,
    ) -> Self {
        Self {
            name: "stack_deploy".to_string(),
            stack: stack.into(),
            compose_relative_path: compose_relative_path.into(),
            vars,
            source_clone,
            merge_checkout,
            image_build,
            stack_inspect,
            orchestrator,
            dry_run,
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
impl TypedStep for StackDeployStep {
    type Output = StackDeployResult;

    fn step_name(&self) -> &str {
        &self.name
    }

    async fn evaluate(&self) -> Result<StackDeployResult, StepFailure> {
        self.cache
            .get_or_compute(|| async {
                let working_copy = self.source_clone.evaluate().await?;
                let checkout = self.merge_checkout.evaluate().await?;
                self.image_build.evaluate().await?;
                let running = self.stack_inspect.evaluate().await?;

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
                doc.drop_build_keys();
                doc.stamp_version_label(&format!("auto-{}", checkout.version));

                let running_by_name: HashMap<&str, &str> = running
                    .services
                    .iter()
                    .map(|s| (s.name.as_str(), s.image.as_str()))
                    .collect();

                let mut desired_names: BTreeSet<String> = BTreeSet::new();
                let mut changed = Vec::new();
                let mut ok = Vec::new();
                for service in doc.service_names() {
                    let Some(tag) = doc.image_tag(&service) else {
                        continue;
                    };
                    desired_names.insert(service.clone());
                    match running_by_name.get(service.as_str()) {
                        Some(running_tag) if *running_tag == tag => ok.push(service),
                        _ => changed.push(service),
                    }
                }
                let pruned: Vec<String> = running
                    .services
                    .iter()
                    .filter(|s| !desired_names.contains(&s.name))
                    .map(|s| s.name.clone())
                    .collect();

                if self.dry_run {
                    return Ok(StackDeployResult {
                        changed,
                        ok,
                        pruned,
                        applied: false,
                    });
                }

                if changed.is_empty() && pruned.is_empty() {
                    return Ok(StackDeployResult {
                        changed,
                        ok,
                        pruned,
                        applied: false,
                    });
                }

                let rendered = doc
                    .to_yaml_string()
                    .map_err(|e| StepFailure::other(e.to_string()))?;
                let deploy_path = compose_path.with_extension("deploy.yml");
                tokio::fs::write(&deploy_path, rendered).await.map_err(|e| {
                    StepFailure::other(format!(
                        "could not write deploy compose at {}: {e}",
                        deploy_path.display()
                    ))
                })?;

                self.orchestrator
                    .deploy_stack(&self.stack, &deploy_path)
                    .await
                    .map_err(to_step_failure)?;

                Ok(StackDeployResult {
                    changed,
                    ok,
                    pruned,
                    applied: true,
                })
            })
            .await
    }

    fn reset_cache(&self) {
        self.cache.reset();
    }
}

#[cfg(test)]
#[path = "stack_deploy_tests.rs"]
mod tests;

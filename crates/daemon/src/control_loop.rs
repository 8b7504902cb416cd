// SPDX-License-Identifier: MIT

//! The `ControlLoop` (§4.3): a single driver task per process, holding one
//! process-wide exclusive lock for the whole of one pass across every
//! configured environment. Operator edits queued mid-pass are applied
//! only between passes, never while a pass is in flight.
//!
//! Each environment's [`Pipeline`] is rebuilt at the start of every pass
//! from that environment's current `branches` (§9: steps are plain typed
//! fields, not live references), so an operator edit or a completed
//! `UnmergeResolve` from the previous pass is picked up immediately
//! rather than baked into a pipeline built once at startup.

use crate::config::{Config, EnvironmentConfig};
use crate::hub::SnapshotHub;
use oj_ci_core::{
    BranchPin, Environment, EnvironmentEntry, EnvironmentId, EnvironmentView, Pin, Snapshot,
    StepView,
};
use oj_ci_engine::steps::{
    ImageBuildStep, MergeCheckoutStep, SourceCloneStep, StackDeployStep, StackInspectStep,
    UnmergeResolveStep,
};
use oj_ci_engine::{ErasedStep, Pipeline, PipelineBuilder};
use oj_ci_orchestrator::OrchestratorOps;
use oj_ci_scm::SourceControlOps;
use parking_lot::Mutex as SyncMutex;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, Notify};
use tracing::{info, instrument, warn};

/// One configured environment's mutable domain state plus the static
/// parameters its pipeline is rebuilt from each pass.
struct EnvironmentState {
    env: Environment,
    config: EnvironmentConfig,
}

/// Wires one environment's pipeline from its current `branches`: the
/// `UnmergeResolve` recovery path while `branches` is empty, the full
/// merge/build/deploy/inspect path once it's populated.
fn build_pipeline(
    env: &Environment,
    config: &EnvironmentConfig,
    base_dir: &std::path::Path,
    scm: Arc<dyn SourceControlOps>,
    orchestrator: Arc<dyn OrchestratorOps>,
) -> (Pipeline, Arc<SourceCloneStep>) {
    let source_clone = Arc::new(SourceCloneStep::new(
        env.id.as_str(),
        env.repo.clone(),
        env.branch_name_prefix.clone(),
        base_dir.to_path_buf(),
        scm.clone(),
    ));

    let mut builder = PipelineBuilder::new();

    if env.awaiting_unmerge() {
        let stack_inspect = Arc::new(StackInspectStep::new(
            config.stack.clone(),
            orchestrator.clone(),
        ));
        let unmerge_resolve = Arc::new(UnmergeResolveStep::new(
            source_clone.clone(),
            stack_inspect,
            scm.clone(),
        ));
        builder = builder.unmerge_resolve_step(unmerge_resolve as Arc<dyn ErasedStep>);
    } else {
        let branches: Vec<(String, Pin)> = env
            .branches
            .iter()
            .map(|b| (b.branch_name.clone(), b.pin.clone()))
            .collect();
        let merge_checkout = Arc::new(MergeCheckoutStep::new(
            source_clone.clone(),
            scm.clone(),
            branches,
            config.push,
        ));
        let image_build = Arc::new(ImageBuildStep::new(
            source_clone.clone(),
            orchestrator.clone(),
            config.compose_relative_path.clone(),
            config.vars.clone(),
            config.publish,
        ));
        let stack_inspect = Arc::new(StackInspectStep::new(
            config.stack.clone(),
            orchestrator.clone(),
        ));
        let stack_deploy = Arc::new(StackDeployStep::new(
            config.stack.clone(),
            config.compose_relative_path.clone(),
            config.vars.clone(),
            source_clone.clone(),
            merge_checkout.clone(),
            image_build.clone(),
            stack_inspect.clone(),
            orchestrator.clone(),
            env.dry,
        ));

        builder = builder
            .step(merge_checkout as Arc<dyn ErasedStep>)
            .step(image_build as Arc<dyn ErasedStep>)
            .step(stack_inspect as Arc<dyn ErasedStep>)
            .step(stack_deploy as Arc<dyn ErasedStep>);
    }

    (builder.build(), source_clone)
}

/// An operator edit, applied wholesale to one environment's `branches`
/// between passes (§6).
#[derive(Debug, Clone)]
pub struct OperatorUpdate {
    pub id: EnvironmentId,
    pub branches: Vec<BranchPin>,
}

/// One pass's externally-visible outcome, handed to whoever drives
/// [`ControlLoop::run_pass`] so it can be logged or tested without
/// reaching back into the snapshot hub.
#[derive(Debug, Clone)]
pub struct PassSummary {
    pub environment_count: usize,
    pub failed_step_count: usize,
}

/// The single driver (§4.3): every environment's pass runs back-to-back
/// under one exclusive lock, so two passes (triggered by a wake event and
/// by the fallback timeout racing) can never interleave.
pub struct ControlLoop {
    environments: AsyncMutex<Vec<EnvironmentState>>,
    pending_updates: SyncMutex<Vec<OperatorUpdate>>,
    hub: SnapshotHub,
    wake: Arc<Notify>,
    base_dir: PathBuf,
    scm: Arc<dyn SourceControlOps>,
    orchestrator: Arc<dyn OrchestratorOps>,
}

const WAKE_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(60);

impl ControlLoop {
    pub fn new(
        config: &Config,
        scm: Arc<dyn SourceControlOps>,
        orchestrator: Arc<dyn OrchestratorOps>,
        hub: SnapshotHub,
    ) -> Self {
        let environments = config
            .environments
            .iter()
            .map(|c| EnvironmentState {
                env: c.environment.clone(),
                config: c.clone(),
            })
            .collect();
        Self {
            environments: AsyncMutex::new(environments),
            pending_updates: SyncMutex::new(Vec::new()),
            hub,
            wake: Arc::new(Notify::new()),
            base_dir: config.base_dir.clone(),
            scm,
            orchestrator,
        }
    }

    /// The most recently published snapshot, for `status` queries and the
    /// federation dialer's outbound publish.
    pub fn current_snapshot(&self) -> Snapshot {
        self.hub.current()
    }

    /// Subscribes to every future snapshot publication, for the
    /// federation dialer.
    pub fn subscribe_snapshots(&self) -> tokio::sync::watch::Receiver<Snapshot> {
        self.hub.subscribe()
    }

    /// Folds a peer's snapshot into the published one (§4.6), returning
    /// any environment-id conflicts found on the overlap.
    pub fn merge_remote_snapshot(&self, remote: Snapshot) -> Vec<oj_ci_core::FederationConflict> {
        let local = self.hub.current();
        let branches = oj_ci_core::merge_branches(local.branches, remote.branches);
        let (environments, conflicts) =
            oj_ci_core::merge_environments(local.environments, remote.environments);
        self.hub.publish(Snapshot {
            branches,
            environments,
        });
        conflicts
    }

    /// Queues an operator edit for application at the start of the next
    /// pass; never mutates a running pass's environment state.
    pub fn queue_update(&self, update: OperatorUpdate) {
        self.pending_updates.lock().push(update);
        self.wake.notify_one();
    }

    /// Runs passes forever: one immediately, then one every time the wake
    /// event fires or 60 seconds elapse, whichever is first (§4.3).
    pub async fn run_forever(&self) {
        loop {
            self.run_pass().await;
            tokio::select! {
                _ = self.wake.notified() => {}
                _ = tokio::time::sleep(WAKE_TIMEOUT) => {}
            }
        }
    }

    /// Runs exactly one pass over every configured environment, holding
    /// the exclusive lock for the whole of it (§4.3), then publishes the
    /// resulting snapshot.
    #[instrument(skip_all)]
    pub async fn run_pass(&self) -> PassSummary {
        let mut states = self.environments.lock().await;
        self.apply_pending_updates(&mut states);

        let mut entries = oj_ci_core::EnvironmentsSnapshot::new();
        let mut branches_snapshot = oj_ci_core::BranchesSnapshot::new();
        let mut failed_step_count = 0;

        for state in states.iter_mut() {
            let id = state.env.id.clone();
            let (pipeline, source_clone) = build_pipeline(
                &state.env,
                &state.config,
                &self.base_dir,
                self.scm.clone(),
                self.orchestrator.clone(),
            );

            let steps: Arc<SyncMutex<Vec<StepView>>> = Arc::new(SyncMutex::new(Vec::new()));
            let steps_for_closure = steps.clone();
            let env_id_for_log = id.clone();
            let views = pipeline
                .run_pass(&mut state.env, move |step_view| {
                    info!(environment = %env_id_for_log, step = %step_view.name, "step finished");
                    steps_for_closure.lock().push(step_view.clone());
                })
                .await;

            failed_step_count += views
                .iter()
                .filter(|v| matches!(v.status, oj_ci_core::StepStatus::Failed { .. }))
                .count();

            let view = EnvironmentView {
                id: id.clone(),
                repo: state.env.repo.clone(),
                dry: state.env.dry,
                branches: state
                    .env
                    .branches
                    .iter()
                    .map(|b| (b.branch_name.clone(), pin_label(&b.pin)))
                    .collect(),
            };

            entries.insert(
                id.clone(),
                EnvironmentEntry {
                    env: view,
                    steps: views,
                },
            );

            if let Ok(enumerated) = source_clone.enumerate_branches(10).await {
                branches_snapshot.insert(id, enumerated);
            }
        }

        let environment_count = entries.len();
        self.hub.publish(Snapshot {
            branches: branches_snapshot,
            environments: entries,
        });

        PassSummary {
            environment_count,
            failed_step_count,
        }
    }

    fn apply_pending_updates(&self, states: &mut [EnvironmentState]) {
        let updates = std::mem::take(&mut *self.pending_updates.lock());
        for update in updates {
            match states.iter_mut().find(|s| s.env.id == update.id) {
                Some(state) => {
                    state.env.replace_branches(update.branches);
                }
                None => warn!(environment = %update.id, "operator update for unknown environment dropped"),
            }
        }
    }
}

fn pin_label(pin: &Pin) -> String {
    match pin {
        Pin::Head => "HEAD".to_string(),
        Pin::Commit(id) => id.clone(),
    }
}

#[cfg(test)]
#[path = "control_loop_tests.rs"]
mod tests;

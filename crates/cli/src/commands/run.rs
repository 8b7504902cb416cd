// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use oj_ci_daemon::{Config, ControlLoop, SnapshotHub};
use oj_ci_orchestrator::DockerOrchestrator;
use oj_ci_scm::GitSourceControl;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub async fn run(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)
        .with_context(|| format!("failed to load configuration from {}", config_path.display()))?;

    let scm = Arc::new(GitSourceControl::new()) as Arc<dyn oj_ci_scm::SourceControlOps>;
    let orchestrator =
        Arc::new(DockerOrchestrator::new()) as Arc<dyn oj_ci_orchestrator::OrchestratorOps>;
    let hub = SnapshotHub::new();
    let control_loop = Arc::new(ControlLoop::new(&config, scm, orchestrator, hub));

    let listen_addr = config.listen_addr;
    let listener_loop = control_loop.clone();
    let listener_task = tokio::spawn(async move {
        if let Err(err) = oj_ci_daemon::listener::serve(listen_addr, listener_loop).await {
            tracing::error!(error = %err, "operator listener exited");
        }
    });

    let federation_task = config.peer_url.clone().map(|peer| {
        let federation_loop = control_loop.clone();
        tokio::spawn(oj_ci_daemon::federation::dial_forever(peer, federation_loop))
    });

    info!(environments = config.environments.len(), %listen_addr, "control loop starting");
    let driver_loop = control_loop.clone();
    let driver_task = tokio::spawn(async move { driver_loop.run_forever().await });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("received ctrl-c, shutting down");
        }
        _ = driver_task => {}
    }

    listener_task.abort();
    if let Some(task) = federation_task {
        task.abort();
    }
    Ok(())
}

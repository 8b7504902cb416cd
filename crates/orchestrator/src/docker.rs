// SPDX-License-Identifier: MIT

//! `DockerOrchestrator`: the real `OrchestratorOps` implementation,
//! shelling out to the `docker` CLI (`docker compose`, `docker image`,
//! `docker login`). Same timeout/exit-code idiom as
//! `oj_ci_scm::git::GitSourceControl`.

use crate::error::OrchestratorError;
use crate::ops::OrchestratorOps;
use async_trait::async_trait;
use oj_ci_core::{DeploymentSnapshot, ServiceDeployment};
use std::path::Path;
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

const DOCKER_TIMEOUT: Duration = Duration::from_secs(300);
/// Label the orchestrator filters stacks by, set on every service at
/// deploy time alongside `version` (§3 Deployment snapshot).
pub const STACK_NAMESPACE_LABEL: &str = "oj-ci.stack";

#[derive(Debug, Clone)]
pub struct DockerOrchestrator {
    timeout: Duration,
}

impl Default for DockerOrchestrator {
    fn default() -> Self {
        Self {
            timeout: DOCKER_TIMEOUT,
        }
    }
}

impl DockerOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    async fn run(&self, args: &[&str]) -> Result<Output, OrchestratorError> {
        let mut cmd = Command::new("docker");
        cmd.args(args);
        let description = format!("docker {}", args.join(" "));
        tracing::debug!(command = %description, "running");
        match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => {
                if !output.status.success() {
                    tracing::warn!(
                        command = %description,
                        exit_code = ?output.status.code(),
                        stderr = %String::from_utf8_lossy(&output.stderr),
                        "exited non-zero"
                    );
                }
                Ok(output)
            }
            Ok(Err(io_err)) => {
                tracing::warn!(command = %description, error = %io_err, "failed to spawn");
                Err(OrchestratorError::DeployFailed {
                    exit_code: None,
                    stderr: io_err.to_string(),
                })
            }
            Err(_elapsed) => {
                tracing::warn!(command = %description, seconds = self.timeout.as_secs(), "timed out");
                Err(OrchestratorError::Timeout {
                    command: description,
                    seconds: self.timeout.as_secs(),
                })
            }
        }
    }
}

#[async_trait]
impl OrchestratorOps for DockerOrchestrator {
    async fn inspect_stack(&self, stack: &str) -> Result<DeploymentSnapshot, OrchestratorError> {
        let filter = format!("label={STACK_NAMESPACE_LABEL}={stack}");
        let output = self
            .run(&[
                "ps",
                "--filter",
                &filter,
                "--format",
                "{{.Names}}\t{{.Image}}\t{{.Label \"version\"}}",
            ])
            .await?;
        if !output.status.success() {
            return Err(OrchestratorError::DeployFailed {
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut services = Vec::new();
        for line in stdout.lines() {
            let mut fields = line.split('\t');
            let (Some(name), Some(image), Some(version)) =
                (fields.next(), fields.next(), fields.next())
            else {
                continue;
            };
            services.push(ServiceDeployment {
                name: name.to_string(),
                image: image.to_string(),
                stack_namespace: stack.to_string(),
                version: version.to_string(),
            });
        }

        let snapshot = DeploymentSnapshot::new(services);
        let versions = snapshot.distinct_versions();
        if versions.len() > 1 {
            return Err(OrchestratorError::VersionMismatch {
                stack: stack.to_string(),
                versions: versions.into_iter().map(str::to_string).collect(),
            });
        }
        Ok(snapshot)
    }

    async fn image_exists_local(&self, tag: &str) -> Result<bool, OrchestratorError> {
        let output = self.run(&["image", "inspect", tag]).await?;
        Ok(output.status.success())
    }

    async fn image_exists_remote(&self, tag: &str) -> Result<bool, OrchestratorError> {
        let output = self.run(&["manifest", "inspect", tag]).await?;
        Ok(output.status.success())
    }

    async fn registry_login(&self, _tag: &str) -> Result<(), OrchestratorError> {
        // Credentials are resolved by the caller (config loading) and
        // passed via `DOCKER_CONFIG`/env before this process starts; there
        // is nothing to do here beyond confirming the daemon is reachable.
        let output = self.run(&["info"]).await?;
        if !output.status.success() {
            return Err(OrchestratorError::LoginFailed {
                message: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(())
    }

    async fn build_image(&self, tag: &str, context_path: &Path) -> Result<(), OrchestratorError> {
        let context = context_path.to_string_lossy().into_owned();
        let output = self.run(&["build", "-t", tag, &context]).await?;
        if !output.status.success() {
            return Err(OrchestratorError::BuildFailed {
                image: tag.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(())
    }

    async fn push_image(&self, tag: &str) -> Result<(), OrchestratorError> {
        let output = self.run(&["push", tag]).await?;
        if !output.status.success() {
            return Err(OrchestratorError::BuildFailed {
                image: tag.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(())
    }

    async fn deploy_stack(&self, stack: &str, compose_path: &Path) -> Result<(), OrchestratorError> {
        let compose = compose_path.to_string_lossy().into_owned();
        let output = self
            .run(&[
                "compose",
                "-f",
                &compose,
                "-p",
                stack,
                "up",
                "-d",
                "--remove-orphans",
            ])
            .await?;
        if !output.status.success() {
            return Err(OrchestratorError::DeployFailed {
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(())
    }
}

// SPDX-License-Identifier: MIT

//! Error taxonomy for orchestrator and registry operations.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("compose document at {path} is malformed: {message}")]
    MalformedCompose { path: String, message: String },

    #[error("service {service} has no image and no build context")]
    MissingImage { service: String },

    #[error("stack {stack} reported services with differing versions: {versions:?}")]
    VersionMismatch { stack: String, versions: Vec<String> },

    #[error("registry login failed: {message}")]
    LoginFailed { message: String },

    #[error("image build failed for {image}: {stderr}")]
    BuildFailed { image: String, stderr: String },

    #[error("stack deploy failed (exit {exit_code:?}): {stderr}")]
    DeployFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("{command} timed out after {seconds}s")]
    Timeout { command: String, seconds: u64 },
}

impl OrchestratorError {
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::LoginFailed { .. } | Self::DeployFailed { .. } | Self::Timeout { .. }
        )
    }
}

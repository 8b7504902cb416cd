// SPDX-License-Identifier: MIT

//! Error taxonomy for source-control operations, shaped so callers can map
//! straight onto the step failure taxonomy (`oj_ci_core::StepFailure`)
//! without string matching.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScmError {
    #[error("fetch failed: {message}")]
    FetchFailed { message: String },

    #[error("{ref_name} does not resolve to a commit")]
    UnresolvedRef { ref_name: String },

    #[error("working copy at {path} is missing its repository marker")]
    NotARepository { path: String },

    #[error("merge conflict on commit {commit_id}: {message}")]
    MergeConflict { commit_id: String, message: String },

    #[error("git {command} failed (exit {exit_code:?}): {stderr}")]
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("{command} timed out after {seconds}s")]
    Timeout { command: String, seconds: u64 },
}

impl ScmError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::FetchFailed { .. } | Self::Timeout { .. })
    }
}

// SPDX-License-Identifier: MIT

//! The step failure taxonomy (§7): one `thiserror` enum so the engine can
//! classify a failure programmatically instead of string-matching its
//! message.

use thiserror::Error;

/// Everything a failed `Step::evaluate()` can return.
///
/// `ConfigurationFault` and `MergeConflict` surface as-is and are not
/// retried. `TransientIOFault` surfaces this pass but is expected to clear
/// on the next one. `FederationConflict` is never returned from a step; it
/// travels on the federation error channel instead (see
/// [`crate::snapshot`]).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StepFailure {
    #[error("{message}")]
    ConfigurationFault { message: String },

    #[error("{message}")]
    TransientIoFault { message: String },

    #[error("{message}")]
    MergeConflict {
        message: String,
        offending_commit: Option<String>,
    },

    #[error("{message}")]
    Other {
        message: String,
        trace: Vec<String>,
    },
}

impl StepFailure {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationFault {
            message: message.into(),
        }
    }

    pub fn transient_io(message: impl Into<String>) -> Self {
        Self::TransientIoFault {
            message: message.into(),
        }
    }

    pub fn merge_conflict(message: impl Into<String>, offending_commit: Option<String>) -> Self {
        Self::MergeConflict {
            message: message.into(),
            offending_commit,
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
            trace: Vec::new(),
        }
    }

    pub fn with_trace(mut self, trace: Vec<String>) -> Self {
        if let Self::Other { trace: t, .. } = &mut self {
            *t = trace;
        }
        self
    }

    /// Human-readable message, regardless of variant.
    pub fn message(&self) -> &str {
        match self {
            Self::ConfigurationFault { message }
            | Self::TransientIoFault { message }
            | Self::MergeConflict { message, .. }
            | Self::Other { message, .. } => message,
        }
    }

    /// Captured stderr/trace lines, if any were attached.
    pub fn trace(&self) -> &[String] {
        match self {
            Self::Other { trace, .. } => trace,
            _ => &[],
        }
    }

    /// Whether the driver should expect this failure to clear on the next
    /// pass without operator intervention.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientIoFault { .. })
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::ConfigurationFault { .. } => FailureKind::ConfigurationFault,
            Self::TransientIoFault { .. } => FailureKind::TransientIoFault,
            Self::MergeConflict { .. } => FailureKind::MergeConflict,
            Self::Other { .. } => FailureKind::Other,
        }
    }
}

/// The bare classification, useful for metrics/logging without cloning
/// the message or trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    ConfigurationFault,
    TransientIoFault,
    MergeConflict,
    Other,
}

#[cfg(test)]
#[path = "failure_tests.rs"]
mod tests;

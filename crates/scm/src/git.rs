// SPDX-License-Identifier: MIT

//! `GitSourceControl`: the real `SourceControlOps` implementation, shelling
//! out to the system `git` binary. Every invocation runs under a timeout
//! and a non-zero exit becomes a descriptive `ScmError`.

use crate::error::ScmError;
use crate::ops::SourceControlOps;
use async_trait::async_trait;
use indexmap::IndexMap;
use oj_ci_core::{BranchTip, BranchTips, CommitGraph, CommitId, CommitRecord};
use std::path::Path;
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

const GIT_TIMEOUT: Duration = Duration::from_secs(120);
const LOG_FORMAT: &str = "%H%x1f%an%x1f%aI%x1f%s%x1e";

/// A `git` subprocess wrapper. Stateless beyond the timeout; every method
/// takes the working copy path explicitly.
#[derive(Debug, Clone, Default)]
pub struct GitSourceControl {
    timeout: Duration,
}

impl GitSourceControl {
    pub fn new() -> Self {
        Self {
            timeout: GIT_TIMEOUT,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn run(&self, path: &Path, args: &[&str]) -> Result<Output, ScmError> {
        let mut cmd = Command::new("git");
        cmd.arg("-C").arg(path).args(args);
        let description = format!("git {}", args.join(" "));
        tracing::debug!(command = %description, path = %path.display(), "running");
        match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(io_err)) => {
                tracing::warn!(command = %description, error = %io_err, "failed to spawn");
                Err(ScmError::CommandFailed {
                    command: description,
                    exit_code: None,
                    stderr: io_err.to_string(),
                })
            }
            Err(_elapsed) => {
                tracing::warn!(command = %description, seconds = self.timeout.as_secs(), "timed out");
                Err(ScmError::Timeout {
                    command: description,
                    seconds: self.timeout.as_secs(),
                })
            }
        }
    }

    async fn run_ok(&self, path: &Path, args: &[&str]) -> Result<String, ScmError> {
        let output = self.run(path, args).await?;
        if !output.status.success() {
            let command = format!("git {}", args.join(" "));
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            tracing::warn!(command = %command, exit_code = ?output.status.code(), %stderr, "exited non-zero");
            return Err(ScmError::CommandFailed {
                command,
                exit_code: output.status.code(),
                stderr,
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn parse_log(raw: &str) -> Vec<CommitRecord> {
        raw.split('\u{1e}')
            .filter(|entry| !entry.trim().is_empty())
            .filter_map(|entry| {
                let mut fields = entry.trim_start_matches('\n').split('\u{1f}');
                let commit_id = fields.next()?.trim();
                let author = fields.next()?;
                let iso_timestamp = fields.next()?;
                let message = fields.next()?.trim_end();
                Some(CommitRecord::new(commit_id, author, iso_timestamp, message))
            })
            .collect()
    }
}

#[async_trait]
impl SourceControlOps for GitSourceControl {
    async fn clone_or_fetch(
        &self,
        path: &Path,
        repo: &str,
        branch_prefix: Option<&str>,
    ) -> Result<(), ScmError> {
        let refspec = match branch_prefix {
            Some(prefix) => format!("+refs/heads/{prefix}/*:refs/remotes/origin/{prefix}/*"),
            None => "+refs/heads/*:refs/remotes/origin/*".to_string(),
        };

        if crate::ops::repository_marker(path).is_dir() {
            self.run_ok(path, &["fetch", "--prune", "origin", &refspec])
                .await?;
        } else {
            tokio::fs::create_dir_all(path).await.map_err(|e| ScmError::FetchFailed {
                message: format!("could not create working copy directory: {e}"),
            })?;
            let mut cmd = Command::new("git");
            cmd.arg("clone").arg("--no-checkout").arg(repo).arg(path);
            let output = tokio::time::timeout(self.timeout, cmd.output())
                .await
                .map_err(|_| ScmError::Timeout {
                    command: "git clone".to_string(),
                    seconds: self.timeout.as_secs(),
                })?
                .map_err(|e| ScmError::FetchFailed {
                    message: e.to_string(),
                })?;
            if !output.status.success() {
                return Err(ScmError::FetchFailed {
                    message: String::from_utf8_lossy(&output.stderr).into_owned(),
                });
            }
            if branch_prefix.is_some() {
                self.run_ok(path, &["fetch", "--prune", "origin", &refspec])
                    .await?;
            }
        }

        if !crate::ops::repository_marker(path).is_dir() {
            return Err(ScmError::NotARepository {
                path: path.display().to_string(),
            });
        }
        Ok(())
    }

    async fn enumerate_branches(
        &self,
        path: &Path,
        prefix: Option<&str>,
        limit: usize,
    ) -> Result<IndexMap<String, Vec<CommitRecord>>, ScmError> {
        let refs_raw = self
            .run_ok(path, &["for-each-ref", "--format=%(refname:short)", "refs/remotes/origin"])
            .await?;

        let mut result = IndexMap::new();
        for line in refs_raw.lines() {
            let short = line.trim();
            let Some(name) = short.strip_prefix("origin/") else {
                continue;
            };
            if name == "HEAD" || !oj_ci_core::snapshot_eligible(name) {
                continue;
            }
            if let Some(p) = prefix {
                if !name.starts_with(p) {
                    continue;
                }
            }

            let raw = self
                .run_ok(
                    path,
                    &[
                        "log",
                        &format!("-{limit}"),
                        &format!("--format={LOG_FORMAT}"),
                        short,
                    ],
                )
                .await?;
            result.insert(name.to_string(), Self::parse_log(&raw));
        }
        Ok(result)
    }

    async fn resolve_head(&self, path: &Path, branch_name: &str) -> Result<CommitId, ScmError> {
        let rev = format!("origin/{branch_name}");
        let out = self
            .run_ok(path, &["rev-parse", "--verify", &format!("{rev}^{{commit}}")])
            .await
            .map_err(|_| ScmError::UnresolvedRef {
                ref_name: branch_name.to_string(),
            })?;
        Ok(CommitId::new(out.trim()))
    }

    async fn resolve_commit(&self, path: &Path, commit_id: &str) -> Result<CommitId, ScmError> {
        let out = self
            .run_ok(path, &["rev-parse", "--verify", &format!("{commit_id}^{{commit}}")])
            .await
            .map_err(|_| ScmError::UnresolvedRef {
                ref_name: commit_id.to_string(),
            })?;
        Ok(CommitId::new(out.trim()))
    }

    async fn branch_tips(&self, path: &Path) -> Result<BranchTips, ScmError> {
        let raw = self
            .run_ok(
                path,
                &[
                    "for-each-ref",
                    "--format=%(refname:short) %(objectname)",
                    "refs/remotes/origin",
                ],
            )
            .await?;
        let mut tips = Vec::new();
        for line in raw.lines() {
            let mut parts = line.split_whitespace();
            let Some(short) = parts.next() else { continue };
            let Some(commit) = parts.next() else { continue };
            let Some(name) = short.strip_prefix("origin/") else {
                continue;
            };
            if name == "HEAD" || !oj_ci_core::snapshot_eligible(name) {
                continue;
            }
            tips.push(BranchTip::new(name.to_string(), commit));
        }
        Ok(BranchTips::new(tips))
    }

    async fn commit_graph(&self, path: &Path) -> Result<CommitGraph, ScmError> {
        let raw = self
            .run_ok(
                path,
                &["log", "--all", "--format=%H %P"],
            )
            .await?;
        let mut parents: IndexMap<CommitId, Vec<CommitId>> = IndexMap::new();
        for line in raw.lines() {
            let mut parts = line.split_whitespace();
            let Some(commit) = parts.next() else { continue };
            let parent_ids: Vec<CommitId> = parts.map(CommitId::new).collect();
            parents.insert(CommitId::new(commit), parent_ids);
        }
        Ok(CommitGraph::new(parents))
    }

    async fn checkout_commit(&self, path: &Path, commit_id: &CommitId) -> Result<(), ScmError> {
        self.run_ok(path, &["checkout", "--detach", commit_id.as_str()])
            .await?;
        Ok(())
    }

    async fn force_create_branch(
        &self,
        path: &Path,
        branch_name: &str,
        commit_id: &CommitId,
    ) -> Result<(), ScmError> {
        self.run_ok(path, &["checkout", "-B", branch_name, commit_id.as_str()])
            .await?;
        Ok(())
    }

    async fn checkout_branch(&self, path: &Path, branch_name: &str) -> Result<(), ScmError> {
        let remote_ref = format!("origin/{branch_name}");
        self.run_ok(path, &["checkout", "-B", branch_name, &remote_ref])
            .await?;
        Ok(())
    }

    async fn force_push(&self, path: &Path, branch_name: &str) -> Result<(), ScmError> {
        self.run_ok(path, &["push", "--force", "origin", branch_name])
            .await?;
        Ok(())
    }

    async fn merge_no_ff(&self, path: &Path, commit_id: &CommitId) -> Result<CommitId, ScmError> {
        let output = self
            .run(
                path,
                &["merge", "--no-ff", "--no-edit", commit_id.as_str()],
            )
            .await?;
        if !output.status.success() {
            let _ = self.run(path, &["merge", "--abort"]).await;
            return Err(ScmError::MergeConflict {
                commit_id: commit_id.to_string(),
                message: format!(
                    "Merge conflict merging {}: {}",
                    commit_id,
                    String::from_utf8_lossy(&output.stderr)
                ),
            });
        }
        self.current_commit(path).await
    }

    async fn current_commit(&self, path: &Path) -> Result<CommitId, ScmError> {
        let out = self.run_ok(path, &["rev-parse", "HEAD"]).await?;
        Ok(CommitId::new(out.trim()))
    }
}

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;

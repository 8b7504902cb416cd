// SPDX-License-Identifier: MIT

//! Deterministic working-copy path derivation (§4.1 `SourceClone`): the
//! same `(env.id, repo)` pair always maps to the same directory, so
//! repeated clone steps reuse storage instead of re-cloning from scratch.

use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// The directory a `SourceClone` step checks out `repo` into for `env_id`,
/// rooted under `base` (normally the system temp directory).
pub fn working_copy_path(base: &std::path::Path, env_id: &str, repo: &str) -> PathBuf {
    let mut hasher = Sha256::new();
    hasher.update(repo.as_bytes());
    let digest = hasher.finalize();
    let short = hex_prefix(&digest, 12);
    base.join("oj-ci").join(format!("{env_id}-{short}"))
}

fn hex_prefix(bytes: &[u8], chars: usize) -> String {
    bytes
        .iter()
        .flat_map(|b| [b >> 4, b & 0xf])
        .take(chars)
        .map(|nibble| char::from_digit(nibble as u32, 16).unwrap_or('0'))
        .collect()
}

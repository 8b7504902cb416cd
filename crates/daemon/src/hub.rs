// SPDX-License-Identifier: MIT

//! `SnapshotHub`: the single publication point for the process's current
//! [`Snapshot`] (§4.6, §6). Wraps a [`tokio::sync::watch`] channel and
//! publishes with `send_if_modified`, so re-merging an already-converged
//! federation snapshot never re-triggers a downstream wakeup — without
//! this, two peers that have already converged would keep re-notifying
//! each other forever.

use oj_ci_core::Snapshot;
use tokio::sync::watch;

#[derive(Clone)]
pub struct SnapshotHub {
    tx: watch::Sender<Snapshot>,
}

impl SnapshotHub {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Snapshot::default());
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> Snapshot {
        self.tx.borrow().clone()
    }

    /// Replaces the published snapshot, returning whether it actually
    /// changed (subscribers are only woken on a real change).
    pub fn publish(&self, snapshot: Snapshot) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        })
    }
}

impl Default for SnapshotHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "hub_tests.rs"]
mod tests;

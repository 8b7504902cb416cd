// SPDX-License-Identifier: MIT

//! Federation (§4.6): a symmetric master/slave peer link. Each side dials
//! the other, republishing its own snapshot whenever it changes and
//! folding in whatever the peer sends back. There is no leader election:
//! both processes run the identical dialer, and a conflict on the
//! `environments` overlap is logged, not resolved — both environments
//! keep converging independently.

use crate::control_loop::ControlLoop;
use crate::transport::{read_message, write_message, Message, ProtocolError};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::{info, warn};

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Dials `peer_addr` forever, reconnecting with exponential backoff
/// (capped at [`MAX_BACKOFF`]) whenever the link drops.
pub async fn dial_forever(peer_addr: String, control_loop: Arc<ControlLoop>) {
    let mut backoff = INITIAL_BACKOFF;
    loop {
        match run_link(&peer_addr, &control_loop).await {
            Ok(()) => backoff = INITIAL_BACKOFF,
            Err(err) => {
                warn!(peer = %peer_addr, error = %err, backoff_secs = backoff.as_secs(), "federation link dropped");
                tokio::time::sleep(backoff).await;
                backoff = (backoff * 2).min(MAX_BACKOFF);
            }
        }
    }
}

/// One connection's lifetime: a writer task republishing every snapshot
/// change, and a reader loop folding in whatever arrives, until either
/// side closes the stream.
async fn run_link(peer_addr: &str, control_loop: &ControlLoop) -> Result<(), ProtocolError> {
    let stream = TcpStream::connect(peer_addr).await?;
    info!(peer = %peer_addr, "federation link established");
    let (mut read_half, mut write_half) = stream.into_split();

    let mut snapshots = control_loop.subscribe_snapshots();
    let writer_peer = peer_addr.to_string();
    let writer = tokio::spawn(async move {
        loop {
            let snapshot = snapshots.borrow_and_update().clone();
            if write_message(&mut write_half, &Message::Snapshot(snapshot))
                .await
                .is_err()
            {
                return;
            }
            if snapshots.changed().await.is_err() {
                return;
            }
        }
    });
    let _ = writer_peer;

    loop {
        let message = read_message(&mut read_half).await?;
        match message {
            Message::Snapshot(remote) => {
                let conflicts = control_loop.merge_remote_snapshot(remote);
                for conflict in conflicts {
                    warn!(
                        peer = %peer_addr,
                        environment = %conflict.environment_id,
                        "federation conflict: environment id present on both peers"
                    );
                }
            }
            Message::Error { message } => {
                warn!(peer = %peer_addr, %message, "peer reported an error");
            }
            Message::OperatorUpdate { .. } | Message::StatusQuery => {
                warn!(peer = %peer_addr, "unexpected operator-protocol message on federation link");
            }
        }
    }
}

#[cfg(test)]
#[path = "federation_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT

//! The operator listener (§6): a TCP accept loop speaking [`Message`].
//! A `StatusQuery` gets back one `Snapshot`; an `OperatorUpdate` is queued
//! on the [`ControlLoop`] and woken immediately, applied at the start of
//! the next pass.

use crate::control_loop::{ControlLoop, OperatorUpdate as LoopUpdate};
use crate::transport::{read_message, write_message, Message, ProtocolError};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, warn};

pub async fn serve(addr: SocketAddr, control_loop: Arc<ControlLoop>) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "operator listener bound");
    loop {
        let (stream, peer) = listener.accept().await?;
        let control_loop = control_loop.clone();
        tokio::spawn(async move {
            if let Err(err) = handle_connection(stream, &control_loop).await {
                warn!(%peer, error = %err, "operator connection ended with an error");
            }
        });
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    control_loop: &ControlLoop,
) -> Result<(), ProtocolError> {
    let message = read_message(&mut stream).await?;
    match message {
        Message::StatusQuery => {
            write_message(&mut stream, &Message::Snapshot(control_loop.current_snapshot())).await?;
        }
        Message::OperatorUpdate { id, branches } => {
            control_loop.queue_update(LoopUpdate { id, branches });
            write_message(&mut stream, &Message::StatusQuery).await?;
        }
        Message::Snapshot(_) | Message::Error { .. } => {
            write_message(
                &mut stream,
                &Message::Error {
                    message: "operator listener only accepts status_query and operator_update"
                        .to_string(),
                },
            )
            .await?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;

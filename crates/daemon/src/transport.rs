// SPDX-License-Identifier: MIT

//! Length-prefixed JSON framing carrying [`Message`], the one envelope
//! shared by the federation peer-link and the operator-edit/status-query
//! listener (§4.6, §6).

use oj_ci_core::{BranchPin, EnvironmentId, Snapshot};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Hard ceiling on a single framed message, defending the listener against
/// a misbehaving or malicious peer driving unbounded allocation.
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("message exceeds maximum size of {MAX_MESSAGE_SIZE} bytes: {0}")]
    TooLarge(usize),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("connection closed before a complete message was read")]
    Closed,
}

/// Every frame exchanged over the control transport (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    /// A full snapshot, published unsolicited by the federation link and
    /// in response to a `status` request on the operator transport.
    Snapshot(Snapshot),
    /// An operator edit (§6): replace one environment's `branches`
    /// wholesale. Applied between passes, never mid-pass.
    OperatorUpdate {
        id: EnvironmentId,
        branches: Vec<BranchPin>,
    },
    /// A bare request for the current snapshot, sent by `status`.
    StatusQuery,
    Error {
        message: String,
    },
}

pub async fn write_message<W: AsyncWriteExt + Unpin>(
    writer: &mut W,
    message: &Message,
) -> Result<(), ProtocolError> {
    let body = serde_json::to_vec(message)?;
    if body.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::TooLarge(body.len()));
    }
    writer.write_all(&(body.len() as u32).to_be_bytes()).await?;
    writer.write_all(&body).await?;
    writer.flush().await?;
    Ok(())
}

pub async fn read_message<R: AsyncReadExt + Unpin>(
    reader: &mut R,
) -> Result<Message, ProtocolError> {
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(ProtocolError::Closed)
        }
        Err(e) => return Err(e.into()),
    }
    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::TooLarge(len));
    }
    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;
    Ok(serde_json::from_slice(&body)?)
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT

use anyhow::{bail, Context, Result};
use oj_ci_daemon::{Config, Message};
use std::path::Path;
use tokio::net::TcpStream;

pub async fn run(config_path: &Path, addr_override: Option<String>) -> Result<()> {
    let addr = match addr_override {
        Some(addr) => addr,
        None => {
            let config = Config::load(config_path)
                .with_context(|| format!("failed to load configuration from {}", config_path.display()))?;
            config.listen_addr.to_string()
        }
    };

    let mut stream = TcpStream::connect(&addr)
        .await
        .with_context(|| format!("failed to connect to {addr}"))?;

    oj_ci_daemon::transport::write_message(&mut stream, &Message::StatusQuery)
        .await
        .context("failed to send status query")?;
    let response = oj_ci_daemon::transport::read_message(&mut stream)
        .await
        .context("failed to read status response")?;

    match response {
        Message::Snapshot(snapshot) => {
            let json = serde_json::to_string_pretty(&snapshot)?;
            println!("{json}");
            Ok(())
        }
        Message::Error { message } => bail!("instance reported an error: {message}"),
        other => bail!("unexpected response to status query: {other:?}"),
    }
}

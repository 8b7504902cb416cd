// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use oj_ci_daemon::Config;
use std::path::Path;

pub fn run(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)
        .with_context(|| format!("configuration at {} is invalid", config_path.display()))?;

    println!("configuration OK: {} environment(s)", config.environments.len());
    for env in &config.environments {
        let branch_names: Vec<&str> = env
            .environment
            .branches
            .iter()
            .map(|b| b.branch_name.as_str())
            .collect();
        let recovery = if env.environment.branches.is_empty() {
            " (awaiting unmerge recovery)"
        } else {
            ""
        };
        println!(
            "  - {}: repo={} stack={} branches={:?}{}",
            env.environment.id, env.environment.repo, env.stack, branch_names, recovery
        );
    }
    if let Some(peer) = &config.peer_url {
        println!("federation peer: {peer}");
    }
    println!("listen address: {}", config.listen_addr);
    Ok(())
}

#[cfg(test)]
#[path = "check_config_tests.rs"]
mod tests;

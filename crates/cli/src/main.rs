// SPDX-License-Identifier: MIT

//! `oj-ci`: the CLI entry point. `run` starts the foreground control loop,
//! operator listener, and optional federation link; `status` connects to a
//! running instance and prints its current snapshot; `check-config` parses
//! and validates an environment definition file without starting anything.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "oj-ci", version, about = "CI/CD branch-merge and unmerge pipeline controller")]
struct Cli {
    /// Path to the TOML environment definition file.
    #[arg(short = 'c', long = "config", global = true, default_value = "oj-ci.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the control loop, operator listener, and federation link in the foreground.
    Run,
    /// Connect to a running instance and print its current snapshot.
    Status {
        /// Address of the running instance's operator listener, if not the configured one.
        #[arg(long)]
        addr: Option<String>,
    },
    /// Parse and validate the configuration without starting the loop.
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run => commands::run::run(&cli.config).await,
        Commands::Status { addr } => commands::status::run(&cli.config, addr).await,
        Commands::CheckConfig => commands::check_config::run(&cli.config),
    }
}

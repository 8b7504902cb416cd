// SPDX-License-Identifier: MIT

//! Configuration surface (§6 Ambient addition): a `toml` environment
//! definition list, an id filter (inclusion list, or exclusion list
//! prefixed `-`), a dry-run flag, a peer URL, and the listener address the
//! federation link and operator-edit transport bind to.
//!
//! This is the one place the daemon reads process environment variables
//! for credentials (`<PREFIX>_USERNAME`/`<PREFIX>_PASSWORD`) — the core
//! and engine crates never do, which is what keeps their contracts
//! testable without environment state (§3 Supplemental data).

use oj_ci_core::{BranchPin, Credentials, Environment, Pin};
use serde::Deserialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("environment {id:?} has an empty id")]
    EmptyEnvironmentId { id: String },

    #[error("environment {id} is declared more than once")]
    DuplicateEnvironmentId { id: String },

    #[error("environment {id} branch {branch_name:?} has an invalid pin {pin:?} (expected HEAD or a 40-hex commit id)")]
    InvalidPin {
        id: String,
        branch_name: String,
        pin: String,
    },

    #[error("environment {id} has a branch entry with an empty branch_name")]
    EmptyBranchName { id: String },
}

#[derive(Debug, Clone, Deserialize)]
struct RawBranch {
    branch_name: String,
    #[serde(default = "default_pin")]
    pin: String,
}

fn default_pin() -> String {
    "HEAD".to_string()
}

#[derive(Debug, Clone, Deserialize)]
struct RawEnvironment {
    id: String,
    repo: String,
    #[serde(default)]
    branches: Vec<RawBranch>,
    #[serde(default)]
    dry: bool,
    #[serde(default)]
    branch_name_prefix: Option<String>,
    #[serde(default)]
    credential_prefix: Option<String>,
    stack: String,
    #[serde(default = "default_compose_path")]
    compose_path: String,
    #[serde(default)]
    vars: HashMap<String, String>,
    #[serde(default)]
    push: bool,
    #[serde(default)]
    publish: bool,
}

fn default_compose_path() -> String {
    "docker-compose.yml".to_string()
}

#[derive(Debug, Clone, Deserialize)]
struct RawConfig {
    #[serde(default = "default_listen_addr")]
    listen_addr: String,
    #[serde(default)]
    peer_url: Option<String>,
    #[serde(default)]
    dry_run: bool,
    #[serde(default)]
    filter: Vec<String>,
    #[serde(default = "default_base_dir")]
    base_dir: PathBuf,
    environment: Vec<RawEnvironment>,
}

fn default_listen_addr() -> String {
    "127.0.0.1:7420".to_string()
}

fn default_base_dir() -> PathBuf {
    std::env::temp_dir()
}

/// The id filter (§6): an inclusion list of ids, or an exclusion list
/// whose entries are all prefixed `-`. An empty filter includes every
/// configured environment.
#[derive(Debug, Clone)]
pub enum IdFilter {
    All,
    Include(Vec<String>),
    Exclude(Vec<String>),
}

impl IdFilter {
    fn from_raw(entries: Vec<String>) -> Self {
        if entries.is_empty() {
            return Self::All;
        }
        if entries.iter().all(|e| e.starts_with('-')) {
            Self::Exclude(entries.iter().map(|e| e.trim_start_matches('-').to_string()).collect())
        } else {
            Self::Include(entries)
        }
    }

    pub fn admits(&self, id: &str) -> bool {
        match self {
            Self::All => true,
            Self::Include(ids) => ids.iter().any(|i| i == id),
            Self::Exclude(ids) => !ids.iter().any(|i| i == id),
        }
    }
}

/// One environment's fully-resolved configuration: the `oj-ci-core`
/// `Environment` plus the build/deploy parameters the engine's steps need
/// that aren't part of the core data model (stack name, compose path,
/// substitution vars, push/publish flags).
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: Environment,
    pub stack: String,
    pub compose_relative_path: String,
    pub vars: HashMap<String, String>,
    pub push: bool,
    pub publish: bool,
}

/// The daemon's fully-loaded configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub peer_url: Option<String>,
    pub base_dir: PathBuf,
    pub environments: Vec<EnvironmentConfig>,
}

fn parse_pin(id: &str, branch_name: &str, raw: &str) -> Result<Pin, ConfigError> {
    if raw.eq_ignore_ascii_case("head") {
        return Ok(Pin::Head);
    }
    let is_commit = raw.len() == 40 && raw.chars().all(|c| c.is_ascii_hexdigit());
    if is_commit {
        Ok(Pin::Commit(raw.to_lowercase()))
    } else {
        Err(ConfigError::InvalidPin {
            id: id.to_string(),
            branch_name: branch_name.to_string(),
            pin: raw.to_string(),
        })
    }
}

/// Resolves `<PREFIX>_USERNAME`/`<PREFIX>_PASSWORD` from process
/// environment and, if both are present, embeds them as basic-auth in an
/// `https://` repo URL. Any other scheme (`git@`, `ssh://`) is returned
/// unchanged — credential injection only makes sense over HTTPS.
fn resolve_credentials(prefix: &str, repo: &str) -> (String, Option<Credentials>) {
    let username = std::env::var(format!("{prefix}_USERNAME")).ok();
    let password = std::env::var(format!("{prefix}_PASSWORD")).ok();
    let (Some(username), Some(password)) = (username, password) else {
        return (repo.to_string(), None);
    };

    let credentials = Credentials {
        username: username.clone(),
        password: password.clone(),
    };
    let Some(rest) = repo.strip_prefix("https://") else {
        return (repo.to_string(), Some(credentials));
    };
    (format!("https://{username}:{password}@{rest}"), Some(credentials))
}

impl Config {
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let raw_text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let raw: RawConfig = toml::from_str(&raw_text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let filter = IdFilter::from_raw(raw.filter);
        let mut seen = std::collections::HashSet::new();
        let mut environments = Vec::new();

        for env in raw.environment {
            if env.id.is_empty() {
                return Err(ConfigError::EmptyEnvironmentId { id: env.id });
            }
            if !seen.insert(env.id.clone()) {
                return Err(ConfigError::DuplicateEnvironmentId { id: env.id });
            }
            if !filter.admits(&env.id) {
                continue;
            }

            let mut branches = Vec::with_capacity(env.branches.len());
            for b in &env.branches {
                if b.branch_name.is_empty() {
                    return Err(ConfigError::EmptyBranchName { id: env.id.clone() });
                }
                let pin = parse_pin(&env.id, &b.branch_name, &b.pin)?;
                branches.push(BranchPin::new(b.branch_name.clone(), pin));
            }

            let (repo, credentials) = match &env.credential_prefix {
                Some(prefix) => resolve_credentials(prefix, &env.repo),
                None => (env.repo.clone(), None),
            };

            let mut environment = Environment::new(env.id.clone(), repo)
                .with_branches(branches)
                .with_dry(env.dry || raw.dry_run);
            environment.credentials = credentials;
            environment.branch_name_prefix = env.branch_name_prefix.clone();

            environments.push(EnvironmentConfig {
                environment,
                stack: env.stack.clone(),
                compose_relative_path: env.compose_path.clone(),
                vars: env.vars.clone(),
                push: env.push,
                publish: env.publish,
            });
        }

        let listen_addr = raw
            .listen_addr
            .parse()
            .map_err(|_| ConfigError::Parse {
                path: "listen_addr".to_string(),
                source: toml::de::Error::custom("not a socket address"),
            })?;

        Ok(Self {
            listen_addr,
            peer_url: raw.peer_url,
            base_dir: raw.base_dir,
            environments,
        })
    }
}

/// Minimal shim so `toml::de::Error::custom` reads naturally above without
/// pulling in `serde::de::Error` at the call site.
trait CustomError {
    fn custom(msg: impl std::fmt::Display) -> Self;
}

impl CustomError for toml::de::Error {
    fn custom(msg: impl std::fmt::Display) -> Self {
        <toml::de::Error as serde::de::Error>::custom(msg)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

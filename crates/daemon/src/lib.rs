// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! oj-ci-daemon: the long-running control process. Loads [`config::Config`],
//! drives every configured environment's pipeline through [`control_loop`],
//! serves operator edits and status queries over [`listener`], and
//! maintains an optional [`federation`] peer link — all framed over the
//! shared [`transport`] wire protocol and published through [`hub`].
//!
//! This crate is library-only; `oj` (the `cli` crate) is the binary that
//! wires it up and runs it.

pub mod config;
pub mod control_loop;
pub mod federation;
pub mod hub;
pub mod listener;
pub mod transport;

pub use config::{Config, ConfigError, EnvironmentConfig, IdFilter};
pub use control_loop::{ControlLoop, OperatorUpdate, PassSummary};
pub use hub::SnapshotHub;
pub use transport::Message;

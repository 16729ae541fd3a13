// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! wv-daemon: serves wavelets over a Unix socket
//!
//! The library half holds the wire protocol shared with the `wv` CLI,
//! plus the lifecycle and request handling used by the `wvd` binary.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod lifecycle;
pub mod protocol;
pub mod server;

pub use lifecycle::{Config, DaemonState, LifecycleError, StoreKind};
pub use protocol::{ProtocolError, Request, Response, PROTOCOL_VERSION};
pub use server::{ServerContext, ServerError};

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! wv-storage: append-only delta history for wavelets
//!
//! Backends implement [`DeltasAccess`] for a single wavelet and
//! [`DeltaStore`] for a collection of them. [`DeltaHistory`] layers the
//! contiguity and hash-chain rules on top of any backend.

mod access;
mod entry;
mod file;
mod history;
mod index;
mod memory;
mod traced;

#[cfg(test)]
mod testing;

pub use access::{DeltaStore, DeltasAccess, StoreError};
pub use file::{FileDeltaStore, FileDeltasAccess, DELTAS_EXTENSION};
pub use history::{DeltaHistory, HistoryError};
pub use memory::{MemoryDeltaStore, MemoryDeltasAccess};
pub use traced::{TracedDeltaStore, TracedDeltasAccess};

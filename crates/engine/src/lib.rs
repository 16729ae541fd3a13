// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! wv-engine: concurrency control for wavelets
//!
//! Every loaded wavelet is a [`WaveletContainer`] that serializes
//! submissions behind a single writer lock. The [`WaveletRegistry`] maps
//! wavelet names to containers and loads them from a delta store on demand.

mod concurrency;
mod config;
mod container;
mod error;
mod registry;

#[cfg(test)]
mod testing;

pub use concurrency::{ClientDeltaOutcome, ConcurrencyControl, Reopened};
pub use config::EngineConfig;
pub use container::{SubmitOutcome, WaveletContainer, WaveletStatus};
pub use error::{SubmitError, WaveletError};
pub use registry::WaveletRegistry;

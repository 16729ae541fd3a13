// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine tuning

use serde::{Deserialize, Serialize};
use std::time::Duration;
use wv_core::DEFAULT_HASH_BITS;

/// Engine settings, usually read from the daemon's `[engine]` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Bits of SHA-256 kept in each history hash
    pub hash_bits: u32,
    /// Upper bound on one submission, lock wait included
    #[serde(with = "humantime_serde")]
    pub submit_timeout: Duration,
    /// Committed deltas buffered per wavelet for slow subscribers
    pub broadcast_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hash_bits: DEFAULT_HASH_BITS,
            submit_timeout: Duration::from_secs(10),
            broadcast_capacity: 256,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

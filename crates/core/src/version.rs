// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hashed versions: points in a wavelet's history
//!
//! A `HashedVersion` pairs an operation count with a history hash. The hash
//! at version N>0 chains every prior delta, so two replicas agree on a
//! version only if they agree on the entire history leading up to it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Immutable (version, history hash) pair
///
/// Ordered by version number first, then by hash bytes.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HashedVersion {
    version: u64,
    #[serde(with = "hex_bytes")]
    history_hash: Vec<u8>,
}

impl HashedVersion {
    pub fn of(version: u64, history_hash: impl Into<Vec<u8>>) -> Self {
        Self {
            version,
            history_hash: history_hash.into(),
        }
    }

    /// Placeholder version carrying no hash
    ///
    /// Never equal to a signed version at the same number.
    pub fn unsigned(version: u64) -> Self {
        Self {
            version,
            history_hash: Vec::new(),
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn history_hash(&self) -> &[u8] {
        &self.history_hash
    }

    pub fn is_unsigned(&self) -> bool {
        self.history_hash.is_empty()
    }
}

impl fmt::Debug for HashedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for HashedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hash = hex_encode(&self.history_hash);
        write!(f, "{}:{}", self.version, &hash[..hash.len().min(16)])
    }
}

// Hex encoding helper
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Decode a lowercase or uppercase hex string
pub fn hex_decode(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 || !s.is_ascii() {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}

mod hex_bytes {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::hex_encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::hex_decode(&s).ok_or_else(|| de::Error::custom(format!("invalid hex: {s}")))
    }
}

#[cfg(test)]
#[path = "version_tests.rs"]
mod tests;

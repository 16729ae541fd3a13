// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Minting hashed versions
//!
//! Version zero is derived from the wavelet's canonical name alone. Every
//! later version hashes the previous hash together with the bytes of the
//! delta committed at it:
//!
//! ```text
//! hash(N + ops) = truncate(SHA-256(hash(N) ++ delta_bytes))
//! ```

use crate::id::WaveletName;
use crate::version::HashedVersion;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Default truncated hash length
pub const DEFAULT_HASH_BITS: u32 = 160;

/// Errors from minting versions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("hash length must be a multiple of 8 between 8 and 256 bits, got {0}")]
    InvalidHashBits(u32),
    #[error("a delta must apply at least one operation")]
    EmptyDelta,
    #[error("version overflow: {previous} + {ops}")]
    Overflow { previous: u64, ops: u32 },
    #[error("this factory can only create version zero")]
    Unsupported,
}

/// Derives hashed versions for a wavelet's history
pub trait HashedVersionFactory: Send + Sync {
    /// The first version of a brand-new wavelet
    fn create_version_zero(&self, name: &WaveletName) -> HashedVersion;

    /// The version reached by committing `delta_bytes` at `previous`
    fn create(
        &self,
        delta_bytes: &[u8],
        previous: &HashedVersion,
        ops_applied: u32,
    ) -> Result<HashedVersion, VersionError>;
}

fn version_zero(name: &WaveletName) -> HashedVersion {
    HashedVersion::of(0, name.to_uri().into_bytes())
}

/// Factory chaining truncated SHA-256 digests
#[derive(Clone, Debug)]
pub struct Sha256VersionFactory {
    hash_len: usize,
}

impl Sha256VersionFactory {
    pub fn new(hash_bits: u32) -> Result<Self, VersionError> {
        if hash_bits % 8 != 0 || !(8..=256).contains(&hash_bits) {
            return Err(VersionError::InvalidHashBits(hash_bits));
        }
        Ok(Self {
            hash_len: (hash_bits / 8) as usize,
        })
    }

    pub fn hash_bits(&self) -> u32 {
        (self.hash_len * 8) as u32
    }
}

impl Default for Sha256VersionFactory {
    fn default() -> Self {
        Self { hash_len: 20 }
    }
}

impl HashedVersionFactory for Sha256VersionFactory {
    fn create_version_zero(&self, name: &WaveletName) -> HashedVersion {
        version_zero(name)
    }

    fn create(
        &self,
        delta_bytes: &[u8],
        previous: &HashedVersion,
        ops_applied: u32,
    ) -> Result<HashedVersion, VersionError> {
        if ops_applied == 0 {
            return Err(VersionError::EmptyDelta);
        }
        let version = previous
            .version()
            .checked_add(u64::from(ops_applied))
            .ok_or(VersionError::Overflow {
                previous: previous.version(),
                ops: ops_applied,
            })?;

        let mut hasher = Sha256::new();
        hasher.update(previous.history_hash());
        hasher.update(delta_bytes);
        let digest = hasher.finalize();

        Ok(HashedVersion::of(version, &digest[..self.hash_len]))
    }
}

/// Factory for contexts that never mint versions past zero
///
/// Carries no digest state; every `create` call fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct VersionZeroFactory;

impl HashedVersionFactory for VersionZeroFactory {
    fn create_version_zero(&self, name: &WaveletName) -> HashedVersion {
        version_zero(name)
    }

    fn create(
        &self,
        _delta_bytes: &[u8],
        _previous: &HashedVersion,
        _ops_applied: u32,
    ) -> Result<HashedVersion, VersionError> {
        Err(VersionError::Unsupported)
    }
}

#[cfg(test)]
#[path = "version_factory_tests.rs"]
mod tests;

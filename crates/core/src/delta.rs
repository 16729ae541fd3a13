// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deltas: batches of operations by one author
//!
//! ```text
//! WaveletDelta ──rebase──▶ WaveletDelta @ current ──commit──▶ DeltaRecord
//!  (proposal at              (ready to append)          (applied_at + TransformedWaveletDelta)
//!   target version)
//! ```

use crate::id::ParticipantId;
use crate::operation::WaveletOperation;
use crate::version::HashedVersion;
use crate::version_factory::{HashedVersionFactory, VersionError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from building or hashing deltas
#[derive(Debug, Error)]
pub enum DeltaError {
    #[error("encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("version error: {0}")]
    Version(#[from] VersionError),
    #[error("delta has {0} operations, more than a single delta may carry")]
    TooLarge(usize),
}

/// A proposed, not yet applied, change anchored at the version its author saw
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveletDelta {
    author: ParticipantId,
    target_version: HashedVersion,
    ops: Vec<WaveletOperation>,
}

impl WaveletDelta {
    pub fn new(
        author: ParticipantId,
        target_version: HashedVersion,
        ops: Vec<WaveletOperation>,
    ) -> Self {
        Self {
            author,
            target_version,
            ops,
        }
    }

    pub fn author(&self) -> &ParticipantId {
        &self.author
    }

    pub fn target_version(&self) -> &HashedVersion {
        &self.target_version
    }

    pub fn ops(&self) -> &[WaveletOperation] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// The same author's delta, re-expressed at a later version
    pub fn rebased(self, ops: Vec<WaveletOperation>, target_version: HashedVersion) -> Self {
        Self {
            author: self.author,
            target_version,
            ops,
        }
    }

    /// Deterministic serialization fed to the version factory
    pub fn to_canonical_bytes(&self) -> Result<Vec<u8>, DeltaError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Number of operations as a version increment
    pub fn ops_count(&self) -> Result<u32, DeltaError> {
        u32::try_from(self.ops.len()).map_err(|_| DeltaError::TooLarge(self.ops.len()))
    }
}

/// A delta reconciled against all prior history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformedWaveletDelta {
    author: ParticipantId,
    resulting_version: HashedVersion,
    application_timestamp: i64,
    ops: Vec<WaveletOperation>,
}

impl TransformedWaveletDelta {
    pub fn new(
        author: ParticipantId,
        resulting_version: HashedVersion,
        application_timestamp: i64,
        ops: Vec<WaveletOperation>,
    ) -> Self {
        Self {
            author,
            resulting_version,
            application_timestamp,
            ops,
        }
    }

    pub fn author(&self) -> &ParticipantId {
        &self.author
    }

    pub fn resulting_version(&self) -> &HashedVersion {
        &self.resulting_version
    }

    pub fn application_timestamp(&self) -> i64 {
        self.application_timestamp
    }

    pub fn ops(&self) -> &[WaveletOperation] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Version number the delta was applied at
    pub fn applied_at_version(&self) -> u64 {
        self.resulting_version
            .version()
            .saturating_sub(self.ops.len() as u64)
    }
}

/// A committed history entry
///
/// Indexed both by `applied_at` (where the delta starts) and by the
/// transformed delta's resulting version (where it ends).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaRecord {
    applied_at: HashedVersion,
    transformed: TransformedWaveletDelta,
}

impl DeltaRecord {
    pub fn new(applied_at: HashedVersion, transformed: TransformedWaveletDelta) -> Self {
        Self {
            applied_at,
            transformed,
        }
    }

    /// Mint the resulting version for a fully rebased delta and wrap it as a record
    pub fn commit(
        delta: WaveletDelta,
        factory: &dyn HashedVersionFactory,
        application_timestamp: i64,
    ) -> Result<Self, DeltaError> {
        let bytes = delta.to_canonical_bytes()?;
        let resulting = factory.create(&bytes, &delta.target_version, delta.ops_count()?)?;
        let WaveletDelta {
            author,
            target_version,
            ops,
        } = delta;
        Ok(Self {
            applied_at: target_version,
            transformed: TransformedWaveletDelta::new(
                author,
                resulting,
                application_timestamp,
                ops,
            ),
        })
    }

    pub fn applied_at(&self) -> &HashedVersion {
        &self.applied_at
    }

    pub fn resulting_version(&self) -> &HashedVersion {
        self.transformed.resulting_version()
    }

    pub fn transformed(&self) -> &TransformedWaveletDelta {
        &self.transformed
    }

    pub fn author(&self) -> &ParticipantId {
        self.transformed.author()
    }

    pub fn ops(&self) -> &[WaveletOperation] {
        self.transformed.ops()
    }

    /// True if the version numbers add up: start + ops == end
    pub fn is_well_formed(&self) -> bool {
        !self.transformed.is_empty()
            && self.applied_at.version().checked_add(self.transformed.len() as u64)
                == Some(self.resulting_version().version())
    }

    /// The delta exactly as it was committed at `applied_at`
    pub fn committed_delta(&self) -> WaveletDelta {
        WaveletDelta::new(
            self.transformed.author().clone(),
            self.applied_at.clone(),
            self.transformed.ops().to_vec(),
        )
    }

    /// Recompute the resulting version from the committed bytes
    pub fn recompute_resulting_version(
        &self,
        factory: &dyn HashedVersionFactory,
    ) -> Result<HashedVersion, DeltaError> {
        let delta = self.committed_delta();
        let bytes = delta.to_canonical_bytes()?;
        Ok(factory.create(&bytes, &self.applied_at, delta.ops_count()?)?)
    }
}

#[cfg(test)]
#[path = "delta_tests.rs"]
mod tests;

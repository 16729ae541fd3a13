// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Delta history of one wavelet
//!
//! Wraps a backend with the rules every history obeys: the first delta
//! starts at the wavelet's version zero and each later delta starts
//! exactly (version and hash) where the previous one ended.

use crate::access::{DeltasAccess, StoreError};
use std::sync::Arc;
use thiserror::Error;
use wv_core::{DeltaError, DeltaRecord, HashedVersion, HashedVersionFactory, WaveletName};

/// History invariant violations and backend failures
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("delta applied at {found} does not follow history end {expected}")]
    Discontiguous {
        expected: HashedVersion,
        found: HashedVersion,
    },
    #[error("no delta starts at version {0}")]
    MissingRecord(u64),
    #[error("version {0} is not a delta boundary")]
    NotBoundary(u64),
    #[error("version {version} is beyond the end of history at {end}")]
    BeyondEnd { version: u64, end: u64 },
    #[error("hash chain broken at version {version}: recorded {recorded}, recomputed {recomputed}")]
    HashMismatch {
        version: u64,
        recorded: HashedVersion,
        recomputed: HashedVersion,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Delta(#[from] DeltaError),
}

/// Append-only, contiguous delta log of one wavelet
pub struct DeltaHistory {
    access: Box<dyn DeltasAccess>,
    version_zero: HashedVersion,
}

impl DeltaHistory {
    pub fn new(access: Box<dyn DeltasAccess>, factory: &dyn HashedVersionFactory) -> Self {
        let version_zero = factory.create_version_zero(access.wavelet_name());
        Self {
            access,
            version_zero,
        }
    }

    pub fn wavelet_name(&self) -> &WaveletName {
        self.access.wavelet_name()
    }

    pub fn version_zero(&self) -> &HashedVersion {
        &self.version_zero
    }

    pub fn is_empty(&self) -> bool {
        self.access.is_empty()
    }

    /// Version after the last delta, or version zero when empty
    pub fn end_version(&self) -> HashedVersion {
        self.access
            .end_version()
            .unwrap_or_else(|| self.version_zero.clone())
    }

    /// Version number after the last delta
    pub fn current_version(&self) -> u64 {
        self.access.end_version().map_or(0, |v| v.version())
    }

    /// Append records, each of which must start where the previous ended
    ///
    /// The whole batch is rejected if any record breaks the chain.
    pub fn append(&mut self, records: Vec<DeltaRecord>) -> Result<(), HistoryError> {
        let mut end = self.end_version();
        for record in &records {
            if record.applied_at() != &end || !record.is_well_formed() {
                return Err(HistoryError::Discontiguous {
                    expected: end,
                    found: record.applied_at().clone(),
                });
            }
            end = record.resulting_version().clone();
        }
        self.access.append(records)?;
        Ok(())
    }

    pub fn get_delta_starting_at(
        &self,
        version: u64,
    ) -> Result<Option<Arc<DeltaRecord>>, HistoryError> {
        Ok(self.access.get_delta(version)?)
    }

    pub fn get_delta_ending_at(
        &self,
        version: u64,
    ) -> Result<Option<Arc<DeltaRecord>>, HistoryError> {
        Ok(self.access.get_delta_by_end_version(version)?)
    }

    /// True iff some delta ends at exactly this version and hash
    pub fn has_signature(&self, signature: &HashedVersion) -> Result<bool, HistoryError> {
        Ok(self
            .get_delta_ending_at(signature.version())?
            .is_some_and(|r| r.resulting_version() == signature))
    }

    /// Hashed version at a delta boundary
    pub fn hashed_version_at(&self, version: u64) -> Result<HashedVersion, HistoryError> {
        if version == 0 {
            return Ok(self.version_zero.clone());
        }
        if let Some(record) = self.get_delta_ending_at(version)? {
            return Ok(record.resulting_version().clone());
        }
        let end = self.current_version();
        if version > end {
            Err(HistoryError::BeyondEnd { version, end })
        } else {
            Err(HistoryError::NotBoundary(version))
        }
    }

    /// Deltas covering `start..end`; both must be delta boundaries
    pub fn deltas_between(
        &self,
        start: u64,
        end: u64,
    ) -> Result<Vec<Arc<DeltaRecord>>, HistoryError> {
        let current = self.current_version();
        if end > current {
            return Err(HistoryError::BeyondEnd { version: end, end: current });
        }
        if start > end {
            return Err(HistoryError::BeyondEnd { version: start, end });
        }

        let mut records = Vec::new();
        let mut version = start;
        while version < end {
            let record = match self.get_delta_starting_at(version)? {
                Some(record) => record,
                None if version == start => return Err(HistoryError::NotBoundary(start)),
                None => return Err(HistoryError::MissingRecord(version)),
            };
            version = record.resulting_version().version();
            records.push(record);
        }
        if version != end {
            return Err(HistoryError::NotBoundary(end));
        }
        Ok(records)
    }

    /// Recompute the hash chain from version zero
    ///
    /// Returns the number of deltas checked, or the first break found.
    pub fn verify(&self, factory: &dyn HashedVersionFactory) -> Result<usize, HistoryError> {
        let mut expected = self.version_zero.clone();
        let records = self.deltas_between(0, self.current_version())?;
        for record in &records {
            if record.applied_at() != &expected {
                return Err(HistoryError::Discontiguous {
                    expected,
                    found: record.applied_at().clone(),
                });
            }
            let recomputed = record.recompute_resulting_version(factory)?;
            if &recomputed != record.resulting_version() {
                return Err(HistoryError::HashMismatch {
                    version: record.resulting_version().version(),
                    recorded: record.resulting_version().clone(),
                    recomputed,
                });
            }
            expected = recomputed;
        }
        Ok(records.len())
    }

    pub fn close(&mut self) -> Result<(), HistoryError> {
        Ok(self.access.close()?)
    }
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Backend contracts

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use wv_core::{DeltaRecord, HashedVersion, WaveletName};

/// Errors from delta storage backends
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("corrupted delta log {} at line {line}: {reason}", path.display())]
    Corrupted {
        path: PathBuf,
        line: u64,
        reason: String,
    },
    #[error("append starts at version {found} but history ends at {expected}")]
    Discontiguous { expected: u64, found: u64 },
    #[error("append starts at {found} but history ends at {expected}")]
    HashMismatch {
        expected: HashedVersion,
        found: HashedVersion,
    },
    #[error("record applied at {applied_at} cannot end at {resulting}")]
    Malformed {
        applied_at: HashedVersion,
        resulting: HashedVersion,
    },
    #[error("delta log {} is open elsewhere", .0.display())]
    InUse(PathBuf),
    #[error("delta access for {0} is closed")]
    Closed(WaveletName),
}

/// Append-only, version-indexed delta log of one wavelet
///
/// Lookups are by version number; the start of the first record is
/// version 0 and every later record starts where the previous one ended.
pub trait DeltasAccess: Send + Sync {
    fn wavelet_name(&self) -> &WaveletName;

    fn is_empty(&self) -> bool;

    /// Resulting version of the last record, `None` when empty
    fn end_version(&self) -> Option<HashedVersion>;

    /// Record that starts at `version`
    fn get_delta(&self, version: u64) -> Result<Option<Arc<DeltaRecord>>, StoreError>;

    /// Record that ends at `version`
    fn get_delta_by_end_version(&self, version: u64)
        -> Result<Option<Arc<DeltaRecord>>, StoreError>;

    /// Durably append records; on error nothing is appended
    fn append(&mut self, records: Vec<DeltaRecord>) -> Result<(), StoreError>;

    fn close(&mut self) -> Result<(), StoreError>;
}

impl<A: DeltasAccess + ?Sized> DeltasAccess for Box<A> {
    fn wavelet_name(&self) -> &WaveletName {
        (**self).wavelet_name()
    }

    fn is_empty(&self) -> bool {
        (**self).is_empty()
    }

    fn end_version(&self) -> Option<HashedVersion> {
        (**self).end_version()
    }

    fn get_delta(&self, version: u64) -> Result<Option<Arc<DeltaRecord>>, StoreError> {
        (**self).get_delta(version)
    }

    fn get_delta_by_end_version(
        &self,
        version: u64,
    ) -> Result<Option<Arc<DeltaRecord>>, StoreError> {
        (**self).get_delta_by_end_version(version)
    }

    fn append(&mut self, records: Vec<DeltaRecord>) -> Result<(), StoreError> {
        (**self).append(records)
    }

    fn close(&mut self) -> Result<(), StoreError> {
        (**self).close()
    }
}

/// A collection of wavelet delta logs
pub trait DeltaStore: Send + Sync {
    /// Open (creating if needed) the log of one wavelet
    fn open(&self, name: &WaveletName) -> Result<Box<dyn DeltasAccess>, StoreError>;

    /// Remove a wavelet's log; removing an unknown wavelet is not an error
    fn delete(&self, name: &WaveletName) -> Result<(), StoreError>;

    /// Every wavelet that has a log, sorted
    fn list_wavelets(&self) -> Result<Vec<WaveletName>, StoreError>;
}

impl<S: DeltaStore + ?Sized> DeltaStore for Arc<S> {
    fn open(&self, name: &WaveletName) -> Result<Box<dyn DeltasAccess>, StoreError> {
        (**self).open(name)
    }

    fn delete(&self, name: &WaveletName) -> Result<(), StoreError> {
        (**self).delete(name)
    }

    fn list_wavelets(&self) -> Result<Vec<WaveletName>, StoreError> {
        (**self).list_wavelets()
    }
}

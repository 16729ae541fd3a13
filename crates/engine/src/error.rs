// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine

use std::time::Duration;
use thiserror::Error;
use wv_core::{ApplyError, DeltaError, HashedVersion, TransformError, WaveletName};
use wv_storage::{HistoryError, StoreError};

/// Errors loading or reading a wavelet
#[derive(Debug, Error)]
pub enum WaveletError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("history error: {0}")]
    History(#[from] HistoryError),
    #[error("replaying delta at version {version} failed: {source}")]
    Replay {
        version: u64,
        #[source]
        source: ApplyError,
    },
    #[error("wavelet {0} is closed")]
    Closed(WaveletName),
    #[error("wavelet {name} is read-only: {reason}")]
    Corrupted { name: WaveletName, reason: String },
}

/// Why a submission was not committed
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Target version is newer than anything the server has committed
    #[error("client targets version {target} but history ends at {current}")]
    ClientAhead { target: u64, current: u64 },
    /// Target version is not a point in this wavelet's history
    #[error("target version {0} is not in this wavelet's history")]
    InvalidHash(HashedVersion),
    #[error("delta has no operations")]
    EmptyDelta,
    /// Structural conflict with a concurrent delta; recompute and resubmit
    #[error(transparent)]
    Transform(#[from] TransformError),
    /// The rebased delta does not apply to the current wavelet
    #[error("delta does not apply: {0}")]
    Invalid(#[from] ApplyError),
    #[error("cannot commit delta: {0}")]
    Commit(#[from] DeltaError),
    /// Durable append failed; nothing was committed
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    /// History is inconsistent; the wavelet is now read-only
    #[error("internal consistency violation in {name}: {reason}")]
    Internal { name: WaveletName, reason: String },
    #[error(transparent)]
    Wavelet(#[from] WaveletError),
    #[error("submit to {name} timed out after {timeout:?}")]
    Timeout { name: WaveletName, timeout: Duration },
}

impl SubmitError {
    /// True if the submitter can fix the delta and resubmit
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SubmitError::ClientAhead { .. }
                | SubmitError::InvalidHash(_)
                | SubmitError::EmptyDelta
                | SubmitError::Transform(_)
                | SubmitError::Invalid(_)
        )
    }
}

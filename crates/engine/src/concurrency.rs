// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rebasing client deltas onto committed history
//!
//! ```text
//! client delta @ v2 ──transform(v2→v3)──transform(v3→v5)──▶ delta @ v5 (current)
//! ```
//!
//! Callers must hold the wavelet's writer lock from `on_client_delta`
//! until the rebased delta is appended, so the history cannot move
//! underneath the rebase.

use crate::error::SubmitError;
use std::sync::Arc;
use wv_core::{
    transform_delta, DeltaRecord, DeltaTransformError, HashedVersion, TransformedWaveletDelta,
    WaveletDelta,
};
use wv_storage::{DeltaHistory, HistoryError};

/// Result of rebasing a client delta
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientDeltaOutcome {
    /// Targeted at the current version, ready to commit
    Rebased(WaveletDelta),
    /// The same author already committed these ops; nothing to append
    Duplicate(Arc<DeltaRecord>),
}

/// Catch-up data for a reconnecting client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reopened {
    /// The newest client signature the server recognized
    pub start_signature: HashedVersion,
    /// Every delta committed after it, in order
    pub deltas: Vec<TransformedWaveletDelta>,
}

/// Concurrency control over one wavelet's history
pub struct ConcurrencyControl<'a> {
    history: &'a DeltaHistory,
}

impl<'a> ConcurrencyControl<'a> {
    pub fn new(history: &'a DeltaHistory) -> Self {
        Self { history }
    }

    /// Rebase `delta` over every delta committed since its target version
    pub fn on_client_delta(&self, delta: WaveletDelta) -> Result<ClientDeltaOutcome, SubmitError> {
        let current = self.history.end_version();
        let target = delta.target_version();

        if target.version() > current.version() {
            return Err(SubmitError::ClientAhead {
                target: target.version(),
                current: current.version(),
            });
        }
        if !self.is_known(target).map_err(|e| self.history_error(e))? {
            return Err(SubmitError::InvalidHash(target.clone()));
        }

        let mut delta = delta;
        while delta.target_version().version() < current.version() {
            let version = delta.target_version().version();
            let record = self
                .history
                .get_delta_starting_at(version)
                .map_err(|e| self.history_error(e))?
                .ok_or_else(|| self.internal(format!("no delta starts at version {}", version)))?;

            if record.author() == delta.author() && record.ops() == delta.ops() {
                tracing::debug!(
                    wavelet = %self.history.wavelet_name(),
                    version,
                    "duplicate delta, returning committed record"
                );
                return Ok(ClientDeltaOutcome::Duplicate(record));
            }

            delta = match transform_delta(delta, &record) {
                Ok((rebased, _)) => rebased,
                Err(DeltaTransformError::Conflict(e)) => return Err(e.into()),
                Err(e @ DeltaTransformError::NotConcurrent { .. }) => {
                    return Err(self.internal(e.to_string()))
                }
            };
        }

        if delta.target_version() != &current {
            return Err(self.internal(format!(
                "rebased delta targets {} but history ends at {}",
                delta.target_version(),
                current
            )));
        }
        Ok(ClientDeltaOutcome::Rebased(delta))
    }

    /// Find the newest recognized signature and the deltas after it
    ///
    /// Scans `known` from the end. `None` means no signature matched and
    /// the client must resynchronize from a snapshot.
    pub fn reopen(&self, known: &[HashedVersion]) -> Result<Option<Reopened>, HistoryError> {
        for signature in known.iter().rev() {
            if !self.is_known(signature)? {
                continue;
            }
            let deltas = self
                .history
                .deltas_between(signature.version(), self.history.current_version())?
                .iter()
                .map(|r| r.transformed().clone())
                .collect();
            return Ok(Some(Reopened {
                start_signature: signature.clone(),
                deltas,
            }));
        }
        Ok(None)
    }

    /// True if `version` is version zero or the exact end of a committed delta
    fn is_known(&self, version: &HashedVersion) -> Result<bool, HistoryError> {
        if version.version() == 0 {
            return Ok(version == self.history.version_zero());
        }
        self.history.has_signature(version)
    }

    fn internal(&self, reason: String) -> SubmitError {
        SubmitError::Internal {
            name: self.history.wavelet_name().clone(),
            reason,
        }
    }

    fn history_error(&self, e: HistoryError) -> SubmitError {
        match e {
            HistoryError::Store(e) => SubmitError::Store(e),
            e => self.internal(e.to_string()),
        }
    }
}

#[cfg(test)]
#[path = "concurrency_tests.rs"]
mod tests;

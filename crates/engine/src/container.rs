// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One loaded wavelet: history, snapshot and live subscribers
//!
//! Submissions take the writer lock; reopen and history queries share
//! the reader lock. Once the writer lock is held, a submission runs to
//! completion without yielding, so dropping the future (on timeout)
//! either happens before anything changed or not at all.

use crate::concurrency::{ClientDeltaOutcome, ConcurrencyControl, Reopened};
use crate::config::EngineConfig;
use crate::error::{SubmitError, WaveletError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use wv_core::{
    Clock, DeltaRecord, HashedVersion, HashedVersionFactory, WaveletData, WaveletDelta,
    WaveletName,
};
use wv_storage::{DeltaHistory, DeltasAccess, HistoryError};

/// Result of a successful submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub record: Arc<DeltaRecord>,
    /// The delta had already been committed; nothing new was appended
    pub duplicate: bool,
}

/// Summary of a loaded wavelet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveletStatus {
    pub name: WaveletName,
    pub version: HashedVersion,
    pub participants: usize,
    pub documents: usize,
    /// Set when the wavelet went read-only after an internal error
    pub corrupted: Option<String>,
}

struct WaveletState {
    history: DeltaHistory,
    snapshot: WaveletData,
    corrupted: Option<String>,
    closed: bool,
}

impl WaveletState {
    fn check_writable(&self) -> Result<(), WaveletError> {
        if self.closed {
            return Err(WaveletError::Closed(self.snapshot.name().clone()));
        }
        match &self.corrupted {
            Some(reason) => Err(WaveletError::Corrupted {
                name: self.snapshot.name().clone(),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// A wavelet loaded into memory
pub struct WaveletContainer<C: Clock> {
    name: WaveletName,
    state: RwLock<WaveletState>,
    factory: Arc<dyn HashedVersionFactory>,
    clock: C,
    updates: broadcast::Sender<Arc<DeltaRecord>>,
}

impl<C: Clock> WaveletContainer<C> {
    /// Load a wavelet by replaying its whole history into a snapshot
    pub fn load(
        access: Box<dyn DeltasAccess>,
        factory: Arc<dyn HashedVersionFactory>,
        clock: C,
        config: &EngineConfig,
    ) -> Result<Self, WaveletError> {
        let history = DeltaHistory::new(access, factory.as_ref());
        let name = history.wavelet_name().clone();
        let mut snapshot = WaveletData::new(name.clone(), history.version_zero().clone());

        let records = history.deltas_between(0, history.current_version())?;
        for record in &records {
            snapshot
                .apply_delta(record.transformed())
                .map_err(|source| WaveletError::Replay {
                    version: record.applied_at().version(),
                    source,
                })?;
        }

        tracing::info!(
            wavelet = %name,
            deltas = records.len(),
            version = snapshot.version().version(),
            "loaded wavelet"
        );

        let (updates, _) = broadcast::channel(config.broadcast_capacity.max(1));
        Ok(Self {
            name,
            state: RwLock::new(WaveletState {
                history,
                snapshot,
                corrupted: None,
                closed: false,
            }),
            factory,
            clock,
            updates,
        })
    }

    pub fn name(&self) -> &WaveletName {
        &self.name
    }

    /// Receive every delta committed from now on
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DeltaRecord>> {
        self.updates.subscribe()
    }

    /// Rebase, commit, persist and publish a client delta
    pub async fn submit(&self, delta: WaveletDelta) -> Result<SubmitOutcome, SubmitError> {
        let mut state = self.state.write().await;
        state.check_writable()?;

        match self.submit_locked(&mut state, delta) {
            Err(SubmitError::Internal { name, reason }) => {
                tracing::error!(wavelet = %name, %reason, "wavelet is now read-only");
                state.corrupted = Some(reason.clone());
                Err(SubmitError::Internal { name, reason })
            }
            result => result,
        }
    }

    fn submit_locked(
        &self,
        state: &mut WaveletState,
        delta: WaveletDelta,
    ) -> Result<SubmitOutcome, SubmitError> {
        if delta.is_empty() {
            return Err(SubmitError::EmptyDelta);
        }
        let author = delta.author().clone();
        let target = delta.target_version().version();

        let rebased = match ConcurrencyControl::new(&state.history).on_client_delta(delta)? {
            ClientDeltaOutcome::Rebased(rebased) => rebased,
            ClientDeltaOutcome::Duplicate(record) => {
                return Ok(SubmitOutcome {
                    record,
                    duplicate: true,
                })
            }
        };

        let record = DeltaRecord::commit(rebased, self.factory.as_ref(), self.clock.now_millis())?;

        let mut snapshot = state.snapshot.clone();
        snapshot.apply_delta(record.transformed())?;

        state
            .history
            .append(vec![record.clone()])
            .map_err(|e| match e {
                HistoryError::Store(e) => SubmitError::Store(e),
                e => SubmitError::Internal {
                    name: self.name.clone(),
                    reason: e.to_string(),
                },
            })?;
        state.snapshot = snapshot;

        tracing::info!(
            wavelet = %self.name,
            %author,
            target,
            applied_at = record.applied_at().version(),
            version = %record.resulting_version(),
            ops = record.ops().len(),
            "committed delta"
        );

        let record = Arc::new(record);
        // No receivers is fine
        let _ = self.updates.send(record.clone());

        Ok(SubmitOutcome {
            record,
            duplicate: false,
        })
    }

    /// Catch-up deltas for a reconnecting client
    pub async fn reopen(&self, known: &[HashedVersion]) -> Result<Option<Reopened>, WaveletError> {
        let state = self.state.read().await;
        Ok(ConcurrencyControl::new(&state.history).reopen(known)?)
    }

    /// Committed records from `start` to `end` (default: current version)
    pub async fn history(
        &self,
        start: u64,
        end: Option<u64>,
    ) -> Result<Vec<Arc<DeltaRecord>>, WaveletError> {
        let state = self.state.read().await;
        let end = end.unwrap_or_else(|| state.history.current_version());
        Ok(state.history.deltas_between(start, end)?)
    }

    pub async fn end_version(&self) -> HashedVersion {
        self.state.read().await.history.end_version()
    }

    pub async fn snapshot(&self) -> WaveletData {
        self.state.read().await.snapshot.clone()
    }

    pub async fn status(&self) -> WaveletStatus {
        let state = self.state.read().await;
        WaveletStatus {
            name: self.name.clone(),
            version: state.snapshot.version().clone(),
            participants: state.snapshot.participants().len(),
            documents: state.snapshot.documents().len(),
            corrupted: state.corrupted.clone(),
        }
    }

    /// Recompute the hash chain of the loaded history
    pub async fn verify(&self) -> Result<usize, WaveletError> {
        let state = self.state.read().await;
        Ok(state.history.verify(self.factory.as_ref())?)
    }

    pub async fn is_closed(&self) -> bool {
        self.state.read().await.closed
    }

    /// Flush and release the backing log, waiting for in-flight submissions
    pub async fn close(&self) -> Result<(), WaveletError> {
        let mut state = self.state.write().await;
        if !state.closed {
            state.closed = true;
            state.history.close()?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "container_tests.rs"]
mod tests;

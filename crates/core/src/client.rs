// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client-side concurrency control
//!
//! A client keeps at most one delta in flight. Local edits made while it
//! waits are queued, and every server delta is transformed past the
//! in-flight delta and then the queue before it is applied locally.
//!
//! ```text
//! on_client_ops ──▶ queue ──take_outgoing──▶ in flight ──on_success──▶ acked path
//!                     ▲                          │
//!                     └──── on_reopen (lost) ◀───┘
//! ```
//!
//! The acked path holds deltas the server acknowledged since the last
//! server delta arrived. Its signatures are the versions a reconnecting
//! client offers to `reopen`.

use crate::delta::{TransformedWaveletDelta, WaveletDelta};
use crate::id::ParticipantId;
use crate::operation::WaveletOperation;
use crate::transform::{transform_ops, OperationConflict};
use crate::version::HashedVersion;
use thiserror::Error;

/// Failures of client-side concurrency control
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("acknowledgement received with no delta in flight")]
    NothingInFlight,
    #[error("acknowledged version {acked} does not end the in-flight delta at {expected}")]
    AckMismatch { expected: u64, acked: u64 },
    #[error("server delta applied at {applied_at} but the client is at {expected}")]
    OutOfOrder { expected: u64, applied_at: u64 },
    #[error("server does not recognize any client signature; it reopened at {0}")]
    UnknownSignature(HashedVersion),
    #[error("local op {client_index} conflicts with server op {server_index}: {conflict}")]
    Conflict {
        client_index: usize,
        server_index: usize,
        conflict: OperationConflict,
    },
}

#[derive(Debug, Clone)]
struct AckedDelta {
    delta: WaveletDelta,
    acked: HashedVersion,
}

/// One client's view of a wavelet's pending work
#[derive(Debug, Clone)]
pub struct ClientConcurrencyControl {
    author: ParticipantId,
    start_signature: HashedVersion,
    acked: Vec<AckedDelta>,
    in_flight: Option<WaveletDelta>,
    queue: Vec<WaveletOperation>,
}

impl ClientConcurrencyControl {
    pub fn new(author: ParticipantId, start_signature: HashedVersion) -> Self {
        Self {
            author,
            start_signature,
            acked: Vec::new(),
            in_flight: None,
            queue: Vec::new(),
        }
    }

    pub fn author(&self) -> &ParticipantId {
        &self.author
    }

    /// The newest version this client knows the server holds
    pub fn version(&self) -> &HashedVersion {
        self.acked
            .last()
            .map(|d| &d.acked)
            .unwrap_or(&self.start_signature)
    }

    pub fn in_flight(&self) -> Option<&WaveletDelta> {
        self.in_flight.as_ref()
    }

    pub fn queued(&self) -> &[WaveletOperation] {
        &self.queue
    }

    /// True while any local op is unacknowledged
    pub fn has_pending(&self) -> bool {
        self.in_flight.is_some() || !self.queue.is_empty()
    }

    /// Queue ops the client has already applied locally
    pub fn on_client_ops(&mut self, ops: impl IntoIterator<Item = WaveletOperation>) {
        self.queue.extend(ops);
    }

    /// The next delta to send, if nothing is in flight and ops are queued
    pub fn take_outgoing(&mut self) -> Option<WaveletDelta> {
        if self.in_flight.is_some() || self.queue.is_empty() {
            return None;
        }
        let delta = WaveletDelta::new(
            self.author.clone(),
            self.version().clone(),
            std::mem::take(&mut self.queue),
        );
        self.in_flight = Some(delta.clone());
        Some(delta)
    }

    /// The server committed the in-flight delta, ending at `resulting`
    ///
    /// Server deltas committed before it must already have been passed to
    /// [`on_server_delta`](Self::on_server_delta).
    pub fn on_success(&mut self, resulting: HashedVersion) -> Result<(), ClientError> {
        let delta = self.in_flight.take().ok_or(ClientError::NothingInFlight)?;
        let expected = delta
            .target_version()
            .version()
            .saturating_add(delta.len() as u64);
        if resulting.version() != expected {
            self.in_flight = Some(delta);
            return Err(ClientError::AckMismatch {
                expected,
                acked: resulting.version(),
            });
        }
        self.acked.push(AckedDelta {
            delta,
            acked: resulting,
        });
        Ok(())
    }

    /// Accept a delta committed by someone else
    ///
    /// Returns the ops to apply to the local document, which already
    /// reflects every in-flight and queued op. A delta identical to the
    /// in-flight one is this client's own echoed back and counts as its
    /// acknowledgement.
    pub fn on_server_delta(
        &mut self,
        delta: &TransformedWaveletDelta,
    ) -> Result<Vec<WaveletOperation>, ClientError> {
        let expected = self.version().version();
        if delta.applied_at_version() != expected {
            return Err(ClientError::OutOfOrder {
                expected,
                applied_at: delta.applied_at_version(),
            });
        }

        if self.is_echo(delta) {
            self.on_success(delta.resulting_version().clone())?;
            return Ok(Vec::new());
        }

        let (in_flight_ops, server_ops) = match &self.in_flight {
            Some(in_flight) => {
                let (ops, server_ops) = transform(in_flight.ops(), delta.ops())?;
                (Some(ops), server_ops)
            }
            None => (None, delta.ops().to_vec()),
        };
        let (queue, server_ops) = transform(&self.queue, &server_ops)?;

        // Acked deltas cannot be recovered past a foreign delta
        self.acked.clear();
        self.start_signature = delta.resulting_version().clone();
        if let (Some(in_flight), Some(ops)) = (self.in_flight.take(), in_flight_ops) {
            self.in_flight = Some(in_flight.rebased(ops, self.start_signature.clone()));
        }
        self.queue = queue;
        Ok(server_ops)
    }

    /// Signatures to offer the server when reconnecting, oldest first
    pub fn reconnection_versions(&self) -> Vec<HashedVersion> {
        std::iter::once(&self.start_signature)
            .chain(self.acked.iter().map(|d| &d.acked))
            .cloned()
            .collect()
    }

    /// Resume after the server reopened at `start_signature`
    ///
    /// Acked deltas past the recognized signature were lost by the server
    /// and go back to the head of the queue. The in-flight delta survives
    /// only if the catch-up `deltas` echo it; otherwise it is queued for
    /// resending. Returns the ops to apply locally.
    pub fn on_reopen(
        &mut self,
        start_signature: &HashedVersion,
        deltas: &[TransformedWaveletDelta],
    ) -> Result<Vec<WaveletOperation>, ClientError> {
        let matched = if &self.start_signature == start_signature {
            0
        } else {
            self.acked
                .iter()
                .position(|d| &d.acked == start_signature)
                .map(|i| i + 1)
                .ok_or_else(|| ClientError::UnknownSignature(start_signature.clone()))?
        };

        if matched < self.acked.len() {
            let lost = self.acked.split_off(matched);
            self.requeue(lost.into_iter().map(|d| d.delta));
        }

        let mut local = Vec::new();
        for delta in deltas {
            local.extend(self.on_server_delta(delta)?);
        }
        // Caught up without seeing it: the server never committed it
        self.requeue(std::iter::empty());
        Ok(local)
    }

    fn is_echo(&self, delta: &TransformedWaveletDelta) -> bool {
        self.in_flight.as_ref().is_some_and(|in_flight| {
            in_flight.author() == delta.author() && in_flight.ops() == delta.ops()
        })
    }

    /// Put `lost` deltas and the in-flight delta back ahead of queued ops
    fn requeue(&mut self, lost: impl Iterator<Item = WaveletDelta>) {
        let mut ops: Vec<WaveletOperation> = lost.flat_map(|d| d.ops().to_vec()).collect();
        if let Some(in_flight) = self.in_flight.take() {
            ops.extend_from_slice(in_flight.ops());
        }
        ops.append(&mut self.queue);
        self.queue = ops;
    }
}

fn transform(
    client: &[WaveletOperation],
    server: &[WaveletOperation],
) -> Result<(Vec<WaveletOperation>, Vec<WaveletOperation>), ClientError> {
    let pair = transform_ops(client, server).map_err(|c| ClientError::Conflict {
        client_index: c.client_index,
        server_index: c.server_index,
        conflict: c.conflict,
    })?;
    Ok((pair.client, pair.server))
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;

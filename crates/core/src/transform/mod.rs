// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operational transform
//!
//! Given a client delta and a server delta that both start at the same
//! version, produce `(client', server')` such that applying
//! `server` then `client'` and applying `client` then `server'` yield the
//! same wavelet.
//!
//! ## Tie-break policy
//!
//! The delta already in history (the server side) always wins:
//!
//! - Concurrent inserts at one position place the server's text first.
//! - Deleting text the server already deleted becomes a no-op.
//! - Adding (or removing) a participant the server also added (or removed)
//!   becomes a `NoOp` on both sides.
//! - Adding a participant the other side removed, or vice versa, is a
//!   structural conflict and fails the transform.

mod doc;

use crate::delta::{DeltaRecord, WaveletDelta};
use crate::id::ParticipantId;
use crate::operation::WaveletOperation;
use crate::version::HashedVersion;
use thiserror::Error;

/// Why two concurrent operations cannot be reconciled
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationConflict {
    #[error("blip {blip_id}: client op spans {client_len} characters but server op spans {server_len}")]
    DocumentLength {
        blip_id: String,
        client_len: usize,
        server_len: usize,
    },
    #[error("participant {participant} {client} by the client but {server} by the server")]
    Participant {
        participant: ParticipantId,
        client: &'static str,
        server: &'static str,
    },
}

/// A client delta structurally conflicts with committed history
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("client op {client_index} conflicts with server op {server_index} of the delta ending at {server_version}: {conflict}")]
pub struct TransformError {
    /// Index of the offending operation in the submitted delta
    pub client_index: usize,
    /// Index of the committed operation it collided with
    pub server_index: usize,
    /// Resulting version of the committed delta
    pub server_version: HashedVersion,
    pub conflict: OperationConflict,
}

/// Failures of the delta-level transform
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeltaTransformError {
    #[error(transparent)]
    Conflict(#[from] TransformError),
    /// The deltas do not start at the same version; transforming them is meaningless
    #[error("deltas are not concurrent: client targets {client_target} but server delta starts at {server_start}")]
    NotConcurrent {
        client_target: HashedVersion,
        server_start: HashedVersion,
    },
}

/// A transformed pair of operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationPair {
    pub client: WaveletOperation,
    pub server: WaveletOperation,
}

impl OperationPair {
    fn unchanged(client: &WaveletOperation, server: &WaveletOperation) -> Self {
        Self {
            client: client.clone(),
            server: server.clone(),
        }
    }

    fn both_noop() -> Self {
        Self {
            client: WaveletOperation::NoOp,
            server: WaveletOperation::NoOp,
        }
    }
}

/// Transform one client operation against one concurrent server operation
pub fn transform_operation(
    client: &WaveletOperation,
    server: &WaveletOperation,
) -> Result<OperationPair, OperationConflict> {
    use WaveletOperation::*;

    match (client, server) {
        (AddParticipant { participant: c }, AddParticipant { participant: s })
        | (RemoveParticipant { participant: c }, RemoveParticipant { participant: s })
            if c == s =>
        {
            Ok(OperationPair::both_noop())
        }
        (AddParticipant { participant: c }, RemoveParticipant { participant: s }) if c == s => {
            Err(OperationConflict::Participant {
                participant: c.clone(),
                client: "added",
                server: "removed",
            })
        }
        (RemoveParticipant { participant: c }, AddParticipant { participant: s }) if c == s => {
            Err(OperationConflict::Participant {
                participant: c.clone(),
                client: "removed",
                server: "added",
            })
        }
        (
            Blip {
                blip_id: client_blip,
                op: client_op,
            },
            Blip {
                blip_id: server_blip,
                op: server_op,
            },
        ) if client_blip == server_blip => {
            let conflict = || OperationConflict::DocumentLength {
                blip_id: client_blip.clone(),
                client_len: client_op.base_len(),
                server_len: server_op.base_len(),
            };
            let client_prime = doc::transform_doc(client_op, server_op, false).ok_or_else(conflict)?;
            let server_prime = doc::transform_doc(server_op, client_op, true).ok_or_else(conflict)?;
            Ok(OperationPair {
                client: WaveletOperation::blip(client_blip.clone(), client_prime),
                server: WaveletOperation::blip(server_blip.clone(), server_prime),
            })
        }
        _ => Ok(OperationPair::unchanged(client, server)),
    }
}

/// Transformed operation lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpsPair {
    pub client: Vec<WaveletOperation>,
    pub server: Vec<WaveletOperation>,
}

/// Location of a conflict within two operation lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpsConflict {
    pub client_index: usize,
    pub server_index: usize,
    pub conflict: OperationConflict,
}

/// Transform two concurrent operation sequences
///
/// Each client operation passes over every server operation in order, and
/// each server operation is updated as client operations pass it, so the
/// next client operation sees the server sequence as it looks after the
/// earlier client operations.
pub fn transform_ops(
    client: &[WaveletOperation],
    server: &[WaveletOperation],
) -> Result<OpsPair, OpsConflict> {
    let mut server_ops = server.to_vec();
    let mut client_ops = Vec::with_capacity(client.len());

    for (client_index, op) in client.iter().enumerate() {
        let mut op = op.clone();
        for (server_index, server_op) in server_ops.iter_mut().enumerate() {
            let pair = transform_operation(&op, server_op).map_err(|conflict| OpsConflict {
                client_index,
                server_index,
                conflict,
            })?;
            op = pair.client;
            *server_op = pair.server;
        }
        client_ops.push(op);
    }

    Ok(OpsPair {
        client: client_ops,
        server: server_ops,
    })
}

/// Rebase a client delta over one committed delta
///
/// The committed delta must start exactly where the client delta is
/// targeted. Returns the client delta retargeted at the committed delta's
/// resulting version, plus the committed ops as seen after the client's.
pub fn transform_delta(
    client: WaveletDelta,
    server: &DeltaRecord,
) -> Result<(WaveletDelta, Vec<WaveletOperation>), DeltaTransformError> {
    if client.target_version() != server.applied_at() {
        return Err(DeltaTransformError::NotConcurrent {
            client_target: client.target_version().clone(),
            server_start: server.applied_at().clone(),
        });
    }

    let pair = transform_ops(client.ops(), server.ops()).map_err(|c| TransformError {
        client_index: c.client_index,
        server_index: c.server_index,
        server_version: server.resulting_version().clone(),
        conflict: c.conflict,
    })?;

    let rebased = client.rebased(pair.client, server.resulting_version().clone());
    Ok((rebased, pair.server))
}

#[cfg(test)]
#[path = "transform_tests.rs"]
mod tests;

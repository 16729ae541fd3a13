// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wavelet snapshot materialized from committed deltas

use crate::delta::TransformedWaveletDelta;
use crate::doc::DocOpError;
use crate::id::{ParticipantId, WaveletName};
use crate::operation::WaveletOperation;
use crate::version::HashedVersion;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors from applying operations to a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    #[error("participant {0} is already on the wavelet")]
    DuplicateParticipant(ParticipantId),
    #[error("participant {0} is not on the wavelet")]
    MissingParticipant(ParticipantId),
    #[error("blip {blip_id}: {source}")]
    Document {
        blip_id: String,
        #[source]
        source: DocOpError,
    },
    #[error("delta applied at {applied_at} but snapshot is at {current}")]
    VersionMismatch { applied_at: u64, current: u64 },
}

/// State of a wavelet at a version
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WaveletData {
    name: WaveletName,
    creator: Option<ParticipantId>,
    participants: Vec<ParticipantId>,
    documents: BTreeMap<String, String>,
    version: HashedVersion,
    last_modified: i64,
}

impl WaveletData {
    /// Empty wavelet at version zero
    pub fn new(name: WaveletName, version_zero: HashedVersion) -> Self {
        Self {
            name,
            creator: None,
            participants: Vec::new(),
            documents: BTreeMap::new(),
            version: version_zero,
            last_modified: 0,
        }
    }

    pub fn name(&self) -> &WaveletName {
        &self.name
    }

    /// Author of the first delta
    pub fn creator(&self) -> Option<&ParticipantId> {
        self.creator.as_ref()
    }

    /// Participants in the order they were added
    pub fn participants(&self) -> &[ParticipantId] {
        &self.participants
    }

    pub fn has_participant(&self, participant: &ParticipantId) -> bool {
        self.participants.contains(participant)
    }

    pub fn documents(&self) -> &BTreeMap<String, String> {
        &self.documents
    }

    /// Content of a blip; blips that were never written are empty
    pub fn document(&self, blip_id: &str) -> &str {
        self.documents.get(blip_id).map(String::as_str).unwrap_or("")
    }

    pub fn version(&self) -> &HashedVersion {
        &self.version
    }

    pub fn last_modified(&self) -> i64 {
        self.last_modified
    }

    /// Apply a single operation
    ///
    /// Leaves the snapshot untouched on error.
    pub fn apply_operation(&mut self, op: &WaveletOperation) -> Result<(), ApplyError> {
        match op {
            WaveletOperation::AddParticipant { participant } => {
                if self.has_participant(participant) {
                    return Err(ApplyError::DuplicateParticipant(participant.clone()));
                }
                self.participants.push(participant.clone());
            }
            WaveletOperation::RemoveParticipant { participant } => {
                let Some(index) = self.participants.iter().position(|p| p == participant) else {
                    return Err(ApplyError::MissingParticipant(participant.clone()));
                };
                self.participants.remove(index);
            }
            WaveletOperation::Blip { blip_id, op } => {
                let updated =
                    op.apply(self.document(blip_id))
                        .map_err(|source| ApplyError::Document {
                            blip_id: blip_id.clone(),
                            source,
                        })?;
                self.documents.insert(blip_id.clone(), updated);
            }
            WaveletOperation::NoOp => {}
        }
        Ok(())
    }

    /// Apply a committed delta, advancing the version
    ///
    /// All-or-nothing: on error the snapshot is unchanged.
    pub fn apply_delta(&mut self, delta: &TransformedWaveletDelta) -> Result<(), ApplyError> {
        if delta.applied_at_version() != self.version.version() {
            return Err(ApplyError::VersionMismatch {
                applied_at: delta.applied_at_version(),
                current: self.version.version(),
            });
        }

        let mut next = self.clone();
        for op in delta.ops() {
            next.apply_operation(op)?;
        }
        if next.creator.is_none() {
            next.creator = Some(delta.author().clone());
        }
        next.version = delta.resulting_version().clone();
        next.last_modified = delta.application_timestamp();

        *self = next;
        Ok(())
    }
}

#[cfg(test)]
#[path = "wavelet_tests.rs"]
mod tests;

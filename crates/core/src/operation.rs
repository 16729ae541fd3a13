// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Primitive wavelet operations

use crate::doc::DocOp;
use crate::id::ParticipantId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single primitive change to a wavelet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WaveletOperation {
    /// Add a participant to the wavelet
    AddParticipant { participant: ParticipantId },

    /// Remove a participant from the wavelet
    RemoveParticipant { participant: ParticipantId },

    /// Mutate the content of one blip document
    Blip { blip_id: String, op: DocOp },

    /// Does nothing; what an operation becomes when a concurrent
    /// operation already achieved its effect
    NoOp,
}

impl WaveletOperation {
    pub fn add_participant(participant: ParticipantId) -> Self {
        WaveletOperation::AddParticipant { participant }
    }

    pub fn remove_participant(participant: ParticipantId) -> Self {
        WaveletOperation::RemoveParticipant { participant }
    }

    pub fn blip(blip_id: impl Into<String>, op: DocOp) -> Self {
        WaveletOperation::Blip {
            blip_id: blip_id.into(),
            op,
        }
    }

    pub fn is_noop(&self) -> bool {
        match self {
            WaveletOperation::NoOp => true,
            WaveletOperation::Blip { op, .. } => op.is_noop(),
            _ => false,
        }
    }

    /// Short name for logs and error messages
    pub fn kind(&self) -> &'static str {
        match self {
            WaveletOperation::AddParticipant { .. } => "add_participant",
            WaveletOperation::RemoveParticipant { .. } => "remove_participant",
            WaveletOperation::Blip { .. } => "blip",
            WaveletOperation::NoOp => "noop",
        }
    }
}

impl fmt::Display for WaveletOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaveletOperation::AddParticipant { participant } => {
                write!(f, "add_participant({})", participant)
            }
            WaveletOperation::RemoveParticipant { participant } => {
                write!(f, "remove_participant({})", participant)
            }
            WaveletOperation::Blip { blip_id, op } => {
                write!(f, "blip({}, {} -> {})", blip_id, op.base_len(), op.target_len())
            }
            WaveletOperation::NoOp => write!(f, "noop"),
        }
    }
}

#[cfg(test)]
#[path = "operation_tests.rs"]
mod tests;

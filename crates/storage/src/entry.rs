// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Delta log line with checksum verification
//!
//! Each line holds one committed record and the CRC32 of the record's
//! JSON encoding.

use serde::{Deserialize, Serialize};
use wv_core::DeltaRecord;

/// A single line of a wavelet delta log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct DeltaEntry {
    pub record: DeltaRecord,
    /// CRC32 of the serialized record
    pub checksum: u32,
}

impl DeltaEntry {
    pub fn new(record: DeltaRecord) -> Result<Self, serde_json::Error> {
        let checksum = Self::calculate_checksum(&record)?;
        Ok(Self { record, checksum })
    }

    fn calculate_checksum(record: &DeltaRecord) -> Result<u32, serde_json::Error> {
        let json = serde_json::to_string(record)?;
        Ok(crc32fast::hash(json.as_bytes()))
    }

    /// Verify the checksum matches the record
    pub fn verify(&self) -> bool {
        Self::calculate_checksum(&self.record).is_ok_and(|c| c == self.checksum)
    }

    /// Serialize to one line of JSON, newline included
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }

    pub fn from_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

#[cfg(test)]
#[path = "entry_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory version index shared by the backends

use crate::access::StoreError;
use std::collections::HashMap;
use std::sync::Arc;
use wv_core::{DeltaRecord, HashedVersion};

/// Records in commit order, indexed by start and end version
#[derive(Debug, Default)]
pub(crate) struct DeltaIndex {
    records: Vec<Arc<DeltaRecord>>,
    by_start: HashMap<u64, usize>,
    by_end: HashMap<u64, usize>,
}

impl DeltaIndex {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn end_version(&self) -> Option<&HashedVersion> {
        self.records.last().map(|r| r.resulting_version())
    }

    pub(crate) fn by_start(&self, version: u64) -> Option<Arc<DeltaRecord>> {
        self.by_start
            .get(&version)
            .and_then(|&i| self.records.get(i))
            .cloned()
    }

    pub(crate) fn by_end(&self, version: u64) -> Option<Arc<DeltaRecord>> {
        self.by_end
            .get(&version)
            .and_then(|&i| self.records.get(i))
            .cloned()
    }

    /// Check that `records` extend the chain, without touching the index
    pub(crate) fn check(&self, records: &[DeltaRecord]) -> Result<(), StoreError> {
        let mut end = self.end_version();
        for record in records {
            if !record.is_well_formed() {
                return Err(StoreError::Malformed {
                    applied_at: record.applied_at().clone(),
                    resulting: record.resulting_version().clone(),
                });
            }
            let start = record.applied_at();
            match end {
                None if start.version() != 0 => {
                    return Err(StoreError::Discontiguous {
                        expected: 0,
                        found: start.version(),
                    });
                }
                Some(end) if end.version() != start.version() => {
                    return Err(StoreError::Discontiguous {
                        expected: end.version(),
                        found: start.version(),
                    });
                }
                Some(end) if end != start => {
                    return Err(StoreError::HashMismatch {
                        expected: end.clone(),
                        found: start.clone(),
                    });
                }
                _ => {}
            }
            end = Some(record.resulting_version());
        }
        Ok(())
    }

    /// Index a record already known to extend the chain
    pub(crate) fn push(&mut self, record: DeltaRecord) {
        let i = self.records.len();
        self.by_start.insert(record.applied_at().version(), i);
        self.by_end.insert(record.resulting_version().version(), i);
        self.records.push(Arc::new(record));
    }

    pub(crate) fn extend(&mut self, records: Vec<DeltaRecord>) -> Result<(), StoreError> {
        self.check(&records)?;
        for record in records {
            self.push(record);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "index_tests.rs"]
mod tests;

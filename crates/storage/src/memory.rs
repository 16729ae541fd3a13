// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory backend for tests and low-durability deployments

use crate::access::{DeltaStore, DeltasAccess, StoreError};
use crate::index::DeltaIndex;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use wv_core::{DeltaRecord, HashedVersion, WaveletName};

type SharedIndex = Arc<Mutex<DeltaIndex>>;

/// Wavelet logs held in process memory
///
/// Clones share the same logs, and reopening a wavelet sees everything
/// appended through earlier handles.
#[derive(Clone, Default)]
pub struct MemoryDeltaStore {
    wavelets: Arc<Mutex<HashMap<WaveletName, SharedIndex>>>,
}

impl MemoryDeltaStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DeltaStore for MemoryDeltaStore {
    fn open(&self, name: &WaveletName) -> Result<Box<dyn DeltasAccess>, StoreError> {
        let mut wavelets = self.wavelets.lock().unwrap_or_else(|e| e.into_inner());
        let index = wavelets.entry(name.clone()).or_default().clone();
        Ok(Box::new(MemoryDeltasAccess {
            name: name.clone(),
            index,
            closed: false,
        }))
    }

    fn delete(&self, name: &WaveletName) -> Result<(), StoreError> {
        let mut wavelets = self.wavelets.lock().unwrap_or_else(|e| e.into_inner());
        wavelets.remove(name);
        Ok(())
    }

    fn list_wavelets(&self) -> Result<Vec<WaveletName>, StoreError> {
        let wavelets = self.wavelets.lock().unwrap_or_else(|e| e.into_inner());
        let mut names: Vec<_> = wavelets
            .iter()
            .filter(|(_, index)| !index.lock().unwrap_or_else(|e| e.into_inner()).is_empty())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        Ok(names)
    }
}

/// Handle on one in-memory wavelet log
pub struct MemoryDeltasAccess {
    name: WaveletName,
    index: SharedIndex,
    closed: bool,
}

impl MemoryDeltasAccess {
    /// A standalone log not registered in any store
    pub fn new(name: WaveletName) -> Self {
        Self {
            name,
            index: SharedIndex::default(),
            closed: false,
        }
    }
}

impl DeltasAccess for MemoryDeltasAccess {
    fn wavelet_name(&self) -> &WaveletName {
        &self.name
    }

    fn is_empty(&self) -> bool {
        self.index.lock().unwrap_or_else(|e| e.into_inner()).is_empty()
    }

    fn end_version(&self) -> Option<HashedVersion> {
        self.index
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .end_version()
            .cloned()
    }

    fn get_delta(&self, version: u64) -> Result<Option<Arc<DeltaRecord>>, StoreError> {
        Ok(self
            .index
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .by_start(version))
    }

    fn get_delta_by_end_version(
        &self,
        version: u64,
    ) -> Result<Option<Arc<DeltaRecord>>, StoreError> {
        Ok(self
            .index
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .by_end(version))
    }

    fn append(&mut self, records: Vec<DeltaRecord>) -> Result<(), StoreError> {
        if self.closed {
            return Err(StoreError::Closed(self.name.clone()));
        }
        self.index
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend(records)
    }

    fn close(&mut self) -> Result<(), StoreError> {
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;

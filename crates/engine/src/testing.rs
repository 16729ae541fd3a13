// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fixtures shared by the engine tests

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use wv_core::{
    DeltaRecord, DocOp, HashedVersion, HashedVersionFactory, ParticipantId, Sha256VersionFactory,
    WaveletDelta, WaveletName, WaveletOperation,
};
use wv_storage::{DeltaHistory, DeltaStore, DeltasAccess, MemoryDeltasAccess, StoreError};

pub(crate) fn name() -> WaveletName {
    WaveletName::of("example.com", "w+abc", "conv+root").unwrap()
}

pub(crate) fn p(address: &str) -> ParticipantId {
    ParticipantId::new(address).unwrap()
}

pub(crate) fn factory() -> Arc<dyn HashedVersionFactory> {
    Arc::new(Sha256VersionFactory::default())
}

pub(crate) fn v0() -> HashedVersion {
    factory().create_version_zero(&name())
}

pub(crate) fn add(address: &str) -> WaveletOperation {
    WaveletOperation::add_participant(p(address))
}

pub(crate) fn remove(address: &str) -> WaveletOperation {
    WaveletOperation::remove_participant(p(address))
}

pub(crate) fn edit(op: DocOp) -> WaveletOperation {
    WaveletOperation::blip("b+1", op)
}

pub(crate) fn delta(author: &str, target: &HashedVersion, ops: Vec<WaveletOperation>) -> WaveletDelta {
    WaveletDelta::new(p(author), target.clone(), ops)
}

pub(crate) fn memory_history() -> DeltaHistory {
    DeltaHistory::new(Box::new(MemoryDeltasAccess::new(name())), factory().as_ref())
}

/// Append a delta that is already targeted at the end of history
pub(crate) fn commit(history: &mut DeltaHistory, delta: WaveletDelta) -> DeltaRecord {
    let record = DeltaRecord::commit(delta, factory().as_ref(), 0).unwrap();
    history.append(vec![record.clone()]).unwrap();
    record
}

/// Switches for a [`FlakyAccess`], shared with the test body
#[derive(Clone, Default)]
pub(crate) struct Faults {
    pub fail_appends: Arc<AtomicBool>,
    pub hide_records: Arc<AtomicBool>,
}

impl Faults {
    pub fn fail_appends(&self, on: bool) {
        self.fail_appends.store(on, Ordering::SeqCst);
    }

    pub fn hide_records(&self, on: bool) {
        self.hide_records.store(on, Ordering::SeqCst);
    }
}

/// In-memory access that can be told to fail appends or lose records
pub(crate) struct FlakyAccess {
    inner: MemoryDeltasAccess,
    faults: Faults,
}

impl FlakyAccess {
    pub fn new(faults: Faults) -> Self {
        Self {
            inner: MemoryDeltasAccess::new(name()),
            faults,
        }
    }
}

impl DeltasAccess for FlakyAccess {
    fn wavelet_name(&self) -> &WaveletName {
        self.inner.wavelet_name()
    }

    fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn end_version(&self) -> Option<HashedVersion> {
        self.inner.end_version()
    }

    fn get_delta(&self, version: u64) -> Result<Option<Arc<DeltaRecord>>, StoreError> {
        if self.faults.hide_records.load(Ordering::SeqCst) {
            return Ok(None);
        }
        self.inner.get_delta(version)
    }

    fn get_delta_by_end_version(
        &self,
        version: u64,
    ) -> Result<Option<Arc<DeltaRecord>>, StoreError> {
        self.inner.get_delta_by_end_version(version)
    }

    fn append(&mut self, records: Vec<DeltaRecord>) -> Result<(), StoreError> {
        if self.faults.fail_appends.load(Ordering::SeqCst) {
            return Err(StoreError::Io(std::io::Error::other("disk full")));
        }
        self.inner.append(records)
    }

    fn close(&mut self) -> Result<(), StoreError> {
        self.inner.close()
    }
}

/// Blocks a store call on a worker thread until the test lets it through
#[derive(Clone, Default)]
pub(crate) struct Gate {
    lock: Arc<Mutex<()>>,
    reached: Arc<AtomicBool>,
}

impl Gate {
    /// Callers block until the guard is dropped
    pub fn hold(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap()
    }

    /// Wait until some caller is blocked at the gate
    pub async fn reached(&self) {
        while !self.reached.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    fn pass(&self) {
        self.reached.store(true, Ordering::SeqCst);
        let _guard = self.lock.lock();
    }
}

/// Store whose `open` or `append` for one wavelet goes through a [`Gate`]
pub(crate) struct GatedStore {
    inner: Arc<dyn DeltaStore>,
    gated: WaveletName,
    on_open: Option<Gate>,
    on_append: Option<Gate>,
}

impl GatedStore {
    pub fn on_open(inner: Arc<dyn DeltaStore>, gated: WaveletName, gate: Gate) -> Self {
        Self {
            inner,
            gated,
            on_open: Some(gate),
            on_append: None,
        }
    }

    pub fn on_append(inner: Arc<dyn DeltaStore>, gated: WaveletName, gate: Gate) -> Self {
        Self {
            inner,
            gated,
            on_open: None,
            on_append: Some(gate),
        }
    }
}

impl DeltaStore for GatedStore {
    fn open(&self, name: &WaveletName) -> Result<Box<dyn DeltasAccess>, StoreError> {
        if name != &self.gated {
            return self.inner.open(name);
        }
        if let Some(gate) = &self.on_open {
            gate.pass();
        }
        Ok(Box::new(GatedAccess {
            inner: self.inner.open(name)?,
            gate: self.on_append.clone(),
        }))
    }

    fn delete(&self, name: &WaveletName) -> Result<(), StoreError> {
        self.inner.delete(name)
    }

    fn list_wavelets(&self) -> Result<Vec<WaveletName>, StoreError> {
        self.inner.list_wavelets()
    }
}

struct GatedAccess {
    inner: Box<dyn DeltasAccess>,
    gate: Option<Gate>,
}

impl DeltasAccess for GatedAccess {
    fn wavelet_name(&self) -> &WaveletName {
        self.inner.wavelet_name()
    }

    fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn end_version(&self) -> Option<HashedVersion> {
        self.inner.end_version()
    }

    fn get_delta(&self, version: u64) -> Result<Option<Arc<DeltaRecord>>, StoreError> {
        self.inner.get_delta(version)
    }

    fn get_delta_by_end_version(
        &self,
        version: u64,
    ) -> Result<Option<Arc<DeltaRecord>>, StoreError> {
        self.inner.get_delta_by_end_version(version)
    }

    fn append(&mut self, records: Vec<DeltaRecord>) -> Result<(), StoreError> {
        if let Some(gate) = &self.gate {
            gate.pass();
        }
        self.inner.append(records)
    }

    fn close(&mut self) -> Result<(), StoreError> {
        self.inner.close()
    }
}

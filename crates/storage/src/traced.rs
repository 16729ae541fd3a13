// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced backend wrappers for consistent observability

use crate::access::{DeltaStore, DeltasAccess, StoreError};
use std::sync::Arc;
use wv_core::{DeltaRecord, HashedVersion, WaveletName};

/// Wrapper that adds tracing to any DeltaStore
///
/// Every log it opens is wrapped in a [`TracedDeltasAccess`].
#[derive(Clone)]
pub struct TracedDeltaStore<S> {
    inner: S,
}

impl<S> TracedDeltaStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

impl<S: DeltaStore> DeltaStore for TracedDeltaStore<S> {
    fn open(&self, name: &WaveletName) -> Result<Box<dyn DeltasAccess>, StoreError> {
        let span = tracing::info_span!("store.open", wavelet = %name);
        let _guard = span.enter();

        let start = std::time::Instant::now();
        let result = self.inner.open(name);
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(access) => {
                tracing::info!(
                    elapsed_ms,
                    end_version = ?access.end_version().map(|v| v.version()),
                    "opened"
                );
                Ok(Box::new(TracedDeltasAccess::new(access)))
            }
            Err(e) => {
                tracing::error!(elapsed_ms, error = %e, "open failed");
                Err(e)
            }
        }
    }

    fn delete(&self, name: &WaveletName) -> Result<(), StoreError> {
        let span = tracing::info_span!("store.delete", wavelet = %name);
        let _guard = span.enter();

        let result = self.inner.delete(name);
        match &result {
            Ok(()) => tracing::info!("deleted"),
            Err(e) => tracing::error!(error = %e, "delete failed"),
        }
        result
    }

    fn list_wavelets(&self) -> Result<Vec<WaveletName>, StoreError> {
        let result = self.inner.list_wavelets();
        tracing::debug!(count = result.as_ref().map(Vec::len).ok(), "listed wavelets");
        result
    }
}

/// Wrapper that adds tracing to any DeltasAccess
pub struct TracedDeltasAccess<A> {
    inner: A,
}

impl<A> TracedDeltasAccess<A> {
    pub fn new(inner: A) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> A {
        self.inner
    }
}

impl<A: DeltasAccess> DeltasAccess for TracedDeltasAccess<A> {
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
        let result = self.inner.get_delta(version);
        tracing::trace!(
            wavelet = %self.inner.wavelet_name(),
            version,
            found = ?result.as_ref().map(Option::is_some).ok(),
            "lookup by start"
        );
        result
    }

    fn get_delta_by_end_version(
        &self,
        version: u64,
    ) -> Result<Option<Arc<DeltaRecord>>, StoreError> {
        let result = self.inner.get_delta_by_end_version(version);
        tracing::trace!(
            wavelet = %self.inner.wavelet_name(),
            version,
            found = ?result.as_ref().map(Option::is_some).ok(),
            "lookup by end"
        );
        result
    }

    fn append(&mut self, records: Vec<DeltaRecord>) -> Result<(), StoreError> {
        let span = tracing::info_span!("deltas.append", wavelet = %self.inner.wavelet_name());
        let _guard = span.enter();

        let count = records.len();
        let first = records.first().map(|r| r.applied_at().version());
        let last = records.last().map(|r| r.resulting_version().version());

        let start = std::time::Instant::now();
        let result = self.inner.append(records);
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(()) => tracing::info!(count, ?first, ?last, elapsed_ms, "appended"),
            Err(e) => tracing::error!(count, ?first, elapsed_ms, error = %e, "append failed"),
        }
        result
    }

    fn close(&mut self) -> Result<(), StoreError> {
        let result = self.inner.close();
        match &result {
            Ok(()) => tracing::debug!(wavelet = %self.inner.wavelet_name(), "closed"),
            Err(e) => tracing::warn!(wavelet = %self.inner.wavelet_name(), error = %e, "close failed"),
        }
        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;

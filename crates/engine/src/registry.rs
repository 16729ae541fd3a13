// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Loaded wavelets, keyed by name
//!
//! Wavelets load lazily on first use and stay loaded until evicted.
//! The map lock only guards lookups; loading happens in a per-name slot,
//! so a slow load never stalls other wavelets.

use crate::concurrency::Reopened;
use crate::config::EngineConfig;
use crate::container::{SubmitOutcome, WaveletContainer, WaveletStatus};
use crate::error::{SubmitError, WaveletError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, OnceCell};
use wv_core::{
    Clock, DeltaRecord, HashedVersion, HashedVersionFactory, Sha256VersionFactory, VersionError,
    WaveletDelta, WaveletName,
};
use wv_storage::{DeltaStore, StoreError};

/// A wavelet's place in the map; filled once its history is loaded
type Slot<C> = OnceCell<Arc<WaveletContainer<C>>>;

/// Map from wavelet name to its loaded container
pub struct WaveletRegistry<C: Clock> {
    store: Arc<dyn DeltaStore>,
    factory: Arc<dyn HashedVersionFactory>,
    clock: C,
    config: EngineConfig,
    wavelets: Mutex<HashMap<WaveletName, Arc<Slot<C>>>>,
}

impl<C: Clock> WaveletRegistry<C> {
    pub fn new(
        store: Arc<dyn DeltaStore>,
        clock: C,
        config: EngineConfig,
    ) -> Result<Self, VersionError> {
        let factory = Arc::new(Sha256VersionFactory::new(config.hash_bits)?);
        Ok(Self {
            store,
            factory,
            clock,
            config,
            wavelets: Mutex::new(HashMap::new()),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn factory(&self) -> &dyn HashedVersionFactory {
        self.factory.as_ref()
    }

    /// The loaded container for `name`, loading it from the store if needed
    pub async fn get_or_load(
        &self,
        name: &WaveletName,
    ) -> Result<Arc<WaveletContainer<C>>, WaveletError> {
        loop {
            let slot = self.slot(name).await;
            let container = match slot.get_or_try_init(|| async { self.load(name) }).await {
                Ok(container) => container.clone(),
                Err(e) => {
                    self.forget(name, &slot).await;
                    return Err(e);
                }
            };
            if !container.is_closed().await {
                return Ok(container);
            }
            // Evicted under us; the next pass loads a fresh container
            self.forget(name, &slot).await;
        }
    }

    async fn slot(&self, name: &WaveletName) -> Arc<Slot<C>> {
        self.wavelets
            .lock()
            .await
            .entry(name.clone())
            .or_default()
            .clone()
    }

    /// Remove `slot` from the map unless it was already replaced
    async fn forget(&self, name: &WaveletName, slot: &Arc<Slot<C>>) {
        let mut wavelets = self.wavelets.lock().await;
        if wavelets.get(name).is_some_and(|current| Arc::ptr_eq(current, slot)) {
            wavelets.remove(name);
        }
    }

    fn load(&self, name: &WaveletName) -> Result<Arc<WaveletContainer<C>>, WaveletError> {
        let access = self.store.open(name)?;
        Ok(Arc::new(WaveletContainer::load(
            access,
            self.factory.clone(),
            self.clock.clone(),
            &self.config,
        )?))
    }

    /// Containers that finished loading
    async fn containers(&self) -> Vec<Arc<WaveletContainer<C>>> {
        let wavelets = self.wavelets.lock().await;
        wavelets.values().filter_map(|slot| slot.get().cloned()).collect()
    }

    /// Submit a delta, bounded by the configured timeout
    ///
    /// The timeout covers loading, waiting for the writer lock, and the
    /// commit itself. A submission that lands on a container being evicted
    /// is retried against the reloaded wavelet.
    pub async fn submit(
        &self,
        name: &WaveletName,
        delta: WaveletDelta,
    ) -> Result<SubmitOutcome, SubmitError> {
        let timeout = self.config.submit_timeout;
        let submit = async move {
            loop {
                let container = match self.get_or_load(name).await {
                    Ok(container) => container,
                    Err(e) => return Err(SubmitError::Wavelet(e)),
                };
                match container.submit(delta.clone()).await {
                    Err(SubmitError::Wavelet(WaveletError::Closed(_))) => continue,
                    result => return result,
                }
            }
        };

        match tokio::time::timeout(timeout, submit).await {
            Ok(result) => {
                if let Err(e) = &result {
                    tracing::warn!(wavelet = %name, error = %e, "submit rejected");
                }
                result
            }
            Err(_) => {
                tracing::warn!(wavelet = %name, ?timeout, "submit timed out");
                Err(SubmitError::Timeout {
                    name: name.clone(),
                    timeout,
                })
            }
        }
    }

    pub async fn reopen(
        &self,
        name: &WaveletName,
        known: &[HashedVersion],
    ) -> Result<Option<Reopened>, WaveletError> {
        self.get_or_load(name).await?.reopen(known).await
    }

    pub async fn history(
        &self,
        name: &WaveletName,
        start: u64,
        end: Option<u64>,
    ) -> Result<Vec<Arc<DeltaRecord>>, WaveletError> {
        self.get_or_load(name).await?.history(start, end).await
    }

    pub async fn subscribe(
        &self,
        name: &WaveletName,
    ) -> Result<broadcast::Receiver<Arc<DeltaRecord>>, WaveletError> {
        Ok(self.get_or_load(name).await?.subscribe())
    }

    /// Every wavelet in the backing store
    pub fn list_wavelets(&self) -> Result<Vec<WaveletName>, StoreError> {
        self.store.list_wavelets()
    }

    /// Names of the wavelets currently loaded, sorted
    pub async fn loaded(&self) -> Vec<WaveletName> {
        let mut names: Vec<_> = self
            .containers()
            .await
            .iter()
            .map(|c| c.name().clone())
            .collect();
        names.sort();
        names
    }

    pub async fn status(&self) -> Vec<WaveletStatus> {
        let containers = self.containers().await;
        let mut statuses = Vec::with_capacity(containers.len());
        for container in containers {
            statuses.push(container.status().await);
        }
        statuses.sort_by(|a, b| a.name.cmp(&b.name));
        statuses
    }

    /// Unload a wavelet; returns false if it was not loaded
    ///
    /// Waits for in-flight submissions to finish before closing the log.
    /// The entry stays in the map until the log is closed, so nothing
    /// reopens the log while the old container still owns it.
    pub async fn evict(&self, name: &WaveletName) -> Result<bool, WaveletError> {
        let Some(slot) = self.wavelets.lock().await.get(name).cloned() else {
            return Ok(false);
        };
        let Some(container) = slot.get().cloned() else {
            return Ok(false);
        };

        let closed = container.close().await;
        self.forget(name, &slot).await;
        closed?;
        tracing::info!(wavelet = %name, "evicted wavelet");
        Ok(true)
    }

    /// Close every loaded wavelet
    pub async fn shutdown(&self) {
        let slots: Vec<_> = self.wavelets.lock().await.drain().collect();
        for (name, slot) in slots {
            let Some(container) = slot.get() else {
                continue;
            };
            if let Err(e) = container.close().await {
                tracing::warn!(wavelet = %name, error = %e, "failed to close wavelet");
            }
        }
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: configuration, startup, shutdown.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use fs2::FileExt;
use serde::Deserialize;
use thiserror::Error;
use tokio::net::UnixListener;
use tracing::{info, warn};
use wv_core::{SystemClock, VersionError};
use wv_engine::{EngineConfig, WaveletRegistry};
use wv_storage::{DeltaStore, FileDeltaStore, MemoryDeltaStore, StoreError, TracedDeltaStore};

/// Name of the config file looked up in the state directory
pub const CONFIG_FILE: &str = "wvd.toml";

/// Where committed deltas live
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// One append-only log file per wavelet under `<state_dir>/deltas`
    #[default]
    File,
    /// Process memory; everything is lost on exit
    Memory,
}

/// On-disk shape of `wvd.toml`; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    state_dir: Option<PathBuf>,
    socket_path: Option<PathBuf>,
    store: StoreKind,
    engine: EngineConfig,
}

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the lock, log, and delta files
    pub state_dir: PathBuf,
    /// Path to Unix socket
    pub socket_path: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Path to version file
    pub version_path: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
    /// Directory of per-wavelet delta logs
    pub store_dir: PathBuf,
    pub store: StoreKind,
    pub engine: EngineConfig,
}

impl Config {
    /// Defaults rooted at `state_dir`
    pub fn with_state_dir(state_dir: impl Into<PathBuf>) -> Self {
        let state_dir = state_dir.into();
        Self {
            socket_path: state_dir.join("wvd.sock"),
            lock_path: state_dir.join("wvd.pid"),
            version_path: state_dir.join("wvd.version"),
            log_path: state_dir.join("wvd.log"),
            store_dir: state_dir.join("deltas"),
            store: StoreKind::default(),
            engine: EngineConfig::default(),
            state_dir,
        }
    }

    /// Load configuration from `path`, or from `wvd.toml` in the default
    /// state directory. A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, LifecycleError> {
        let default_dir = default_state_dir()?;
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => default_dir.join(CONFIG_FILE),
        };

        match std::fs::read_to_string(&path) {
            Ok(content) => Self::from_toml(&content, &default_dir)
                .map_err(|e| LifecycleError::Config(path, e)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::with_state_dir(default_dir))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Parse a config file, falling back to `default_dir` for the state directory
    pub fn from_toml(content: &str, default_dir: &Path) -> Result<Self, toml::de::Error> {
        let file: ConfigFile = toml::from_str(content)?;
        let mut config = Self::with_state_dir(
            file.state_dir
                .unwrap_or_else(|| default_dir.to_path_buf()),
        );
        if let Some(socket_path) = file.socket_path {
            config.socket_path = socket_path;
        }
        config.store = file.store;
        config.engine = file.engine;
        Ok(config)
    }
}

/// Daemon state during operation
pub struct DaemonState {
    pub config: Config,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    pub listener: UnixListener,
    pub registry: Arc<WaveletRegistry<SystemClock>>,
    pub start_time: Instant,
}

impl DaemonState {
    /// Close every wavelet and remove the runtime files
    pub async fn shutdown(&self) -> Result<(), LifecycleError> {
        info!("Shutting down daemon...");

        self.registry.shutdown().await;

        for path in [
            &self.config.socket_path,
            &self.config.lock_path,
            &self.config.version_path,
        ] {
            if path.exists() {
                if let Err(e) = std::fs::remove_file(path) {
                    warn!("Failed to remove {}: {}", path.display(), e);
                }
            }
        }

        info!("Daemon shutdown complete");
        Ok(())
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("Invalid config at {0}: {1}")]
    Config(PathBuf, #[source] toml::de::Error),

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Engine config error: {0}")]
    Engine(#[from] VersionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Start the daemon
pub async fn startup(config: &Config) -> Result<DaemonState, LifecycleError> {
    match startup_inner(config).await {
        Ok(state) => Ok(state),
        // A held lock means the files belong to the running daemon
        Err(e @ LifecycleError::LockFailed(_)) => Err(e),
        Err(e) => {
            cleanup_on_failure(config);
            Err(e)
        }
    }
}

/// Inner startup logic - cleanup_on_failure called if this fails
async fn startup_inner(config: &Config) -> Result<DaemonState, LifecycleError> {
    // 1. Create state directory
    std::fs::create_dir_all(&config.state_dir)?;
    if let Some(parent) = config.socket_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // 2. Acquire lock file FIRST - one daemon per store
    // Not truncated until locked, so a running daemon's PID survives
    let lock_file = std::fs::OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&config.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;
    lock_file.set_len(0)?;

    use std::io::Write;
    let mut lock_file = lock_file;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file;

    std::fs::write(&config.version_path, env!("CARGO_PKG_VERSION"))?;

    // 3. Open the store and build the registry before accepting connections
    let store = open_store(config)?;
    let known = store.list_wavelets()?;
    let registry = Arc::new(WaveletRegistry::new(
        store,
        SystemClock,
        config.engine.clone(),
    )?);

    info!(
        store = ?config.store,
        wavelets = known.len(),
        hash_bits = config.engine.hash_bits,
        "opened delta store"
    );

    // 4. Remove stale socket and bind (LAST - only after all validation passes)
    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let listener = UnixListener::bind(&config.socket_path)
        .map_err(|e| LifecycleError::BindFailed(config.socket_path.clone(), e))?;

    info!("Daemon started in {}", config.state_dir.display());

    Ok(DaemonState {
        config: config.clone(),
        lock_file,
        listener,
        registry,
        start_time: Instant::now(),
    })
}

fn open_store(config: &Config) -> Result<Arc<dyn DeltaStore>, LifecycleError> {
    let store: Arc<dyn DeltaStore> = match config.store {
        StoreKind::File => Arc::new(TracedDeltaStore::new(FileDeltaStore::open(
            &config.store_dir,
        )?)),
        StoreKind::Memory => Arc::new(TracedDeltaStore::new(MemoryDeltaStore::new())),
    };
    Ok(store)
}

/// Clean up resources on startup failure
fn cleanup_on_failure(config: &Config) {
    if config.socket_path.exists() {
        let _ = std::fs::remove_file(&config.socket_path);
    }

    if config.version_path.exists() {
        let _ = std::fs::remove_file(&config.version_path);
    }

    if config.lock_path.exists() {
        let _ = std::fs::remove_file(&config.lock_path);
    }
}

/// Default state directory for wv
pub fn default_state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("WV_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }

    // Use XDG_STATE_HOME or default to ~/.local/state
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("wv"));
    }

    let home = std::env::var("HOME").map_err(|_| LifecycleError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/wv"))
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon client for CLI commands

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tokio::net::UnixStream;
use wv_core::{DeltaRecord, HashedVersion, TransformedWaveletDelta, WaveletDelta, WaveletName};
use wv_daemon::lifecycle::{Config, LifecycleError};
use wv_daemon::protocol::{self, ProtocolError, WaveletStatus};
use wv_daemon::{Request, Response};

// Timeout configuration (env vars in milliseconds)
fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Timeout for IPC requests
pub fn timeout_ipc() -> Duration {
    parse_duration_ms("WV_TIMEOUT_IPC_MS").unwrap_or(Duration::from_secs(15))
}

/// Client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Daemon not running (no socket at {0})")]
    DaemonNotRunning(PathBuf),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Rejected: {0}")]
    Rejected(String),

    #[error("Daemon error: {0}")]
    Daemon(String),

    #[error("Unexpected response from daemon")]
    UnexpectedResponse,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] LifecycleError),
}

/// Socket to talk to: an explicit path, or the one in the daemon's config
pub fn resolve_socket(explicit: Option<PathBuf>) -> Result<PathBuf, ClientError> {
    match explicit {
        Some(path) => Ok(path),
        None => Ok(Config::load(None)?.socket_path),
    }
}

/// Outcome of a submission the daemon accepted
#[derive(Debug)]
pub struct Committed {
    pub record: DeltaRecord,
    pub duplicate: bool,
}

/// Daemon client
pub struct DaemonClient {
    socket_path: PathBuf,
}

impl DaemonClient {
    /// Connect to an existing daemon
    pub fn connect(socket_path: PathBuf) -> Result<Self, ClientError> {
        if !socket_path.exists() {
            return Err(ClientError::DaemonNotRunning(socket_path));
        }
        Ok(Self { socket_path })
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Send a request and receive a response
    pub async fn send(&self, request: Request) -> Result<Response, ClientError> {
        let timeout = timeout_ipc();
        tracing::debug!(socket = %self.socket_path.display(), ?request, "sending request");
        let stream = UnixStream::connect(&self.socket_path).await?;
        let (mut reader, mut writer) = stream.into_split();

        let data = protocol::encode(&request)?;
        tokio::time::timeout(timeout, protocol::write_message(&mut writer, &data))
            .await
            .map_err(|_| ProtocolError::Timeout)??;

        let response_bytes = tokio::time::timeout(timeout, protocol::read_message(&mut reader))
            .await
            .map_err(|_| ProtocolError::Timeout)??;

        Ok(protocol::decode(&response_bytes)?)
    }

    /// Protocol version via Hello handshake
    pub async fn hello(&self) -> Result<String, ClientError> {
        match self
            .send(Request::Hello {
                version: wv_daemon::PROTOCOL_VERSION.to_string(),
            })
            .await?
        {
            Response::Hello { version } => Ok(version),
            other => Err(unexpected(other)),
        }
    }

    pub async fn status(&self) -> Result<(u64, Vec<WaveletStatus>), ClientError> {
        match self.send(Request::Status).await? {
            Response::Status {
                uptime_secs,
                wavelets,
            } => Ok((uptime_secs, wavelets)),
            other => Err(unexpected(other)),
        }
    }

    pub async fn submit(
        &self,
        wavelet: WaveletName,
        delta: WaveletDelta,
    ) -> Result<Committed, ClientError> {
        match self.send(Request::Submit { wavelet, delta }).await? {
            Response::Committed { record, duplicate } => Ok(Committed { record, duplicate }),
            Response::Rejected { reason, .. } => Err(ClientError::Rejected(reason)),
            other => Err(unexpected(other)),
        }
    }

    /// Catch-up deltas, or `None` if no signature was recognized
    pub async fn reopen(
        &self,
        wavelet: WaveletName,
        known: Vec<HashedVersion>,
    ) -> Result<Option<(HashedVersion, Vec<TransformedWaveletDelta>)>, ClientError> {
        match self.send(Request::Reopen { wavelet, known }).await? {
            Response::Reopened {
                start_signature,
                deltas,
            } => Ok(Some((start_signature, deltas))),
            Response::NotRecognized => Ok(None),
            other => Err(unexpected(other)),
        }
    }

    pub async fn history(
        &self,
        wavelet: WaveletName,
        start: u64,
        end: Option<u64>,
    ) -> Result<Vec<DeltaRecord>, ClientError> {
        match self
            .send(Request::History {
                wavelet,
                start,
                end,
            })
            .await?
        {
            Response::Deltas { deltas } => Ok(deltas),
            other => Err(unexpected(other)),
        }
    }

    pub async fn list_wavelets(&self) -> Result<Vec<WaveletName>, ClientError> {
        match self.send(Request::ListWavelets).await? {
            Response::Wavelets { wavelets } => Ok(wavelets),
            other => Err(unexpected(other)),
        }
    }

    /// Returns false if the wavelet was not loaded
    pub async fn evict(&self, wavelet: WaveletName) -> Result<bool, ClientError> {
        match self.send(Request::Evict { wavelet }).await? {
            Response::Evicted { evicted } => Ok(evicted),
            other => Err(unexpected(other)),
        }
    }

    /// Request daemon shutdown
    pub async fn shutdown(&self) -> Result<(), ClientError> {
        match self.send(Request::Shutdown).await? {
            Response::ShuttingDown => Ok(()),
            other => Err(unexpected(other)),
        }
    }
}

fn unexpected(response: Response) -> ClientError {
    match response {
        Response::Error { message } => ClientError::Daemon(message),
        _ => ClientError::UnexpectedResponse,
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;

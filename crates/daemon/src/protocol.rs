// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire protocol between `wv` and `wvd`
//!
//! Every message is a 4-byte big-endian length followed by a JSON body.
//! A connection carries one request and one response.

use std::time::Duration;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use wv_core::{DeltaRecord, HashedVersion, TransformedWaveletDelta, WaveletDelta, WaveletName};
pub use wv_engine::WaveletStatus;

/// Bumped whenever a request or response changes shape
pub const PROTOCOL_VERSION: &str = "1";

/// Default budget for reading a request or writing a response
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Largest body either side will accept
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// Requests from the CLI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    Ping,
    Hello {
        version: String,
    },
    /// Submit a client delta to a wavelet
    Submit {
        wavelet: WaveletName,
        delta: WaveletDelta,
    },
    /// Catch up a reconnecting client from the signatures it holds
    Reopen {
        wavelet: WaveletName,
        known: Vec<HashedVersion>,
    },
    /// Committed records between two versions; `end` defaults to the current version
    History {
        wavelet: WaveletName,
        start: u64,
        end: Option<u64>,
    },
    ListWavelets,
    Evict {
        wavelet: WaveletName,
    },
    Status,
    Shutdown,
}

/// Responses from the daemon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    Pong,
    Hello {
        version: String,
    },
    ShuttingDown,
    /// The delta is durably committed (or was already)
    Committed {
        record: DeltaRecord,
        duplicate: bool,
    },
    /// The delta was refused; `client_error` is false for server-side failures
    Rejected {
        reason: String,
        client_error: bool,
    },
    Reopened {
        start_signature: HashedVersion,
        deltas: Vec<TransformedWaveletDelta>,
    },
    /// None of the client's signatures belong to this wavelet
    NotRecognized,
    Deltas {
        deltas: Vec<DeltaRecord>,
    },
    Wavelets {
        wavelets: Vec<WaveletName>,
    },
    Evicted {
        evicted: bool,
    },
    Status {
        uptime_secs: u64,
        wavelets: Vec<WaveletStatus>,
    },
    Error {
        message: String,
    },
}

/// Errors reading or writing protocol messages
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("message of {size} bytes exceeds limit of {max}")]
    MessageTooLarge { size: usize, max: usize },

    #[error("connection closed")]
    ConnectionClosed,

    #[error("timed out")]
    Timeout,
}

/// Serialize a message body (no length prefix)
pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, ProtocolError> {
    Ok(serde_json::to_vec(message)?)
}

/// Deserialize a message body
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ProtocolError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Read one length-prefixed message
pub async fn read_message<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Vec<u8>, ProtocolError> {
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(ProtocolError::ConnectionClosed)
        }
        Err(e) => return Err(e.into()),
    }

    let size = u32::from_be_bytes(len_buf) as usize;
    if size > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size,
            max: MAX_MESSAGE_SIZE,
        });
    }

    let mut body = vec![0u8; size];
    reader.read_exact(&mut body).await?;
    Ok(body)
}

/// Write one length-prefixed message
pub async fn write_message<W: AsyncWrite + Unpin>(
    writer: &mut W,
    data: &[u8],
) -> Result<(), ProtocolError> {
    if data.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: data.len(),
            max: MAX_MESSAGE_SIZE,
        });
    }
    let len = data.len() as u32;
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(data).await?;
    writer.flush().await?;
    Ok(())
}

/// Read and decode a request within `timeout`
pub async fn read_request<R: AsyncRead + Unpin>(
    reader: &mut R,
    timeout: Duration,
) -> Result<Request, ProtocolError> {
    let bytes = tokio::time::timeout(timeout, read_message(reader))
        .await
        .map_err(|_| ProtocolError::Timeout)??;
    decode(&bytes)
}

/// Encode and write a response within `timeout`
pub async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &Response,
    timeout: Duration,
) -> Result<(), ProtocolError> {
    let bytes = encode(response)?;
    tokio::time::timeout(timeout, write_message(writer, &bytes))
        .await
        .map_err(|_| ProtocolError::Timeout)?
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;

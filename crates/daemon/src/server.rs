// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Socket server and connection handling.
//!
//! Each accepted connection runs on its own task against a shared
//! [`ServerContext`], so submissions to different wavelets never wait on
//! each other.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};
use wv_core::Clock;
use wv_engine::WaveletRegistry;

use crate::protocol::{self, ProtocolError, Request, Response, DEFAULT_TIMEOUT, PROTOCOL_VERSION};

/// State shared by every connection task
pub struct ServerContext<C: Clock> {
    pub registry: Arc<WaveletRegistry<C>>,
    pub start_time: Instant,
    shutdown: Notify,
}

impl<C: Clock> ServerContext<C> {
    pub fn new(registry: Arc<WaveletRegistry<C>>, start_time: Instant) -> Self {
        Self {
            registry,
            start_time,
            shutdown: Notify::new(),
        }
    }

    pub fn request_shutdown(&self) {
        self.shutdown.notify_one();
    }

    /// Resolves once a client has asked the daemon to stop
    pub async fn shutdown_requested(&self) {
        self.shutdown.notified().await;
    }
}

/// Server errors
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Request timeout")]
    Timeout,

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Handle a single client connection
pub async fn handle_connection<S, C>(stream: S, ctx: &ServerContext<C>) -> Result<(), ServerError>
where
    S: AsyncRead + AsyncWrite + Unpin,
    C: Clock,
{
    let (mut reader, mut writer) = tokio::io::split(stream);

    let request = match protocol::read_request(&mut reader, DEFAULT_TIMEOUT).await {
        Ok(req) => req,
        Err(ProtocolError::Timeout) => {
            error!("Request read timeout");
            return Err(ServerError::Timeout);
        }
        Err(ProtocolError::ConnectionClosed) => {
            debug!("Client disconnected before sending request");
            return Ok(());
        }
        Err(ProtocolError::Json(e)) => {
            warn!("Rejecting malformed request: {}", e);
            let response = Response::Error {
                message: format!("invalid request: {}", e),
            };
            protocol::write_response(&mut writer, &response, DEFAULT_TIMEOUT).await?;
            return Ok(());
        }
        Err(e) => {
            error!("Failed to read request: {}", e);
            return Err(ServerError::Protocol(e));
        }
    };

    debug!("Received request: {:?}", request);

    let response = handle_request(ctx, request).await;

    debug!("Sending response: {:?}", response);

    protocol::write_response(&mut writer, &response, DEFAULT_TIMEOUT).await?;

    Ok(())
}

/// Handle a single request and return a response
pub async fn handle_request<C: Clock>(ctx: &ServerContext<C>, request: Request) -> Response {
    let registry = &ctx.registry;
    match request {
        Request::Ping => Response::Pong,

        Request::Hello { version } => {
            if version != PROTOCOL_VERSION {
                warn!(client = %version, server = PROTOCOL_VERSION, "protocol version mismatch");
            }
            Response::Hello {
                version: PROTOCOL_VERSION.to_string(),
            }
        }

        Request::Submit { wavelet, delta } => match registry.submit(&wavelet, delta).await {
            Ok(outcome) => Response::Committed {
                record: outcome.record.as_ref().clone(),
                duplicate: outcome.duplicate,
            },
            Err(e) => Response::Rejected {
                reason: e.to_string(),
                client_error: e.is_client_error(),
            },
        },

        Request::Reopen { wavelet, known } => match registry.reopen(&wavelet, &known).await {
            Ok(Some(reopened)) => Response::Reopened {
                start_signature: reopened.start_signature,
                deltas: reopened.deltas,
            },
            Ok(None) => Response::NotRecognized,
            Err(e) => error_response(e),
        },

        Request::History {
            wavelet,
            start,
            end,
        } => match registry.history(&wavelet, start, end).await {
            Ok(records) => Response::Deltas {
                deltas: records.iter().map(|r| r.as_ref().clone()).collect(),
            },
            Err(e) => error_response(e),
        },

        Request::ListWavelets => match registry.list_wavelets() {
            Ok(wavelets) => Response::Wavelets { wavelets },
            Err(e) => error_response(e),
        },

        Request::Evict { wavelet } => match registry.evict(&wavelet).await {
            Ok(evicted) => Response::Evicted { evicted },
            Err(e) => error_response(e),
        },

        Request::Status => Response::Status {
            uptime_secs: ctx.start_time.elapsed().as_secs(),
            wavelets: registry.status().await,
        },

        Request::Shutdown => {
            info!("Shutdown requested by client");
            ctx.request_shutdown();
            Response::ShuttingDown
        }
    }
}

fn error_response(e: impl std::fmt::Display) -> Response {
    Response::Error {
        message: e.to_string(),
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;

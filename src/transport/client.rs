use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::backoff::Backoff;
use super::endpoints::BackendEndpoints;
use super::http::BackendHttpClient;
use super::traits::{Outbound, OutboundFuture};
use super::websocket::{ConnectionStatus, SnapshotListener};
use crate::audio::AudioPayload;
use crate::config::Config;
use crate::error::TransportError;

/// Frames buffered between the socket and the store owner.
const FRAME_QUEUE_DEPTH: usize = 64;

/// Owns the persistent snapshot connection and the outbound request channel.
pub struct TransportClient {
    endpoints: BackendEndpoints,
    http: BackendHttpClient,
    initial_backoff_ms: u64,
    max_backoff_ms: u64,
}

impl TransportClient {
    pub fn new(config: &Config) -> Result<Self, TransportError> {
        let endpoints = BackendEndpoints::from_base_url(&config.backend.base_url)?;
        let http = BackendHttpClient::new(
            endpoints.clone(),
            Duration::from_secs(config.transport.request_timeout_secs.max(1)),
        )?;
        Ok(Self {
            endpoints,
            http,
            initial_backoff_ms: config.transport.initial_backoff_ms,
            max_backoff_ms: config.transport.max_backoff_ms,
        })
    }

    pub fn endpoints(&self) -> &BackendEndpoints {
        &self.endpoints
    }

    /// Open the snapshot socket. Raw snapshot payloads arrive on the returned
    /// receiver in arrival order; the connection lives as long as the guard.
    pub fn connect(&self) -> (Connection, mpsc::Receiver<String>) {
        let (frames_tx, frames_rx) = mpsc::channel(FRAME_QUEUE_DEPTH);
        let (status_tx, status_rx) = watch::channel(ConnectionStatus::Connecting);
        let cancel = CancellationToken::new();

        let listener = SnapshotListener::new(
            self.endpoints.snapshots.clone(),
            frames_tx,
            status_tx,
            Backoff::from_millis(self.initial_backoff_ms, self.max_backoff_ms),
        );
        let handle = tokio::spawn(listener.run(cancel.clone()));

        let connection = Connection {
            cancel,
            handle: Some(handle),
            status: status_rx,
        };
        (connection, frames_rx)
    }

    pub fn http(&self) -> &BackendHttpClient {
        &self.http
    }
}

impl Outbound for TransportClient {
    fn send_response<'a>(&'a self, text: &'a str) -> OutboundFuture<'a> {
        Box::pin(self.http.send_response(text))
    }

    fn send_audio<'a>(&'a self, payload: &'a AudioPayload) -> OutboundFuture<'a> {
        Box::pin(self.http.send_audio(payload))
    }
}

/// Scoped handle to the live snapshot connection. Dropping it tears the
/// connection down.
pub struct Connection {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
    status: watch::Receiver<ConnectionStatus>,
}

impl Connection {
    pub fn status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.clone()
    }

    /// Cancel the listener and wait for the socket to be released.
    pub async fn close(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take()
            && let Err(e) = handle.await
        {
            tracing::warn!("snapshot listener task ended abnormally: {e}");
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

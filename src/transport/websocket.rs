use futures_util::StreamExt;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::backoff::Backoff;
use crate::error::{SnapshotError, TransportError};

/// Connection state reported to the view layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Reconnecting { attempt: u32, delay: Duration },
    Closed,
}

/// Why one connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    /// The peer closed or the socket dropped; reconnect.
    Dropped,
    /// Teardown was requested or nobody reads frames any more.
    Shutdown,
}

/// Reads full scratchpad snapshots off the persistent socket and forwards
/// them, in arrival order, to the single store owner.
pub struct SnapshotListener {
    url: Url,
    frames: mpsc::Sender<String>,
    status: watch::Sender<ConnectionStatus>,
    backoff: Backoff,
}

impl SnapshotListener {
    pub fn new(
        url: Url,
        frames: mpsc::Sender<String>,
        status: watch::Sender<ConnectionStatus>,
        backoff: Backoff,
    ) -> Self {
        Self {
            url,
            frames,
            status,
            backoff,
        }
    }

    /// Connect, listen, and reconnect with backoff until `cancel` fires or
    /// the frame receiver is dropped.
    pub async fn run(mut self, cancel: CancellationToken) {
        self.status.send_replace(ConnectionStatus::Connecting);
        loop {
            let end = tokio::select! {
                () = cancel.cancelled() => SessionEnd::Shutdown,
                result = self.connect_and_listen() => match result {
                    Ok(end) => end,
                    Err(e) => {
                        tracing::warn!(error = %e, "snapshot socket failed");
                        SessionEnd::Dropped
                    }
                },
            };

            if end == SessionEnd::Shutdown || cancel.is_cancelled() || self.frames.is_closed() {
                break;
            }

            let delay = self.backoff.next_delay();
            let attempt = self.backoff.attempt();
            tracing::info!(
                url = %self.url,
                attempt,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "snapshot socket closed; reconnecting"
            );
            self.status
                .send_replace(ConnectionStatus::Reconnecting { attempt, delay });

            tokio::select! {
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(delay) => {}
            }
        }

        self.status.send_replace(ConnectionStatus::Closed);
        tracing::debug!(url = %self.url, "snapshot listener stopped");
    }

    async fn connect_and_listen(&mut self) -> Result<SessionEnd, TransportError> {
        let (mut ws_stream, _response) = tokio_tungstenite::connect_async(self.url.as_str())
            .await
            .map_err(|e| TransportError::Connection {
                url: self.url.to_string(),
                message: e.to_string(),
            })?;

        tracing::info!(url = %self.url, "snapshot socket connected");
        self.status.send_replace(ConnectionStatus::Connected);
        self.backoff.reset();

        while let Some(message) = ws_stream.next().await {
            let message = message.map_err(|e| TransportError::Connection {
                url: self.url.to_string(),
                message: e.to_string(),
            })?;

            if matches!(message, Message::Close(_)) {
                tracing::warn!(url = %self.url, "backend closed snapshot socket");
                return Ok(SessionEnd::Dropped);
            }

            match websocket_message_to_text(message) {
                Ok(Some(raw)) => {
                    if self.frames.send(raw).await.is_err() {
                        return Ok(SessionEnd::Shutdown);
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "discarding undecodable snapshot frame");
                }
            }
        }

        tracing::warn!(url = %self.url, "snapshot socket ended");
        Ok(SessionEnd::Dropped)
    }
}

/// Snapshot text carried by a frame, `None` for control frames.
fn websocket_message_to_text(message: Message) -> Result<Option<String>, SnapshotError> {
    match message {
        Message::Text(text) => Ok(Some(text.to_string())),
        Message::Binary(bytes) => String::from_utf8(bytes.to_vec())
            .map(Some)
            .map_err(|_| SnapshotError::NotUtf8),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_and_utf8_binary_frames_carry_snapshots() {
        let text = websocket_message_to_text(Message::Text("{}".into())).unwrap();
        assert_eq!(text.as_deref(), Some("{}"));

        let binary =
            websocket_message_to_text(Message::Binary(b"{\"steps\":[]}".to_vec().into())).unwrap();
        assert_eq!(binary.as_deref(), Some("{\"steps\":[]}"));
    }

    #[test]
    fn non_utf8_binary_frames_are_rejected() {
        let err = websocket_message_to_text(Message::Binary(vec![0xff, 0xfe].into())).unwrap_err();
        assert!(matches!(err, SnapshotError::NotUtf8));
    }

    #[test]
    fn control_frames_are_not_snapshots() {
        assert!(
            websocket_message_to_text(Message::Ping(Vec::new().into()))
                .unwrap()
                .is_none()
        );
        assert!(
            websocket_message_to_text(Message::Pong(Vec::new().into()))
                .unwrap()
                .is_none()
        );
    }
}

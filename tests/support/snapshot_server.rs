#![allow(dead_code)]

use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::{WebSocketStream, accept_async};

use aethel_console::config::Config;
use aethel_console::transport::ConnectionStatus;

pub const WAIT: Duration = Duration::from_secs(5);

/// Local websocket backend that hands each accepted socket to the test.
pub struct SnapshotServer {
    pub base_url: String,
    sockets: mpsc::UnboundedReceiver<WebSocketStream<TcpStream>>,
}

impl SnapshotServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, sockets) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                if let Ok(ws) = accept_async(stream).await
                    && tx.send(ws).is_err()
                {
                    break;
                }
            }
        });

        Self {
            base_url: format!("http://{addr}"),
            sockets,
        }
    }

    pub async fn next_socket(&mut self) -> WebSocketStream<TcpStream> {
        tokio::time::timeout(WAIT, self.sockets.recv())
            .await
            .expect("client did not connect in time")
            .expect("accept loop stopped")
    }

    /// Client config pointed at this server, with fast reconnects.
    pub fn config(&self) -> Config {
        let mut config = Config::default();
        config.backend.base_url.clone_from(&self.base_url);
        config.transport.initial_backoff_ms = 20;
        config.transport.max_backoff_ms = 100;
        config
    }
}

pub async fn wait_for_status(
    status: &mut watch::Receiver<ConnectionStatus>,
    wanted: impl Fn(&ConnectionStatus) -> bool,
) -> ConnectionStatus {
    tokio::time::timeout(WAIT, async {
        loop {
            let current = status.borrow_and_update().clone();
            if wanted(&current) {
                return current;
            }
            if status.changed().await.is_err() {
                return status.borrow().clone();
            }
        }
    })
    .await
    .expect("status did not change in time")
}

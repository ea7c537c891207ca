use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;

use aethel_console::scratchpad::{IngestOutcome, ScratchpadStore};
use aethel_console::transport::{ConnectionStatus, TransportClient};

use super::snapshot_server::{SnapshotServer, WAIT, wait_for_status};

const FIRST: &str = r#"{"steps":[{"step_id":1,"action":"kg_search","result":"3 hits"}],"plan":[{"id":"p1","description":"Search","status":"done"}]}"#;
const SECOND: &str = r#"{"steps":[],"plan":[],"ui_action":{"type":"confirm","message":"Go?","options":["Yes","No"]}}"#;

async fn next_frame(frames: &mut tokio::sync::mpsc::Receiver<String>) -> String {
    tokio::time::timeout(WAIT, frames.recv())
        .await
        .expect("no frame in time")
        .expect("frame channel closed")
}

#[tokio::test]
async fn snapshots_arrive_in_order_and_malformed_ones_are_dropped() {
    let mut server = SnapshotServer::start().await;
    let client = TransportClient::new(&server.config()).unwrap();
    let (connection, mut frames) = client.connect();
    let mut status = connection.status();

    let mut socket = server.next_socket().await;
    wait_for_status(&mut status, |s| *s == ConnectionStatus::Connected).await;

    socket.send(Message::text(FIRST)).await.unwrap();
    socket.send(Message::text("{\"steps\": [")).await.unwrap();
    socket.send(Message::text(SECOND)).await.unwrap();

    let store = ScratchpadStore::new();
    assert!(store.ingest(&next_frame(&mut frames).await).is_applied());
    let after_first = store.current();

    let outcome = store.ingest(&next_frame(&mut frames).await);
    assert!(matches!(outcome, IngestOutcome::Discarded(_)));
    assert_eq!(store.current().revision(), after_first.revision());
    assert_eq!(
        store.current().snapshot().unwrap().steps[0].result_text(),
        "3 hits"
    );

    assert!(store.ingest(&next_frame(&mut frames).await).is_applied());
    let current = store.current();
    let snapshot = current.snapshot().unwrap();
    assert!(snapshot.steps.is_empty());
    assert!(snapshot.active_ui_action().is_some());

    connection.close().await;
}

#[tokio::test]
async fn reconnects_after_the_backend_closes_the_socket() {
    let mut server = SnapshotServer::start().await;
    let client = TransportClient::new(&server.config()).unwrap();
    let (connection, mut frames) = client.connect();
    let mut status = connection.status();

    let mut first = server.next_socket().await;
    first.send(Message::text(FIRST)).await.unwrap();
    assert_eq!(next_frame(&mut frames).await, FIRST);
    first.close(None).await.unwrap();

    let reconnecting = wait_for_status(&mut status, |s| {
        matches!(s, ConnectionStatus::Reconnecting { .. })
    })
    .await;
    assert!(matches!(
        reconnecting,
        ConnectionStatus::Reconnecting { attempt: 1, .. }
    ));

    let mut second = server.next_socket().await;
    wait_for_status(&mut status, |s| *s == ConnectionStatus::Connected).await;
    second.send(Message::text(SECOND)).await.unwrap();
    assert_eq!(next_frame(&mut frames).await, SECOND);

    connection.close().await;
}

#[tokio::test]
async fn closing_the_connection_releases_the_socket() {
    let mut server = SnapshotServer::start().await;
    let client = TransportClient::new(&server.config()).unwrap();
    let (connection, _frames) = client.connect();
    let mut status = connection.status();

    let mut socket = server.next_socket().await;
    wait_for_status(&mut status, |s| *s == ConnectionStatus::Connected).await;

    connection.close().await;
    assert_eq!(*status.borrow(), ConnectionStatus::Closed);

    let ended = tokio::time::timeout(WAIT, async {
        loop {
            match socket.next().await {
                None | Some(Err(_) | Ok(Message::Close(_))) => return,
                Some(Ok(_)) => {}
            }
        }
    })
    .await;
    assert!(ended.is_ok(), "socket stayed open after close");
}

#[tokio::test]
async fn keeps_retrying_while_backend_is_down() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut config = aethel_console::config::Config::default();
    config.backend.base_url = format!("http://{addr}");
    config.transport.initial_backoff_ms = 10;
    config.transport.max_backoff_ms = 20;

    let client = TransportClient::new(&config).unwrap();
    let (connection, _frames) = client.connect();
    let mut status = connection.status();

    wait_for_status(&mut status, |s| {
        matches!(s, ConnectionStatus::Reconnecting { attempt, .. } if *attempt >= 3)
    })
    .await;

    connection.close().await;
}

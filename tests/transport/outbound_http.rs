use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use aethel_console::audio::AudioPayload;
use aethel_console::config::Config;
use aethel_console::error::TransportError;
use aethel_console::transport::{Outbound, TransportClient};

fn client_for(base_url: &str) -> TransportClient {
    let mut config = Config::default();
    config.backend.base_url = base_url.to_string();
    TransportClient::new(&config).unwrap()
}

#[tokio::test]
async fn response_is_posted_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/input"))
        .and(body_json(json!({ "response": "  Yes, move them  " })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    client.send_response("  Yes, move them  ").await.unwrap();
}

#[tokio::test]
async fn base_url_path_prefix_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/agent/input"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&format!("{}/agent/", server.uri()));
    client.send_response("go").await.unwrap();
}

#[tokio::test]
async fn non_success_status_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/input"))
        .respond_with(ResponseTemplate::new(503).set_body_string("agent busy"))
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let err = client.send_response("hello").await.unwrap_err();
    match err {
        TransportError::Rejected { status, body, .. } => {
            assert_eq!(status, 503);
            assert!(body.contains("agent busy"));
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_backend_is_a_request_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(&format!("http://{addr}"));
    let err = client.send_response("hello").await.unwrap_err();
    assert!(matches!(err, TransportError::Request { .. }));
}

#[tokio::test]
async fn audio_is_uploaded_as_multipart_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/audio"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "accepted"})))
        .expect(1)
        .mount(&server)
        .await;

    let payload = AudioPayload::new(b"RIFF....WAVEdata".to_vec(), "audio/wav", "recording.wav");
    let client = client_for(&server.uri());
    client.send_audio(&payload).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];

    let content_type = request
        .headers
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.starts_with("multipart/form-data"));

    let body = String::from_utf8_lossy(&request.body);
    assert!(body.contains("name=\"file\""));
    assert!(body.contains("filename=\"recording.wav\""));
    assert!(body.contains("audio/wav"));
    assert!(body.contains("RIFF....WAVEdata"));
}

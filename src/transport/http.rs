use reqwest::Response;
use serde_json::json;
use std::time::Duration;
use url::Url;

use super::endpoints::BackendEndpoints;
use crate::audio::AudioPayload;
use crate::error::TransportError;

/// Request channel for human responses and audio uploads.
#[derive(Debug, Clone)]
pub struct BackendHttpClient {
    client: reqwest::Client,
    endpoints: BackendEndpoints,
}

impl BackendHttpClient {
    pub fn new(endpoints: BackendEndpoints, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Request {
                endpoint: endpoints.input.to_string(),
                message: format!("build HTTP client: {e}"),
            })?;
        Ok(Self { client, endpoints })
    }

    pub fn endpoints(&self) -> &BackendEndpoints {
        &self.endpoints
    }

    /// `POST /input` with `{"response": text}`.
    pub async fn send_response(&self, text: &str) -> Result<(), TransportError> {
        let url = &self.endpoints.input;
        let response = self
            .client
            .post(url.clone())
            .json(&json!({ "response": text }))
            .send()
            .await
            .map_err(|e| request_error(url, &e))?;
        ensure_success(url, response).await
    }

    /// `POST /audio` as multipart with the clip in the `file` part.
    pub async fn send_audio(&self, payload: &AudioPayload) -> Result<(), TransportError> {
        let url = &self.endpoints.audio;
        let part = reqwest::multipart::Part::bytes(payload.bytes.clone())
            .file_name(payload.file_name.clone())
            .mime_str(&payload.mime_type)
            .map_err(|e| TransportError::Request {
                endpoint: url.to_string(),
                message: format!("invalid audio MIME type {}: {e}", payload.mime_type),
            })?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(url.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| request_error(url, &e))?;
        ensure_success(url, response).await
    }
}

fn request_error(url: &Url, error: &reqwest::Error) -> TransportError {
    TransportError::Request {
        endpoint: url.to_string(),
        message: error.to_string(),
    }
}

async fn ensure_success(url: &Url, response: Response) -> Result<(), TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|error| format!("<failed to read response body: {error}>"));
    Err(TransportError::Rejected {
        endpoint: url.to_string(),
        status: status.as_u16(),
        body,
    })
}

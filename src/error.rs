use thiserror::Error;

// ─── Config errors ───────────────────────────────────────────────────────────

/// Config loading and validation. Fatal at startup only.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Transport errors ───────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid backend endpoint {endpoint}: {message}")]
    Endpoint { endpoint: String, message: String },

    #[error("websocket {url} connection failed: {message}")]
    Connection { url: String, message: String },

    #[error("request to {endpoint} failed: {message}")]
    Request { endpoint: String, message: String },

    #[error("{endpoint} rejected request ({status}): {body}")]
    Rejected {
        endpoint: String,
        status: u16,
        body: String,
    },
}

// ─── Snapshot errors ────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("payload is not valid JSON: {0}")]
    Parse(String),

    #[error("payload does not match the scratchpad shape: {0}")]
    Shape(String),

    #[error("binary frame is not UTF-8")]
    NotUtf8,
}

// ─── Audio errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no microphone available: {0}")]
    DeviceUnavailable(String),

    #[error("microphone access denied: {0}")]
    PermissionDenied(String),

    #[error("capture failed: {0}")]
    Capture(String),
}

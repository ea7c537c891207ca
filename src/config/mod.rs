pub mod schema;

pub use schema::{
    AudioConfig, BackendConfig, CaptureBackendKind, Config, ObservabilityConfig, PromptConfig,
    TransportConfig,
};

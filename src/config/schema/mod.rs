mod env_overrides;
mod loader;
#[cfg(test)]
mod test_env;
mod types;

pub use crate::audio::capture::{AudioConfig, CaptureBackendKind};
pub use types::{BackendConfig, Config, ObservabilityConfig, PromptConfig, TransportConfig};

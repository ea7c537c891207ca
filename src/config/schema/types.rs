use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::AudioConfig;
use crate::error::ConfigError;

// ── Top-level config ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Data directory (`~/.aethel`) - computed from home, not serialized
    #[serde(skip)]
    pub data_dir: PathBuf,
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub transport: TransportConfig,

    #[serde(default)]
    pub audio: AudioConfig,

    #[serde(default)]
    pub prompt: PromptConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = url::Url::parse(&self.backend.base_url).map_err(|e| {
            ConfigError::Validation(format!(
                "backend.base_url {:?} is not a URL: {e}",
                self.backend.base_url
            ))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Validation(format!(
                "backend.base_url must use http or https, got {}",
                url.scheme()
            )));
        }
        if self.transport.initial_backoff_ms == 0 {
            return Err(ConfigError::Validation(
                "transport.initial_backoff_ms must be greater than 0".into(),
            ));
        }
        if self.audio.sample_rate == 0 || self.audio.channels == 0 {
            return Err(ConfigError::Validation(
                "audio.sample_rate and audio.channels must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Log file used by the full-screen console.
    pub fn log_file_path(&self) -> PathBuf {
        self.observability
            .log_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("console.log"))
    }
}

// ── Backend ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the agent backend (default: http://localhost:8000).
    /// The websocket, `/input` and `/audio` endpoints hang off it.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    "http://localhost:8000".into()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

// ── Transport ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// First reconnect delay after the snapshot socket drops
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Upper bound for a single reconnect delay (attempts are unlimited)
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Per-request timeout for `/input` and `/audio`
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_initial_backoff_ms() -> u64 {
    500
}

fn default_max_backoff_ms() -> u64 {
    30_000
}

fn default_request_timeout_secs() -> u64 {
    15
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

// ── Prompt ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Invite the human to answer again when the agent has not resolved a
    /// prompt this long after a response was sent. Disabled when unset.
    #[serde(default)]
    pub confirm_timeout_secs: Option<u64>,
}

impl PromptConfig {
    pub fn confirm_timeout(&self) -> Option<std::time::Duration> {
        self.confirm_timeout_secs
            .filter(|secs| *secs > 0)
            .map(std::time::Duration::from_secs)
    }
}

// ── Observability ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// `tracing` filter directive, e.g. "info" or "aethel_console=debug"
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Console log file (default: ~/.aethel/console.log)
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_file: None,
        }
    }
}

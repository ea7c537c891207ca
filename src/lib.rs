#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

pub mod app;
pub mod audio;
pub mod cli;
pub mod config;
pub mod console;
pub mod coordinator;
pub mod dispatch;
pub mod error;
pub mod notifications;
pub mod observability;
pub mod scratchpad;
pub mod transport;

pub use config::Config;
pub use error::{AudioError, ConfigError, SnapshotError, TransportError};

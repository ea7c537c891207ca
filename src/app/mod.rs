//! Command routing for the binary.

pub mod dispatch;
pub mod style;
pub mod tail;

pub use dispatch::{apply_cli_overrides, dispatch};

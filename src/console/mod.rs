//! Full-screen terminal console: live timeline, plan, command input and the
//! blocking prompt modal.

mod app;
pub mod handlers;
pub mod render;
pub mod state;
pub mod theme;
pub mod widgets;

pub use app::{ConsoleSession, run_console};
pub use state::ConsoleState;

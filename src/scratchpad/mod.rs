//! The single synchronized view of agent state.
//!
//! Inbound snapshots are parsed into [`Scratchpad`] values and swapped into the
//! [`ScratchpadStore`] whole. There is no field-level update path.

pub mod store;
pub mod types;

pub use store::{IngestOutcome, ScratchpadReader, ScratchpadStore, StoreView};
pub use types::{
    ExecutionStep, PlanItem, PlanStatus, RenderKey, Scratchpad, SnapshotMeta, UiActionRequest,
};

use std::sync::Arc;
use tokio::sync::watch;

use super::types::Scratchpad;
use crate::error::SnapshotError;

/// What a consumer sees when it reads the store.
#[derive(Debug, Clone, Default)]
pub enum StoreView {
    /// No snapshot has arrived yet; render a loading state.
    #[default]
    Uninitialized,
    Ready {
        snapshot: Arc<Scratchpad>,
        /// Number of replacements applied so far, starting at 1.
        revision: u64,
    },
}

impl StoreView {
    pub fn snapshot(&self) -> Option<&Arc<Scratchpad>> {
        match self {
            Self::Uninitialized => None,
            Self::Ready { snapshot, .. } => Some(snapshot),
        }
    }

    pub fn revision(&self) -> u64 {
        match self {
            Self::Uninitialized => 0,
            Self::Ready { revision, .. } => *revision,
        }
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }
}

#[derive(Debug)]
pub enum IngestOutcome {
    Applied { revision: u64 },
    Discarded(SnapshotError),
}

impl IngestOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Owner of the single current scratchpad.
///
/// There is exactly one writer. Views hold [`ScratchpadReader`]s and only ever
/// see whole snapshots: the value is swapped behind an `Arc`, never edited.
#[derive(Debug)]
pub struct ScratchpadStore {
    tx: watch::Sender<StoreView>,
}

impl Default for ScratchpadStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ScratchpadStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(StoreView::Uninitialized);
        Self { tx }
    }

    pub fn reader(&self) -> ScratchpadReader {
        ScratchpadReader {
            rx: self.tx.subscribe(),
        }
    }

    pub fn current(&self) -> StoreView {
        self.tx.borrow().clone()
    }

    /// Atomically swap in a new snapshot and notify readers. Returns the new
    /// revision.
    pub fn replace(&self, snapshot: Scratchpad) -> u64 {
        let snapshot = Arc::new(snapshot);
        let mut revision = 0;
        self.tx.send_modify(|view| {
            revision = view.revision() + 1;
            *view = StoreView::Ready { snapshot, revision };
        });
        revision
    }

    /// Parse an inbound payload and apply it. A malformed payload is logged
    /// and dropped; the previous snapshot stays in place.
    pub fn ingest(&self, raw: &str) -> IngestOutcome {
        match Scratchpad::from_json(raw) {
            Ok(snapshot) => {
                let revision = self.replace(snapshot);
                tracing::debug!(revision, "applied scratchpad snapshot");
                IngestOutcome::Applied { revision }
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    bytes = raw.len(),
                    "discarding malformed scratchpad snapshot; keeping previous state"
                );
                IngestOutcome::Discarded(e)
            }
        }
    }
}

/// Read-only handle given to views.
#[derive(Debug, Clone)]
pub struct ScratchpadReader {
    rx: watch::Receiver<StoreView>,
}

impl ScratchpadReader {
    pub fn current(&self) -> StoreView {
        self.rx.borrow().clone()
    }

    /// Wait for the next replacement. Returns `false` once the store is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

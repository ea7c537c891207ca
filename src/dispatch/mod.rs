//! Single entry point for everything the human sends as text.

use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;

use crate::console::widgets::TextInput;
use crate::coordinator::PromptCoordinator;
use crate::notifications::{Notification, NotificationSender, preview};
use crate::transport::Outbound;

const NOTICE_PREVIEW_CHARS: usize = 48;

/// Forwards typed commands and prompt answers to the backend. Both go through
/// the same `send_response` call; only the calling surface differs.
#[derive(Clone)]
pub struct CommandDispatcher {
    outbound: Arc<dyn Outbound>,
    notices: NotificationSender,
}

impl CommandDispatcher {
    pub fn new(outbound: Arc<dyn Outbound>, notices: NotificationSender) -> Self {
        Self { outbound, notices }
    }

    /// Send `text` without waiting. The outcome arrives as a notification.
    pub fn submit(&self, text: String) -> JoinHandle<()> {
        let outbound = Arc::clone(&self.outbound);
        let notices = self.notices.clone();
        tokio::spawn(async move {
            let notice = match outbound.send_response(&text).await {
                Ok(()) => {
                    tracing::debug!(chars = text.chars().count(), "response delivered");
                    Notification::info(format!("sent: {}", preview(&text, NOTICE_PREVIEW_CHARS)))
                }
                Err(e) => {
                    tracing::warn!(error = %e, "response not delivered");
                    Notification::error(format!("not delivered: {e}"))
                }
            };
            // The view may already be gone during teardown.
            let _ = notices.send(notice);
        })
    }

    /// Submit whatever is in the command input and clear it, whatever the
    /// send outcome. With a pending prompt the text is recorded as its answer.
    pub fn submit_input(
        &self,
        input: &mut TextInput,
        prompt: &mut PromptCoordinator,
    ) -> Option<JoinHandle<()>> {
        if input.is_empty() {
            return None;
        }
        if !prompt.accepts(&input.value) {
            let _ = self
                .notices
                .send(Notification::warning("choose one of the offered options"));
            return None;
        }

        let text = input.take();
        prompt.record_submission(&text, Instant::now());
        Some(self.submit(text))
    }

    /// Answer the pending prompt with the option at `index`, sent verbatim.
    pub fn submit_option(
        &self,
        prompt: &mut PromptCoordinator,
        index: usize,
    ) -> Option<JoinHandle<()>> {
        let choice = prompt
            .active()
            .and_then(|active| active.choices())
            .and_then(|choices| choices.get(index))
            .cloned()?;
        prompt.record_submission(&choice, Instant::now());
        Some(self.submit(choice))
    }
}

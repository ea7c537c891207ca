use std::collections::VecDeque;

use crate::coordinator::{PromptCoordinator, PromptTransition};
use crate::notifications::Notification;
use crate::scratchpad::{Scratchpad, StoreView};
use crate::transport::ConnectionStatus;

use super::widgets::{LoadingIndicator, TextInput};

const MAX_NOTICES: usize = 5;

/// Everything the console renders. Owned by the event loop.
#[derive(Debug)]
pub struct ConsoleState {
    pub view: StoreView,
    pub connection: ConnectionStatus,
    pub input: TextInput,
    pub prompt: PromptCoordinator,
    /// Highlighted option while a multiple-choice prompt is open.
    pub selected_option: usize,
    pub recording: bool,
    pub notices: VecDeque<Notification>,
    pub loading: LoadingIndicator,
    pub should_quit: bool,
}

impl ConsoleState {
    pub fn new(prompt: PromptCoordinator) -> Self {
        Self {
            view: StoreView::Uninitialized,
            connection: ConnectionStatus::Connecting,
            input: TextInput::default(),
            prompt,
            selected_option: 0,
            recording: false,
            notices: VecDeque::with_capacity(MAX_NOTICES),
            loading: LoadingIndicator::default(),
            should_quit: false,
        }
    }

    pub fn snapshot(&self) -> Option<&Scratchpad> {
        self.view.snapshot().map(|snapshot| &**snapshot)
    }

    /// Take a newly applied store view and let the coordinator see it.
    pub fn apply_view(&mut self, view: StoreView) -> PromptTransition {
        self.view = view;
        let transition = match self.view.snapshot() {
            Some(snapshot) => self.prompt.observe(snapshot),
            None => PromptTransition::StillIdle,
        };
        if matches!(
            transition,
            PromptTransition::Opened | PromptTransition::Replaced | PromptTransition::Resolved
        ) {
            self.selected_option = 0;
        }
        transition
    }

    pub fn options(&self) -> &[String] {
        self.prompt
            .active()
            .and_then(|active| active.choices())
            .unwrap_or_default()
    }

    pub fn select_next_option(&mut self) {
        let count = self.options().len();
        if count > 0 {
            self.selected_option = (self.selected_option + 1) % count;
        }
    }

    pub fn select_prev_option(&mut self) {
        let count = self.options().len();
        if count > 0 {
            self.selected_option = (self.selected_option + count - 1) % count;
        }
    }

    pub fn push_notice(&mut self, notice: Notification) {
        if self.notices.len() == MAX_NOTICES {
            self.notices.pop_front();
        }
        self.notices.push_back(notice);
    }

    pub fn latest_notice(&self) -> Option<&Notification> {
        self.notices.back()
    }
}

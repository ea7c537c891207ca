//! Blocking prompt ("UI action") state machine.
//!
//! The backend is the only authority on resolution: answering a prompt is
//! recorded but never clears it. Only a snapshot without an active
//! `ui_action` returns the coordinator to idle.

use std::time::{Duration, Instant};

use crate::scratchpad::{Scratchpad, UiActionRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub text: String,
    pub at: Instant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivePrompt {
    pub request: UiActionRequest,
    pub opened_at: Instant,
    /// The human's answer, while the backend has not yet confirmed it.
    pub submitted: Option<Submission>,
    /// Set after a confirmation timeout so the view can ask again.
    pub reprompted: bool,
}

impl ActivePrompt {
    fn new(request: UiActionRequest, now: Instant) -> Self {
        Self {
            request,
            opened_at: now,
            submitted: None,
            reprompted: false,
        }
    }

    pub fn choices(&self) -> Option<&[String]> {
        self.request.choices()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PromptState {
    #[default]
    Idle,
    AwaitingResponse(ActivePrompt),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptTransition {
    StillIdle,
    Opened,
    /// A different request arrived while one was pending; it wins.
    Replaced,
    Unchanged,
    Resolved,
    /// No confirmation within the configured timeout; the answer may be sent
    /// again. The request stays pending.
    Reprompt,
}

#[derive(Debug, Default)]
pub struct PromptCoordinator {
    state: PromptState,
    confirm_timeout: Option<Duration>,
}

impl PromptCoordinator {
    pub fn new(confirm_timeout: Option<Duration>) -> Self {
        Self {
            state: PromptState::Idle,
            confirm_timeout,
        }
    }

    pub fn state(&self) -> &PromptState {
        &self.state
    }

    pub fn is_awaiting(&self) -> bool {
        matches!(self.state, PromptState::AwaitingResponse(_))
    }

    pub fn active(&self) -> Option<&ActivePrompt> {
        match &self.state {
            PromptState::Idle => None,
            PromptState::AwaitingResponse(prompt) => Some(prompt),
        }
    }

    /// Feed every applied snapshot, in order.
    pub fn observe(&mut self, snapshot: &Scratchpad) -> PromptTransition {
        self.observe_at(snapshot, Instant::now())
    }

    pub fn observe_at(&mut self, snapshot: &Scratchpad, now: Instant) -> PromptTransition {
        let incoming = snapshot.active_ui_action();
        let transition = match (&self.state, incoming) {
            (PromptState::Idle, None) => PromptTransition::StillIdle,
            (PromptState::AwaitingResponse(_), None) => {
                self.state = PromptState::Idle;
                PromptTransition::Resolved
            }
            (PromptState::Idle, Some(request)) => {
                self.state = PromptState::AwaitingResponse(ActivePrompt::new(request.clone(), now));
                PromptTransition::Opened
            }
            (PromptState::AwaitingResponse(current), Some(request)) => {
                if current.request == *request {
                    PromptTransition::Unchanged
                } else {
                    self.state =
                        PromptState::AwaitingResponse(ActivePrompt::new(request.clone(), now));
                    PromptTransition::Replaced
                }
            }
        };

        if !matches!(
            transition,
            PromptTransition::StillIdle | PromptTransition::Unchanged
        ) {
            tracing::info!(?transition, "ui action state changed");
        }
        transition
    }

    /// True when `text` is a valid answer to the pending request: anything
    /// goes without options, otherwise it must equal one exactly.
    pub fn accepts(&self, text: &str) -> bool {
        match self.active().and_then(ActivePrompt::choices) {
            Some(choices) => choices.iter().any(|choice| choice == text),
            None => true,
        }
    }

    /// Remember that the human answered. The state is not changed.
    pub fn record_submission(&mut self, text: &str, now: Instant) -> bool {
        let PromptState::AwaitingResponse(prompt) = &mut self.state else {
            return false;
        };
        prompt.submitted = Some(Submission {
            text: text.to_string(),
            at: now,
        });
        prompt.reprompted = false;
        true
    }

    /// Hardening beyond the backend contract: if an answer has gone
    /// unconfirmed for longer than the configured timeout, drop the recorded
    /// submission so the human can answer again. Fires once per submission.
    pub fn check_timeout(&mut self, now: Instant) -> Option<PromptTransition> {
        let timeout = self.confirm_timeout?;
        let PromptState::AwaitingResponse(prompt) = &mut self.state else {
            return None;
        };
        let submitted_at = prompt.submitted.as_ref()?.at;
        if now.saturating_duration_since(submitted_at) < timeout {
            return None;
        }

        tracing::warn!(
            timeout_secs = timeout.as_secs(),
            "agent has not resolved the prompt; asking again"
        );
        prompt.submitted = None;
        prompt.reprompted = true;
        Some(PromptTransition::Reprompt)
    }
}

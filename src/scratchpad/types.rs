use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SnapshotError;

/// Opaque identifier used only as a render key.
///
/// The backend sends integers today; strings are accepted as well. The value
/// is never interpreted, only compared and displayed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawKey", into = "String")]
pub struct RenderKey(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawKey {
    Number(serde_json::Number),
    Text(String),
}

impl From<RawKey> for RenderKey {
    fn from(raw: RawKey) -> Self {
        match raw {
            RawKey::Number(n) => Self(n.to_string()),
            RawKey::Text(s) => Self(s),
        }
    }
}

impl From<RenderKey> for String {
    fn from(key: RenderKey) -> Self {
        key.0
    }
}

impl From<&str> for RenderKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl RenderKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RenderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Completion status of a plan item.
///
/// Only `"done"` is recognised as done; any other value, `null`, or a missing
/// field reads as pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum PlanStatus {
    #[default]
    Pending,
    Done,
}

impl From<Option<String>> for PlanStatus {
    fn from(raw: Option<String>) -> Self {
        match raw.as_deref() {
            Some("done") => Self::Done,
            _ => Self::Pending,
        }
    }
}

impl From<PlanStatus> for String {
    fn from(status: PlanStatus) -> Self {
        match status {
            PlanStatus::Pending => "pending".into(),
            PlanStatus::Done => "done".into(),
        }
    }
}

/// One recorded unit of agent execution history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionStep {
    #[serde(alias = "stepId")]
    pub step_id: RenderKey,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub phase: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl ExecutionStep {
    /// `None` while the agent has not categorized the step yet.
    pub fn action_name(&self) -> Option<&str> {
        self.action.as_deref().filter(|a| !a.is_empty())
    }

    pub fn result_text(&self) -> &str {
        self.result.as_deref().unwrap_or("")
    }
}

/// One task in the agent's current plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanItem {
    pub id: RenderKey,
    pub description: String,
    #[serde(default)]
    pub status: PlanStatus,
}

impl PlanItem {
    pub fn is_done(&self) -> bool {
        self.status == PlanStatus::Done
    }
}

/// A backend-issued blocking request for human input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiActionRequest {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
}

impl UiActionRequest {
    /// A request is active iff its type is non-empty.
    pub fn is_active(&self) -> bool {
        self.kind.as_deref().is_some_and(|kind| !kind.is_empty())
    }

    /// The constrained choices, if any. An empty list counts as no choices.
    pub fn choices(&self) -> Option<&[String]> {
        self.options.as_deref().filter(|opts| !opts.is_empty())
    }

    pub fn title_text(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    pub fn message_text(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }
}

/// Session metadata attached to each snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMeta {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub iteration_count: Option<u64>,
    #[serde(default)]
    pub start_time: Option<String>,
}

/// The full synchronized agent state. Every inbound message carries one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scratchpad {
    pub steps: Vec<ExecutionStep>,
    pub plan: Vec<PlanItem>,
    #[serde(default, alias = "uiAction")]
    pub ui_action: Option<UiActionRequest>,
    #[serde(default)]
    pub meta: Option<SnapshotMeta>,
    #[serde(default)]
    pub final_output: Option<serde_json::Value>,
}

impl Scratchpad {
    /// Parse one inbound snapshot. A failure leaves no partial value behind.
    pub fn from_json(raw: &str) -> Result<Self, SnapshotError> {
        serde_json::from_str(raw).map_err(|err| {
            if err.is_data() {
                SnapshotError::Shape(err.to_string())
            } else {
                SnapshotError::Parse(err.to_string())
            }
        })
    }

    /// The pending UI action, if its type is non-empty.
    pub fn active_ui_action(&self) -> Option<&UiActionRequest> {
        self.ui_action.as_ref().filter(|action| action.is_active())
    }
}

//! Action types
//!
//! Actions are the side-effecting half of a rule. The action union is
//! closed: each kind carries its own typed payload, so the executor's
//! dispatch is an exhaustive match and an unhandled action kind is a
//! compile error rather than a runtime surprise.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use hd_core::{TicketPriority, TicketStatus};

/// A single action within a rule
///
/// Actions execute strictly in ascending `execution_order`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Position in the rule's action sequence
    #[serde(default)]
    pub execution_order: i32,

    /// What the action does
    #[serde(flatten)]
    pub kind: ActionKind,
}

impl Action {
    /// Create an action at a given position
    pub fn new(execution_order: i32, kind: ActionKind) -> Self {
        Self {
            execution_order,
            kind,
        }
    }
}

/// The closed set of action kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    /// Assign the ticket to an agent
    AssignToUser(AssignToUserAction),

    /// Assign the ticket to a team
    AssignToTeam(AssignToTeamAction),

    /// Change the ticket status
    ChangeStatus(ChangeStatusAction),

    /// Change the ticket priority
    ChangePriority(ChangePriorityAction),

    /// Attach a label (no-op if already present)
    AddLabel(LabelAction),

    /// Detach a label (no-op if absent)
    RemoveLabel(LabelAction),

    /// Send an email through the notifier
    SendEmail(SendEmailAction),

    /// Send an in-app notification through the notifier
    SendNotification(SendNotificationAction),

    /// Create a follow-up task linked to the ticket
    CreateTask(CreateTaskAction),

    /// Append an agent-only note to the ticket conversation
    AddInternalNote(InternalNoteAction),

    /// Set the ticket's SLA deadline
    SetSla(SetSlaAction),

    /// POST the ticket/event payload to an external URL
    TriggerWebhook(WebhookAction),
}

impl ActionKind {
    /// Get the action kind's wire name
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::AssignToUser(_) => "assign_to_user",
            ActionKind::AssignToTeam(_) => "assign_to_team",
            ActionKind::ChangeStatus(_) => "change_status",
            ActionKind::ChangePriority(_) => "change_priority",
            ActionKind::AddLabel(_) => "add_label",
            ActionKind::RemoveLabel(_) => "remove_label",
            ActionKind::SendEmail(_) => "send_email",
            ActionKind::SendNotification(_) => "send_notification",
            ActionKind::CreateTask(_) => "create_task",
            ActionKind::AddInternalNote(_) => "add_internal_note",
            ActionKind::SetSla(_) => "set_sla",
            ActionKind::TriggerWebhook(_) => "trigger_webhook",
        }
    }
}

/// Assign to a specific agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignToUserAction {
    /// Agent to assign
    pub user_id: String,
}

/// Assign to a team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignToTeamAction {
    /// Team to assign
    pub team_id: String,
}

/// Change ticket status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeStatusAction {
    /// New status
    pub status: TicketStatus,
}

/// Change ticket priority
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangePriorityAction {
    /// New priority
    pub priority: TicketPriority,
}

/// Add or remove a label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelAction {
    /// Label text
    pub label: String,
}

/// Send an email
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendEmailAction {
    /// Recipient address
    pub to: String,

    /// Subject line
    pub subject: String,

    /// Message body
    pub body: String,
}

/// Send an in-app notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendNotificationAction {
    /// Recipient user
    pub user_id: String,

    /// Notification text
    pub message: String,
}

/// Create a follow-up task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTaskAction {
    /// What needs doing
    pub description: String,

    /// Optional task assignee
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
}

/// Append an internal note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InternalNoteAction {
    /// Note body
    pub body: String,
}

/// Set the SLA deadline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetSlaAction {
    /// When the SLA is due
    pub deadline: SlaDeadline,
}

/// SLA deadline specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlaDeadline {
    /// Absolute deadline
    At(DateTime<Utc>),

    /// Relative deadline from execution time
    In {
        /// Minutes from now
        minutes: i64,
    },
}

impl SlaDeadline {
    /// Resolve to an absolute deadline relative to `now`
    pub fn resolve(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            SlaDeadline::At(t) => *t,
            SlaDeadline::In { minutes } => now + Duration::minutes(*minutes),
        }
    }
}

/// Call an external webhook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookAction {
    /// Target URL
    pub url: String,

    /// Per-call timeout in seconds (engine default applies if unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Extra fields merged into the POSTed payload
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub extra: HashMap<String, serde_json::Value>,
}

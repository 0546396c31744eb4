//! Execution log records
//!
//! One `ExecutionLog` is written per rule invocation attempt, whether or
//! not the conditions matched. Records are immutable once appended and are
//! the only place action/condition failures surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use ulid::Ulid;

use hd_core::{RuleId, TicketId, TriggerType};

use crate::action::ActionKind;

/// Outcome of one executed action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    /// Action kind wire name, e.g. "assign_to_team"
    pub action: String,

    /// Whether the action's side effect went through
    pub status: ActionStatus,

    /// Failure detail, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionOutcome {
    /// Record a successful action
    pub fn success(kind: &ActionKind) -> Self {
        Self {
            action: kind.name().to_string(),
            status: ActionStatus::Success,
            error: None,
        }
    }

    /// Record a failed action
    pub fn failed(kind: &ActionKind, error: impl std::fmt::Display) -> Self {
        Self {
            action: kind.name().to_string(),
            status: ActionStatus::Failed,
            error: Some(error.to_string()),
        }
    }

    /// Whether the action succeeded
    pub fn is_success(&self) -> bool {
        self.status == ActionStatus::Success
    }
}

/// Success/failure of a single action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Success,
    Failed,
}

/// Audit record of one rule invocation for one trigger event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionLog {
    /// Unique record id
    pub id: String,

    /// Rule that was evaluated
    pub rule_id: RuleId,

    /// Ticket the pass concerned
    pub ticket_id: TicketId,

    /// Trigger that started the pass
    pub trigger_type: TriggerType,

    /// Whether the condition set matched
    pub conditions_met: bool,

    /// Per-action outcomes, in execution order (empty when no match)
    #[serde(default)]
    pub actions_executed: Vec<ActionOutcome>,

    /// Rule-level error (condition failure, ticket load failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// How long the invocation took
    pub execution_time_ms: u64,

    /// When the record was written
    pub created_at: DateTime<Utc>,
}

impl ExecutionLog {
    /// Start a record for a rule invocation
    pub fn new(rule_id: RuleId, ticket_id: TicketId, trigger_type: TriggerType) -> Self {
        Self {
            id: Ulid::new().to_string(),
            rule_id,
            ticket_id,
            trigger_type,
            conditions_met: false,
            actions_executed: Vec::new(),
            error_message: None,
            execution_time_ms: 0,
            created_at: Utc::now(),
        }
    }

    /// Mark the conditions as matched and attach the action outcomes
    pub fn matched(mut self, outcomes: Vec<ActionOutcome>) -> Self {
        self.conditions_met = true;
        self.actions_executed = outcomes;
        self
    }

    /// Attach a rule-level error
    pub fn with_error(mut self, error: impl std::fmt::Display) -> Self {
        self.error_message = Some(error.to_string());
        self
    }

    /// Attach the measured duration
    pub fn timed(mut self, elapsed: Duration) -> Self {
        self.execution_time_ms = elapsed.as_millis() as u64;
        self
    }

    /// Count of actions that succeeded
    pub fn succeeded_actions(&self) -> usize {
        self.actions_executed
            .iter()
            .filter(|o| o.is_success())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionKind, LabelAction};

    fn add_label_kind() -> ActionKind {
        ActionKind::AddLabel(LabelAction {
            label: "bug".to_string(),
        })
    }

    #[test]
    fn test_log_defaults_to_no_match() {
        let log = ExecutionLog::new(
            RuleId::from("R1"),
            TicketId::from("T-1"),
            TriggerType::TicketCreated,
        );

        assert!(!log.conditions_met);
        assert!(log.actions_executed.is_empty());
        assert!(log.error_message.is_none());
    }

    #[test]
    fn test_matched_log_carries_outcomes() {
        let outcomes = vec![
            ActionOutcome::success(&add_label_kind()),
            ActionOutcome::failed(&add_label_kind(), "store unavailable"),
        ];

        let log = ExecutionLog::new(
            RuleId::from("R1"),
            TicketId::from("T-1"),
            TriggerType::TicketCreated,
        )
        .matched(outcomes)
        .timed(Duration::from_millis(12));

        assert!(log.conditions_met);
        assert_eq!(log.actions_executed.len(), 2);
        assert_eq!(log.succeeded_actions(), 1);
        assert_eq!(log.execution_time_ms, 12);
        assert_eq!(
            log.actions_executed[1].error.as_deref(),
            Some("store unavailable")
        );
    }

    #[test]
    fn test_log_serde_shape() {
        let log = ExecutionLog::new(
            RuleId::from("R2"),
            TicketId::from("T-2"),
            TriggerType::SlaBreach,
        )
        .with_error("rule store timed out");

        let json = serde_json::to_value(&log).unwrap();
        assert_eq!(json["rule_id"], "R2");
        assert_eq!(json["ticket_id"], "T-2");
        assert_eq!(json["trigger_type"], "sla_breach");
        assert_eq!(json["conditions_met"], false);
        assert_eq!(json["error_message"], "rule store timed out");
    }
}

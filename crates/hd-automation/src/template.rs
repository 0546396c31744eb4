//! Rule templates
//!
//! Templates are prebuilt trigger/condition/action bundles used to pre-fill
//! a new rule in the editor. They carry no runtime behavior: instantiating
//! one just produces a [`RuleConfig`] the operator can adjust and save.

use serde::{Deserialize, Serialize};
use serde_json::json;

use hd_core::{TicketPriority, TicketStatus, TriggerType};

use crate::action::{
    Action, ActionKind, AssignToTeamAction, ChangePriorityAction, CreateTaskAction,
    InternalNoteAction, LabelAction, SendEmailAction,
};
use crate::condition::{Condition, GroupCombinator};
use crate::rule::RuleConfig;

/// A named, categorized rule bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    /// Template name shown in the picker
    pub name: String,

    /// Grouping category, e.g. "triage", "sla"
    pub category: String,

    /// What the template does
    pub description: String,

    /// Trigger the resulting rule listens on
    pub trigger_type: TriggerType,

    /// Prefilled conditions
    pub conditions: Vec<Condition>,

    /// Prefilled actions
    pub actions: Vec<Action>,
}

impl Template {
    /// Produce a rule config from this template
    pub fn instantiate(&self, organization_id: impl Into<String>) -> RuleConfig {
        RuleConfig {
            id: None,
            name: self.name.clone(),
            description: Some(self.description.clone()),
            trigger_type: self.trigger_type,
            priority: 0,
            is_active: true,
            organization_id: organization_id.into(),
            conditions: self.conditions.clone(),
            actions: self.actions.clone(),
        }
    }

    /// The built-in template catalog
    pub fn builtin() -> Vec<Template> {
        vec![
            Template {
                name: "Urgent tickets to triage team".to_string(),
                category: "triage".to_string(),
                description: "Route newly created urgent tickets to the triage team"
                    .to_string(),
                trigger_type: TriggerType::TicketCreated,
                conditions: vec![Condition::equals("priority", json!("urgent"))],
                actions: vec![
                    Action::new(
                        0,
                        ActionKind::AssignToTeam(AssignToTeamAction {
                            team_id: "triage".to_string(),
                        }),
                    ),
                    Action::new(
                        1,
                        ActionKind::AddLabel(LabelAction {
                            label: "needs-triage".to_string(),
                        }),
                    ),
                ],
            },
            Template {
                name: "VIP fast lane".to_string(),
                category: "triage".to_string(),
                description:
                    "Bump open tickets from VIP customers (by tier or label) to high priority"
                        .to_string(),
                trigger_type: TriggerType::TicketCreated,
                conditions: vec![
                    Condition::equals("customer.type", json!("vip"))
                        .in_group(0, GroupCombinator::Any),
                    Condition::contains("labels", json!("vip")).in_group(0, GroupCombinator::Any),
                    Condition::equals("status", json!("open")).in_group(1, GroupCombinator::All),
                ],
                actions: vec![
                    Action::new(
                        0,
                        ActionKind::ChangePriority(ChangePriorityAction {
                            priority: TicketPriority::High,
                        }),
                    ),
                    Action::new(
                        1,
                        ActionKind::AddLabel(LabelAction {
                            label: "vip".to_string(),
                        }),
                    ),
                ],
            },
            Template {
                name: "SLA breach escalation".to_string(),
                category: "sla".to_string(),
                description: "Escalate and flag tickets that breached their SLA".to_string(),
                trigger_type: TriggerType::SlaBreach,
                conditions: vec![Condition::not_equals("status", json!("closed"))],
                actions: vec![
                    Action::new(
                        0,
                        ActionKind::ChangePriority(ChangePriorityAction {
                            priority: TicketPriority::Urgent,
                        }),
                    ),
                    Action::new(
                        1,
                        ActionKind::AddLabel(LabelAction {
                            label: "sla-breached".to_string(),
                        }),
                    ),
                    Action::new(
                        2,
                        ActionKind::SendEmail(SendEmailAction {
                            to: "escalations@example.com".to_string(),
                            subject: "SLA breach".to_string(),
                            body: "A ticket has breached its SLA and was escalated.".to_string(),
                        }),
                    ),
                ],
            },
            Template {
                name: "Log inbound replies".to_string(),
                category: "conversation".to_string(),
                description: "Leave an internal note whenever a customer message arrives"
                    .to_string(),
                trigger_type: TriggerType::MessageReceived,
                conditions: vec![],
                actions: vec![Action::new(
                    0,
                    ActionKind::AddInternalNote(InternalNoteAction {
                        body: "Customer replied; conversation needs review.".to_string(),
                    }),
                )],
            },
            Template {
                name: "Chase stale pending tickets".to_string(),
                category: "housekeeping".to_string(),
                description: "On the scheduler tick, open a follow-up task for pending tickets"
                    .to_string(),
                trigger_type: TriggerType::TimeBased,
                conditions: vec![Condition::equals(
                    "status",
                    json!(TicketStatus::Pending.as_str()),
                )],
                actions: vec![Action::new(
                    0,
                    ActionKind::CreateTask(CreateTaskAction {
                        description: "Follow up on pending ticket".to_string(),
                        assignee_id: None,
                    }),
                )],
            },
        ]
    }
}

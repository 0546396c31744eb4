//! Action execution
//!
//! The executor applies a rule's actions strictly in ascending
//! execution_order. It is an explicit fold over the action list: every
//! action produces an outcome, a failure is recorded and the chain keeps
//! going. There is no way to abort the remaining actions from inside one.

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, warn};

use hd_automation::{Action, ActionKind, ActionOutcome};
use hd_core::{Context, TicketId, TriggerEvent};
use hd_store::{Notifier, StoreError, TaskStore, TicketPatch, TicketStore, WebhookClient};

/// Default bound on a single external call (notification, webhook)
pub const DEFAULT_ACTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Why a single action failed
#[derive(Debug, Error)]
enum ActionError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Applies a rule's actions through the collaborator interfaces
pub struct ActionExecutor {
    tickets: Arc<dyn TicketStore>,
    notifier: Arc<dyn Notifier>,
    tasks: Arc<dyn TaskStore>,
    webhooks: Arc<dyn WebhookClient>,
    action_timeout: Duration,
}

impl ActionExecutor {
    /// Create an executor over the given collaborators
    pub fn new(
        tickets: Arc<dyn TicketStore>,
        notifier: Arc<dyn Notifier>,
        tasks: Arc<dyn TaskStore>,
        webhooks: Arc<dyn WebhookClient>,
    ) -> Self {
        Self {
            tickets,
            notifier,
            tasks,
            webhooks,
            action_timeout: DEFAULT_ACTION_TIMEOUT,
        }
    }

    /// Override the external-call timeout
    pub fn with_action_timeout(mut self, action_timeout: Duration) -> Self {
        self.action_timeout = action_timeout;
        self
    }

    /// Execute actions in ascending execution_order
    ///
    /// Returns one outcome per action, in the order they ran. Never fails
    /// as a whole: individual failures land in their outcome.
    pub async fn execute(
        &self,
        actions: &[Action],
        ticket_id: &TicketId,
        event: &TriggerEvent,
        ctx: &Context,
    ) -> Vec<ActionOutcome> {
        let mut ordered: Vec<&Action> = actions.iter().collect();
        ordered.sort_by_key(|a| a.execution_order);

        debug!(ticket_id = %ticket_id, count = ordered.len(), "Executing actions");

        let mut outcomes = Vec::with_capacity(ordered.len());
        for action in ordered {
            let outcome = match self.run_action(&action.kind, ticket_id, event, ctx).await {
                Ok(()) => ActionOutcome::success(&action.kind),
                Err(e) => {
                    warn!(
                        ticket_id = %ticket_id,
                        action = action.kind.name(),
                        error = %e,
                        "Action failed"
                    );
                    ActionOutcome::failed(&action.kind, e)
                }
            };
            outcomes.push(outcome);
        }
        outcomes
    }

    async fn run_action(
        &self,
        kind: &ActionKind,
        ticket_id: &TicketId,
        event: &TriggerEvent,
        ctx: &Context,
    ) -> Result<(), ActionError> {
        match kind {
            ActionKind::AssignToUser(a) => {
                self.tickets
                    .update(ticket_id, TicketPatch::assignee(&a.user_id), ctx)
                    .await?;
            }
            ActionKind::AssignToTeam(a) => {
                self.tickets
                    .update(ticket_id, TicketPatch::team(&a.team_id), ctx)
                    .await?;
            }
            ActionKind::ChangeStatus(a) => {
                self.tickets
                    .update(ticket_id, TicketPatch::status(a.status), ctx)
                    .await?;
            }
            ActionKind::ChangePriority(a) => {
                self.tickets
                    .update(ticket_id, TicketPatch::priority(a.priority), ctx)
                    .await?;
            }
            ActionKind::AddLabel(a) => {
                self.tickets.add_label(ticket_id, &a.label, ctx).await?;
            }
            ActionKind::RemoveLabel(a) => {
                self.tickets.remove_label(ticket_id, &a.label, ctx).await?;
            }
            ActionKind::SendEmail(a) => {
                self.bounded(self.notifier.send_email(&a.to, &a.subject, &a.body))
                    .await?;
            }
            ActionKind::SendNotification(a) => {
                self.bounded(self.notifier.send_in_app(&a.user_id, &a.message))
                    .await?;
            }
            ActionKind::CreateTask(a) => {
                self.tasks
                    .create_task(ticket_id, &a.description, a.assignee_id.as_deref())
                    .await?;
            }
            ActionKind::AddInternalNote(a) => {
                self.tickets
                    .append_internal_note(ticket_id, &a.body, ctx)
                    .await?;
            }
            ActionKind::SetSla(a) => {
                let due_at = a.deadline.resolve(chrono::Utc::now());
                self.tickets
                    .update(ticket_id, TicketPatch::sla_due_at(due_at), ctx)
                    .await?;
            }
            ActionKind::TriggerWebhook(a) => {
                let bound = a
                    .timeout_secs
                    .map(Duration::from_secs)
                    .unwrap_or(self.action_timeout);

                let mut payload = json!({
                    "ticket_id": ticket_id,
                    "trigger_type": event.trigger_type,
                    "occurred_at": event.occurred_at,
                    "rule_id": ctx.rule_id,
                    "metadata": event.metadata,
                });
                if let Some(map) = payload.as_object_mut() {
                    for (key, value) in &a.extra {
                        map.insert(key.clone(), value.clone());
                    }
                }

                timeout(bound, self.webhooks.post(&a.url, &payload, bound))
                    .await
                    .map_err(|_| ActionError::Timeout(bound))??;
            }
        }
        Ok(())
    }

    /// Bound an external call with the executor's timeout
    async fn bounded(
        &self,
        fut: impl std::future::Future<Output = Result<(), StoreError>>,
    ) -> Result<(), ActionError> {
        timeout(self.action_timeout, fut)
            .await
            .map_err(|_| ActionError::Timeout(self.action_timeout))?
            .map_err(ActionError::from)
    }
}

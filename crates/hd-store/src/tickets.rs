//! Ticket store interface and in-memory implementation
//!
//! The ticket store exposes the current snapshot for condition evaluation
//! and partial-field updates for actions. A patch is applied atomically per
//! ticket entry, so automation racing an agent edit cannot produce a
//! torn write.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use hd_core::{Context, TicketId, TicketPriority, TicketSnapshot, TicketStatus};

use crate::error::{StoreError, StoreResult};

/// Partial ticket update
///
/// Unset fields are left untouched. An empty patch is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TicketPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TicketStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TicketPriority>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sla_due_at: Option<DateTime<Utc>>,
}

impl TicketPatch {
    /// Patch assigning an agent
    pub fn assignee(user_id: impl Into<String>) -> Self {
        Self {
            assignee_id: Some(user_id.into()),
            ..Self::default()
        }
    }

    /// Patch assigning a team
    pub fn team(team_id: impl Into<String>) -> Self {
        Self {
            team_id: Some(team_id.into()),
            ..Self::default()
        }
    }

    /// Patch changing the status
    pub fn status(status: TicketStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Patch changing the priority
    pub fn priority(priority: TicketPriority) -> Self {
        Self {
            priority: Some(priority),
            ..Self::default()
        }
    }

    /// Patch setting the SLA deadline
    pub fn sla_due_at(due_at: DateTime<Utc>) -> Self {
        Self {
            sla_due_at: Some(due_at),
            ..Self::default()
        }
    }

    /// Whether the patch changes anything
    pub fn is_empty(&self) -> bool {
        self.assignee_id.is_none()
            && self.team_id.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.sla_due_at.is_none()
    }
}

/// An agent-only note on a ticket's conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InternalNote {
    /// Note body
    pub body: String,

    /// Who or what wrote it
    pub context: Context,

    /// When it was written
    pub created_at: DateTime<Utc>,
}

/// Read/write access to tickets
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Fetch the current snapshot of a ticket
    async fn get(&self, id: &TicketId) -> StoreResult<TicketSnapshot>;

    /// Apply a partial update
    async fn update(&self, id: &TicketId, patch: TicketPatch, context: &Context)
        -> StoreResult<()>;

    /// Attach a label; adding a present label is a no-op success
    async fn add_label(&self, id: &TicketId, label: &str, context: &Context) -> StoreResult<()>;

    /// Detach a label; removing an absent label is a no-op success
    async fn remove_label(&self, id: &TicketId, label: &str, context: &Context)
        -> StoreResult<()>;

    /// Append an internal note to the ticket conversation
    async fn append_internal_note(
        &self,
        id: &TicketId,
        body: &str,
        context: &Context,
    ) -> StoreResult<()>;
}

/// In-memory ticket store
///
/// Each mutation runs under the ticket's map entry, which gives the
/// per-field-group atomicity the update contract requires.
#[derive(Default)]
pub struct MemoryTicketStore {
    tickets: DashMap<TicketId, TicketSnapshot>,
    notes: DashMap<TicketId, Vec<InternalNote>>,
}

impl MemoryTicketStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a ticket
    pub fn insert(&self, ticket: TicketSnapshot) {
        self.tickets.insert(ticket.id.clone(), ticket);
    }

    /// Read the notes appended to a ticket
    pub fn notes(&self, id: &TicketId) -> Vec<InternalNote> {
        self.notes.get(id).map(|n| n.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TicketStore for MemoryTicketStore {
    async fn get(&self, id: &TicketId) -> StoreResult<TicketSnapshot> {
        self.tickets
            .get(id)
            .map(|t| t.clone())
            .ok_or_else(|| StoreError::TicketNotFound(id.clone()))
    }

    async fn update(
        &self,
        id: &TicketId,
        patch: TicketPatch,
        context: &Context,
    ) -> StoreResult<()> {
        let mut entry = self
            .tickets
            .get_mut(id)
            .ok_or_else(|| StoreError::TicketNotFound(id.clone()))?;

        debug!(ticket_id = %id, context_id = %context.id, ?patch, "Patching ticket");

        if let Some(assignee_id) = patch.assignee_id {
            entry.assignee_id = Some(assignee_id);
        }
        if let Some(team_id) = patch.team_id {
            entry.team_id = Some(team_id);
        }
        if let Some(status) = patch.status {
            entry.status = status;
        }
        if let Some(priority) = patch.priority {
            entry.priority = priority;
        }
        if let Some(sla_due_at) = patch.sla_due_at {
            entry.sla_due_at = Some(sla_due_at);
        }
        entry.updated_at = Utc::now();

        Ok(())
    }

    async fn add_label(&self, id: &TicketId, label: &str, context: &Context) -> StoreResult<()> {
        let mut entry = self
            .tickets
            .get_mut(id)
            .ok_or_else(|| StoreError::TicketNotFound(id.clone()))?;

        if entry.has_label(label) {
            trace!(ticket_id = %id, label, "Label already present");
            return Ok(());
        }

        debug!(ticket_id = %id, label, context_id = %context.id, "Adding label");
        entry.labels.push(label.to_string());
        entry.updated_at = Utc::now();
        Ok(())
    }

    async fn remove_label(&self, id: &TicketId, label: &str, context: &Context) -> StoreResult<()> {
        let mut entry = self
            .tickets
            .get_mut(id)
            .ok_or_else(|| StoreError::TicketNotFound(id.clone()))?;

        let before = entry.labels.len();
        entry.labels.retain(|l| l != label);

        if entry.labels.len() != before {
            debug!(ticket_id = %id, label, context_id = %context.id, "Removed label");
            entry.updated_at = Utc::now();
        } else {
            trace!(ticket_id = %id, label, "Label absent");
        }
        Ok(())
    }

    async fn append_internal_note(
        &self,
        id: &TicketId,
        body: &str,
        context: &Context,
    ) -> StoreResult<()> {
        if !self.tickets.contains_key(id) {
            return Err(StoreError::TicketNotFound(id.clone()));
        }

        debug!(ticket_id = %id, context_id = %context.id, "Appending internal note");
        self.notes.entry(id.clone()).or_default().push(InternalNote {
            body: body.to_string(),
            context: context.clone(),
            created_at: Utc::now(),
        });
        Ok(())
    }
}

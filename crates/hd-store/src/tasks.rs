//! Task store interface and in-memory implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Mutex;
use tracing::debug;
use ulid::Ulid;

use hd_core::TicketId;

use crate::error::{StoreError, StoreResult};

/// Creation of follow-up tasks linked to tickets
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Create a task; returns the new task's id
    async fn create_task(
        &self,
        ticket_id: &TicketId,
        description: &str,
        assignee_id: Option<&str>,
    ) -> StoreResult<String>;
}

/// A follow-up task captured by [`MemoryTaskStore`]
#[derive(Debug, Clone)]
pub struct FollowUpTask {
    /// Task id
    pub id: String,

    /// Ticket the task is linked to
    pub ticket_id: TicketId,

    /// What needs doing
    pub description: String,

    /// Optional assignee
    pub assignee_id: Option<String>,

    /// When the task was created
    pub created_at: DateTime<Utc>,
}

/// In-memory task store
#[derive(Default)]
pub struct MemoryTaskStore {
    tasks: Mutex<Vec<FollowUpTask>>,
}

impl MemoryTaskStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// All created tasks, in order
    pub fn tasks(&self) -> Vec<FollowUpTask> {
        self.tasks.lock().map(|t| t.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn create_task(
        &self,
        ticket_id: &TicketId,
        description: &str,
        assignee_id: Option<&str>,
    ) -> StoreResult<String> {
        let id = Ulid::new().to_string();
        debug!(ticket_id = %ticket_id, task_id = %id, "Creating follow-up task");

        self.tasks
            .lock()
            .map_err(|_| StoreError::Backend("task store lock poisoned".to_string()))?
            .push(FollowUpTask {
                id: id.clone(),
                ticket_id: ticket_id.clone(),
                description: description.to_string(),
                assignee_id: assignee_id.map(str::to_string),
                created_at: Utc::now(),
            });

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_task_links_ticket() {
        let store = MemoryTaskStore::new();
        let id = store
            .create_task(&TicketId::from("T-1"), "Call the customer", Some("U1"))
            .await
            .unwrap();

        let tasks = store.tasks();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, id);
        assert_eq!(tasks[0].ticket_id, TicketId::from("T-1"));
        assert_eq!(tasks[0].assignee_id.as_deref(), Some("U1"));
    }
}

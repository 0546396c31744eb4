//! Execution log store interface and in-memory implementation

use async_trait::async_trait;
use std::sync::RwLock;
use tracing::trace;

use hd_automation::ExecutionLog;
use hd_core::RuleId;

use crate::error::{StoreError, StoreResult};

/// Append-only storage for execution logs
#[async_trait]
pub trait ExecutionLogStore: Send + Sync {
    /// Persist one record; records are never mutated afterwards
    async fn append(&self, log: ExecutionLog) -> StoreResult<()>;

    /// All records for one rule, oldest first
    async fn list_by_rule(&self, rule_id: &RuleId) -> StoreResult<Vec<ExecutionLog>>;

    /// Most recent records across all rules, newest first
    async fn list_all(&self, limit: usize) -> StoreResult<Vec<ExecutionLog>>;
}

/// In-memory execution log store
#[derive(Default)]
pub struct MemoryExecutionLogStore {
    entries: RwLock<Vec<ExecutionLog>>,
}

impl MemoryExecutionLogStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub fn count(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }
}

#[async_trait]
impl ExecutionLogStore for MemoryExecutionLogStore {
    async fn append(&self, log: ExecutionLog) -> StoreResult<()> {
        trace!(rule_id = %log.rule_id, conditions_met = log.conditions_met, "Appending execution log");
        self.entries
            .write()
            .map_err(|_| StoreError::Backend("log store lock poisoned".to_string()))?
            .push(log);
        Ok(())
    }

    async fn list_by_rule(&self, rule_id: &RuleId) -> StoreResult<Vec<ExecutionLog>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| StoreError::Backend("log store lock poisoned".to_string()))?;

        Ok(entries
            .iter()
            .filter(|log| &log.rule_id == rule_id)
            .cloned()
            .collect())
    }

    async fn list_all(&self, limit: usize) -> StoreResult<Vec<ExecutionLog>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| StoreError::Backend("log store lock poisoned".to_string()))?;

        Ok(entries.iter().rev().take(limit).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hd_core::{TicketId, TriggerType};

    fn log(rule: &str) -> ExecutionLog {
        ExecutionLog::new(
            RuleId::from(rule),
            TicketId::from("T-1"),
            TriggerType::TicketCreated,
        )
    }

    #[tokio::test]
    async fn test_append_and_list_by_rule() {
        let store = MemoryExecutionLogStore::new();
        store.append(log("R1")).await.unwrap();
        store.append(log("R2")).await.unwrap();
        store.append(log("R1")).await.unwrap();

        let r1 = store.list_by_rule(&RuleId::from("R1")).await.unwrap();
        assert_eq!(r1.len(), 2);
        assert_eq!(store.count(), 3);
    }

    #[tokio::test]
    async fn test_list_all_newest_first_with_limit() {
        let store = MemoryExecutionLogStore::new();
        for rule in ["R1", "R2", "R3"] {
            store.append(log(rule)).await.unwrap();
        }

        let recent = store.list_all(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].rule_id, RuleId::from("R3"));
        assert_eq!(recent[1].rule_id, RuleId::from("R2"));
    }
}

//! Execution logging
//!
//! Thin append-only wrapper over the log store. Dispatch results are
//! observability-only: a broken audit sink is reported and otherwise
//! ignored, it never fails a pass.

use std::sync::Arc;
use tracing::warn;

use hd_automation::ExecutionLog;
use hd_core::RuleId;
use hd_store::{ExecutionLogStore, StoreResult};

/// Append-only audit sink for rule invocations
pub struct ExecutionLogger {
    store: Arc<dyn ExecutionLogStore>,
}

impl ExecutionLogger {
    /// Create a logger over a log store
    pub fn new(store: Arc<dyn ExecutionLogStore>) -> Self {
        Self { store }
    }

    /// Persist one record
    pub async fn record(&self, log: ExecutionLog) {
        if let Err(e) = self.store.append(log).await {
            warn!(error = %e, "Failed to append execution log");
        }
    }

    /// All records for one rule
    pub async fn for_rule(&self, rule_id: &RuleId) -> StoreResult<Vec<ExecutionLog>> {
        self.store.list_by_rule(rule_id).await
    }

    /// Most recent records across all rules
    pub async fn recent(&self, limit: usize) -> StoreResult<Vec<ExecutionLog>> {
        self.store.list_all(limit).await
    }
}

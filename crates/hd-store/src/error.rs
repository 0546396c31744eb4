//! Store errors

use hd_core::{RuleId, TicketId};
use thiserror::Error;

/// Errors surfaced by collaborator implementations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("ticket not found: {0}")]
    TicketNotFound(TicketId),

    #[error("rule not found: {0}")]
    RuleNotFound(RuleId),

    #[error("rule already exists: {0}")]
    RuleExists(RuleId),

    #[error("webhook request failed: {0}")]
    Webhook(String),

    #[error("backend error: {0}")]
    Backend(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

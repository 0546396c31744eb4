//! Collaborator interfaces for the helpdesk automation engine
//!
//! The engine never touches persistence directly: every side effect goes
//! through one of the traits in this crate. The surrounding application
//! implements them against its hosted backend; the `Memory*`
//! implementations here back tests and in-process embedding, and
//! [`HttpWebhookClient`] is the production webhook transport.

mod error;
mod logs;
mod notify;
mod rules;
mod tasks;
mod tickets;
mod webhook;

pub use error::{StoreError, StoreResult};
pub use logs::{ExecutionLogStore, MemoryExecutionLogStore};
pub use notify::{MemoryNotifier, Notifier, SentNotification};
pub use rules::{MemoryRuleStore, RuleStore};
pub use tasks::{FollowUpTask, MemoryTaskStore, TaskStore};
pub use tickets::{InternalNote, MemoryTicketStore, TicketPatch, TicketStore};
pub use webhook::{HttpWebhookClient, MemoryWebhookClient, WebhookClient};

//! Core types for the helpdesk automation engine
//!
//! This crate provides the fundamental vocabulary shared by every other
//! crate in the workspace: TicketId/RuleId, Context, TicketSnapshot,
//! TriggerType, and TriggerEvent.

mod context;
mod event;
mod ids;
mod ticket;

pub use context::Context;
pub use event::{TriggerEvent, TriggerType};
pub use ids::{RuleId, TicketId};
pub use ticket::{Customer, TicketPriority, TicketSnapshot, TicketStatus};

/// Maximum length for a ticket label
pub const MAX_LABEL_LENGTH: usize = 64;

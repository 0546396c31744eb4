//! Trigger event types
//!
//! A trigger event is the unit of work the dispatcher consumes: something
//! happened to a ticket (or the scheduler ticked) and the active rules for
//! that trigger type must be evaluated once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Context, TicketId};

/// The closed set of events that can fire automation rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    TicketCreated,
    TicketUpdated,
    TicketStatusChanged,
    TicketAssigned,
    MessageReceived,
    TimeBased,
    SlaBreach,
}

impl TriggerType {
    /// All trigger types, in declaration order
    pub const ALL: [TriggerType; 7] = [
        TriggerType::TicketCreated,
        TriggerType::TicketUpdated,
        TriggerType::TicketStatusChanged,
        TriggerType::TicketAssigned,
        TriggerType::MessageReceived,
        TriggerType::TimeBased,
        TriggerType::SlaBreach,
    ];

    /// Get the trigger type as its wire string
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerType::TicketCreated => "ticket_created",
            TriggerType::TicketUpdated => "ticket_updated",
            TriggerType::TicketStatusChanged => "ticket_status_changed",
            TriggerType::TicketAssigned => "ticket_assigned",
            TriggerType::MessageReceived => "message_received",
            TriggerType::TimeBased => "time_based",
            TriggerType::SlaBreach => "sla_breach",
        }
    }
}

impl std::fmt::Display for TriggerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An incoming event that starts one dispatch pass
///
/// Emitted by the surrounding application (ticket CRUD, email ingestion, a
/// scheduler for time_based/sla_breach). The metadata object carries
/// trigger-specific detail, e.g. the old and new status for
/// ticket_status_changed, and is addressable from conditions via
/// `trigger.*` paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerEvent {
    /// What kind of event this is
    pub trigger_type: TriggerType,

    /// The ticket the event concerns
    pub ticket_id: TicketId,

    /// Trigger-specific payload
    #[serde(default)]
    pub metadata: Value,

    /// When the event was emitted
    pub occurred_at: DateTime<Utc>,

    /// Context tracking who caused the event
    pub context: Context,
}

impl TriggerEvent {
    /// Create a new event with current timestamp and fresh context
    pub fn new(trigger_type: TriggerType, ticket_id: impl Into<TicketId>) -> Self {
        Self {
            trigger_type,
            ticket_id: ticket_id.into(),
            metadata: Value::Null,
            occurred_at: Utc::now(),
            context: Context::new(),
        }
    }

    /// Attach a metadata entry, creating the metadata object if needed
    pub fn with_meta(mut self, key: impl Into<String>, value: Value) -> Self {
        if !self.metadata.is_object() {
            self.metadata = Value::Object(serde_json::Map::new());
        }
        if let Some(map) = self.metadata.as_object_mut() {
            map.insert(key.into(), value);
        }
        self
    }

    /// Attach a context
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// Look up a metadata entry by key
    pub fn meta(&self, key: &str) -> Option<&Value> {
        self.metadata.as_object().and_then(|m| m.get(key))
    }
}

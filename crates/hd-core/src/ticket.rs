//! Ticket snapshot type and bounded field resolution
//!
//! The snapshot is the read model the automation engine evaluates conditions
//! against. Field access uses an explicit dot-path accessor over the known
//! ticket schema rather than a generic reflective walker, so the set of
//! addressable fields is closed and checked in one place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::TicketId;

/// Lifecycle status of a ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[default]
    Open,
    Pending,
    Resolved,
    Closed,
}

impl TicketStatus {
    /// Get the status as its wire string
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::Pending => "pending",
            TicketStatus::Resolved => "resolved",
            TicketStatus::Closed => "closed",
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Priority of a ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

impl TicketPriority {
    /// Get the priority as its wire string
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketPriority::Low => "low",
            TicketPriority::Normal => "normal",
            TicketPriority::High => "high",
            TicketPriority::Urgent => "urgent",
        }
    }
}

impl std::fmt::Display for TicketPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The customer a ticket belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    /// Customer id
    pub id: String,

    /// Customer email address
    pub email: String,

    /// Display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Customer tier, e.g. "standard" or "vip"
    #[serde(rename = "type")]
    pub kind: String,
}

impl Customer {
    fn field(&self, path: &str) -> Option<Value> {
        match path {
            "id" => Some(Value::String(self.id.clone())),
            "email" => Some(Value::String(self.email.clone())),
            "name" => self.name.clone().map(Value::String),
            "type" => Some(Value::String(self.kind.clone())),
            _ => None,
        }
    }
}

/// A point-in-time view of a ticket
///
/// Snapshots are read from the ticket store at evaluation time. Within one
/// dispatch pass the snapshot is refetched per rule, so a later rule
/// observes mutations applied by earlier rules' actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketSnapshot {
    /// The ticket this snapshot belongs to
    pub id: TicketId,

    /// Subject line
    pub subject: String,

    /// Free-form body of the original request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Current status
    pub status: TicketStatus,

    /// Current priority
    pub priority: TicketPriority,

    /// Assigned agent, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,

    /// Assigned team, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,

    /// Labels attached to the ticket (no duplicates)
    #[serde(default)]
    pub labels: Vec<String>,

    /// Customer that opened the ticket
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<Customer>,

    /// Owning organization
    pub organization_id: String,

    /// SLA deadline, if one is set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sla_due_at: Option<DateTime<Utc>>,

    /// When the ticket was created
    pub created_at: DateTime<Utc>,

    /// When the ticket was last modified
    pub updated_at: DateTime<Utc>,
}

impl TicketSnapshot {
    /// Resolve a dot-path field selector against this snapshot
    ///
    /// Returns `None` for a path outside the ticket schema or for a known
    /// field that currently has no value (unassigned ticket, absent
    /// customer). `None` is the undefined sentinel the condition evaluator
    /// builds its missing-field semantics on.
    pub fn field(&self, path: &str) -> Option<Value> {
        match path.split_once('.') {
            Some(("customer", rest)) => self.customer.as_ref().and_then(|c| c.field(rest)),
            Some(_) => None,
            None => match path {
                "id" => Some(Value::String(self.id.to_string())),
                "subject" => Some(Value::String(self.subject.clone())),
                "description" => self.description.clone().map(Value::String),
                "status" => Some(Value::String(self.status.as_str().to_string())),
                "priority" => Some(Value::String(self.priority.as_str().to_string())),
                "assignee_id" => self.assignee_id.clone().map(Value::String),
                "team_id" => self.team_id.clone().map(Value::String),
                "labels" => Some(Value::Array(
                    self.labels.iter().cloned().map(Value::String).collect(),
                )),
                "organization_id" => Some(Value::String(self.organization_id.clone())),
                "sla_due_at" => self.sla_due_at.map(|t| Value::String(t.to_rfc3339())),
                "created_at" => Some(Value::String(self.created_at.to_rfc3339())),
                "updated_at" => Some(Value::String(self.updated_at.to_rfc3339())),
                _ => None,
            },
        }
    }

    /// Check whether a label is present
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

//! Rule definition
//!
//! A rule is a named, prioritized bundle of one trigger type, a condition
//! set, and an ordered action list, scoped to an organization. Rules are
//! created and edited as a unit: saving a rule replaces its whole
//! condition/action set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hd_core::{RuleId, TriggerType};

use crate::action::Action;
use crate::condition::Condition;

/// Rule creation/edit payload
///
/// The serde-facing shape: id is optional (a ULID is generated when
/// absent), priority defaults to 0, and rules start active.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Unique id (generated if not provided)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RuleId>,

    /// Human-readable name
    pub name: String,

    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Event type that fires this rule
    pub trigger_type: TriggerType,

    /// Higher priority runs first within a dispatch pass
    #[serde(default)]
    pub priority: i32,

    /// Whether the rule participates in dispatch
    #[serde(default = "default_active")]
    pub is_active: bool,

    /// Owning organization
    pub organization_id: String,

    /// Condition set (empty = always matches)
    #[serde(default)]
    pub conditions: Vec<Condition>,

    /// Action list (empty = no-op match)
    #[serde(default)]
    pub actions: Vec<Action>,
}

fn default_active() -> bool {
    true
}

/// A stored automation rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    /// Unique identifier
    pub id: RuleId,

    /// Human-readable name
    pub name: String,

    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Event type that fires this rule
    pub trigger_type: TriggerType,

    /// Higher priority runs first
    pub priority: i32,

    /// Whether the rule participates in dispatch
    pub is_active: bool,

    /// Owning organization
    pub organization_id: String,

    /// Condition set
    pub conditions: Vec<Condition>,

    /// Action list
    pub actions: Vec<Action>,

    /// When the rule was created
    pub created_at: DateTime<Utc>,
}

impl Rule {
    /// Create a rule from a config
    pub fn from_config(config: RuleConfig) -> Self {
        let id = config.id.unwrap_or_default();

        Self {
            id,
            name: config.name,
            description: config.description,
            trigger_type: config.trigger_type,
            priority: config.priority,
            is_active: config.is_active,
            organization_id: config.organization_id,
            conditions: config.conditions,
            actions: config.actions,
            created_at: Utc::now(),
        }
    }

    /// Check whether this rule should be considered for a trigger
    pub fn matches_trigger(&self, trigger_type: TriggerType) -> bool {
        self.is_active && self.trigger_type == trigger_type
    }
}

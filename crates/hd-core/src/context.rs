//! Context type for tracking the origin and causality of ticket mutations

use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::RuleId;

/// Context for tracking who or what caused a mutation or event
///
/// Every trigger event and every ticket mutation carries a Context that
/// identifies the initiating actor (an agent, or an automation rule) and
/// allows tracing the chain of mutations a single event produced. When a
/// rule's actions mutate a ticket, the mutation context carries the rule id
/// and points back at the triggering event's context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    /// Unique identifier for this context (ULID)
    pub id: String,

    /// User that initiated this action (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Automation rule responsible for this action (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<RuleId>,

    /// Parent context id for tracking causality chains
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl Context {
    /// Create a new context with a fresh ULID
    pub fn new() -> Self {
        Self {
            id: Ulid::new().to_string(),
            user_id: None,
            rule_id: None,
            parent_id: None,
        }
    }

    /// Create a new context attributed to a specific user
    pub fn with_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::new()
        }
    }

    /// Create a child context attributed to an automation rule
    ///
    /// Used by the action executor so that every mutation it applies can be
    /// traced back to the rule and, through the parent chain, to the
    /// trigger event that started the pass.
    pub fn for_rule(&self, rule_id: RuleId) -> Self {
        Self {
            id: Ulid::new().to_string(),
            user_id: self.user_id.clone(),
            rule_id: Some(rule_id),
            parent_id: Some(self.id.clone()),
        }
    }

    /// Create a child context with this context as parent
    pub fn child(&self) -> Self {
        Self {
            id: Ulid::new().to_string(),
            user_id: self.user_id.clone(),
            rule_id: self.rule_id.clone(),
            parent_id: Some(self.id.clone()),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_ids_are_unique() {
        let a = Context::new();
        let b = Context::new();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_rule_context_chains_to_parent() {
        let event_ctx = Context::with_user("agent-7");
        let rule_ctx = event_ctx.for_rule(RuleId::from("R1"));

        assert_eq!(rule_ctx.parent_id.as_deref(), Some(event_ctx.id.as_str()));
        assert_eq!(rule_ctx.rule_id, Some(RuleId::from("R1")));
        assert_eq!(rule_ctx.user_id.as_deref(), Some("agent-7"));
        assert_ne!(rule_ctx.id, event_ctx.id);
    }

    #[test]
    fn test_child_preserves_attribution() {
        let ctx = Context::new().for_rule(RuleId::from("R2"));
        let child = ctx.child();

        assert_eq!(child.rule_id, Some(RuleId::from("R2")));
        assert_eq!(child.parent_id.as_deref(), Some(ctx.id.as_str()));
    }
}

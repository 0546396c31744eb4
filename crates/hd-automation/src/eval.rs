//! Condition evaluation
//!
//! Pure evaluation of a rule's condition set against an [`EvalContext`].
//! No side effects and no shared state: the same inputs always produce the
//! same answer, so the evaluator is safe to call at dispatch time and for
//! dry-run previews alike.
//!
//! # Grouping
//!
//! Conditions partition by `group` id. Within a group the combinator
//! decides AND (`all`) or OR (`any`); the rule matches iff every group
//! matches. Zero conditions match vacuously.
//!
//! # Undefined fields
//!
//! A field path that resolves to nothing (unknown path, or a known field
//! with no current value) satisfies the negative operators
//! (`not_equals`, `not_contains`, `not_in`) and fails every other one.

use chrono::DateTime;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::trace;

use hd_core::{TicketSnapshot, TriggerEvent, TriggerType};

use crate::condition::{Condition, ConditionError, ConditionOperator, ConditionResult, GroupCombinator};

/// The snapshot conditions are evaluated against
///
/// Carries the ticket as currently visible plus the trigger metadata.
/// Ticket fields resolve through the snapshot's bounded accessor;
/// `trigger.*` paths resolve into the event metadata (`trigger.type` is the
/// trigger type itself).
#[derive(Debug, Clone)]
pub struct EvalContext {
    /// Ticket state at evaluation time
    pub ticket: TicketSnapshot,

    /// What fired the dispatch pass
    pub trigger_type: TriggerType,

    /// Trigger-specific metadata
    pub metadata: Value,
}

impl EvalContext {
    /// Create a context without trigger metadata
    pub fn new(ticket: TicketSnapshot, trigger_type: TriggerType) -> Self {
        Self {
            ticket,
            trigger_type,
            metadata: Value::Null,
        }
    }

    /// Create a context from a ticket snapshot and the event being dispatched
    pub fn for_event(ticket: TicketSnapshot, event: &TriggerEvent) -> Self {
        Self {
            ticket,
            trigger_type: event.trigger_type,
            metadata: event.metadata.clone(),
        }
    }

    /// Resolve a dot-path field selector
    ///
    /// Returns `None`, the undefined sentinel, for anything the context
    /// cannot address.
    pub fn resolve(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("trigger.") {
            if rest == "type" {
                return Some(Value::String(self.trigger_type.as_str().to_string()));
            }
            return rest
                .split('.')
                .try_fold(&self.metadata, |value, segment| value.get(segment))
                .cloned();
        }

        self.ticket.field(path)
    }
}

/// Evaluate a rule's condition set
///
/// Returns `Ok(true)` iff every condition group matches. An empty condition
/// set always matches. Errors surface only for malformed operator/value
/// pairings; the caller treats an error as a non-match and records it.
pub fn evaluate(conditions: &[Condition], ctx: &EvalContext) -> ConditionResult<bool> {
    if conditions.is_empty() {
        return Ok(true);
    }

    let mut groups: BTreeMap<u32, Vec<&Condition>> = BTreeMap::new();
    for condition in conditions {
        groups.entry(condition.group).or_default().push(condition);
    }

    for (group, members) in &groups {
        // The group's combinator is taken from its first member
        let combinator = members[0].combinator;

        let matched = match combinator {
            GroupCombinator::All => {
                let mut all = true;
                for condition in members {
                    if !evaluate_condition(condition, ctx)? {
                        all = false;
                        break;
                    }
                }
                all
            }
            GroupCombinator::Any => {
                let mut any = false;
                for condition in members {
                    if evaluate_condition(condition, ctx)? {
                        any = true;
                        break;
                    }
                }
                any
            }
        };

        trace!(group, ?combinator, matched, "Evaluated condition group");

        if !matched {
            return Ok(false);
        }
    }

    Ok(true)
}

/// Evaluate a single condition
pub fn evaluate_condition(condition: &Condition, ctx: &EvalContext) -> ConditionResult<bool> {
    let Some(field_value) = ctx.resolve(&condition.field) else {
        trace!(field = %condition.field, "Field undefined");
        return Ok(condition.operator.is_negative());
    };

    compare(&field_value, condition.operator, &condition.value)
}

fn compare(field: &Value, operator: ConditionOperator, expected: &Value) -> ConditionResult<bool> {
    match operator {
        ConditionOperator::Equals => Ok(loose_eq(field, expected)),
        ConditionOperator::NotEquals => Ok(!loose_eq(field, expected)),
        ConditionOperator::Contains => Ok(contains(field, expected)),
        ConditionOperator::NotContains => Ok(!contains(field, expected)),
        ConditionOperator::StartsWith => {
            Ok(value_to_string(field).starts_with(&value_to_string(expected)))
        }
        ConditionOperator::EndsWith => {
            Ok(value_to_string(field).ends_with(&value_to_string(expected)))
        }
        ConditionOperator::GreaterThan => Ok(ordering(field, expected) == Ordering::Greater),
        ConditionOperator::LessThan => Ok(ordering(field, expected) == Ordering::Less),
        ConditionOperator::In => {
            let candidates = expected
                .as_array()
                .ok_or(ConditionError::ExpectedArray(ConditionOperator::In))?;
            Ok(candidates.iter().any(|candidate| loose_eq(field, candidate)))
        }
        ConditionOperator::NotIn => {
            let candidates = expected
                .as_array()
                .ok_or(ConditionError::ExpectedArray(ConditionOperator::NotIn))?;
            Ok(!candidates.iter().any(|candidate| loose_eq(field, candidate)))
        }
    }
}

/// Equality with string/number normalization
///
/// When one side is a string and the other a number, both compare as
/// strings; everything else compares structurally.
fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::String(_), Value::Number(_)) | (Value::Number(_), Value::String(_)) => {
            value_to_string(a) == value_to_string(b)
        }
        _ => a == b,
    }
}

/// Substring test for string fields, membership test for array fields
fn contains(field: &Value, expected: &Value) -> bool {
    match field {
        Value::Array(items) => items.iter().any(|item| loose_eq(item, expected)),
        Value::String(s) => s.contains(&value_to_string(expected)),
        other => value_to_string(other).contains(&value_to_string(expected)),
    }
}

/// Ordering: numeric when both sides parse as numbers (RFC3339 timestamps
/// count as numbers), lexicographic otherwise
fn ordering(field: &Value, expected: &Value) -> Ordering {
    if let (Some(a), Some(b)) = (as_number(field), as_number(expected)) {
        a.partial_cmp(&b).unwrap_or(Ordering::Equal)
    } else {
        value_to_string(field).cmp(&value_to_string(expected))
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            if let Ok(n) = s.parse::<f64>() {
                return Some(n);
            }
            DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|t| t.timestamp_millis() as f64)
        }
        _ => None,
    }
}

/// Convert a JSON value to its comparison string
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::GroupCombinator;
    use chrono::Utc;
    use hd_core::{Customer, TicketId, TicketPriority, TicketStatus};
    use serde_json::json;

    fn sample_ticket() -> TicketSnapshot {
        let now = Utc::now();
        TicketSnapshot {
            id: TicketId::from("T-1"),
            subject: "Cannot log in".to_string(),
            description: None,
            status: TicketStatus::Open,
            priority: TicketPriority::Urgent,
            assignee_id: None,
            team_id: None,
            labels: vec!["vip".to_string(), "urgent".to_string()],
            customer: Some(Customer {
                id: "C-1".to_string(),
                email: "bob@corp.example".to_string(),
                name: None,
                kind: "vip".to_string(),
            }),
            organization_id: "org-1".to_string(),
            sla_due_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn ctx() -> EvalContext {
        EvalContext::new(sample_ticket(), TriggerType::TicketCreated)
    }

    #[test]
    fn test_empty_conditions_match_vacuously() {
        assert!(evaluate(&[], &ctx()).unwrap());
    }

    #[test]
    fn test_equals_on_priority() {
        let conditions = vec![Condition::equals("priority", json!("urgent"))];
        assert!(evaluate(&conditions, &ctx()).unwrap());

        let conditions = vec![Condition::equals("priority", json!("normal"))];
        assert!(!evaluate(&conditions, &ctx()).unwrap());
    }

    #[test]
    fn test_equals_normalizes_string_and_number() {
        let mut ticket = sample_ticket();
        ticket.subject = "42".to_string();
        let ctx = EvalContext::new(ticket, TriggerType::TicketCreated);

        let condition = Condition::equals("subject", json!(42));
        assert!(evaluate_condition(&condition, &ctx).unwrap());
    }

    #[test]
    fn test_negative_operators_on_missing_field() {
        let ctx = ctx();

        // assignee_id is unset, "nonsense" is not in the schema
        for field in ["assignee_id", "nonsense.path"] {
            let c = Condition::new(field, ConditionOperator::NotEquals, json!("x"));
            assert!(evaluate_condition(&c, &ctx).unwrap(), "{field} not_equals");

            let c = Condition::new(field, ConditionOperator::NotContains, json!("x"));
            assert!(evaluate_condition(&c, &ctx).unwrap(), "{field} not_contains");

            let c = Condition::new(field, ConditionOperator::NotIn, json!(["x"]));
            assert!(evaluate_condition(&c, &ctx).unwrap(), "{field} not_in");

            let c = Condition::equals(field, json!("x"));
            assert!(!evaluate_condition(&c, &ctx).unwrap(), "{field} equals");

            let c = Condition::new(field, ConditionOperator::GreaterThan, json!(1));
            assert!(!evaluate_condition(&c, &ctx).unwrap(), "{field} greater_than");
        }
    }

    #[test]
    fn test_contains_on_label_array() {
        let conditions = vec![Condition::contains("labels", json!("vip"))];
        assert!(evaluate(&conditions, &ctx()).unwrap());

        let conditions = vec![Condition::contains("labels", json!("billing"))];
        assert!(!evaluate(&conditions, &ctx()).unwrap());
    }

    #[test]
    fn test_contains_on_string_field() {
        let conditions = vec![Condition::contains("subject", json!("log in"))];
        assert!(evaluate(&conditions, &ctx()).unwrap());
    }

    #[test]
    fn test_starts_with_and_ends_with() {
        let c = Condition::new("customer.email", ConditionOperator::EndsWith, json!("@corp.example"));
        assert!(evaluate_condition(&c, &ctx()).unwrap());

        let c = Condition::new("subject", ConditionOperator::StartsWith, json!("Cannot"));
        assert!(evaluate_condition(&c, &ctx()).unwrap());

        let c = Condition::new("subject", ConditionOperator::StartsWith, json!("Printer"));
        assert!(!evaluate_condition(&c, &ctx()).unwrap());
    }

    #[test]
    fn test_ordering_numeric_vs_lexicographic() {
        let mut ticket = sample_ticket();
        ticket.subject = "9".to_string();
        let ctx = EvalContext::new(ticket, TriggerType::TicketCreated);

        // Numeric: 9 < 10
        let c = Condition::new("subject", ConditionOperator::LessThan, json!(10));
        assert!(evaluate_condition(&c, &ctx).unwrap());

        // Lexicographic: "9" > "10" when the right side is not numeric
        let c = Condition::new("subject", ConditionOperator::GreaterThan, json!("10x"));
        assert!(evaluate_condition(&c, &ctx).unwrap());
    }

    #[test]
    fn test_ordering_on_timestamps() {
        let ctx = ctx();
        let c = Condition::new(
            "created_at",
            ConditionOperator::GreaterThan,
            json!("2001-01-01T00:00:00Z"),
        );
        assert!(evaluate_condition(&c, &ctx).unwrap());

        let c = Condition::new(
            "created_at",
            ConditionOperator::LessThan,
            json!("2001-01-01T00:00:00Z"),
        );
        assert!(!evaluate_condition(&c, &ctx).unwrap());
    }

    #[test]
    fn test_in_and_not_in() {
        let c = Condition::new("status", ConditionOperator::In, json!(["open", "pending"]));
        assert!(evaluate_condition(&c, &ctx()).unwrap());

        let c = Condition::new("status", ConditionOperator::NotIn, json!(["closed"]));
        assert!(evaluate_condition(&c, &ctx()).unwrap());

        let c = Condition::new("status", ConditionOperator::In, json!(["closed"]));
        assert!(!evaluate_condition(&c, &ctx()).unwrap());
    }

    #[test]
    fn test_in_requires_array_value() {
        let c = Condition::new("status", ConditionOperator::In, json!("open"));
        let err = evaluate_condition(&c, &ctx()).unwrap_err();
        assert!(matches!(err, ConditionError::ExpectedArray(ConditionOperator::In)));
    }

    #[test]
    fn test_any_group_is_or() {
        let conditions = vec![
            Condition::equals("priority", json!("low")).in_group(0, GroupCombinator::Any),
            Condition::equals("status", json!("open")).in_group(0, GroupCombinator::Any),
        ];
        // priority is urgent (false), status is open (true): any ⇒ true
        assert!(evaluate(&conditions, &ctx()).unwrap());
    }

    #[test]
    fn test_all_group_is_and() {
        let conditions = vec![
            Condition::equals("priority", json!("urgent")),
            Condition::equals("status", json!("closed")),
        ];
        assert!(!evaluate(&conditions, &ctx()).unwrap());
    }

    #[test]
    fn test_groups_combine_with_and() {
        // (priority == low OR status == open) AND (customer.type == vip)
        let conditions = vec![
            Condition::equals("priority", json!("low")).in_group(0, GroupCombinator::Any),
            Condition::equals("status", json!("open")).in_group(0, GroupCombinator::Any),
            Condition::equals("customer.type", json!("vip")).in_group(1, GroupCombinator::All),
        ];
        assert!(evaluate(&conditions, &ctx()).unwrap());

        // Second group fails ⇒ whole rule fails even though group 0 matches
        let conditions = vec![
            Condition::equals("status", json!("open")).in_group(0, GroupCombinator::Any),
            Condition::equals("customer.type", json!("free")).in_group(1, GroupCombinator::All),
        ];
        assert!(!evaluate(&conditions, &ctx()).unwrap());
    }

    #[test]
    fn test_trigger_metadata_resolution() {
        let event = hd_core::TriggerEvent::new(TriggerType::TicketStatusChanged, "T-1")
            .with_meta("old_status", json!("open"))
            .with_meta("new_status", json!("resolved"));

        let ctx = EvalContext::for_event(sample_ticket(), &event);

        let c = Condition::equals("trigger.old_status", json!("open"));
        assert!(evaluate_condition(&c, &ctx).unwrap());

        let c = Condition::equals("trigger.type", json!("ticket_status_changed"));
        assert!(evaluate_condition(&c, &ctx).unwrap());

        let c = Condition::equals("trigger.missing", json!("x"));
        assert!(!evaluate_condition(&c, &ctx).unwrap());
    }

    #[test]
    fn test_evaluation_is_repeatable() {
        let conditions = vec![
            Condition::equals("priority", json!("urgent")),
            Condition::contains("labels", json!("vip")),
        ];
        let ctx = ctx();
        let first = evaluate(&conditions, &ctx).unwrap();
        let second = evaluate(&conditions, &ctx).unwrap();
        assert_eq!(first, second);
        assert!(first);
    }
}

//! Condition types
//!
//! A condition is a single field/operator/value test against the ticket
//! snapshot (or trigger metadata). Conditions carry a group id and a group
//! combinator so that a rule can express "(A or B) and C" style logic; the
//! grouping algorithm lives in [`crate::eval`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Condition errors
#[derive(Debug, Error)]
pub enum ConditionError {
    #[error("operator '{0}' requires an array comparison value")]
    ExpectedArray(ConditionOperator),

    #[error("invalid condition value: {0}")]
    InvalidValue(String),
}

/// Result type for condition operations
pub type ConditionResult<T> = Result<T, ConditionError>;

/// Comparison operator of a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    GreaterThan,
    LessThan,
    In,
    NotIn,
}

impl ConditionOperator {
    /// Get the operator as its wire string
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionOperator::Equals => "equals",
            ConditionOperator::NotEquals => "not_equals",
            ConditionOperator::Contains => "contains",
            ConditionOperator::NotContains => "not_contains",
            ConditionOperator::StartsWith => "starts_with",
            ConditionOperator::EndsWith => "ends_with",
            ConditionOperator::GreaterThan => "greater_than",
            ConditionOperator::LessThan => "less_than",
            ConditionOperator::In => "in",
            ConditionOperator::NotIn => "not_in",
        }
    }

    /// Whether this operator is a negative test
    ///
    /// Negative operators are satisfied by an undefined field value; every
    /// other operator fails against one.
    pub fn is_negative(&self) -> bool {
        matches!(
            self,
            ConditionOperator::NotEquals
                | ConditionOperator::NotContains
                | ConditionOperator::NotIn
        )
    }
}

impl std::fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How conditions within one group combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GroupCombinator {
    /// Every condition in the group must be true (AND)
    #[default]
    All,

    /// At least one condition in the group must be true (OR)
    Any,
}

/// A single field test belonging to a rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Dot-path field selector into the evaluation context,
    /// e.g. `priority`, `customer.email`, `trigger.old_status`
    pub field: String,

    /// Comparison operator
    pub operator: ConditionOperator,

    /// Comparison value (scalar, array, or string)
    pub value: Value,

    /// Group this condition belongs to
    #[serde(default)]
    pub group: u32,

    /// Combinator of this condition's group
    #[serde(default, rename = "group_combinator")]
    pub combinator: GroupCombinator,
}

impl Condition {
    /// Create a condition in the default group (0, all)
    pub fn new(field: impl Into<String>, operator: ConditionOperator, value: Value) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
            group: 0,
            combinator: GroupCombinator::All,
        }
    }

    /// Create an equality condition
    pub fn equals(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, ConditionOperator::Equals, value)
    }

    /// Create an inequality condition
    pub fn not_equals(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, ConditionOperator::NotEquals, value)
    }

    /// Create a contains condition
    pub fn contains(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, ConditionOperator::Contains, value)
    }

    /// Move this condition into a specific group
    pub fn in_group(mut self, group: u32, combinator: GroupCombinator) -> Self {
        self.group = group;
        self.combinator = combinator;
        self
    }
}

//! Automation rule engine model
//!
//! This crate provides the rule vocabulary for the helpdesk automation
//! engine. A rule ties one trigger type to a condition set and an ordered
//! action list:
//!
//! ```text
//! RULE = TRIGGER → CONDITIONS → ACTIONS
//! ```
//!
//! - **Trigger**: the ticket event that makes the dispatcher consider a rule
//! - **Conditions**: field/operator/value tests, clustered into AND/OR groups
//! - **Actions**: side-effecting operations executed in order on match
//!
//! # Key Types
//!
//! - [`Rule`] - Complete rule definition
//! - [`Condition`] - A single field test, with its group and combinator
//! - [`Action`] / [`ActionKind`] - The closed action union
//! - [`ExecutionLog`] - Audit record of one rule invocation
//! - [`evaluate`] - The pure condition evaluator
//! - [`Template`] - Prebuilt trigger/condition/action bundles

pub mod action;
pub mod condition;
pub mod eval;
pub mod log;
pub mod rule;
pub mod template;

pub use action::{Action, ActionKind, SlaDeadline};
pub use condition::{Condition, ConditionError, ConditionOperator, ConditionResult, GroupCombinator};
pub use eval::{evaluate, EvalContext};
pub use log::{ActionOutcome, ActionStatus, ExecutionLog};
pub use rule::{Rule, RuleConfig};
pub use template::Template;

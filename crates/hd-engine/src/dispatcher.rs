//! Rule matching and dispatch
//!
//! One dispatch pass per trigger event: snapshot the active rules for the
//! event's trigger type, order them by priority, then evaluate and execute
//! each in turn. Rules are isolated from each other: an error in one
//! never touches the next, and every rule invocation writes exactly one
//! execution log row, matched or not.
//!
//! Within a pass the ticket snapshot is refetched per rule, so a later
//! rule observes the mutations earlier rules applied. Rule evaluation
//! inside one pass is therefore sequential; concurrency lives at the pass
//! level (one pass per event, passes independent).

use std::cmp::Reverse;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

use hd_automation::{evaluate, ActionOutcome, ConditionError, EvalContext, ExecutionLog, Rule};
use hd_core::TriggerEvent;
use hd_store::{RuleStore, StoreError, TicketStore};

use crate::executor::ActionExecutor;
use crate::logger::ExecutionLogger;

/// Errors that abort a whole dispatch pass
///
/// Only a rule-set load failure aborts: evaluating a partial rule set
/// would skip higher-priority rules unpredictably. The event stays
/// unprocessed and is redeliverable by the upstream source.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("failed to load rules: {0}")]
    RuleLoad(#[source] StoreError),
}

/// Per-rule failures, captured into that rule's execution log
#[derive(Debug, Error)]
enum RuleEvalError {
    #[error("ticket load failed: {0}")]
    Ticket(#[from] StoreError),

    #[error("condition evaluation failed: {0}")]
    Condition(#[from] ConditionError),
}

/// Summary of one dispatch pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Rules evaluated (log rows written)
    pub evaluated: usize,

    /// Rules whose conditions matched
    pub matched: usize,

    /// Whether a shutdown dropped remaining rules
    pub aborted: bool,
}

/// Runs one dispatch pass per trigger event
pub struct Dispatcher {
    rules: Arc<dyn RuleStore>,
    tickets: Arc<dyn TicketStore>,
    executor: ActionExecutor,
    logger: ExecutionLogger,
    shutting_down: AtomicBool,
}

impl Dispatcher {
    /// Create a dispatcher over the given collaborators
    pub fn new(
        rules: Arc<dyn RuleStore>,
        tickets: Arc<dyn TicketStore>,
        executor: ActionExecutor,
        logger: ExecutionLogger,
    ) -> Self {
        Self {
            rules,
            tickets,
            executor,
            logger,
            shutting_down: AtomicBool::new(false),
        }
    }

    /// Request graceful shutdown
    ///
    /// The in-flight rule finishes and its log is persisted; remaining
    /// rules in the pass are dropped. Events are redeliverable upstream,
    /// so partial completion is acceptable.
    pub fn begin_shutdown(&self) {
        info!("Dispatcher shutdown requested");
        self.shutting_down.store(true, Ordering::SeqCst);
    }

    /// Run one dispatch pass for an event
    pub async fn dispatch(&self, event: &TriggerEvent) -> Result<DispatchReport, DispatchError> {
        let rules = self
            .rules
            .list_active_by_trigger(event.trigger_type)
            .await
            .map_err(DispatchError::RuleLoad)?;

        // Stable sort: creation order (the store's listing order) breaks
        // priority ties.
        let mut ordered = rules;
        ordered.sort_by_key(|rule| Reverse(rule.priority));

        debug!(
            trigger_type = %event.trigger_type,
            ticket_id = %event.ticket_id,
            rules = ordered.len(),
            "Starting dispatch pass"
        );

        let mut report = DispatchReport::default();

        for rule in &ordered {
            if self.shutting_down.load(Ordering::SeqCst) {
                warn!(
                    ticket_id = %event.ticket_id,
                    dropped = ordered.len() - report.evaluated,
                    "Shutdown in progress, dropping remaining rules"
                );
                report.aborted = true;
                break;
            }

            let started = Instant::now();
            let mut log =
                ExecutionLog::new(rule.id.clone(), event.ticket_id.clone(), event.trigger_type);

            match self.run_rule(rule, event).await {
                Ok(Some(outcomes)) => {
                    report.matched += 1;
                    log = log.matched(outcomes);
                }
                Ok(None) => {
                    debug!(rule_id = %rule.id, "Conditions not met");
                }
                Err(e) => {
                    warn!(rule_id = %rule.id, error = %e, "Rule invocation failed");
                    log = log.with_error(e);
                }
            }

            report.evaluated += 1;
            self.logger.record(log.timed(started.elapsed())).await;
        }

        debug!(
            evaluated = report.evaluated,
            matched = report.matched,
            "Dispatch pass finished"
        );
        Ok(report)
    }

    /// Evaluate one rule against the current ticket state, executing its
    /// actions on match
    ///
    /// `Ok(None)` means the conditions did not match. Errors here are
    /// per-rule: the caller logs them and moves on to the next rule.
    async fn run_rule(
        &self,
        rule: &Rule,
        event: &TriggerEvent,
    ) -> Result<Option<Vec<ActionOutcome>>, RuleEvalError> {
        let ticket = self.tickets.get(&event.ticket_id).await?;
        let ctx = EvalContext::for_event(ticket, event);

        if !evaluate(&rule.conditions, &ctx)? {
            return Ok(None);
        }

        debug!(rule_id = %rule.id, "Conditions met, executing actions");
        let action_ctx = event.context.for_rule(rule.id.clone());
        let outcomes = self
            .executor
            .execute(&rule.actions, &event.ticket_id, event, &action_ctx)
            .await;

        Ok(Some(outcomes))
    }
}

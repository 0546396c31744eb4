//! Helpdesk automation engine
//!
//! This crate wires the rule model to the outside world. One dispatch pass
//! per trigger event:
//!
//! ```text
//! TriggerEvent → Dispatcher → [per rule: evaluate → execute → log]
//! ```
//!
//! - [`ActionExecutor`] applies a rule's actions through the collaborator
//!   interfaces, collecting a per-action outcome and never short-circuiting
//! - [`Dispatcher`] snapshots the active rules for a trigger, runs them in
//!   priority order, and writes one [`hd_automation::ExecutionLog`] per rule
//! - [`ExecutionLogger`] is the append-only audit sink
//! - [`EngineService`] consumes the trigger bus and runs one independent
//!   pass per incoming event

pub mod dispatcher;
pub mod executor;
pub mod logger;
pub mod service;

pub use dispatcher::{DispatchError, DispatchReport, Dispatcher};
pub use executor::{ActionExecutor, DEFAULT_ACTION_TIMEOUT};
pub use logger::ExecutionLogger;
pub use service::{EngineService, ShutdownHandle};

//! Engine run loop
//!
//! Consumes the trigger bus and runs one dispatch pass per incoming event.
//! Each pass is spawned as its own task: trigger events are independent
//! units of work and may be processed concurrently. All cross-cutting
//! state lives in the stores; ordering only exists *within* a pass.

use std::sync::Arc;
use tokio::sync::{broadcast::error::RecvError, watch};
use tracing::{debug, info, warn};

use hd_event_bus::TriggerBus;

use crate::dispatcher::Dispatcher;

/// Handle for stopping a running [`EngineService`]
#[derive(Clone)]
pub struct ShutdownHandle {
    tx: watch::Sender<bool>,
}

impl ShutdownHandle {
    /// Request shutdown; the service stops accepting events and in-flight
    /// passes drop their remaining rules
    pub fn shutdown(&self) {
        let _ = self.tx.send(true);
    }
}

/// Drives dispatch passes from the trigger bus
pub struct EngineService {
    bus: Arc<TriggerBus>,
    dispatcher: Arc<Dispatcher>,
    shutdown_rx: watch::Receiver<bool>,
}

impl EngineService {
    /// Create a service and its shutdown handle
    pub fn new(bus: Arc<TriggerBus>, dispatcher: Arc<Dispatcher>) -> (Self, ShutdownHandle) {
        let (tx, shutdown_rx) = watch::channel(false);
        (
            Self {
                bus,
                dispatcher,
                shutdown_rx,
            },
            ShutdownHandle { tx },
        )
    }

    /// Run until shutdown is requested or the bus closes
    pub async fn run(mut self) {
        let mut events = self.bus.subscribe_all();
        info!("Automation engine running");

        loop {
            tokio::select! {
                changed = self.shutdown_rx.changed() => {
                    if changed.is_err() || *self.shutdown_rx.borrow() {
                        break;
                    }
                }
                event = events.recv() => match event {
                    Ok(event) => {
                        debug!(
                            trigger_type = %event.trigger_type,
                            ticket_id = %event.ticket_id,
                            "Dispatching trigger event"
                        );
                        let dispatcher = self.dispatcher.clone();
                        tokio::spawn(async move {
                            if let Err(e) = dispatcher.dispatch(&event).await {
                                warn!(
                                    ticket_id = %event.ticket_id,
                                    error = %e,
                                    "Dispatch pass aborted"
                                );
                            }
                        });
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Trigger receiver lagged, events dropped");
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }

        self.dispatcher.begin_shutdown();
        info!("Automation engine stopped");
    }
}

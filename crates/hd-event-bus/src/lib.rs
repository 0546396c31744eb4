//! Trigger event pub/sub for the helpdesk automation engine
//!
//! The TriggerBus is the in-process feed of trigger events. The surrounding
//! application (ticket CRUD, email ingestion, the scheduler) fires events;
//! the automation engine subscribes and runs one dispatch pass per event.
//! Subscriptions can be scoped to a single trigger type or to all events.

use dashmap::DashMap;
use hd_core::{TriggerEvent, TriggerType};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Default channel capacity for trigger subscriptions
const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Pub/sub bus for trigger events
///
/// Events are fanned out to every subscriber of the event's trigger type
/// and to every match-all subscriber. Firing never blocks: a lagging
/// subscriber drops its oldest buffered events, and firing with no
/// subscribers is a no-op.
pub struct TriggerBus {
    /// Per-trigger-type broadcast senders
    listeners: DashMap<TriggerType, broadcast::Sender<TriggerEvent>>,
    /// Sender for match-all subscribers
    match_all_sender: broadcast::Sender<TriggerEvent>,
    /// Channel capacity
    capacity: usize,
}

impl TriggerBus {
    /// Create a new trigger bus
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new trigger bus with specified channel capacity
    pub fn with_capacity(capacity: usize) -> Self {
        let (match_all_sender, _) = broadcast::channel(capacity);
        Self {
            listeners: DashMap::new(),
            match_all_sender,
            capacity,
        }
    }

    /// Subscribe to events of a single trigger type
    pub fn subscribe(&self, trigger_type: TriggerType) -> broadcast::Receiver<TriggerEvent> {
        trace!(trigger_type = %trigger_type, "Subscribing to trigger type");

        self.listeners
            .entry(trigger_type)
            .or_insert_with(|| {
                let (tx, _) = broadcast::channel(self.capacity);
                tx
            })
            .subscribe()
    }

    /// Subscribe to every trigger event
    pub fn subscribe_all(&self) -> broadcast::Receiver<TriggerEvent> {
        self.match_all_sender.subscribe()
    }

    /// Fire an event to all subscribers
    pub fn fire(&self, event: TriggerEvent) {
        debug!(
            trigger_type = %event.trigger_type,
            ticket_id = %event.ticket_id,
            "Firing trigger event"
        );

        if let Some(sender) = self.listeners.get(&event.trigger_type) {
            // Send errors just mean no active receivers
            let _ = sender.send(event.clone());
        }

        let _ = self.match_all_sender.send(event);
    }

    /// Get the number of trigger types with at least one subscription
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Default for TriggerBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe handle to a shared bus
pub type SharedTriggerBus = Arc<TriggerBus>;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribe_and_fire() {
        let bus = TriggerBus::new();
        let mut rx = bus.subscribe(TriggerType::TicketCreated);

        let event = TriggerEvent::new(TriggerType::TicketCreated, "T-1");
        bus.fire(event);

        let received = rx.recv().await.unwrap();
        assert_eq!(received.trigger_type, TriggerType::TicketCreated);
        assert_eq!(received.ticket_id.as_str(), "T-1");
    }

    #[tokio::test]
    async fn test_match_all_subscription() {
        let bus = TriggerBus::new();
        let mut rx = bus.subscribe_all();

        bus.fire(TriggerEvent::new(TriggerType::TicketCreated, "T-1"));
        bus.fire(TriggerEvent::new(TriggerType::SlaBreach, "T-2"));

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();

        assert_eq!(first.trigger_type, TriggerType::TicketCreated);
        assert_eq!(second.trigger_type, TriggerType::SlaBreach);
    }

    #[tokio::test]
    async fn test_no_cross_trigger_delivery() {
        let bus = TriggerBus::new();
        let mut rx_created = bus.subscribe(TriggerType::TicketCreated);
        let mut rx_breach = bus.subscribe(TriggerType::SlaBreach);

        bus.fire(TriggerEvent::new(TriggerType::TicketCreated, "T-1"));

        let received = rx_created.recv().await.unwrap();
        assert_eq!(received.ticket_id.as_str(), "T-1");
        assert!(rx_breach.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_multiple_subscribers_each_receive() {
        let bus = TriggerBus::new();
        let mut rx1 = bus.subscribe(TriggerType::MessageReceived);
        let mut rx2 = bus.subscribe(TriggerType::MessageReceived);

        bus.fire(
            TriggerEvent::new(TriggerType::MessageReceived, "T-3")
                .with_meta("message_id", serde_json::json!("M-1")),
        );

        let e1 = rx1.recv().await.unwrap();
        let e2 = rx2.recv().await.unwrap();
        assert_eq!(e1.meta("message_id"), e2.meta("message_id"));
    }

    #[test]
    fn test_fire_without_subscribers_is_noop() {
        let bus = TriggerBus::new();
        bus.fire(TriggerEvent::new(TriggerType::TimeBased, "T-4"));
        assert_eq!(bus.listener_count(), 0);
    }
}

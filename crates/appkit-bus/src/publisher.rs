//! # Event Publisher
//!
//! Publishing side of the bus. Subsystems emit from synchronous code paths
//! (registry mutations, probe results, SIWX outcomes), so publishing never
//! awaits; receivers that fall behind lag rather than block the sender.

use crate::events::{AppKitEvent, EventFilter, EventTopic};
use crate::subscriber::{EventStream, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use parking_lot::Mutex;
use std::collections::HashMap;
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Sink for [`AppKitEvent`]s.
pub trait EventPublisher: Send + Sync {
    /// Publish `event`; returns how many receivers got it.
    fn emit(&self, event: AppKitEvent) -> usize;

    /// Events published so far on `topic`, or on every topic for
    /// [`EventTopic::All`].
    fn published(&self, topic: EventTopic) -> u64;
}

/// Broadcast-channel event bus shared by every subsystem of a client.
pub struct InMemoryEventBus {
    sender: broadcast::Sender<AppKitEvent>,
    counts: Mutex<HashMap<EventTopic, u64>>,
    capacity: usize,
}

impl InMemoryEventBus {
    /// Bus buffering [`DEFAULT_CHANNEL_CAPACITY`] events per receiver.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Bus buffering `capacity` events per receiver.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            counts: Mutex::new(HashMap::new()),
            capacity,
        }
    }

    /// Receive events matching `filter`.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        debug!(topics = ?filter.topics, "[bus] Subscriber attached");
        Subscription::new(self.sender.subscribe(), filter)
    }

    /// Stream of events matching `filter`.
    #[must_use]
    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        EventStream::new(self.sender.subscribe(), filter)
    }

    /// Live receivers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Per-receiver buffer size.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventPublisher for InMemoryEventBus {
    fn emit(&self, event: AppKitEvent) -> usize {
        let topic = event.topic();
        let subsystem = event.source_subsystem();
        *self.counts.lock().entry(topic).or_default() += 1;

        match self.sender.send(event) {
            Ok(receivers) => {
                trace!(?topic, subsystem, receivers, "[bus] Event delivered");
                receivers
            }
            // Nobody listening; analytics events are routinely unobserved.
            Err(_) => 0,
        }
    }

    fn published(&self, topic: EventTopic) -> u64 {
        let counts = self.counts.lock();
        match topic {
            EventTopic::All => counts.values().sum(),
            topic => counts.get(&topic).copied().unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{SiwxEventProperties, TrackEvent};

    #[test]
    fn test_emit_without_subscribers() {
        let bus = InMemoryEventBus::new();
        assert_eq!(bus.emit(AppKitEvent::ConnectorsChanged { count: 1 }), 0);
        assert_eq!(bus.published(EventTopic::Connectors), 1);
    }

    #[test]
    fn test_emit_reaches_every_receiver() {
        let bus = InMemoryEventBus::new();
        let _all = bus.subscribe(EventFilter::all());
        let _connections = bus.subscribe(EventFilter::topics(vec![EventTopic::Connections]));

        // Filtering happens on the receiving side.
        assert_eq!(bus.emit(AppKitEvent::ConnectorsChanged { count: 0 }), 2);
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[test]
    fn test_published_counts_per_topic() {
        let bus = InMemoryEventBus::new();
        bus.emit(AppKitEvent::ConnectorsChanged { count: 1 });
        bus.emit(AppKitEvent::PairingUri { uri: "wc:1@2".into() });
        bus.emit(AppKitEvent::Track(TrackEvent::SiwxAuthSuccess(
            SiwxEventProperties::default(),
        )));
        bus.emit(AppKitEvent::Track(TrackEvent::ClickCancelSiwx(
            SiwxEventProperties::default(),
        )));

        assert_eq!(bus.published(EventTopic::Track), 2);
        assert_eq!(bus.published(EventTopic::Provider), 1);
        assert_eq!(bus.published(EventTopic::Account), 0);
        assert_eq!(bus.published(EventTopic::All), 4);
    }

    #[test]
    fn test_custom_capacity() {
        assert_eq!(InMemoryEventBus::with_capacity(8).capacity(), 8);
    }
}

use std::sync::Mutex;

use tokio::sync::broadcast;
use tracing::debug;

use crate::error::{EventError, Result};
use crate::event::{EmittedEvent, Notification};

/// Destination for named events.
///
/// Mirrors the ledger's own event call: one name, one opaque payload.
/// Callers treat sinks as best-effort; an `Err` is reported, not retried.
pub trait EventSink: Send + Sync {
    fn set_event(&self, name: &str, payload: &[u8]) -> Result<()>;
}

/// Sink that keeps every event in memory, in emission order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<EmittedEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events emitted so far.
    pub fn events(&self) -> Vec<EmittedEvent> {
        self.events.lock().expect("lock poisoned").clone()
    }

    /// Remove and return all events emitted so far.
    pub fn drain(&self) -> Vec<EmittedEvent> {
        std::mem::take(&mut *self.events.lock().expect("lock poisoned"))
    }

    /// Payloads decoded as notifications. Events that are not notifications
    /// are skipped.
    pub fn notifications(&self) -> Vec<Notification> {
        self.events()
            .iter()
            .filter_map(|e| e.notification().ok())
            .collect()
    }

    /// The most recent notification, if any.
    pub fn last_notification(&self) -> Option<Notification> {
        self.notifications().pop()
    }

    pub fn len(&self) -> usize {
        self.events.lock().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for RecordingSink {
    fn set_event(&self, name: &str, payload: &[u8]) -> Result<()> {
        if name.is_empty() {
            return Err(EventError::EmptyName);
        }
        self.events
            .lock()
            .expect("lock poisoned")
            .push(EmittedEvent::new(name, payload.to_vec()));
        Ok(())
    }
}

/// A broadcast channel receiver for emitted events.
pub type EventStream = broadcast::Receiver<EmittedEvent>;

/// Fan-out sink that delivers events to every live subscriber.
///
/// Having no subscribers is not an error; the event is simply dropped.
/// Slow subscribers lag and lose the oldest events once `capacity` is
/// exceeded.
#[derive(Debug)]
pub struct BroadcastSink {
    sender: broadcast::Sender<EmittedEvent>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Register a new subscriber.
    pub fn subscribe(&self) -> EventStream {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastSink {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventSink for BroadcastSink {
    fn set_event(&self, name: &str, payload: &[u8]) -> Result<()> {
        if name.is_empty() {
            return Err(EventError::EmptyName);
        }
        let event = EmittedEvent::new(name, payload.to_vec());
        match self.sender.send(event) {
            Ok(delivered) => debug!(name, delivered, "event broadcast"),
            Err(_) => debug!(name, "event dropped: no subscribers"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::StatusCode;

    #[test]
    fn recording_sink_keeps_order() {
        let sink = RecordingSink::new();
        sink.set_event("evtsender", b"one").unwrap();
        sink.set_event("errEvent", b"two").unwrap();
        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].name, "evtsender");
        assert_eq!(events[1].payload, b"two");
    }

    #[test]
    fn recording_sink_decodes_notifications() {
        let sink = RecordingSink::new();
        let n = Notification::success("ok").for_merchant("m1");
        sink.set_event("evtsender", &n.to_bytes().unwrap()).unwrap();
        sink.set_event("raw", b"not a notification").unwrap();

        assert_eq!(sink.notifications(), vec![n.clone()]);
        assert_eq!(sink.last_notification().unwrap().code, StatusCode::Ok);
    }

    #[test]
    fn drain_empties_the_sink() {
        let sink = RecordingSink::new();
        sink.set_event("e", b"x").unwrap();
        assert_eq!(sink.drain().len(), 1);
        assert!(sink.is_empty());
    }

    #[test]
    fn empty_name_is_rejected() {
        let sink = RecordingSink::new();
        assert!(matches!(sink.set_event("", b"x"), Err(EventError::EmptyName)));
        let broadcast = BroadcastSink::default();
        assert!(matches!(
            broadcast.set_event("", b"x"),
            Err(EventError::EmptyName)
        ));
    }

    #[test]
    fn broadcast_without_subscribers_is_ok() {
        let sink = BroadcastSink::new(4);
        assert_eq!(sink.subscriber_count(), 0);
        sink.set_event("evtsender", b"dropped").unwrap();
    }

    #[test]
    fn broadcast_reaches_every_subscriber() {
        let sink = BroadcastSink::new(4);
        let mut a = sink.subscribe();
        let mut b = sink.subscribe();
        sink.set_event("evtsender", b"hello").unwrap();

        assert_eq!(a.try_recv().unwrap().payload, b"hello");
        assert_eq!(b.try_recv().unwrap().name, "evtsender");
        assert!(a.try_recv().is_err());
    }

    #[tokio::test]
    async fn broadcast_subscriber_receives_async() {
        let sink = BroadcastSink::default();
        let mut rx = sink.subscribe();
        let n = Notification::failure("boom");
        sink.set_event("errEvent", &n.to_bytes().unwrap()).unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.notification().unwrap(), n);
    }
}

//! Update feed for observing indexing progress.
//!
//! Each [`crate::LogView`] owns one feed. Subscribers receive every event
//! emitted after they subscribed; nothing is replayed and nothing is
//! persisted, so a subscriber that was not listening simply misses the
//! event.
//!
//! # Usage
//!
//! ```rust
//! use logdex_core::{Message, UpdateFeed, ViewEvent};
//! use logdex_codec::Value;
//!
//! let feed = UpdateFeed::new();
//! let sub = feed.subscribe();
//!
//! feed.emit(ViewEvent::Indexed(Message::new("L1", 0, Value::from("hi"))));
//!
//! match sub.receiver.recv().unwrap() {
//!     ViewEvent::Indexed(msg) => assert_eq!(msg.sequence, 0),
//!     other => panic!("unexpected event {other:?}"),
//! }
//! ```

use crate::types::Message;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};

/// An event broadcast by a view.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    /// A message was durably indexed.
    Indexed(Message),
    /// An index was registered at runtime.
    IndexAdded(String),
}

/// A live subscription to an [`UpdateFeed`].
#[derive(Debug)]
pub struct Subscription {
    /// Identifier accepted by [`UpdateFeed::unsubscribe`].
    pub id: u64,
    /// Receiving end of the subscription.
    pub receiver: Receiver<ViewEvent>,
}

/// Distributes view events to in-process subscribers.
///
/// The feed:
/// - Delivers events in emission order
/// - Supports multiple subscribers
/// - Drops subscribers whose receiver is gone on the next emit
/// - Is thread-safe
#[derive(Debug)]
pub struct UpdateFeed {
    subscribers: RwLock<Vec<(u64, Sender<ViewEvent>)>>,
    next_id: AtomicU64,
}

impl UpdateFeed {
    /// Creates a feed with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Subscribes to every future event.
    ///
    /// The receiver is unbounded and should be drained regularly.
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.write().push((id, tx));
        Subscription { id, receiver: rx }
    }

    /// Removes a subscription. Returns false if it was already gone.
    pub fn unsubscribe(&self, id: u64) -> bool {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|(sub, _)| *sub != id);
        subscribers.len() != before
    }

    /// Sends an event to every live subscriber.
    pub fn emit(&self, event: ViewEvent) {
        let mut subscribers = self.subscribers.write();
        subscribers.retain(|(_, tx)| tx.send(event.clone()).is_ok());
    }

    /// Returns the number of registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}

impl Default for UpdateFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logdex_codec::Value;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn indexed(seq: u64) -> ViewEvent {
        ViewEvent::Indexed(Message::new("L1", seq, Value::Integer(seq as i64)))
    }

    #[test]
    fn emit_and_receive() {
        let feed = UpdateFeed::new();
        let sub = feed.subscribe();

        feed.emit(indexed(1));

        let received = sub.receiver.recv_timeout(Duration::from_millis(100)).unwrap();
        assert_eq!(received, indexed(1));
    }

    #[test]
    fn multiple_subscribers() {
        let feed = UpdateFeed::new();
        let a = feed.subscribe();
        let b = feed.subscribe();
        assert_ne!(a.id, b.id);

        feed.emit(ViewEvent::IndexAdded("tags".into()));

        assert_eq!(a.receiver.recv().unwrap(), ViewEvent::IndexAdded("tags".into()));
        assert_eq!(b.receiver.recv().unwrap(), ViewEvent::IndexAdded("tags".into()));
    }

    #[test]
    fn late_subscriber_misses_earlier_events() {
        let feed = UpdateFeed::new();
        feed.emit(indexed(1));
        let sub = feed.subscribe();
        feed.emit(indexed(2));

        assert_eq!(sub.receiver.recv().unwrap(), indexed(2));
        assert!(sub.receiver.try_recv().is_err());
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let feed = UpdateFeed::new();
        let sub = feed.subscribe();
        assert!(feed.unsubscribe(sub.id));
        assert!(!feed.unsubscribe(sub.id));

        feed.emit(indexed(1));
        assert!(sub.receiver.try_recv().is_err());
        assert_eq!(feed.subscriber_count(), 0);
    }

    #[test]
    fn subscriber_cleanup() {
        let feed = UpdateFeed::new();
        let sub = feed.subscribe();
        assert_eq!(feed.subscriber_count(), 1);

        drop(sub);

        feed.emit(indexed(1));
        assert_eq!(feed.subscriber_count(), 0);
    }

    #[test]
    fn order_is_preserved() {
        let feed = UpdateFeed::new();
        let sub = feed.subscribe();
        for i in 0..10 {
            feed.emit(indexed(i));
        }
        let got: Vec<ViewEvent> = sub.receiver.try_iter().collect();
        assert_eq!(got, (0..10).map(indexed).collect::<Vec<_>>());
    }

    #[test]
    fn threaded_subscribe() {
        let feed = Arc::new(UpdateFeed::new());
        let sub = feed.subscribe();

        let emitter = Arc::clone(&feed);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            emitter.emit(indexed(42));
        });

        let received = sub.receiver.recv_timeout(Duration::from_millis(500)).unwrap();
        assert_eq!(received, indexed(42));

        handle.join().unwrap();
    }
}

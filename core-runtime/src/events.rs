//! # Event Bus System
//!
//! A typed fan-out channel built on `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! - **EventBus**: owns the sending half; `emit` never blocks
//! - **EventStream**: one subscriber's receiving half, with optional filtering
//! - **Close-once**: `close()` drops the sender exactly once; every stream then
//!   drains what it already buffered and observes `RecvError::Closed`
//!
//! ```text
//!                     ┌───────────┐     subscribe    ┌────────────┐
//!  engine callbacks ─>│           ├─────────────────>│ EventStream│
//!                     │ EventBus  │                  └────────────┘
//!  position ticker ──>│ (broadcast│     subscribe    ┌────────────┐
//!                     │  channel) ├─────────────────>│ EventStream│
//!                     └───────────┘                  └────────────┘
//! ```
//!
//! ## Backpressure
//!
//! The bus is bounded. Each subscriber has its own window of `capacity`
//! events; a subscriber that falls further behind loses the oldest events and
//! is told how many through `RecvError::Lagged(n)`. Producers are never slowed
//! down by slow consumers.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::EventBus;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus: EventBus<String> = EventBus::new(16);
//! let mut stream = bus.subscribe();
//!
//! bus.emit("hello".to_string()).ok();
//! assert_eq!(stream.recv().await.unwrap(), "hello");
//!
//! bus.close();
//! assert!(stream.recv().await.is_err());
//! # }
//! ```

use core_async::sync::broadcast::{self, error::SendError, Receiver, Sender};
use parking_lot::RwLock;
use std::fmt;

pub use core_async::sync::broadcast::error::{RecvError, TryRecvError};

/// Default per-subscriber buffer size for event buses.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 1024;

// ============================================================================
// Event Bus
// ============================================================================

/// Broadcast bus for events of type `E`.
///
/// Cloning events is the cost of fan-out: every subscriber receives its own
/// copy, so `E` should be cheap to clone.
pub struct EventBus<E> {
    sender: RwLock<Option<Sender<E>>>,
    capacity: usize,
}

impl<E> EventBus<E>
where
    E: Clone + Send + 'static,
{
    /// Creates a new event bus with the specified per-subscriber buffer size.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: RwLock::new(Some(sender)),
            capacity,
        }
    }

    /// Publishes an event to all subscribers without blocking.
    ///
    /// Returns the number of subscribers that received the event. Returns the
    /// event back if nobody is subscribed or the bus has been closed; callers
    /// that do not care use `.ok()`.
    pub fn emit(&self, event: E) -> Result<usize, SendError<E>> {
        match self.sender.read().as_ref() {
            Some(sender) => sender.send(event),
            None => Err(SendError(event)),
        }
    }

    /// Creates a new subscriber that receives every event emitted from now on.
    ///
    /// Past events are not replayed. Subscribing to a closed bus yields a
    /// stream that is already closed.
    pub fn subscribe(&self) -> EventStream<E> {
        let receiver = match self.sender.read().as_ref() {
            Some(sender) => sender.subscribe(),
            None => {
                let (_, receiver) = broadcast::channel(1);
                receiver
            }
        };
        EventStream::new(receiver)
    }

    /// Closes the bus. Returns `true` only for the call that actually closed it.
    pub fn close(&self) -> bool {
        self.sender.write().take().is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.sender.read().is_none()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender
            .read()
            .as_ref()
            .map(Sender::receiver_count)
            .unwrap_or(0)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<E> Default for EventBus<E>
where
    E: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl<E> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sender = self.sender.read();
        f.debug_struct("EventBus")
            .field("capacity", &self.capacity)
            .field("closed", &sender.is_none())
            .field(
                "subscriber_count",
                &sender.as_ref().map(Sender::receiver_count).unwrap_or(0),
            )
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

/// Type alias for event filter functions.
type EventFilter<E> = Box<dyn Fn(&E) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with optional filtering.
///
/// # Example
///
/// ```rust
/// use core_runtime::events::EventBus;
///
/// let bus: EventBus<u32> = EventBus::new(8);
/// let evens = bus.subscribe().filter(|n| n % 2 == 0);
/// ```
pub struct EventStream<E> {
    receiver: Receiver<E>,
    filter: Option<EventFilter<E>>,
}

impl<E> EventStream<E>
where
    E: Clone + Send + 'static,
{
    /// Creates a new event stream from a receiver.
    pub fn new(receiver: Receiver<E>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` are returned by `recv`/`try_recv`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &E) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter.
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n` events.
    /// Returns `RecvError::Closed` once the bus is closed and the buffer drained.
    pub async fn recv(&mut self) -> Result<E, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without waiting.
    ///
    /// Returns `None` if no matching event is currently buffered.
    pub fn try_recv(&mut self) -> Option<Result<E, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Lagged(n)) => return Some(Err(RecvError::Lagged(n))),
                Err(TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }

    /// Drains every matching event currently buffered, skipping lag markers.
    pub fn drain(&mut self) -> Vec<E> {
        let mut events = Vec::new();
        while let Some(result) = self.try_recv() {
            match result {
                Ok(event) => events.push(event),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
        events
    }

    /// Consumes the wrapper, returning the underlying receiver.
    pub fn into_inner(self) -> Receiver<E> {
        self.receiver
    }
}

impl<E> fmt::Debug for EventStream<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("filtered", &self.filter.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq)]
    enum Ping {
        Number(u32),
        Text(String),
    }

    #[tokio::test]
    async fn test_event_bus_creation() {
        let bus: EventBus<Ping> = EventBus::new(10);
        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(bus.capacity(), 10);
        assert!(!bus.is_closed());
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let bus: EventBus<Ping> = EventBus::new(0);
        assert_eq!(bus.capacity(), 1);
    }

    #[tokio::test]
    async fn test_event_emission_no_subscribers() {
        let bus = EventBus::new(10);
        assert!(bus.emit(Ping::Number(1)).is_err());
    }

    #[tokio::test]
    async fn test_multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(10);
        let mut sub1 = bus.subscribe();
        let mut sub2 = bus.subscribe();

        assert_eq!(bus.emit(Ping::Number(7)).unwrap(), 2);

        assert_eq!(sub1.recv().await.unwrap(), Ping::Number(7));
        assert_eq!(sub2.recv().await.unwrap(), Ping::Number(7));
    }

    #[tokio::test]
    async fn test_event_stream_with_filter() {
        let bus = EventBus::new(10);
        let mut numbers = bus.subscribe().filter(|e| matches!(e, Ping::Number(_)));

        bus.emit(Ping::Text("skip".into())).ok();
        bus.emit(Ping::Number(3)).ok();

        assert_eq!(numbers.recv().await.unwrap(), Ping::Number(3));
        assert!(numbers.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_lagged_subscriber() {
        let bus = EventBus::new(2);
        let mut sub = bus.subscribe();

        for n in 0..5 {
            bus.emit(Ping::Number(n)).ok();
        }

        assert!(matches!(sub.recv().await, Err(RecvError::Lagged(3))));
        assert_eq!(sub.recv().await.unwrap(), Ping::Number(3));
    }

    #[tokio::test]
    async fn test_close_is_reported_once() {
        let bus: EventBus<Ping> = EventBus::new(4);
        assert!(bus.close());
        assert!(!bus.close());
        assert!(bus.is_closed());
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_buffered_events_survive_close() {
        let bus = EventBus::new(4);
        let mut sub = bus.subscribe();

        bus.emit(Ping::Number(1)).ok();
        bus.close();

        assert_eq!(sub.recv().await.unwrap(), Ping::Number(1));
        assert!(matches!(sub.recv().await, Err(RecvError::Closed)));
        assert!(bus.emit(Ping::Number(2)).is_err());
    }

    #[tokio::test]
    async fn test_subscribe_after_close_is_closed() {
        let bus: EventBus<Ping> = EventBus::new(4);
        bus.close();

        let mut late = bus.subscribe();
        assert!(matches!(late.recv().await, Err(RecvError::Closed)));
    }

    #[tokio::test]
    async fn test_concurrent_publishers() {
        let bus = Arc::new(EventBus::new(64));
        let mut sub = bus.subscribe();

        let handles: Vec<_> = (0..4)
            .map(|n| {
                let bus = Arc::clone(&bus);
                tokio::spawn(async move {
                    bus.emit(Ping::Number(n)).ok();
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let mut received = sub.drain();
        received.sort_by_key(|e| match e {
            Ping::Number(n) => *n,
            Ping::Text(_) => u32::MAX,
        });
        assert_eq!(received, (0..4).map(Ping::Number).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_try_recv_empty() {
        let bus: EventBus<Ping> = EventBus::new(4);
        let mut sub = bus.subscribe();
        assert!(sub.try_recv().is_none());
    }
}

//! # Event bus for broadcasting pagination events.
//!
//! [`Bus`] wraps a [`tokio::sync::broadcast`] channel so that every part of
//! the pager can report what it is doing without caring who listens: steps
//! publish sentinel and merge events, watch/unwatch publish lifecycle
//! events, and the subscriber fan-out publishes its own health reports onto
//! the same stream.
//!
//! ```text
//!   Pager::step ──────┐
//!   Pager::watch    ──┼──────► Bus ─────┬──► subscriber_listener ──► SubscriberSet
//!   Pager::unwatch  ──┤  (ring buffer)  └──► host-held Receiver(s)
//!   SubscriberSet   ──┘
//! ```
//!
//! Publishing is fire-and-forget: it never blocks, never fails, and keeps
//! nothing once every receiver has seen (or missed) an event. The channel
//! holds the most recent `capacity` events; a receiver that falls further
//! behind gets `RecvError::Lagged(n)` on its next `recv()` and resumes with
//! the oldest event still buffered. Events published while there are no
//! receivers at all simply vanish.
//!
//! Most hosts never touch the bus directly - the pager runs its own
//! listener that feeds [`SubscriberSet`](crate::SubscriberSet) - but
//! [`Bus::subscribe`] hands out a raw receiver for tests and for hosts that
//! want the unfanned stream.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for pagination events.
///
/// Cloning is cheap (the sender is `Arc`-backed internally) and every clone
/// publishes into the same ring buffer. Receivers get their own cursor and
/// a clone of each event.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus whose ring buffer holds `capacity` events (minimum 1,
    /// clamped). The buffer is shared by all receivers.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Publishes an event to all current receivers, without blocking.
    ///
    /// With no receivers attached the event is dropped silently.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Publishes a borrowed event; shorthand for `publish(ev.clone())`.
    pub fn publish_ref(&self, ev: &Event) {
        let _ = self.tx.send(ev.clone());
    }

    /// Attaches a fresh receiver.
    ///
    /// The receiver observes only events published after this call, and
    /// reports `RecvError::Lagged` if it falls behind the ring buffer.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

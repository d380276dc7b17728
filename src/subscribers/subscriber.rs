//! # Subscribe: the event consumer contract.
//!
//! [`Subscribe`] is the hook for watching pagination from the outside:
//! ship merge counts to metrics, mirror fetch failures into an alerting
//! channel, or record event streams for replay in tests.
//!
//! ## Delivery contract
//! Each subscriber owns a bounded FIFO queue and a dedicated worker task:
//!
//! ```text
//! Bus ──► SubscriberSet.emit ──► [queue, cap = queue_capacity()] ──► worker
//!                                                                      │
//!                                                   on_event(ev) ◄─────┘
//! ```
//!
//! - Events arrive in publish order, one at a time per subscriber.
//! - `emit` never waits: a full queue drops the event **for that subscriber
//!   only** and a `SubscriberOverflow` report is raised in its place.
//! - A panic inside [`Subscribe::on_event`] is caught and surfaced as
//!   `SubscriberPanicked`; the worker keeps consuming and no other
//!   subscriber notices.
//!
//! Subscribers therefore cannot stall a page load, only their own view of
//! the event stream.
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! use async_trait::async_trait;
//! use scrollvisor::{Event, EventKind, Subscribe};
//!
//! /// Counts rows merged across all containers.
//! #[derive(Default)]
//! struct RowCounter(AtomicUsize);
//!
//! #[async_trait]
//! impl Subscribe for RowCounter {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::PageMerged {
//!             self.0.fetch_add(ev.appended.unwrap_or(0), Ordering::Relaxed);
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "row_counter"
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// A consumer of pagination events.
///
/// Implementations run behind their own queue and worker, so a slow or
/// broken subscriber degrades only itself. Keep `on_event` non-blocking
/// (async I/O, no long computations) and swallow errors internally; the
/// fan-out has no error channel, only the panic report.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event.
    ///
    /// Runs on the subscriber's worker task, never in the publisher's
    /// context, and strictly in arrival order. Panics are caught and
    /// reported as `SubscriberPanicked` rather than propagated.
    async fn on_event(&self, event: &Event);

    /// Short identifier stamped on log lines and on the `subscriber` field
    /// of overflow/panic reports.
    ///
    /// The default is `type_name::<Self>()`, which includes the full module
    /// path; override with something like `"log"` or `"metrics"`.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Capacity of this subscriber's event queue (default 1024, minimum 1).
    ///
    /// Size it for the subscriber's worst-case lag: once the queue is full,
    /// newer events are dropped for this subscriber and reported as
    /// `SubscriberOverflow` while everyone else keeps receiving.
    fn queue_capacity(&self) -> usize {
        1024
    }
}

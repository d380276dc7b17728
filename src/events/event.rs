//! # Events emitted by the pager.
//!
//! [`EventKind`] covers three groups of happenings:
//! - **Watch lifecycle**: containers entering and leaving the pager's care
//! - **Pagination flow**: sentinel arming, triggering, fetching, merging, draining
//! - **Subscriber safety**: fan-out overflow and panic reports
//!
//! The [`Event`] struct carries the metadata that goes with each kind: the
//! watched container, the fetched path, HTTP status, merge counts, and a
//! wall-clock timestamp.
//!
//! ## Ordering guarantees
//! Every constructed event draws the next value from one process-wide
//! counter into `seq`, so two events can always be put back in creation
//! order even after crossing channels.
//!
//! ## Example
//! ```rust
//! use scrollvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::FetchFailed)
//!     .with_path("/items?page=2")
//!     .with_status(503)
//!     .with_reason("service unavailable");
//!
//! assert_eq!(ev.kind, EventKind::FetchFailed);
//! assert_eq!(ev.path.as_deref(), Some("/items?page=2"));
//! assert_eq!(ev.status, Some(503));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::dom::NodeId;

/// Process-wide ticket source for `Event::seq`.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// What happened, without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Watch lifecycle events ===
    /// A container was placed under pagination watch.
    ///
    /// Sets:
    /// - `container`: watched container node
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    ContainerWatched,

    /// A container left pagination watch (explicit unwatch).
    ///
    /// Sets:
    /// - `container`: container node
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    ContainerUnwatched,

    // === Pagination flow events ===
    /// A sentinel row with a next-page link was found inside the container.
    ///
    /// Emitted when the armed sentinel identity changes, not on every scroll.
    ///
    /// Sets:
    /// - `container`: container node
    /// - `path`: next-page path carried by the sentinel
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    SentinelArmed,

    /// The viewport revealed the armed sentinel; a load is being committed.
    ///
    /// The sentinel's marker class is already gone when this event is
    /// published, so the same sentinel can never trigger twice.
    ///
    /// Sets:
    /// - `container`: container node
    /// - `path`: next-page path
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    SentinelTriggered,

    /// A next-page request left for the backend.
    ///
    /// Sets:
    /// - `container`: container node
    /// - `path`: requested path
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    FetchStarted,

    /// A next-page request failed (transport error or non-200 status).
    ///
    /// Sets:
    /// - `container`: container node
    /// - `path`: requested path
    /// - `status`: HTTP status, when one was received
    /// - `reason`: what went wrong, as text
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    FetchFailed,

    /// A fetched page was spliced into the container.
    ///
    /// Sets:
    /// - `container`: container node
    /// - `path`: fetched path
    /// - `appended`: number of top-level nodes inserted
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    PageMerged,

    /// The container merged its last page: no new sentinel arrived.
    ///
    /// Sets:
    /// - `container`: container node
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    PagerDrained,

    /// Pagination halted for the container after a failed load.
    ///
    /// Sets:
    /// - `container`: container node
    /// - `path`: path of the failed load
    /// - `reason`: why the container parked
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    PagerStalled,

    // === Subscriber safety events ===
    /// An event was dropped for one subscriber, because its queue was full
    /// or its worker had shut down.
    ///
    /// Sets:
    /// - `subscriber`: subscriber name
    /// - `reason`: `"full"` or `"closed"`
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    SubscriberOverflow,

    /// A subscriber's `on_event` panicked; the worker survived it.
    ///
    /// Sets:
    /// - `subscriber`: subscriber name
    /// - `reason`: the panic payload, stringified
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    SubscriberPanicked,
}

/// One pagination event plus whatever metadata its kind carries.
///
/// Only `seq`, `at`, and `kind` are always set; each [`EventKind`] lists
/// which of the optional fields accompany it.
#[derive(Clone, Debug)]
pub struct Event {
    /// Creation-ordered sequence number, unique within the process.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,

    /// Watched container, if applicable.
    pub container: Option<NodeId>,
    /// Next-page path (the sentinel's link attribute value).
    pub path: Option<Arc<str>>,
    /// HTTP status of a failed fetch, when one was received.
    pub status: Option<u16>,
    /// Number of top-level nodes merged into the container.
    pub appended: Option<usize>,
    /// Failure or drop reason in human-readable form.
    pub reason: Option<Arc<str>>,
    /// Name of the subscriber, for subscriber safety events.
    pub subscriber: Option<Arc<str>>,
    /// Which kind of event this is.
    pub kind: EventKind,
}

impl Event {
    /// Stamps a new event of `kind` with the next sequence number and the
    /// current time.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            kind,
            at: SystemTime::now(),
            container: None,
            path: None,
            status: None,
            appended: None,
            reason: None,
            subscriber: None,
        }
    }

    /// Attaches the watched container node.
    #[inline]
    pub fn with_container(mut self, container: NodeId) -> Self {
        self.container = Some(container);
        self
    }

    /// Attaches a next-page path.
    #[inline]
    pub fn with_path(mut self, path: impl Into<Arc<str>>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attaches an HTTP status code.
    #[inline]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Attaches a merged-node count.
    #[inline]
    pub fn with_appended(mut self, appended: usize) -> Self {
        self.appended = Some(appended);
        self
    }

    /// Attaches a failure or drop reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a subscriber name.
    #[inline]
    pub fn with_subscriber(mut self, subscriber: impl Into<Arc<str>>) -> Self {
        self.subscriber = Some(subscriber.into());
        self
    }

    /// Reports that a subscriber's queue rejected an event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_subscriber(subscriber)
            .with_reason(reason)
    }

    /// Reports that a subscriber panicked while handling an event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_subscriber(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    #[inline]
    pub fn is_subscriber_panic(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberPanicked)
    }
}

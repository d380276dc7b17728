//! # SubscriberSet: clone-and-queue event fan-out.
//!
//! One [`Event`](crate::events::Event) in, one `Arc`-wrapped clone out to
//! every subscriber's bounded queue; a worker task per subscriber drains its
//! queue and calls [`Subscribe::on_event`]. The delivery contract is
//! documented on [`Subscribe`]; this module is the machinery enforcing it.
//!
//! ```text
//! emit(&Event) ─ clone once ─► Arc<Event>
//!                  ├─► [queue s1] ─► worker ─► s1.on_event()
//!                  ├─► [queue s2] ─► worker ─► s2.on_event()
//!                  └─► [queue sN] ─► worker ─► sN.on_event()
//! ```
//!
//! The queues keep subscribers independent of the pager and of each other:
//! `emit` only ever enqueues, ordering holds within a queue but not across
//! queues, and a full queue sheds events for its own subscriber alone.
//!
//! ## Feedback
//! When constructed with a feedback [`Bus`], drops and panics are published
//! back as `SubscriberOverflow` / `SubscriberPanicked` events, so the same
//! subscribers that watch pagination can watch their own health. Reports
//! about subscriber-safety events themselves are logged but never
//! republished; the feedback loop stays finite.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use scrollvisor::{Event, EventKind, Subscribe, SubscriberSet};
//!
//! struct Printer;
//!
//! #[async_trait::async_trait]
//! impl Subscribe for Printer {
//!     async fn on_event(&self, ev: &Event) { let _ = ev; }
//!     fn name(&self) -> &'static str { "printer" }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let set = SubscriberSet::new(vec![Arc::new(Printer) as Arc<dyn Subscribe>], None);
//! set.emit(&Event::new(EventKind::PagerDrained));
//! set.shutdown().await;
//! # }
//! ```

use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::events::{Bus, Event};

use super::Subscribe;

/// Send side of one subscriber's queue, tagged with its name.
struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Fans events out to subscribers over per-subscriber queues and workers.
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    workers: Vec<JoinHandle<()>>,
    feedback: Option<Bus>,
}

impl SubscriberSet {
    /// Builds the set and starts a worker task for every subscriber.
    ///
    /// `feedback` is where overflow/panic reports are published; pass the
    /// pager's bus to have subscriber health observed like everything else,
    /// or `None` to keep reports in the logs only.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, feedback: Option<Bus>) -> Self {
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let cap = sub.queue_capacity().max(1);
            let name = sub.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Event>>(cap);
            let s = Arc::clone(&sub);
            let bus = feedback.clone();

            let handle = tokio::spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let fut = s.on_event(ev.as_ref());
                    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        let info = panic_message(panic_err.as_ref());
                        tracing::warn!(subscriber = s.name(), %info, "subscriber panicked");
                        // A panic while handling a safety report stays in the
                        // logs; republishing it could feed on itself.
                        if ev.is_subscriber_overflow() || ev.is_subscriber_panic() {
                            continue;
                        }
                        if let Some(bus) = &bus {
                            bus.publish(Event::subscriber_panicked(s.name(), info));
                        }
                    }
                }
            });

            channels.push(SubscriberChannel { name, sender: tx });
            workers.push(handle);
        }

        Self {
            channels,
            workers,
            feedback,
        }
    }

    /// Queues a clone of `event` for every subscriber and returns at once.
    ///
    /// A full or closed queue drops the event for that subscriber; the drop
    /// is logged and raised as `SubscriberOverflow` on the feedback bus.
    pub fn emit(&self, event: &Event) {
        let ev = Arc::new(event.clone());
        for channel in &self.channels {
            match channel.sender.try_send(Arc::clone(&ev)) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    self.report_drop(channel.name, "full", event);
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    self.report_drop(channel.name, "closed", event);
                }
            }
        }
    }

    /// Closes every queue and waits for the workers to drain and exit.
    pub async fn shutdown(self) {
        drop(self.channels);
        for h in self.workers {
            let _ = h.await;
        }
    }

    /// True when the set was built with no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// How many subscribers are attached.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    fn report_drop(&self, name: &'static str, reason: &'static str, dropped: &Event) {
        tracing::warn!(subscriber = name, reason, "subscriber dropped event");
        // Dropping a safety report must not spawn another safety report.
        if dropped.is_subscriber_overflow() || dropped.is_subscriber_panic() {
            return;
        }
        if let Some(bus) = &self.feedback {
            bus.publish(Event::subscriber_overflow(name, reason));
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

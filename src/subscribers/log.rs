//! # LogWriter: pagination events as tracing lines.
//!
//! [`LogWriter`] forwards events to [`tracing`] in a human-readable format.
//! Handy while developing or running the bundled demos; real deployments
//! usually want their own [`Subscribe`](super::Subscribe) impl instead.
//!
//! ## Output format (with a default `tracing_subscriber::fmt` layer)
//! ```text
//! INFO scrollvisor: container watched container=NodeId(2)
//! INFO scrollvisor: sentinel armed container=NodeId(2) path=/items?page=2
//! INFO scrollvisor: page merged container=NodeId(2) path=/items?page=2 appended=10
//! WARN scrollvisor: fetch failed container=Some(NodeId(2)) path=Some("/items?page=3") status=Some(503)
//! INFO scrollvisor: pager drained container=NodeId(2)
//! ```
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use scrollvisor::{LogWriter, Subscribe, SubscriberSet};
//!
//! tracing_subscriber::fmt().with_env_filter("info").init();
//! let set = SubscriberSet::new(vec![Arc::new(LogWriter) as Arc<dyn Subscribe>], None);
//! // set.emit(&event) now lands in the log.
//! ```

use async_trait::async_trait;
use tracing::{info, warn};

use crate::events::{Event, EventKind};

use super::Subscribe;

/// Tracing-backed subscriber that prints one line per event.
///
/// Ships behind the `logging` feature as a quick way to see what the pager
/// is doing. For production telemetry, write a [`Subscribe`] impl that emits
/// your own fields rather than adopting this format.
#[derive(Default)]
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::ContainerWatched => {
                if let Some(container) = e.container {
                    info!(?container, "container watched");
                }
            }
            EventKind::ContainerUnwatched => {
                if let Some(container) = e.container {
                    info!(?container, "container unwatched");
                }
            }
            EventKind::SentinelArmed => {
                if let (Some(container), Some(path)) = (e.container, e.path.as_deref()) {
                    info!(?container, path, "sentinel armed");
                }
            }
            EventKind::SentinelTriggered => {
                if let (Some(container), Some(path)) = (e.container, e.path.as_deref()) {
                    info!(?container, path, "sentinel triggered");
                }
            }
            EventKind::FetchStarted => {
                if let (Some(container), Some(path)) = (e.container, e.path.as_deref()) {
                    info!(?container, path, "fetch started");
                }
            }
            EventKind::FetchFailed => {
                warn!(
                    container = ?e.container,
                    path = ?e.path,
                    status = ?e.status,
                    reason = ?e.reason,
                    "fetch failed"
                );
            }
            EventKind::PageMerged => {
                if let (Some(container), Some(path)) = (e.container, e.path.as_deref()) {
                    info!(?container, path, appended = ?e.appended, "page merged");
                }
            }
            EventKind::PagerDrained => {
                if let Some(container) = e.container {
                    info!(?container, "pager drained");
                }
            }
            EventKind::PagerStalled => {
                warn!(
                    container = ?e.container,
                    path = ?e.path,
                    reason = ?e.reason,
                    "pager stalled"
                );
            }
            EventKind::SubscriberOverflow => {
                warn!(
                    subscriber = ?e.subscriber,
                    reason = ?e.reason,
                    "subscriber dropped an event"
                );
            }
            EventKind::SubscriberPanicked => {
                warn!(
                    subscriber = ?e.subscriber,
                    reason = ?e.reason,
                    "subscriber panicked"
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

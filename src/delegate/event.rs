//! # Input events delivered by the host.
//!
//! [`UiEvent`] is the headless stand-in for a browser event: a name, an
//! optional target node, and (for scroll events) the current viewport. The
//! host constructs one per user interaction and hands it to
//! [`Delegator::dispatch`](super::Delegator::dispatch).
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically, so handlers can restore arrival order when events are
//! recorded out of band.
//!
//! ## Example
//! ```rust
//! use scrollvisor::{UiEvent, Viewport};
//!
//! let click = UiEvent::new("click");
//! let scroll = UiEvent::scroll(Viewport::new(120.0, 600.0));
//!
//! assert_eq!(&*click.name, "click");
//! assert!(scroll.viewport.is_some());
//! assert!(scroll.seq > click.seq);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::dom::{NodeId, Viewport};

/// Process-wide ticket source for `UiEvent::seq`.
static UI_EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// A single input event as reported by the host.
#[derive(Debug, Clone)]
pub struct UiEvent {
    /// Creation-ordered sequence number, unique within the process.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,

    /// Event name (`"click"`, `"scroll"`, ...). Matched verbatim against
    /// registrations.
    pub name: Arc<str>,
    /// The node the event originated on, if any.
    pub target: Option<NodeId>,
    /// Scroll window at the time of the event; set for scroll events.
    pub viewport: Option<Viewport>,
}

impl UiEvent {
    /// Creates a new event with the current timestamp and next sequence number.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            seq: UI_EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            name: name.into(),
            target: None,
            viewport: None,
        }
    }

    /// A `click` on the given node.
    #[inline]
    pub fn click(target: NodeId) -> Self {
        UiEvent::new("click").with_target(target)
    }

    /// A `scroll` carrying the current viewport.
    #[inline]
    pub fn scroll(viewport: Viewport) -> Self {
        UiEvent::new("scroll").with_viewport(viewport)
    }

    /// Attaches the originating node.
    #[inline]
    pub fn with_target(mut self, target: NodeId) -> Self {
        self.target = Some(target);
        self
    }

    /// Attaches the current viewport.
    #[inline]
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = Some(viewport);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;

    #[test]
    fn test_seq_is_monotonic() {
        let a = UiEvent::new("click");
        let b = UiEvent::new("click");
        let c = UiEvent::new("scroll");
        assert!(a.seq < b.seq);
        assert!(b.seq < c.seq);
    }

    #[test]
    fn test_constructors_set_payloads() {
        let mut doc = Document::new();
        let node = doc.create_element(doc.root(), "a", &[]).unwrap();

        let click = UiEvent::click(node);
        assert_eq!(&*click.name, "click");
        assert_eq!(click.target, Some(node));
        assert!(click.viewport.is_none());

        let scroll = UiEvent::scroll(Viewport::new(0.0, 480.0));
        assert_eq!(&*scroll.name, "scroll");
        assert!(scroll.target.is_none());
        assert_eq!(scroll.viewport.unwrap().height, 480.0);
    }
}

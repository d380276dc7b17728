//! # Delegator: one listener per registration, resolved per event.
//!
//! [`Delegator`] implements delegated event handling over a [`Document`]:
//! a handler is registered once on a root element and fires for events that
//! originate on any matching descendant, including descendants added after
//! registration.
//!
//! ## Architecture
//! ```text
//! host input ──► UiEvent ──► Delegator::dispatch(&mut doc, &event)
//!                               │
//!                               ├─► window listeners (event name match)
//!                               │
//!                               └─► delegated registrations (event name match)
//!                                     │  per registration:
//!                                     │    candidates = query_all(root, selector)   (fresh)
//!                                     │    walk target → parent → ... → root
//!                                     │    first candidate hit = context
//!                                     └─► handler(&mut doc, context, &event)   (at most once)
//! ```
//!
//! ## Rules
//! - **Fresh candidates**: the selector is evaluated against the live tree on
//!   every dispatch; registration captures no node set.
//! - **Document order wins**: candidates are tried in document order, and the
//!   first one found on the target's ancestor chain is the context. A handler
//!   runs at most once per registration per event.
//! - **Silent no-op**: no candidates, or a target outside the root, simply
//!   matches nothing.
//! - **Disposal**: every registration returns a [`Subscription`]; dropping it
//!   detaches exactly that listener. Registrations never clobber each other.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use scrollvisor::{Delegator, Document, UiEvent};
//!
//! let mut doc = Document::parse(
//!     r#"<ul id="feed"><li class="row"><span>first</span></li></ul>"#,
//! )?;
//! let span = doc.query_first(doc.root(), &"span".parse()?).unwrap();
//!
//! let delegator = Delegator::new();
//! let hits = Arc::new(AtomicUsize::new(0));
//! let seen = Arc::clone(&hits);
//! let _sub = delegator.on(&doc, "#feed", "click", ".row", move |_doc, _row, _ev| {
//!     seen.fetch_add(1, Ordering::SeqCst);
//! })?;
//!
//! // The click lands on the <span>, the handler binds to the enclosing .row.
//! delegator.dispatch(&mut doc, &UiEvent::click(span));
//! assert_eq!(hits.load(Ordering::SeqCst), 1);
//! # Ok::<(), scrollvisor::DelegateError>(())
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use crate::dom::{Document, NodeId, Selector};

use super::error::DelegateError;
use super::event::UiEvent;

/// Handler for delegated events: the document, the matched descendant (the
/// bound context), and the original event.
pub type DelegateHandler = dyn Fn(&mut Document, NodeId, &UiEvent) + Send + Sync;

/// Handler for window-level events; no document access, no context node.
pub type WindowHandler = dyn Fn(&UiEvent) + Send + Sync;

struct DelegatedEntry {
    id: u64,
    event: Arc<str>,
    root: NodeId,
    selector: Selector,
    handler: Arc<DelegateHandler>,
}

struct WindowEntry {
    id: u64,
    event: Arc<str>,
    handler: Arc<WindowHandler>,
}

#[derive(Default)]
struct Registry {
    delegated: Vec<DelegatedEntry>,
    window: Vec<WindowEntry>,
}

/// Dispatch table for delegated and window-level listeners.
pub struct Delegator {
    registry: Arc<Mutex<Registry>>,
    next_id: AtomicU64,
}

impl Delegator {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry::default())),
            next_id: AtomicU64::new(0),
        }
    }

    /// Registers a delegated listener.
    ///
    /// The root selector is resolved against `doc` once, now; failing to
    /// resolve is an error rather than a silent no-op. The candidate
    /// `selector` is kept as-is and evaluated fresh on every dispatch.
    pub fn on<F>(
        &self,
        doc: &Document,
        root_selector: &str,
        event: &str,
        selector: &str,
        handler: F,
    ) -> Result<Subscription, DelegateError>
    where
        F: Fn(&mut Document, NodeId, &UiEvent) + Send + Sync + 'static,
    {
        let root_sel = Selector::parse(root_selector)?;
        let selector = Selector::parse(selector)?;
        let root = doc
            .query_first(doc.root(), &root_sel)
            .ok_or_else(|| DelegateError::RootNotFound {
                selector: root_selector.to_string(),
            })?;

        let id = self.next_id.fetch_add(1, AtomicOrdering::Relaxed);
        self.lock().delegated.push(DelegatedEntry {
            id,
            event: event.into(),
            root,
            selector,
            handler: Arc::new(handler),
        });
        Ok(self.subscription(id))
    }

    /// Registers a window-level listener for the given event name.
    pub fn on_window<F>(&self, event: &str, handler: F) -> Subscription
    where
        F: Fn(&UiEvent) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, AtomicOrdering::Relaxed);
        self.lock().window.push(WindowEntry {
            id,
            event: event.into(),
            handler: Arc::new(handler),
        });
        self.subscription(id)
    }

    /// Delivers one event: window listeners first, then every delegated
    /// registration whose event name matches.
    ///
    /// Registrations are snapshotted before any handler runs, so handlers may
    /// register or dispose listeners without deadlocking; such changes take
    /// effect from the next dispatch.
    pub fn dispatch(&self, doc: &mut Document, event: &UiEvent) {
        let (window, delegated) = {
            let registry = self.lock();
            let window: Vec<Arc<WindowHandler>> = registry
                .window
                .iter()
                .filter(|entry| entry.event == event.name)
                .map(|entry| Arc::clone(&entry.handler))
                .collect();
            let delegated: Vec<(NodeId, Selector, Arc<DelegateHandler>)> = registry
                .delegated
                .iter()
                .filter(|entry| entry.event == event.name)
                .map(|entry| (entry.root, entry.selector.clone(), Arc::clone(&entry.handler)))
                .collect();
            (window, delegated)
        };

        for handler in window {
            handler(event);
        }

        let Some(target) = event.target else {
            return;
        };
        for (root, selector, handler) in delegated {
            if let Some(context) = delegate_target(doc, root, &selector, target) {
                handler(doc, context, event);
            }
        }
    }

    /// Number of live registrations (delegated + window).
    #[must_use]
    pub fn len(&self) -> usize {
        let registry = self.lock();
        registry.delegated.len() + registry.window.len()
    }

    /// True if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn subscription(&self, id: u64) -> Subscription {
        Subscription {
            registry: Arc::downgrade(&self.registry),
            id,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        // A poisoned registry is still structurally sound; keep dispatching.
        self.registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for Delegator {
    fn default() -> Self {
        Self::new()
    }
}

/// Locates the delegate context for one registration: the first candidate in
/// document order that lies on the target's ancestor chain (inclusive),
/// cut off at the registration root.
fn delegate_target(
    doc: &Document,
    root: NodeId,
    selector: &Selector,
    target: NodeId,
) -> Option<NodeId> {
    let candidates = doc.query_all(root, selector);
    for candidate in candidates {
        let mut cursor = Some(target);
        while let Some(node) = cursor {
            if node == candidate {
                return Some(candidate);
            }
            if node == root {
                break;
            }
            cursor = doc.parent(node);
        }
    }
    None
}

/// Owned registration: dropping (or [`cancel`](Subscription::cancel)-ing)
/// detaches exactly the listener it was returned for.
#[must_use = "dropping a Subscription detaches its listener"]
pub struct Subscription {
    registry: Weak<Mutex<Registry>>,
    id: u64,
}

impl Subscription {
    /// Detaches the listener now. Equivalent to dropping the subscription.
    pub fn cancel(self) {}

    fn release(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            let mut guard = registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            guard.delegated.retain(|entry| entry.id != self.id);
            guard.window.retain(|entry| entry.id != self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering::SeqCst;

    use super::*;
    use crate::dom::Viewport;

    fn find(doc: &Document, selector: &str) -> NodeId {
        doc.query_first(doc.root(), &Selector::parse(selector).unwrap())
            .unwrap()
    }

    fn counting_handler(hits: &Arc<AtomicUsize>) -> impl Fn(&mut Document, NodeId, &UiEvent) {
        let hits = Arc::clone(hits);
        move |_doc, _ctx, _ev| {
            hits.fetch_add(1, SeqCst);
        }
    }

    #[test]
    fn test_deep_target_binds_matching_ancestor() {
        let mut doc = Document::parse(
            r#"<ul id="feed">
                 <li class="row" id="r1"><em><span id="deep">x</span></em></li>
                 <li class="row" id="r2">y</li>
               </ul>"#,
        )
        .unwrap();
        let deep = find(&doc, "#deep");
        let r1 = find(&doc, "#r1");

        let delegator = Delegator::new();
        let contexts: Arc<StdMutex<Vec<NodeId>>> = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&contexts);
        let _sub = delegator
            .on(&doc, "#feed", "click", ".row", move |_doc, ctx, _ev| {
                sink.lock().unwrap().push(ctx);
            })
            .unwrap();

        delegator.dispatch(&mut doc, &UiEvent::click(deep));

        let seen = contexts.lock().unwrap();
        assert_eq!(&*seen, &[r1], "handler binds the enclosing .row, exactly once");
    }

    #[test]
    fn test_target_on_candidate_itself_matches() {
        let mut doc =
            Document::parse(r#"<ul id="feed"><li class="row" id="r1">x</li></ul>"#).unwrap();
        let r1 = find(&doc, "#r1");

        let delegator = Delegator::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let _sub = delegator
            .on(&doc, "#feed", "click", ".row", counting_handler(&hits))
            .unwrap();

        delegator.dispatch(&mut doc, &UiEvent::click(r1));
        assert_eq!(hits.load(SeqCst), 1);
    }

    #[test]
    fn test_non_matching_target_never_fires() {
        let mut doc = Document::parse(
            r#"<div id="page">
                 <ul id="feed"><li class="row">a</li></ul>
                 <p id="aside">b</p>
               </div>"#,
        )
        .unwrap();
        let aside = find(&doc, "#aside");

        let delegator = Delegator::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let _sub = delegator
            .on(&doc, "#feed", "click", ".row", counting_handler(&hits))
            .unwrap();

        // Target outside the registration root: silent no-op.
        delegator.dispatch(&mut doc, &UiEvent::click(aside));
        // Wrong event name: also a no-op.
        let row = find(&doc, ".row");
        delegator.dispatch(&mut doc, &UiEvent::new("keydown").with_target(row));
        assert_eq!(hits.load(SeqCst), 0);
    }

    #[test]
    fn test_candidates_are_queried_fresh() {
        let mut doc = Document::parse(r#"<ul id="feed"></ul>"#).unwrap();
        let feed = find(&doc, "#feed");

        let delegator = Delegator::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let _sub = delegator
            .on(&doc, "#feed", "click", ".row", counting_handler(&hits))
            .unwrap();

        // The row is created after registration; no re-registration needed.
        let late = doc.create_element(feed, "li", &[("class", "row")]).unwrap();
        delegator.dispatch(&mut doc, &UiEvent::click(late));
        assert_eq!(hits.load(SeqCst), 1);
    }

    #[test]
    fn test_document_order_wins_over_proximity() {
        // Both the outer and the inner node match; the outer one comes first
        // in document order, so it is the context even though the inner one
        // is the closer ancestor of the target.
        let mut doc = Document::parse(
            r#"<div id="root">
                 <div class="hot" id="outer">
                   <div class="hot" id="inner"><span id="leaf">x</span></div>
                 </div>
               </div>"#,
        )
        .unwrap();
        let leaf = find(&doc, "#leaf");
        let outer = find(&doc, "#outer");

        let delegator = Delegator::new();
        let contexts: Arc<StdMutex<Vec<NodeId>>> = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&contexts);
        let _sub = delegator
            .on(&doc, "#root", "click", ".hot", move |_doc, ctx, _ev| {
                sink.lock().unwrap().push(ctx);
            })
            .unwrap();

        delegator.dispatch(&mut doc, &UiEvent::click(leaf));
        assert_eq!(&*contexts.lock().unwrap(), &[outer]);
    }

    #[test]
    fn test_root_not_found_is_an_error() {
        let doc = Document::parse("<div></div>").unwrap();
        let delegator = Delegator::new();
        let result = delegator.on(&doc, "#missing", "click", ".row", |_d, _c, _e| {});
        assert!(matches!(
            result,
            Err(DelegateError::RootNotFound { .. })
        ));
    }

    #[test]
    fn test_selector_errors_propagate() {
        let doc = Document::parse(r#"<div id="root"></div>"#).unwrap();
        let delegator = Delegator::new();
        let result = delegator.on(&doc, "#root", "click", "ul li", |_d, _c, _e| {});
        assert!(matches!(result, Err(DelegateError::Dom(_))));
    }

    #[test]
    fn test_dropping_subscription_detaches_only_itself() {
        let mut doc =
            Document::parse(r#"<ul id="feed"><li class="row">x</li></ul>"#).unwrap();
        let row = find(&doc, ".row");

        let delegator = Delegator::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let sub_a = delegator
            .on(&doc, "#feed", "click", ".row", counting_handler(&first))
            .unwrap();
        let _sub_b = delegator
            .on(&doc, "#feed", "click", ".row", counting_handler(&second))
            .unwrap();
        assert_eq!(delegator.len(), 2);

        drop(sub_a);
        assert_eq!(delegator.len(), 1);

        delegator.dispatch(&mut doc, &UiEvent::click(row));
        assert_eq!(first.load(SeqCst), 0, "disposed listener must not fire");
        assert_eq!(second.load(SeqCst), 1, "surviving listener still fires");
    }

    #[test]
    fn test_cancel_detaches() {
        let doc = Document::parse(r#"<ul id="feed"></ul>"#).unwrap();
        let delegator = Delegator::new();
        let sub = delegator
            .on(&doc, "#feed", "click", ".row", |_d, _c, _e| {})
            .unwrap();
        sub.cancel();
        assert!(delegator.is_empty());
    }

    #[test]
    fn test_window_listener_filters_by_name() {
        let mut doc = Document::parse("<div></div>").unwrap();
        let delegator = Delegator::new();

        let seen: Arc<StdMutex<Vec<f64>>> = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = delegator.on_window("scroll", move |ev| {
            if let Some(viewport) = ev.viewport {
                sink.lock().unwrap().push(viewport.scroll_top);
            }
        });

        delegator.dispatch(&mut doc, &UiEvent::new("click"));
        delegator.dispatch(&mut doc, &UiEvent::scroll(Viewport::new(250.0, 600.0)));

        assert_eq!(&*seen.lock().unwrap(), &[250.0]);
    }

    #[test]
    fn test_subscription_outliving_delegator_is_harmless() {
        let doc = Document::parse(r#"<ul id="feed"></ul>"#).unwrap();
        let delegator = Delegator::new();
        let sub = delegator
            .on(&doc, "#feed", "click", ".row", |_d, _c, _e| {})
            .unwrap();
        drop(delegator);
        sub.cancel();
    }
}

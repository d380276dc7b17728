//! # scrollvisor
//!
//! **Scrollvisor** is a headless event-delegation and infinite-scroll
//! pagination library for Rust.
//!
//! It provides primitives to route input events to selector-matched
//! handlers and to grow list containers page by page as the user scrolls,
//! driven by sentinel rows the backend embeds in its markup. The crate is
//! designed as a building block for server-side renderers, UI test
//! harnesses, and embedded document hosts.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!              host input events (click, scroll, ...)
//!                              │
//!                              ▼
//!                   ┌────────────────────┐
//!                   │     Delegator      │
//!                   │ (selector matching)│
//!                   └─────┬────────┬─────┘
//!             delegated   │        │   window "scroll"
//!                         ▼        ▼
//!        handler(&mut Document)  ┌────────────────────┐
//!                                │    PagerHandle     │
//!                                │   (signal queue)   │
//!                                └─────────┬──────────┘
//!                                          │ mpsc
//!                                          ▼
//!                                ┌────────────────────┐
//!                                │    Pager::run()    │
//!                                │   (driven loop)    │
//!                                └─────────┬──────────┘
//!                                          │ on_scroll
//!                                          ▼
//! ┌────────────────────────────────────────────────────────────────────┐
//! │  Pager (per-container slots: Idle / Armed / Fetching / Stalled)    │
//! │  - resolve the armed sentinel (marker class + link attribute)      │
//! │  - visibility check against the reported viewport                  │
//! │  - consume marker, fetch fragment, splice payload, re-arm/drain    │
//! └──────────────────────────────┬─────────────────────────────────────┘
//!                                │ publishes Events:
//!                                │ - SentinelArmed / SentinelTriggered
//!                                │ - FetchStarted / FetchFailed
//!                                │ - PageMerged / PagerDrained / ...
//!                                ▼
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                      Bus (broadcast channel)                       │
//! │                   (capacity: Config::bus_capacity)                 │
//! └──────────────────────────────┬─────────────────────────────────────┘
//!                                ▼
//!                    ┌────────────────────────┐
//!                    │  subscriber_listener   │
//!                    │      (in Pager)        │
//!                    └───────────┬────────────┘
//!                                ▼
//!                          SubscriberSet
//!                         (per-sub queues)
//!                      ┌─────────┼─────────┐
//!                      ▼         ▼         ▼
//!                    worker1   worker2   workerN
//!                      ▼         ▼         ▼
//!                  on_event  on_event  on_event
//! ```
//!
//! ### Lifecycle
//! ```text
//! watch(container) ──► slot = Idle
//!
//! step(container, viewport):        (or: handle.signal ─► run loop ─► on_scroll)
//!   ├─► slot Stalled  ──────────────────────────► Outcome::Stalled
//!   ├─► slot Fetching ──────────────────────────► Outcome::InFlight
//!   │
//!   ├─► revalidate the armed sentinel; rescan only when it broke
//!   │     ├─ none  ──► slot = Idle ─────────────► Outcome::Idle
//!   │     └─ found ──► publish SentinelArmed (on identity change only)
//!   │
//!   ├─► viewport reveals the sentinel rect?
//!   │     └─ no ──► slot = Armed ───────────────► Outcome::NotVisible
//!   │
//!   ├─► remove marker class (this sentinel can never fire twice)
//!   ├─► slot = Fetching; publish SentinelTriggered, FetchStarted
//!   └─► fetcher.get_fragment(path)    (no locks held)
//!         │
//!         ├─ Ok ──► splice payload children after the sentinel,
//!         │         remove the sentinel, publish PageMerged
//!         │           ├─ fresh sentinel ─► slot = Armed, SentinelArmed
//!         │           │                  ► Outcome::Merged{ rearmed: true }
//!         │           └─ none ─► slot = Idle, PagerDrained
//!         │                              ► Outcome::Merged{ rearmed: false }
//!         │
//!         ├─ Err ──► publish FetchFailed, apply FailurePolicy:
//!         │           ├─ Halt  ─► slot = Stalled, PagerStalled
//!         │           └─ Rearm ─► restore marker, slot = Armed
//!         │           then ──► Err(PagerError::Fetch(cause))
//!         │
//!         └─ malformed 200 body ─► slot = Stalled, PagerStalled, Err(...)
//! ```
//!
//! ## Features
//! | Area               | Description                                                             | Key types / traits                                   |
//! |--------------------|-------------------------------------------------------------------------|------------------------------------------------------|
//! | **Delegation**     | Root-scoped, selector-matched handlers with ancestor walking.           | [`Delegator`], [`Subscription`], [`UiEvent`]         |
//! | **Pagination**     | Sentinel-driven infinite scroll: watch, step, merge, drain.             | [`Pager`], [`Outcome`], [`PagerHandle`]              |
//! | **Document**       | Headless DOM: parse, query, splice subtrees, layout rects.              | [`Document`], [`Selector`], [`NodeId`]               |
//! | **Fetching**       | Pluggable fragment transport with an XHR-style HTTP implementation.     | [`Fetch`], [`HttpFetcher`]                           |
//! | **Subscriber API** | Hook into pagination events (logging, metrics, custom subscribers).     | [`Subscribe`], [`Event`], [`EventKind`]              |
//! | **Policies**       | Decide what a failed load does to its container.                        | [`FailurePolicy`]                                    |
//! | **Errors**         | Typed errors for pagination, delegation, DOM edits, and transport.      | [`PagerError`], [`FetchError`], [`DelegateError`]    |
//! | **Configuration**  | Centralize the markup contract and channel sizing.                      | [`Config`]                                           |
//!
//! ## Optional features
//! - `http` _(default)_: exports [`HttpFetcher`], a reqwest-backed [`Fetch`].
//! - `logging`: ships [`LogWriter`], a ready-made tracing subscriber for demos.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use tokio::sync::RwLock;
//! use scrollvisor::{
//!     Config, Document, Fetch, FetchError, Outcome, Pager, Rect, Selector, Viewport,
//! };
//!
//! /// Serves one canned fragment regardless of path.
//! struct Canned;
//!
//! #[async_trait]
//! impl Fetch for Canned {
//!     async fn get_fragment(&self, _path: &str) -> Result<String, FetchError> {
//!         Ok(r#"<tbody class="loading_tbody"><tr id="r2"><td>two</td></tr></tbody>"#.into())
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let html = r#"<tbody id="list">
//!         <tr id="r1"><td>one</td></tr>
//!         <tr class="next_page_list" data-link="/items?page=2"><td>loading</td></tr>
//!     </tbody>"#;
//!     let doc = Arc::new(RwLock::new(Document::parse(html)?));
//!
//!     // Lay out the sentinel so a scroll can reveal it.
//!     let (container, sentinel) = {
//!         let mut d = doc.write().await;
//!         let container = d
//!             .query_first(d.root(), &Selector::parse("#list")?)
//!             .ok_or("missing container")?;
//!         let sentinel = d
//!             .query_first(d.root(), &Selector::parse(".next_page_list")?)
//!             .ok_or("missing sentinel")?;
//!         d.set_rect(sentinel, Rect::new(800.0, 40.0));
//!         (container, sentinel)
//!     };
//!
//!     let pager = Pager::new(Config::default(), Arc::clone(&doc), Arc::new(Canned), Vec::new());
//!     pager.watch(container).await?;
//!
//!     // Scrolled far enough: the sentinel is revealed and the page merges.
//!     let outcome = pager.step(container, Viewport::new(400.0, 600.0)).await?;
//!     assert_eq!(outcome, Outcome::Merged { appended: 1, rearmed: false });
//!     assert!(!doc.read().await.is_attached(sentinel));
//!     Ok(())
//! }
//! ```
mod config;
mod delegate;
mod dom;
mod error;
mod events;
mod fetch;
mod pager;
mod policy;
mod subscribers;

// ---- Public re-exports ----

pub use config::Config;
pub use delegate::{
    DelegateError, DelegateHandler, Delegator, Subscription, UiEvent, WindowHandler,
};
pub use dom::{Document, DomError, NodeId, Rect, Selector, Viewport};
pub use error::{FetchError, PagerError};
pub use events::{Bus, Event, EventKind};
pub use fetch::{Fetch, REQUESTED_WITH, REQUESTED_WITH_VALUE};
pub use pager::{Outcome, Pager, PagerHandle, SignalError};
pub use policy::FailurePolicy;
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: XHR-style fragment fetcher over reqwest.
// Enable with: `--features http` (on by default).
#[cfg(feature = "http")]
pub use fetch::HttpFetcher;

// Optional: built-in tracing subscriber for demos and quick wiring.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;

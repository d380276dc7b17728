//! # Event subscribers for pagination observability.
//!
//! Everything needed to consume the pager's event stream: the [`Subscribe`]
//! trait to implement, the [`SubscriberSet`] fan-out that runs the
//! implementations, and a ready-made log writer behind the `logging`
//! feature.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Pager ── publish(Event) ──► Bus ──► subscriber_listener (in Pager)
//!                                            │
//!                                            ▼
//!                                      SubscriberSet
//!                                            │
//!                                  ┌─────────┼─────────┐
//!                                  ▼         ▼         ▼
//!                              LogWriter  Metrics   Custom ...
//! ```
//!
//! Each subscriber runs behind its own bounded queue and worker task; a slow
//! or panicking subscriber never stalls the pager or its siblings.
//!
//! ## Writing a subscriber
//! ```rust
//! use async_trait::async_trait;
//! use scrollvisor::{Event, EventKind, Subscribe};
//!
//! struct MergeCounter;
//!
//! #[async_trait]
//! impl Subscribe for MergeCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if matches!(event.kind, EventKind::PageMerged) {
//!             // increment a counter
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "merge-counter" }
//! }
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscriber;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;

//! # Scroll-driven pagination.
//!
//! [`Pager`] watches containers for armed sentinels and, when a scroll
//! position reveals one, fetches the linked page and splices it into the
//! document. [`PagerHandle`] feeds viewports to the driven run loop;
//! [`Outcome`] reports what each step did.

pub mod error;

mod core;
mod handle;
mod sentinel;
mod slot;

pub use core::{Outcome, Pager};
pub use error::SignalError;
pub use handle::PagerHandle;

//! Delegated event handling.
//!
//! - [`UiEvent`]: one host input occurrence (name, target, viewport).
//! - [`Delegator`]: registration table plus dispatch.
//! - [`Subscription`]: owned registration; drop to detach.
//! - [`DelegateError`]: registration failures.

mod delegator;
mod error;
mod event;

pub use delegator::{DelegateHandler, Delegator, Subscription, WindowHandler};
pub use error::DelegateError;
pub use event::UiEvent;

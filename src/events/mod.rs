//! What the pager tells the world, and the channel it says it on.
//!
//! [`Event`] and [`EventKind`] are the data model; [`Bus`] is the broadcast
//! channel they travel over. Everything the pager does - watching, arming,
//! fetching, merging, stalling - leaves a trace here, as do the subscriber
//! workers when they drop an event or survive a panic.
//!
//! Publishers are `Pager` (watch/step/run) and the `SubscriberSet` workers;
//! consumers are the pager's own subscriber listener plus any receiver
//! handed out by [`Bus::subscribe`]. See `lib.rs` for the system-level
//! wiring diagram.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};

//! # Global pager configuration.
//!
//! Provides [`Config`] centralized settings for the pagination machinery.
//!
//! Config is used in one place: `Pager::new(config, doc, fetcher, subscribers)`.
//! The class and attribute names are the contract with the backend's markup;
//! the defaults match the fragment protocol most list backends render.
//!
//! ## Sentinel values
//! - `bus_capacity` and `signal_capacity` are clamped to a minimum of 1 by
//!   their accessors; `0` never constructs an invalid channel.
//!
//! # Example
//! ```
//! use scrollvisor::{Config, FailurePolicy};
//!
//! let mut cfg = Config::default();
//! cfg.marker_class = "more_rows".to_string();
//! cfg.failure = FailurePolicy::Rearm;
//!
//! assert_eq!(cfg.link_attr, "data-link");
//! ```

use crate::policy::FailurePolicy;

/// Global configuration for the pager.
///
/// Defines:
/// - **Markup contract**: marker class, link attribute, payload slot class
/// - **Failure behavior**: what a failed load does to the container
/// - **Channel sizing**: event bus and scroll signal capacities
///
/// ## Field semantics
/// - `marker_class`: class that arms a row as a sentinel (with `link_attr`)
/// - `link_attr`: attribute on the sentinel carrying the next-page path
/// - `slot_class`: class of the fragment element whose children are merged
/// - `failure`: policy applied after a failed load
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
/// - `signal_capacity`: scroll signal queue size (min 1; clamped by accessor)
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors to
/// avoid sprinkling sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Class that marks a pending-load row inside a watched container.
    ///
    /// A node is an armed sentinel only while it carries **both** this class
    /// and a non-empty `link_attr`. Removing the class is what commits a
    /// load: it happens before the fetch starts, so a sentinel can never
    /// trigger twice.
    pub marker_class: String,

    /// Attribute on the sentinel holding the origin-relative next-page path.
    pub link_attr: String,

    /// Class of the element inside a fetched fragment whose **children** are
    /// the payload rows. The first such element wins; the wrapper itself is
    /// never inserted.
    pub slot_class: String,

    /// What a failed load does to the container.
    ///
    /// See [`FailurePolicy`]; the default halts the container.
    pub failure: FailurePolicy,

    /// Ring buffer size of the event bus.
    ///
    /// A receiver that falls more than `bus_capacity` events behind gets
    /// `Lagged` and skips the overwritten items. Minimum value is 1
    /// (enforced by Bus).
    pub bus_capacity: usize,

    /// Capacity of the scroll signal queue feeding the driven run loop.
    ///
    /// Scroll positions are coalescable; when the queue is full the handle
    /// reports the overflow and the host may simply drop the signal.
    pub signal_capacity: usize,
}

impl Config {
    /// Bus capacity with the minimum of 1 applied.
    ///
    /// Channel constructors take this value so `bus_capacity = 0` never
    /// reaches them.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Signal queue capacity with the minimum of 1 applied.
    #[inline]
    pub fn signal_capacity_clamped(&self) -> usize {
        self.signal_capacity.max(1)
    }
}

impl Default for Config {
    /// The stock fragment-protocol configuration:
    ///
    /// - `marker_class = "next_page_list"`
    /// - `link_attr = "data-link"`
    /// - `slot_class = "loading_tbody"`
    /// - `failure = FailurePolicy::Halt` (failed load parks the container)
    /// - `bus_capacity = 1024`
    /// - `signal_capacity = 64` (scroll signals are coalescable)
    fn default() -> Self {
        Self {
            marker_class: "next_page_list".to_string(),
            link_attr: "data-link".to_string(),
            slot_class: "loading_tbody".to_string(),
            failure: FailurePolicy::default(),
            bus_capacity: 1024,
            signal_capacity: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_fragment_protocol() {
        let cfg = Config::default();
        assert_eq!(cfg.marker_class, "next_page_list");
        assert_eq!(cfg.link_attr, "data-link");
        assert_eq!(cfg.slot_class, "loading_tbody");
        assert!(matches!(cfg.failure, FailurePolicy::Halt));
    }

    #[test]
    fn test_capacities_are_clamped() {
        let mut cfg = Config::default();
        cfg.bus_capacity = 0;
        cfg.signal_capacity = 0;
        assert_eq!(cfg.bus_capacity_clamped(), 1);
        assert_eq!(cfg.signal_capacity_clamped(), 1);
    }
}

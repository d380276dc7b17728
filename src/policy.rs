//! # Failure policies for next-page loads.
//!
//! [`FailurePolicy`] determines what happens to a watched container after a
//! next-page load fails.
//!
//! - [`FailurePolicy::Halt`] the container stalls; no further loads (default).
//! - [`FailurePolicy::Rearm`] the sentinel is restored and the next reveal retries.
//!
//! ## Picking a policy
//!
//! **Finite archives** (the backend answers non-200 after the last page):
//! ```text
//! FailurePolicy::Halt       → First failure parks the container permanently
//! ```
//!
//! **Flaky backends** (transient 5xx, load balancer hiccups):
//! ```text
//! FailurePolicy::Rearm      → Failure restores the marker class; the next
//!                             scroll that reveals the sentinel tries again
//! ```
//!
//! Halting still publishes `PagerStalled`, so hosts can surface a "couldn't
//! load more" affordance instead of a silently dead list.

/// Policy controlling what a failed load does to the container's sentinel.
#[derive(Clone, Copy, Debug)]
pub enum FailurePolicy {
    /// Park the container: the sentinel stays consumed and the slot moves to
    /// a stalled state that ignores further scrolls (default).
    Halt,
    /// Restore the sentinel's marker class and re-arm; the next reveal
    /// triggers a fresh load of the same path.
    Rearm,
}

impl Default for FailurePolicy {
    /// Returns [`FailurePolicy::Halt`].
    fn default() -> Self {
        FailurePolicy::Halt
    }
}

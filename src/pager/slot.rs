use super::sentinel::SentinelRef;

/// State of a single watched container.
pub(super) struct Slot {
    /// Where the container sits in the load cycle.
    pub phase: Phase,
}

/// Phase of a watched container's load cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Phase {
    /// No armed sentinel known; every step rescans the container.
    Idle,

    /// A sentinel is armed and waiting for the viewport to reveal it.
    /// Steps revalidate this cached reference and rescan the container only
    /// when it no longer holds up.
    Armed {
        /// The armed sentinel (node plus next-page path).
        sentinel: SentinelRef,
    },

    /// A load is in flight; further triggers are refused until it settles.
    Fetching {
        /// The consumed sentinel the in-flight page will land after.
        sentinel: SentinelRef,
    },

    /// Parked after a failure ([`FailurePolicy::Halt`](crate::FailurePolicy)
    /// or a broken fragment body); the container ignores scrolls until
    /// re-watched.
    Stalled,
}

impl Slot {
    /// Creates a new idle slot.
    pub fn new() -> Self {
        Self { phase: Phase::Idle }
    }
}

use thiserror::Error;

/// Error returned by [`PagerHandle`](super::PagerHandle) signal methods.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalError {
    /// Scroll signal queue is full (scroll positions are coalescable; dropping
    /// one and sending the next is usually fine).
    #[error("scroll signal queue full")]
    Full,

    /// The pager's signal channel is closed (the pager was dropped).
    #[error("pager signal channel closed")]
    Closed,
}

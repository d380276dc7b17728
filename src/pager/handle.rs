use tokio::sync::mpsc;

use crate::dom::Viewport;

use super::error::SignalError;

/// Handle for feeding scroll positions to the pager's driven loop.
///
/// Cheap to clone; every clone feeds the same queue. Scroll positions are
/// coalescable, so dropping a signal on overflow is benign: the next scroll
/// carries fresher data anyway.
#[derive(Clone)]
pub struct PagerHandle {
    tx: mpsc::Sender<Viewport>,
}

impl PagerHandle {
    pub(super) fn new(tx: mpsc::Sender<Viewport>) -> Self {
        Self { tx }
    }

    /// Submits a scroll position (async, waits if the queue is full).
    pub async fn signal(&self, viewport: Viewport) -> Result<(), SignalError> {
        self.tx.send(viewport).await.map_err(|_| SignalError::Closed)
    }

    /// Tries to submit without blocking (fails if the queue is full).
    ///
    /// This is the variant to call from synchronous event handlers.
    pub fn try_signal(&self, viewport: Viewport) -> Result<(), SignalError> {
        self.tx.try_send(viewport).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SignalError::Full,
            mpsc::error::TrySendError::Closed(_) => SignalError::Closed,
        })
    }
}

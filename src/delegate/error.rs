use thiserror::Error;

use crate::dom::DomError;

/// # Errors produced when registering listeners.
///
/// Registration is the only fallible step of delegation; dispatch itself
/// never fails (events that match nothing are dropped silently).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DelegateError {
    /// No element matched the root selector at registration time.
    #[error("no element matches root selector {selector:?}")]
    RootNotFound {
        /// The selector that failed to resolve.
        selector: String,
    },

    /// The root or candidate selector failed to parse.
    #[error(transparent)]
    Dom(#[from] DomError),
}

impl DelegateError {
    /// Stable snake_case tag for this error, for log fields and metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            DelegateError::RootNotFound { .. } => "delegate_root_not_found",
            DelegateError::Dom(err) => err.as_label(),
        }
    }
}

//! Error types used by the pager and its fetchers.
//!
//! Failures split along the machinery/transport line:
//!
//! - [`PagerError`] - the pagination machinery itself went wrong.
//! - [`FetchError`] - a next-page fragment request went wrong. When a step
//!   triggers the fetch, the pager reports it as [`PagerError::Fetch`].
//!
//! Each enum carries `as_label` (stable snake_case tag for metrics) and
//! `as_message` (free-form details); [`FetchError`] additionally classifies
//! itself via [`FetchError::is_retryable`].

use thiserror::Error;

use crate::dom::{DomError, NodeId};

/// # Errors produced by the pagination machinery.
///
/// These represent structural failures: stepping a container nobody watches,
/// starting the driven loop twice, or the tree changing shape under an
/// in-flight load. Failed next-page requests surface here too, wrapped as
/// [`PagerError::Fetch`] after the failure policy has run.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum PagerError {
    /// `run()` was called while a driven loop is already consuming signals.
    #[error("pager run loop is already running")]
    AlreadyRunning,

    /// The container has no pagination slot (never watched, or unwatched).
    #[error("container is not watched: {container:?}")]
    NotWatched {
        /// The container that was stepped or unwatched.
        container: NodeId,
    },

    /// The armed sentinel left the tree between trigger and merge.
    ///
    /// The host removed or rewired the sentinel while the fetch was in
    /// flight; the fetched fragment has no insertion point and is dropped.
    #[error("sentinel vanished mid-flight in container {container:?}")]
    SentinelVanished {
        /// The container whose sentinel disappeared.
        container: NodeId,
    },

    /// A fetched fragment carries no payload wrapper.
    ///
    /// The backend answered `200 OK` but the body has no element with the
    /// configured slot class, so there is nothing to merge. The container
    /// is parked; this is a broken fragment contract, not a transient
    /// failure.
    #[error("fragment from {path:?} has no payload slot")]
    MissingPayload {
        /// The fetched path.
        path: String,
    },

    /// The next-page fetch failed.
    ///
    /// The step has already applied the configured
    /// [`FailurePolicy`](crate::FailurePolicy) to the container (parked or
    /// re-armed) by the time this surfaces; the caller sees the cause.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A tree operation failed while watching or merging.
    #[error(transparent)]
    Dom(#[from] DomError),
}

impl PagerError {
    /// Stable snake_case tag for this error, for log fields and metrics.
    ///
    /// # Example
    /// ```
    /// use scrollvisor::PagerError;
    ///
    /// assert_eq!(PagerError::AlreadyRunning.as_label(), "pager_already_running");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            PagerError::AlreadyRunning => "pager_already_running",
            PagerError::NotWatched { .. } => "pager_not_watched",
            PagerError::SentinelVanished { .. } => "pager_sentinel_vanished",
            PagerError::MissingPayload { .. } => "pager_missing_payload",
            PagerError::Fetch(e) => e.as_label(),
            PagerError::Dom(e) => e.as_label(),
        }
    }

    /// Free-form description including the error's details.
    pub fn as_message(&self) -> String {
        match self {
            PagerError::AlreadyRunning => "run loop already running".to_string(),
            PagerError::NotWatched { container } => {
                format!("container not watched: {container:?}")
            }
            PagerError::SentinelVanished { container } => {
                format!("sentinel vanished: {container:?}")
            }
            PagerError::MissingPayload { path } => {
                format!("no payload slot in fragment from {path:?}")
            }
            PagerError::Fetch(e) => e.as_message(),
            PagerError::Dom(e) => e.to_string(),
        }
    }
}

/// # Errors produced by next-page fetches.
///
/// These represent failures of the fragment request: a malformed origin or
/// path, a transport-level failure, or a backend answering with anything
/// but `200 OK`.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum FetchError {
    /// The configured origin is not a valid absolute URL.
    #[error("invalid origin: {message}")]
    BadOrigin {
        /// Parser message for the rejected origin.
        message: String,
    },

    /// The sentinel's path does not resolve against the origin.
    #[error("invalid path {path:?}: {message}")]
    BadPath {
        /// The rejected next-page path.
        path: String,
        /// Parser message for the rejected path.
        message: String,
    },

    /// The backend answered with a status other than `200 OK`.
    #[error("unexpected status {status}")]
    Status {
        /// The received HTTP status code.
        status: u16,
    },

    /// The request never produced a usable response (DNS, connect, body read).
    #[error("transport failure: {message}")]
    Transport {
        /// Text of the underlying transport failure.
        message: String,
    },
}

impl FetchError {
    /// Stable snake_case tag for this error, for log fields and metrics.
    ///
    /// # Example
    /// ```
    /// use scrollvisor::FetchError;
    ///
    /// let err = FetchError::Status { status: 404 };
    /// assert_eq!(err.as_label(), "fetch_status");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            FetchError::BadOrigin { .. } => "fetch_bad_origin",
            FetchError::BadPath { .. } => "fetch_bad_path",
            FetchError::Status { .. } => "fetch_status",
            FetchError::Transport { .. } => "fetch_transport",
        }
    }

    /// Free-form description including the error's details.
    pub fn as_message(&self) -> String {
        match self {
            FetchError::BadOrigin { message } => format!("bad origin: {message}"),
            FetchError::BadPath { path, message } => format!("bad path {path:?}: {message}"),
            FetchError::Status { status } => format!("status {status}"),
            FetchError::Transport { message } => format!("transport: {message}"),
        }
    }

    /// Indicates whether retrying the same request could plausibly succeed.
    ///
    /// Returns `true` for [`FetchError::Transport`] and server-side statuses
    /// (5xx), `false` for malformed origins/paths and client-side statuses.
    /// The pager itself never retries; this is a hint for hosts and for
    /// [`FailurePolicy`](crate::FailurePolicy) decisions.
    ///
    /// # Example
    /// ```
    /// use scrollvisor::FetchError;
    ///
    /// let flaky = FetchError::Status { status: 503 };
    /// assert!(flaky.is_retryable());
    ///
    /// let gone = FetchError::Status { status: 404 };
    /// assert!(!gone.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Transport { .. } => true,
            FetchError::Status { status } => (500..600).contains(status),
            FetchError::BadOrigin { .. } | FetchError::BadPath { .. } => false,
        }
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Transport {
            message: e.to_string(),
        }
    }
}

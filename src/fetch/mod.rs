//! # Next-page fragment fetching.
//!
//! Provides [`Fetch`], the extension point for plugging transport into the
//! pager, plus the default HTTP implementation.
//!
//! ## Request contract
//! A next-page load is a `GET` against the path carried by the sentinel,
//! with the [`REQUESTED_WITH`] header set to [`REQUESTED_WITH_VALUE`] so the
//! backend renders a bare fragment instead of a full page. Only `200 OK`
//! counts as success; every other status is a failed load.
//!
//! ## Rules
//! - `get_fragment` receives the path exactly as the sentinel carried it
//!   (usually origin-relative, e.g. `/items?page=2`).
//! - The returned string is the raw fragment body; the pager parses it and
//!   extracts the payload rows itself.
//! - Implementations decide nothing about pagination; they only move bytes.
//!
//! ## Custom fetchers
//! ```rust
//! use async_trait::async_trait;
//! use scrollvisor::{Fetch, FetchError};
//!
//! struct Canned;
//!
//! #[async_trait]
//! impl Fetch for Canned {
//!     async fn get_fragment(&self, path: &str) -> Result<String, FetchError> {
//!         match path {
//!             "/items?page=2" => Ok("<tbody class=\"loading_tbody\"></tbody>".to_string()),
//!             _ => Err(FetchError::Status { status: 404 }),
//!         }
//!     }
//! }
//! ```

#[cfg(feature = "http")]
mod http;

use async_trait::async_trait;

use crate::error::FetchError;

#[cfg(feature = "http")]
pub use http::HttpFetcher;

/// Header telling the backend this is a fragment request.
pub const REQUESTED_WITH: &str = "X-Requested-With";

/// The value backends key fragment rendering on.
pub const REQUESTED_WITH_VALUE: &str = "XMLHttpRequest";

/// Transport for next-page fragments.
///
/// The pager calls [`Fetch::get_fragment`] outside of any document or slot
/// lock; implementations may take as long as they need without stalling
/// scroll handling for other containers.
#[async_trait]
pub trait Fetch: Send + Sync + 'static {
    /// Fetches one page fragment by its origin-relative path.
    ///
    /// Success means the backend produced a body to merge; any non-`200 OK`
    /// answer must surface as [`FetchError::Status`].
    async fn get_fragment(&self, path: &str) -> Result<String, FetchError>;
}

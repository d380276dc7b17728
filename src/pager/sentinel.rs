//! Sentinel discovery: which row, if any, arms a container.
//!
//! A node is an **armed sentinel** only while it carries both halves of the
//! markup contract at once:
//! - the marker class ([`Config::marker_class`](crate::Config)), and
//! - a non-empty next-page path in the link attribute
//!   ([`Config::link_attr`](crate::Config)).
//!
//! Rows with only one half are inert: a marker class without a path has
//! nowhere to load from, and a path without the marker class is a row the
//! pager already consumed (or never owned).

use std::sync::Arc;

use crate::config::Config;
use crate::dom::{Document, NodeId, Selector};

/// An armed sentinel: the node and the path it promises.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct SentinelRef {
    /// The sentinel row inside the watched container.
    pub node: NodeId,
    /// Origin-relative next-page path from the link attribute.
    pub path: Arc<str>,
}

/// Finds the first armed sentinel under `container`, in document order.
///
/// Candidates carrying the marker class but an absent or empty link
/// attribute are skipped, not reported; the scan keeps looking.
pub(super) fn scan(doc: &Document, container: NodeId, cfg: &Config) -> Option<SentinelRef> {
    let marker = Selector::class(&cfg.marker_class);
    doc.query_all(container, &marker)
        .into_iter()
        .find_map(|node| {
            let path = doc.attr(node, &cfg.link_attr)?;
            if path.is_empty() {
                return None;
            }
            Some(SentinelRef {
                node,
                path: Arc::from(path),
            })
        })
}

/// True while a previously found sentinel still honors the contract: under
/// the same container, marker class intact, link attribute naming the same
/// path. Lets the pager revalidate on each scroll tick instead of walking
/// the whole container again.
pub(super) fn still_armed(
    doc: &Document,
    container: NodeId,
    sref: &SentinelRef,
    cfg: &Config,
) -> bool {
    doc.is_descendant_of(sref.node, container)
        && doc.has_class(sref.node, &cfg.marker_class)
        && doc.attr(sref.node, &cfg.link_attr) == Some(sref.path.as_ref())
}

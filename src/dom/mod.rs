//! Document model: arena tree, selectors, fragment parsing, geometry.
//!
//! ## Contents
//! - [`Document`], [`NodeId`] arena-backed node tree with host-assigned layout
//! - [`Selector`] compound selector parsing and matching
//! - [`Rect`], [`Viewport`] vertical geometry behind the reveal check
//! - [`DomError`] parse/selector/tree-edit failures

mod document;
mod error;
mod fragment;
mod geometry;
mod node;
mod selector;

pub use document::Document;
pub use error::DomError;
pub use geometry::{Rect, Viewport};
pub use node::NodeId;
pub use selector::Selector;

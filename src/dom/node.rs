//! Arena node primitives: ids, node kinds, element data.

/// Arena index of a node inside a [`Document`](super::Document).
///
/// Ids are minted by the owning document and stay valid for its whole
/// lifetime; detaching a node does not invalidate its id. An id from one
/// document must never be used with another. Ids order by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(super) usize);

/// A single arena slot: tree links plus payload.
#[derive(Debug, Clone)]
pub(super) struct Node {
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub kind: NodeKind,
}

/// Payload of an arena node.
#[derive(Debug, Clone)]
pub(super) enum NodeKind {
    /// The document root. Exactly one per document; never moved or removed.
    Root,
    Element(ElementData),
    Text(String),
}

/// Tag and attributes of an element node.
///
/// Attributes keep insertion order so serialization is deterministic.
#[derive(Debug, Clone)]
pub(super) struct ElementData {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
}

impl ElementData {
    pub fn new(tag: String) -> Self {
        Self {
            tag,
            attrs: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        if let Some(slot) = self.attrs.iter_mut().find(|(n, _)| n == name) {
            slot.1 = value.to_string();
        } else {
            self.attrs.push((name.to_string(), value.to_string()));
        }
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(n, _)| n != name);
    }

    pub fn class_tokens(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.class_tokens().any(|token| token == class)
    }

    pub fn set_classes(&mut self, classes: &[&str]) {
        if classes.is_empty() {
            self.remove_attr("class");
        } else {
            self.set_attr("class", &classes.join(" "));
        }
    }
}

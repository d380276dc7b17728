//! # Document: the arena-backed node tree.
//!
//! [`Document`] owns every node the host works with: the page markup, layout
//! rects assigned by the host, and the edits the pager performs when merging
//! fetched fragments.
//!
//! ## Architecture
//! ```text
//! Document
//!   ├─ nodes: Vec<Node>        arena; NodeId = index, never reused
//!   │    └─ Node { parent, children, kind: Root | Element | Text }
//!   └─ rects: NodeId → Rect    vertical layout, host-assigned
//! ```
//!
//! ## Rules
//! - Ids stay valid for the document's lifetime. Detaching keeps the arena
//!   slot; the subtree can be re-inserted later.
//! - The root is fixed: it cannot be moved, removed, or adopted elsewhere.
//! - Insertions refuse cycles: a node never becomes its own ancestor.
//! - Queries ([`Document::query_all`]) walk the live tree in document order
//!   on every call; nothing is cached or indexed.
//!
//! ## Example
//! ```
//! use scrollvisor::{Document, Selector};
//!
//! let mut doc = Document::parse(r#"<ul id="feed"><li class="row">a</li></ul>"#)?;
//! let feed = doc.query_first(doc.root(), &Selector::parse("#feed")?).unwrap();
//! let row = doc.create_element(feed, "li", &[("class", "row")])?;
//! doc.create_text(row, "b")?;
//!
//! let rows = doc.query_all(feed, &Selector::parse(".row")?);
//! assert_eq!(rows.len(), 2);
//! assert_eq!(doc.text_content(feed), "ab");
//! # Ok::<(), scrollvisor::DomError>(())
//! ```

use std::collections::HashMap;

use super::error::DomError;
use super::fragment;
use super::geometry::Rect;
use super::node::{ElementData, Node, NodeId, NodeKind};
use super::selector::Selector;

/// Arena-backed node tree with host-assigned layout.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    rects: HashMap<NodeId, Rect>,
}

impl Document {
    /// Creates an empty document holding only the root.
    pub fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            kind: NodeKind::Root,
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
            rects: HashMap::new(),
        }
    }

    /// Parses markup into a new document. The markup's top-level nodes become
    /// children of the root.
    pub fn parse(html: &str) -> Result<Self, DomError> {
        fragment::parse(html)
    }

    /// The root node.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub(super) fn create_node(&mut self, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            kind,
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        id
    }

    pub(super) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.nodes[id.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    // ---- Building ----

    /// Creates an element under `parent`.
    pub fn create_element(
        &mut self,
        parent: NodeId,
        tag: &str,
        attrs: &[(&str, &str)],
    ) -> Result<NodeId, DomError> {
        if !self.can_have_children(parent) {
            return Err(DomError::NotAnElement);
        }
        let mut data = ElementData::new(tag.to_ascii_lowercase());
        for (name, value) in attrs {
            data.set_attr(name, value);
        }
        Ok(self.create_node(Some(parent), NodeKind::Element(data)))
    }

    /// Creates an element with no parent; attach it with [`Document::append_child`]
    /// or [`Document::insert_after`].
    pub fn create_detached_element(&mut self, tag: &str) -> NodeId {
        let data = ElementData::new(tag.to_ascii_lowercase());
        self.create_node(None, NodeKind::Element(data))
    }

    /// Creates a text node under `parent`.
    pub fn create_text(&mut self, parent: NodeId, text: &str) -> Result<NodeId, DomError> {
        if !self.can_have_children(parent) {
            return Err(DomError::NotAnElement);
        }
        Ok(self.create_node(Some(parent), NodeKind::Text(text.to_string())))
    }

    /// Moves `child` to the end of `parent`'s children, detaching it from its
    /// current position first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.check_insertable(parent, child)?;
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    /// Inserts `node` as the next sibling of `anchor`. The anchor must be
    /// attached.
    pub fn insert_after(&mut self, anchor: NodeId, node: NodeId) -> Result<(), DomError> {
        let parent = self.parent(anchor).ok_or(DomError::Detached)?;
        self.check_insertable(parent, node)?;
        self.detach(node);
        let pos = self.nodes[parent.0]
            .children
            .iter()
            .position(|c| *c == anchor)
            .ok_or(DomError::Detached)?;
        self.nodes[node.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(pos + 1, node);
        Ok(())
    }

    /// Detaches `node` (and its subtree) from the tree. The arena slot stays
    /// valid; the subtree can be re-attached later.
    pub fn remove(&mut self, node: NodeId) -> Result<(), DomError> {
        if node == self.root {
            return Err(DomError::RootImmovable);
        }
        self.detach(node);
        Ok(())
    }

    /// Deep-copies a subtree from another document into this one. The copy is
    /// created detached; attach it with [`Document::append_child`] or
    /// [`Document::insert_after`].
    pub fn adopt_subtree(&mut self, source: &Document, node: NodeId) -> Result<NodeId, DomError> {
        let kind = match &source.nodes[node.0].kind {
            NodeKind::Root => return Err(DomError::RootImmovable),
            NodeKind::Element(element) => NodeKind::Element(element.clone()),
            NodeKind::Text(text) => NodeKind::Text(text.clone()),
        };
        let copy = self.create_node(None, kind);
        for child in &source.nodes[node.0].children {
            let child_copy = self.adopt_subtree(source, *child)?;
            self.nodes[child_copy.0].parent = Some(copy);
            self.nodes[copy.0].children.push(child_copy);
        }
        Ok(copy)
    }

    fn check_insertable(&self, parent: NodeId, node: NodeId) -> Result<(), DomError> {
        if !self.can_have_children(parent) {
            return Err(DomError::NotAnElement);
        }
        if node == self.root {
            return Err(DomError::RootImmovable);
        }
        if node == parent || self.is_descendant_of(parent, node) {
            return Err(DomError::Cycle);
        }
        Ok(())
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != node);
        }
    }

    fn can_have_children(&self, node: NodeId) -> bool {
        matches!(
            self.nodes[node.0].kind,
            NodeKind::Root | NodeKind::Element(_)
        )
    }

    // ---- Inspection ----

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        matches!(self.nodes[node.0].kind, NodeKind::Element(_))
    }

    pub fn is_text(&self, node: NodeId) -> bool {
        matches!(self.nodes[node.0].kind, NodeKind::Text(_))
    }

    /// Lowercased tag name, for element nodes.
    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|e| e.tag.as_str())
    }

    /// True if walking `parent` links from `node` reaches the root.
    pub fn is_attached(&self, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == self.root {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// True if `ancestor` appears on `node`'s parent chain (strictly above it).
    pub fn is_descendant_of(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut cursor = self.parent(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node).and_then(|e| e.attr(name))
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let element = self.element_mut(node).ok_or(DomError::NotAnElement)?;
        element.set_attr(name, value);
        Ok(())
    }

    pub fn remove_attr(&mut self, node: NodeId, name: &str) -> Result<(), DomError> {
        let element = self.element_mut(node).ok_or(DomError::NotAnElement)?;
        element.remove_attr(name);
        Ok(())
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node).map(|e| e.has_class(class)).unwrap_or(false)
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) -> Result<(), DomError> {
        let element = self.element_mut(node).ok_or(DomError::NotAnElement)?;
        if element.has_class(class) {
            return Ok(());
        }
        let mut classes: Vec<String> = element.class_tokens().map(str::to_string).collect();
        classes.push(class.to_string());
        let refs: Vec<&str> = classes.iter().map(String::as_str).collect();
        element.set_classes(&refs);
        Ok(())
    }

    /// Removes one class token; drops the `class` attribute entirely when the
    /// last token goes.
    pub fn remove_class(&mut self, node: NodeId, class: &str) -> Result<(), DomError> {
        let element = self.element_mut(node).ok_or(DomError::NotAnElement)?;
        let classes: Vec<String> = element
            .class_tokens()
            .filter(|token| *token != class)
            .map(str::to_string)
            .collect();
        let refs: Vec<&str> = classes.iter().map(String::as_str).collect();
        element.set_classes(&refs);
        Ok(())
    }

    /// Concatenated text of the subtree, in document order.
    pub fn text_content(&self, node: NodeId) -> String {
        match &self.nodes[node.0].kind {
            NodeKind::Text(text) => text.clone(),
            NodeKind::Root | NodeKind::Element(_) => {
                let mut out = String::new();
                for child in &self.nodes[node.0].children {
                    out.push_str(&self.text_content(*child));
                }
                out
            }
        }
    }

    /// Serialized markup of the node's children. Errors on text nodes.
    pub fn inner_html(&self, node: NodeId) -> Result<String, DomError> {
        if !self.can_have_children(node) {
            return Err(DomError::NotAnElement);
        }
        let mut out = String::new();
        for child in &self.nodes[node.0].children {
            fragment::serialize(self, *child, &mut out);
        }
        Ok(out)
    }

    /// Serialized markup of the node itself (for the root: its children).
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        fragment::serialize(self, node, &mut out);
        out
    }

    /// Serialized markup of the whole document.
    pub fn html(&self) -> String {
        self.outer_html(self.root)
    }

    // ---- Queries ----

    /// True if `node` is an element matching the selector.
    pub fn matches(&self, node: NodeId, selector: &Selector) -> bool {
        self.element(node)
            .map(|element| selector.matches_element(element))
            .unwrap_or(false)
    }

    /// First matching descendant of `root` in document order. `root` itself
    /// is excluded.
    pub fn query_first(&self, root: NodeId, selector: &Selector) -> Option<NodeId> {
        self.query_all(root, selector).into_iter().next()
    }

    /// All matching descendants of `root` in document order, recomputed from
    /// the live tree on every call. `root` itself is excluded.
    pub fn query_all(&self, root: NodeId, selector: &Selector) -> Vec<NodeId> {
        let mut candidates = Vec::new();
        for child in &self.nodes[root.0].children {
            self.collect_elements(*child, &mut candidates);
        }
        candidates
            .into_iter()
            .filter(|node| self.matches(*node, selector))
            .collect()
    }

    fn collect_elements(&self, node: NodeId, out: &mut Vec<NodeId>) {
        if self.is_element(node) {
            out.push(node);
        }
        for child in &self.nodes[node.0].children {
            self.collect_elements(*child, out);
        }
    }

    // ---- Layout ----

    /// Assigns the vertical layout rect for an element. Host responsibility.
    pub fn set_rect(&mut self, node: NodeId, rect: Rect) {
        self.rects.insert(node, rect);
    }

    /// The element's layout rect; zero (not rendered) if the host never
    /// assigned one.
    pub fn rect(&self, node: NodeId) -> Rect {
        self.rects.get(&node).copied().unwrap_or_default()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_insert_after_order() {
        let mut doc = Document::new();
        let list = doc.create_element(doc.root(), "ul", &[]).unwrap();
        let a = doc.create_element(list, "li", &[("id", "a")]).unwrap();
        let c = doc.create_element(list, "li", &[("id", "c")]).unwrap();

        let b = doc.create_detached_element("li");
        doc.set_attr(b, "id", "b").unwrap();
        doc.insert_after(a, b).unwrap();

        assert_eq!(doc.children(list), &[a, b, c]);
    }

    #[test]
    fn test_insert_after_detached_anchor_fails() {
        let mut doc = Document::new();
        let anchor = doc.create_detached_element("li");
        let node = doc.create_detached_element("li");
        assert!(matches!(
            doc.insert_after(anchor, node),
            Err(DomError::Detached)
        ));
    }

    #[test]
    fn test_remove_detaches_subtree() {
        let mut doc = Document::parse("<ul><li>a</li><li>b</li></ul>").unwrap();
        let ul = doc.children(doc.root())[0];
        let first = doc.children(ul)[0];

        doc.remove(first).unwrap();
        assert_eq!(doc.children(ul).len(), 1);
        assert!(!doc.is_attached(first));
        assert_eq!(doc.text_content(ul), "b");
        // The detached subtree is still readable.
        assert_eq!(doc.text_content(first), "a");
    }

    #[test]
    fn test_remove_root_rejected() {
        let mut doc = Document::new();
        assert!(matches!(
            doc.remove(doc.root()),
            Err(DomError::RootImmovable)
        ));
    }

    #[test]
    fn test_cycle_rejected() {
        let mut doc = Document::parse("<div><span></span></div>").unwrap();
        let div = doc.children(doc.root())[0];
        let span = doc.children(div)[0];
        assert!(matches!(
            doc.append_child(span, div),
            Err(DomError::Cycle)
        ));
        assert!(matches!(doc.append_child(div, div), Err(DomError::Cycle)));
    }

    #[test]
    fn test_text_parent_rejected() {
        let mut doc = Document::new();
        let p = doc.create_element(doc.root(), "p", &[]).unwrap();
        let text = doc.create_text(p, "hi").unwrap();
        assert!(matches!(
            doc.create_element(text, "b", &[]),
            Err(DomError::NotAnElement)
        ));
    }

    #[test]
    fn test_adopt_subtree_deep_copies() {
        let source = Document::parse(r#"<tr data-link="/p"><td>cell</td></tr>"#).unwrap();
        let tr = source.children(source.root())[0];

        let mut doc = Document::parse("<tbody></tbody>").unwrap();
        let tbody = doc.children(doc.root())[0];
        let copy = doc.adopt_subtree(&source, tr).unwrap();
        doc.append_child(tbody, copy).unwrap();

        assert_eq!(doc.attr(copy, "data-link"), Some("/p"));
        assert_eq!(doc.text_content(copy), "cell");
        // The source stays untouched.
        assert!(source.is_attached(tr));
    }

    #[test]
    fn test_class_edits() {
        let mut doc = Document::parse(r#"<tr class="a next_page_list b"></tr>"#).unwrap();
        let tr = doc.children(doc.root())[0];

        assert!(doc.has_class(tr, "next_page_list"));
        doc.remove_class(tr, "next_page_list").unwrap();
        assert!(!doc.has_class(tr, "next_page_list"));
        assert_eq!(doc.attr(tr, "class"), Some("a b"));

        doc.add_class(tr, "next_page_list").unwrap();
        assert_eq!(doc.attr(tr, "class"), Some("a b next_page_list"));

        doc.remove_class(tr, "a").unwrap();
        doc.remove_class(tr, "b").unwrap();
        doc.remove_class(tr, "next_page_list").unwrap();
        assert_eq!(doc.attr(tr, "class"), None);
    }

    #[test]
    fn test_query_document_order() {
        let doc = Document::parse(
            r#"<div>
                 <p class="x" id="one"><span class="x" id="two"></span></p>
                 <p class="x" id="three"></p>
               </div>"#,
        )
        .unwrap();
        let div = doc.children(doc.root())[0];
        let sel = Selector::parse(".x").unwrap();

        let ids: Vec<_> = doc
            .query_all(div, &sel)
            .into_iter()
            .filter_map(|n| doc.attr(n, "id").map(str::to_string))
            .collect();
        assert_eq!(ids, ["one", "two", "three"]);
        assert_eq!(
            doc.query_first(div, &sel).and_then(|n| doc.attr(n, "id")),
            Some("one")
        );
    }

    #[test]
    fn test_query_excludes_root_and_sees_live_edits() {
        let mut doc = Document::parse(r#"<ul class="feed"></ul>"#).unwrap();
        let ul = doc.children(doc.root())[0];
        let sel = Selector::parse(".feed").unwrap();
        // The query root itself never matches.
        assert!(doc.query_all(ul, &sel).is_empty());

        let inner = doc.create_element(ul, "li", &[("class", "feed")]).unwrap();
        assert_eq!(doc.query_all(ul, &sel), vec![inner]);
    }

    #[test]
    fn test_rects_default_zero() {
        let mut doc = Document::parse("<div></div>").unwrap();
        let div = doc.children(doc.root())[0];
        assert!(!doc.rect(div).is_rendered());

        doc.set_rect(div, Rect::new(10.0, 20.0));
        assert_eq!(doc.rect(div).bottom(), 30.0);
    }
}

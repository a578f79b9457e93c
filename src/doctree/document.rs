/*!
 * Arena-backed document tree.
 *
 * Nodes live in a single `Vec` and refer to each other by [`NodeId`]. Moving
 * a node between parents only touches two child lists and one parent slot.
 */

use serde::Serialize;
use std::collections::HashSet;
use std::fmt::Write;
use unicode_normalization::UnicodeNormalization;

use super::node::{Attributes, Node, NodeId, NodeKind};
use crate::errors::MarkupError;

/// A parsed document, owned for the duration of a single build
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    used_ids: HashSet<String>,
    diagnostics: Vec<MarkupError>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document holding only its root node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Document)],
            root: NodeId(0),
            used_ids: HashSet::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Allocate a detached node
    pub fn create(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(kind));
        id
    }

    /// Allocate a detached text node
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.create(NodeKind::Text(text.into()))
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn attributes(&self, id: NodeId) -> &Attributes {
        &self.nodes[id.0].attributes
    }

    pub fn attributes_mut(&mut self, id: NodeId) -> &mut Attributes {
        &mut self.nodes[id.0].attributes
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn is_section(&self, id: NodeId) -> bool {
        self.kind(id).is_section()
    }

    /// Position of `child` within `parent`'s children
    pub fn index_of(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.children(parent).iter().position(|&c| c == child)
    }

    /// Append `child` as the last child of `parent`, detaching it first if needed
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        let index = self.children(parent).len();
        self.insert(parent, index, child);
    }

    /// Insert `child` into `parent` at `index` (clamped to the child count)
    pub fn insert(&mut self, parent: NodeId, index: usize, child: NodeId) {
        debug_assert_ne!(parent, child, "a node cannot contain itself");

        let mut index = index;
        if let Some(old_parent) = self.nodes[child.0].parent {
            if let Some(old_index) = self.index_of(old_parent, child) {
                self.nodes[old_parent.0].children.remove(old_index);
                if old_parent == parent && old_index < index {
                    index -= 1;
                }
            }
        }

        let children = &mut self.nodes[parent.0].children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// Detach `child` from `parent`; returns false if it was not a child
    pub fn remove(&mut self, parent: NodeId, child: NodeId) -> bool {
        match self.index_of(parent, child) {
            Some(index) => {
                self.nodes[parent.0].children.remove(index);
                self.nodes[child.0].parent = None;
                true
            }
            None => false,
        }
    }

    /// `id` and every node below it, in document order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            result.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        result
    }

    /// Every attached node matching `predicate`, in document order (outer before inner)
    pub fn traverse<F>(&self, predicate: F) -> Vec<NodeId>
    where
        F: Fn(&Node) -> bool,
    {
        self.descendants(self.root)
            .into_iter()
            .filter(|&id| predicate(self.node(id)))
            .collect()
    }

    /// Number of nodes reachable from the root
    pub fn node_count(&self) -> usize {
        self.descendants(self.root).len()
    }

    /// Number of section ancestors of `id`, including `id` itself
    pub fn section_depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = Some(id);
        while let Some(node) = current {
            if self.is_section(node) {
                depth += 1;
            }
            current = self.parent(node);
        }
        depth
    }

    /// Concatenated text of every text node below `id`
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .into_iter()
            .filter_map(|n| match self.kind(n) {
                NodeKind::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Derive an identifier from `text`, unique within this document, and attach it to `node`
    pub fn set_unique_id(&mut self, node: NodeId, text: &str) -> String {
        let base = make_id(text);
        let id = if !base.is_empty() && !self.used_ids.contains(&base) {
            base
        } else {
            (1..)
                .map(|n| {
                    if base.is_empty() {
                        format!("id{n}")
                    } else {
                        format!("{base}-{n}")
                    }
                })
                .find(|candidate| !self.used_ids.contains(candidate))
                .unwrap_or_default()
        };

        self.used_ids.insert(id.clone());
        self.attributes_mut(node).ids.push(id.clone());
        id
    }

    /// Record an authoring problem found while building this document
    pub fn report(&mut self, diagnostic: MarkupError) {
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[MarkupError] {
        &self.diagnostics
    }

    /// Indented pseudo-XML rendering of the tree
    pub fn pformat(&self) -> String {
        let mut out = String::new();
        self.pformat_node(self.root, 0, &mut out);
        out
    }

    fn pformat_node(&self, id: NodeId, depth: usize, out: &mut String) {
        let indent = "    ".repeat(depth);
        let node = self.node(id);

        if let NodeKind::Text(text) = &node.kind {
            for line in text.lines() {
                let _ = writeln!(out, "{indent}{line}");
            }
            return;
        }

        let _ = write!(out, "{indent}<{}", node.kind.tag_name());
        for (name, values) in [
            ("classes", &node.attributes.classes),
            ("ids", &node.attributes.ids),
            ("names", &node.attributes.names),
        ] {
            if !values.is_empty() {
                let _ = write!(out, " {name}=\"{}\"", values.join(" "));
            }
        }
        out.push_str(">\n");

        for &child in node.children() {
            self.pformat_node(child, depth + 1, out);
        }
    }

    /// Nested JSON view of the tree
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.view(self.root))
    }

    fn view(&self, id: NodeId) -> NodeView<'_> {
        let node = self.node(id);
        NodeView {
            kind: &node.kind,
            attributes: &node.attributes,
            children: node.children().iter().map(|&c| self.view(c)).collect(),
        }
    }
}

#[derive(Serialize)]
struct NodeView<'a> {
    kind: &'a NodeKind,
    #[serde(flatten)]
    attributes: &'a Attributes,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<NodeView<'a>>,
}

/// Normalize text into an identifier: lowercase ASCII letters and digits
/// separated by single hyphens, never starting with a digit or hyphen.
///
/// Accented letters are folded to their ASCII base (`é` -> `e`), a few
/// letters with no decomposition are transliterated (`ø` -> `o`, `ß` -> `sz`)
/// and any other non-ASCII character is dropped.
pub fn make_id(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        match transliterate(c) {
            Some(ascii) => folded.push_str(ascii),
            None => folded.push(c),
        }
    }

    let mut slug = String::with_capacity(folded.len());
    let mut pending_separator = false;

    for c in folded.nfkd() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c);
        } else if c.is_ascii() {
            pending_separator = true;
        }
    }

    slug.trim_start_matches(|c: char| c == '-' || c.is_ascii_digit())
        .to_string()
}

/// Lowercase letters that NFKD leaves without an ASCII base
fn transliterate(c: char) -> Option<&'static str> {
    Some(match c {
        '\u{00df}' => "sz",
        '\u{00e6}' => "ae",
        '\u{0153}' => "oe",
        '\u{0238}' => "db",
        '\u{0239}' => "qp",
        '\u{00f8}' => "o",
        '\u{0111}' | '\u{018c}' => "d",
        '\u{0127}' => "h",
        '\u{0131}' => "i",
        '\u{0142}' | '\u{019a}' | '\u{0234}' => "l",
        '\u{0167}' | '\u{01ab}' | '\u{01ad}' | '\u{0236}' => "t",
        '\u{0180}' | '\u{0183}' => "b",
        '\u{0188}' | '\u{023c}' => "c",
        '\u{0192}' => "f",
        '\u{0199}' => "k",
        '\u{019e}' | '\u{0235}' => "n",
        '\u{01a5}' => "p",
        '\u{01b4}' | '\u{024f}' => "y",
        '\u{01b6}' | '\u{0225}' | '\u{0240}' => "z",
        '\u{01e5}' => "g",
        '\u{0237}' | '\u{0249}' => "j",
        '\u{023f}' => "s",
        '\u{0247}' => "e",
        '\u{024b}' => "q",
        '\u{024d}' => "r",
        _ => return None,
    })
}

/*!
 * Node types stored in a document arena.
 */

use serde::Serialize;

/// Index of a node inside its owning [`Document`](super::Document)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub usize);

/// Built-in behaviour a custom node kind inherits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseKind {
    /// Plain element
    Element,
    /// Section; counts as a section for every section test
    Section,
}

/// A node kind contributed by an extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CustomKind {
    pub name: &'static str,
    pub base: BaseKind,
}

impl CustomKind {
    pub const fn element(name: &'static str) -> Self {
        Self { name, base: BaseKind::Element }
    }

    pub const fn section(name: &'static str) -> Self {
        Self { name, base: BaseKind::Section }
    }

    pub fn is_section(&self) -> bool {
        self.base == BaseKind::Section
    }
}

/// What a node represents
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum NodeKind {
    Document,
    Section,
    Title,
    Paragraph,
    Text(String),
    Container,
    LiteralBlock,
    Custom(CustomKind),
}

impl NodeKind {
    /// Tag name used in tree dumps
    pub fn tag_name(&self) -> &str {
        match self {
            Self::Document => "document",
            Self::Section => "section",
            Self::Title => "title",
            Self::Paragraph => "paragraph",
            Self::Text(_) => "#text",
            Self::Container => "container",
            Self::LiteralBlock => "literal_block",
            Self::Custom(kind) => kind.name,
        }
    }

    pub fn is_section(&self) -> bool {
        match self {
            Self::Section => true,
            Self::Custom(kind) => kind.is_section(),
            _ => false,
        }
    }

    /// Whether this is an instance of the given custom kind
    pub fn is_custom(&self, kind: &CustomKind) -> bool {
        matches!(self, Self::Custom(k) if k == kind)
    }
}

/// Common attributes carried by every element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Attributes {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ids: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<String>,
}

impl Attributes {
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty() && self.classes.is_empty() && self.names.is_empty()
    }
}

/// One slot in the document arena.
///
/// `parent` and `children` always agree: a node listed in another node's
/// children has that node as its parent.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub attributes: Attributes,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    /// 1-based source line, when known
    pub line: Option<usize>,
}

impl Node {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            attributes: Attributes::default(),
            parent: None,
            children: Vec::new(),
            line: None,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

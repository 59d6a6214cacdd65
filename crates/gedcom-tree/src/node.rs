use gedcom_store::{Block, Line, Structure};
use la_arena::Idx;

pub type Node = Idx<NodeData>;

/// Assignment state of a value or xref. Only `set_*` and `clear` move it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Field {
    #[default]
    Unset,
    Set(String),
}

impl Field {
    pub fn get(&self) -> Option<&str> {
        match self {
            Self::Unset => None,
            Self::Set(text) => Some(text.as_str()),
        }
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Self::Set(_))
    }
}

/// Picks a structure variation, or the tag of a multi-tag line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Selector {
    pub tag: Option<String>,
    pub xref_value: Option<(bool, bool)>,
}

impl Selector {
    pub fn tag(tag: impl Into<String>) -> Self {
        Self { tag: Some(tag.into()), xref_value: None }
    }

    pub fn with_xref_value(mut self, with_xref: bool, with_value: bool) -> Self {
        self.xref_value = Some((with_xref, with_value));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagNode {
    pub(crate) tag: String,
    pub(crate) xref: Field,
    pub(crate) value: Field,
}

impl TagNode {
    pub(crate) fn new(tag: &str) -> Self {
        Self { tag: tag.to_owned(), xref: Field::Unset, value: Field::Unset }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn xref(&self) -> &Field {
        &self.xref
    }

    pub fn value(&self) -> &Field {
        &self.value
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureNode {
    pub(crate) name: String,
    pub(crate) selector: Selector,
    pub(crate) variation: Structure,
}

impl StructureNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The selector this node was created with.
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn variation(&self) -> Structure {
        self.variation
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Tag(TagNode),
    Structure(StructureNode),
}

/// Orders siblings by grammar position, then by insertion.
///
/// `line` is the grammar line the node was created from, `None` for the root.
/// Siblings sharing a position always share the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeKey {
    pub position: u32,
    pub line: Option<Line>,
    pub sequence: u32,
}

#[derive(Debug)]
pub struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) line: Option<Line>,
    pub(crate) block: Option<Block>,
    pub(crate) parent: Option<Node>,
    pub(crate) children: Vec<Node>,
    pub(crate) key: NodeKey,
    pub(crate) removed: bool,
}

impl NodeData {
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// The tag of a tag node or the structure name of a structure node.
    pub fn line_id(&self) -> &str {
        match &self.kind {
            NodeKind::Tag(tag) => &tag.tag,
            NodeKind::Structure(structure) => &structure.name,
        }
    }

    pub fn as_tag(&self) -> Option<&TagNode> {
        match &self.kind {
            NodeKind::Tag(tag) => Some(tag),
            NodeKind::Structure(_) => None,
        }
    }

    pub fn is_structure(&self) -> bool {
        matches!(self.kind, NodeKind::Structure(_))
    }

    /// Grammar line this node instantiates. `None` for the root.
    pub fn line(&self) -> Option<Line> {
        self.line
    }

    /// Grammar block the children of this node come from.
    pub fn block(&self) -> Option<Block> {
        self.block
    }

    pub fn parent(&self) -> Option<Node> {
        self.parent
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn key(&self) -> NodeKey {
        self.key
    }

    pub fn value(&self) -> Option<&str> {
        self.as_tag().and_then(|tag| tag.value.get())
    }

    pub fn xref(&self) -> Option<&str> {
        self.as_tag().and_then(|tag| tag.xref.get())
    }

    pub fn is_value_set(&self) -> bool {
        self.as_tag().is_some_and(|tag| tag.value.is_set())
    }

    pub fn is_xref_set(&self) -> bool {
        self.as_tag().is_some_and(|tag| tag.xref.is_set())
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }
}

use gedcom_store::{
    Block, FieldContext, Line, LineShape, SchemaAccessError, Store, StoreLine, Structure,
};
use la_arena::Arena;
use tracing::{debug, trace};

use crate::error::{Assignment, CardinalityError, CreationError, Rejection};
use crate::node::{Field, Node, NodeData, NodeKey, NodeKind, Selector, StructureNode, TagNode};

/// How far [`Tree::add_mandatory_lines`] descends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MandatoryFill {
    /// Only the direct children of the node.
    #[default]
    Shallow,
    /// Also the mandatory lines of every line added on the way.
    Recursive,
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    Value,
    Xref,
}

/// A document instantiated from one grammar structure.
///
/// Nodes live in an arena owned by the tree and are addressed by [`Node`]
/// handles. Children of a node are kept sorted by grammar position, lines
/// sharing a position stay in insertion order.
#[derive(Debug)]
pub struct Tree<'s> {
    store: &'s Store,
    nodes: Arena<NodeData>,
    root: Node,
    sequence: u32,
}

impl<'s> Tree<'s> {
    pub fn new(store: &'s Store, name: &str, tag: Option<&str>) -> Result<Self, SchemaAccessError> {
        let variation = store.get_structure(name, tag, None)?;
        let selector = Selector { tag: tag.map(str::to_owned), xref_value: None };

        let mut nodes = Arena::default();
        let root = nodes.alloc(NodeData {
            kind: NodeKind::Structure(StructureNode { name: name.to_owned(), selector, variation }),
            line: None,
            block: Some(store.structure(variation).block()),
            parent: None,
            children: Vec::new(),
            key: NodeKey { position: 0, line: None, sequence: 0 },
            removed: false,
        });

        debug!(structure = name, "created tree");
        Ok(Self { store, nodes, root, sequence: 0 })
    }

    pub fn store(&self) -> &'s Store {
        self.store
    }

    pub fn root(&self) -> Node {
        self.root
    }

    pub fn structure_name(&self) -> &str {
        self.nodes[self.root].line_id()
    }

    pub fn node(&self, node: Node) -> &NodeData {
        &self.nodes[node]
    }

    pub fn parent(&self, node: Node) -> Option<Node> {
        self.nodes[node].parent
    }

    pub fn children(&self, node: Node) -> &[Node] {
        &self.nodes[node].children
    }

    pub fn line_id(&self, node: Node) -> &str {
        self.nodes[node].line_id()
    }

    pub fn value(&self, node: Node) -> Option<&str> {
        self.nodes[node].value()
    }

    pub fn xref(&self, node: Node) -> Option<&str> {
        self.nodes[node].xref()
    }

    pub(crate) fn live(&self, node: Node) -> Result<&NodeData, SchemaAccessError> {
        let data = &self.nodes[node];
        if data.removed { Err(SchemaAccessError::RemovedNode) } else { Ok(data) }
    }

    /// Resolves `name` among the grammar lines `node` may contain.
    pub(crate) fn schema_line(&self, node: Node, name: &str) -> Result<Line, SchemaAccessError> {
        let data = self.live(node)?;
        let Some(block) = data.block else {
            return Err(SchemaAccessError::NoChildLines { line: data.line_id().to_owned() });
        };

        let block = self.store.block(block);
        block.line(name).ok_or_else(|| SchemaAccessError::UnknownLine {
            parent: data.line_id().to_owned(),
            name: name.to_owned(),
            available: block.line_ids().map(str::to_owned).collect(),
        })
    }

    fn tag_line(&self, node: Node) -> Result<(&str, &'s StoreLine), SchemaAccessError> {
        let data = self.live(node)?;
        match (&data.kind, data.line) {
            (NodeKind::Tag(tag), Some(line)) => Ok((tag.tag.as_str(), self.store.line(line))),
            _ => Err(SchemaAccessError::StructureLine { name: data.line_id().to_owned() }),
        }
    }

    /// Live children of `parent` instantiating `line`, whatever their tag.
    fn count_for_line(&self, parent: Node, line: Line) -> usize {
        let children = &self.nodes[parent].children;
        children.iter().filter(|&&child| self.nodes[child].line == Some(line)).count()
    }

    /// Whether the line of `node` admits one more instance below its parent.
    pub(crate) fn allows_sibling(&self, node: Node) -> bool {
        let data = &self.nodes[node];
        match (data.parent, data.line) {
            (Some(parent), Some(line)) => {
                self.store.line(line).allows_another(self.count_for_line(parent, line))
            }
            _ => false,
        }
    }

    pub(crate) fn matches(&self, child: Node, name: &str, selector: &Selector) -> bool {
        match &self.nodes[child].kind {
            NodeKind::Tag(tag) => tag.tag == selector.tag.as_deref().unwrap_or(name),
            NodeKind::Structure(structure) => {
                structure.name == name && self.variation_matches(structure, selector)
            }
        }
    }

    /// Checks `selector` against the variation `structure` resolved to.
    ///
    /// A tag requested at creation must equal the selector tag. Otherwise the
    /// tag only has to be a top line id of the variation. The xref/value flags
    /// are compared with the fields of that top line.
    fn variation_matches(&self, structure: &StructureNode, selector: &Selector) -> bool {
        let store = self.store;
        let tag = match (selector.tag.as_deref(), structure.selector.tag.as_deref()) {
            (Some(wanted), Some(requested)) if wanted != requested => return false,
            (Some(tag), _) | (None, Some(tag)) => tag,
            (None, None) if selector.xref_value.is_none() => return true,
            (None, None) => match store.first_line_id(structure.variation) {
                Some(tag) => tag,
                None => return false,
            },
        };

        let block = store.block(store.structure(structure.variation).block());
        let Some(line) = block.line(tag).map(|line| store.line(line)) else { return false };
        selector.xref_value.is_none_or(|(with_xref, with_value)| {
            line.is_tag_line() && line.has_xref() == with_xref && line.has_value() == with_value
        })
    }

    /// Children of `node` addressed by `name` and `selector`, in document order.
    pub fn matching_children(&self, node: Node, name: &str, selector: &Selector) -> Vec<Node> {
        let children = &self.nodes[node].children;
        children.iter().copied().filter(|&child| self.matches(child, name, selector)).collect()
    }

    /// Adds an instance of grammar line `name` below `parent`.
    ///
    /// For a tag line `name` is one of its tags, `selector.tag` may pick
    /// another tag of the same line. For a structure line `name` is the
    /// structure name and `selector` picks the variation.
    pub fn add_child_line(
        &mut self,
        parent: Node,
        name: &str,
        selector: &Selector,
    ) -> Result<Node, CreationError> {
        let store = self.store;
        let line = self.schema_line(parent, name)?;
        let store_line = store.line(line);

        let (kind, block) = match store_line.shape() {
            LineShape::Tag { names, .. } => {
                let tag = selector.tag.as_deref().unwrap_or(name);
                if !store_line.has_tag(tag) {
                    return Err(SchemaAccessError::InvalidTag {
                        line: store_line.id().to_owned(),
                        tag: tag.to_owned(),
                        allowed: names.clone(),
                    }
                    .into());
                }
                (NodeKind::Tag(TagNode::new(tag)), store_line.child_block())
            }
            LineShape::Structure { name: structure } => {
                let variation = store.get_structure(
                    structure,
                    selector.tag.as_deref(),
                    selector.xref_value,
                )?;
                let block = store.structure(variation).block();
                let node = StructureNode {
                    name: structure.clone(),
                    selector: selector.clone(),
                    variation,
                };
                (NodeKind::Structure(node), Some(block))
            }
        };

        let count = self.count_for_line(parent, line);
        if !store_line.allows_another(count) {
            return Err(CardinalityError { line_id: name.to_owned(), count, max: store_line.max() }
                .into());
        }

        self.sequence += 1;
        let key =
            NodeKey { position: store_line.position(), line: Some(line), sequence: self.sequence };
        let child = self.nodes.alloc(NodeData {
            kind,
            line: Some(line),
            block,
            parent: Some(parent),
            children: Vec::new(),
            key,
            removed: false,
        });

        let index = self.nodes[parent]
            .children
            .partition_point(|&sibling| self.nodes[sibling].key.position <= key.position);
        self.nodes[parent].children.insert(index, child);

        trace!(parent = self.line_id(parent), line = self.line_id(child), "added line");
        Ok(child)
    }

    /// Adds a sibling of `node` built from the same line and selector.
    pub fn new_line(&mut self, node: Node) -> Result<Node, CreationError> {
        let data = self.live(node)?;
        let Some(parent) = data.parent else {
            return Err(SchemaAccessError::RootNode.into());
        };

        let (name, selector) = match &data.kind {
            NodeKind::Tag(tag) => (tag.tag.clone(), Selector::default()),
            NodeKind::Structure(structure) => (structure.name.clone(), structure.selector.clone()),
        };
        self.add_child_line(parent, &name, &selector)
    }

    pub fn set_value(&mut self, node: Node, value: &str) -> Result<Assignment, SchemaAccessError> {
        self.assign(node, Slot::Value, value)
    }

    pub fn set_xref(&mut self, node: Node, xref: &str) -> Result<Assignment, SchemaAccessError> {
        self.assign(node, Slot::Xref, xref)
    }

    fn assign(
        &mut self,
        node: Node,
        slot: Slot,
        candidate: &str,
    ) -> Result<Assignment, SchemaAccessError> {
        let store = self.store;
        let (tag, line) = self.tag_line(node)?;

        let (present, names) = match slot {
            Slot::Value => (line.has_value(), line.value_names()),
            Slot::Xref => (line.has_xref(), line.xref_names()),
        };
        if !present {
            let tag = tag.to_owned();
            return Err(match slot {
                Slot::Value => SchemaAccessError::NoValueField { tag },
                Slot::Xref => SchemaAccessError::NoXrefField { tag },
            });
        }

        if matches!(slot, Slot::Value) && !line.admits_value(candidate) {
            debug!(tag, candidate, "value outside of the possibilities");
            return Ok(Assignment::Rejected(Rejection::NotPossible {
                candidate: candidate.to_owned(),
                allowed: line.value_possibilities().to_vec(),
            }));
        }

        let context = FieldContext { tag, line };
        let accepted = store.validator().is_none_or(|validator| {
            names.is_empty()
                || names.iter().any(|field| match slot {
                    Slot::Value => validator.validate_value(context, field, candidate),
                    Slot::Xref => validator.validate_xref(context, field, candidate),
                })
        });
        if !accepted {
            debug!(tag, candidate, "rejected by the validator");
            let rejection = Rejection::Validator { candidate: candidate.to_owned() };
            return Ok(Assignment::Rejected(rejection));
        }

        if let NodeKind::Tag(tag) = &mut self.nodes[node].kind {
            let field = match slot {
                Slot::Value => &mut tag.value,
                Slot::Xref => &mut tag.xref,
            };
            *field = Field::Set(candidate.to_owned());
        }
        Ok(Assignment::Accepted)
    }

    /// Resets value and xref of a tag node to unset.
    pub fn clear(&mut self, node: Node) -> Result<(), SchemaAccessError> {
        self.tag_line(node)?;
        if let NodeKind::Tag(tag) = &mut self.nodes[node].kind {
            tag.value = Field::Unset;
            tag.xref = Field::Unset;
        }
        Ok(())
    }

    pub fn has_child_line(&self, node: Node, name: &str) -> bool {
        self.number_of_child_lines(node, name) > 0
    }

    pub fn number_of_child_lines(&self, node: Node, name: &str) -> usize {
        self.child_lines(node, name).count()
    }

    /// Structure children of `node` named `name` selected by line id `tag`.
    pub fn number_of_child_lines_tagged(&self, node: Node, name: &str, tag: &str) -> usize {
        self.matching_children(node, name, &Selector::tag(tag)).len()
    }

    pub fn child_lines<'a>(&'a self, node: Node, name: &'a str) -> impl Iterator<Item = Node> + 'a {
        let children = &self.nodes[node].children;
        children.iter().copied().filter(move |&child| self.nodes[child].line_id() == name)
    }

    /// The `line_number`-th (0-based) child addressed by `name` and `selector`.
    pub fn child_line(
        &self,
        node: Node,
        name: &str,
        selector: &Selector,
        line_number: usize,
    ) -> Option<Node> {
        self.matching_children(node, name, selector).get(line_number).copied()
    }

    /// Upper bound for instances of `name` below `node`, `0` when unbounded.
    pub fn max_number_of_lines(&self, node: Node, name: &str) -> Result<u32, SchemaAccessError> {
        self.schema_line(node, name).map(|line| self.store.line(line).max())
    }

    /// Whether a child tagged `name` already holds `value`.
    pub fn has_line_with_value(&self, node: Node, name: &str, value: &str) -> bool {
        self.child_lines(node, name).any(|child| self.nodes[child].value() == Some(value))
    }

    /// Whether a child tagged `name` already points at `xref`.
    pub fn has_line_with_xref(&self, node: Node, name: &str, xref: &str) -> bool {
        self.child_lines(node, name).any(|child| self.nodes[child].xref() == Some(xref))
    }

    /// Adds instances of the mandatory lines of `node` until each reaches its
    /// minimum. Lines with several tags or a structure with several variations
    /// are skipped. Returns the number of nodes added.
    ///
    /// A recursive fill does not expand a structure that is already being
    /// filled further up, so self-referencing grammars stop after one level.
    pub fn add_mandatory_lines(
        &mut self,
        node: Node,
        fill: MandatoryFill,
    ) -> Result<usize, CreationError> {
        let mut filling = Vec::new();
        self.fill_mandatory(node, fill, &mut filling)
    }

    fn fill_mandatory(
        &mut self,
        node: Node,
        fill: MandatoryFill,
        filling: &mut Vec<Structure>,
    ) -> Result<usize, CreationError> {
        let data = self.live(node)?;
        let Some(block) = data.block else { return Ok(0) };

        let variation = match &data.kind {
            NodeKind::Structure(structure) => Some(structure.variation),
            NodeKind::Tag(_) => None,
        };
        if let Some(variation) = variation {
            if filling.contains(&variation) {
                debug!(structure = data.line_id(), "stopped filling a recursive structure");
                return Ok(0);
            }
            filling.push(variation);
        }

        let added = self.fill_block(node, block, fill, filling);
        if variation.is_some() {
            filling.pop();
        }
        added
    }

    fn fill_block(
        &mut self,
        node: Node,
        block: Block,
        fill: MandatoryFill,
        filling: &mut Vec<Structure>,
    ) -> Result<usize, CreationError> {
        let store = self.store;

        let mut added = 0;
        for &line in store.block(block).mandatory_lines() {
            let store_line = store.line(line);
            let unambiguous = match store_line.shape() {
                LineShape::Tag { names, .. } => names.len() == 1,
                LineShape::Structure { name } => store.variation_count(name) == 1,
            };
            if !unambiguous {
                debug!(line = store_line.id(), "skipped ambiguous mandatory line");
                continue;
            }

            let existing = self.count_for_line(node, line);
            for _ in existing..store_line.min() as usize {
                let child = self.add_child_line(node, store_line.id(), &Selector::default())?;
                added += 1;
                if fill == MandatoryFill::Recursive {
                    added += self.fill_mandatory(child, fill, filling)?;
                }
            }
        }
        Ok(added)
    }

    /// Detaches `node` and its subtree. Their handles are rejected from then on.
    pub fn remove(&mut self, node: Node) -> Result<(), SchemaAccessError> {
        let Some(parent) = self.live(node)?.parent else {
            return Err(SchemaAccessError::RootNode);
        };
        self.nodes[parent].children.retain(|&child| child != node);

        let mut stack = vec![node];
        while let Some(next) = stack.pop() {
            let data = &mut self.nodes[next];
            data.removed = true;
            stack.extend(data.children.iter().copied());
        }
        trace!(parent = self.line_id(parent), "removed line");
        Ok(())
    }
}

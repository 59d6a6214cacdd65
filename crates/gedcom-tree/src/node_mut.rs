use crate::error::{Assignment, CreationError, FieldError};
use crate::node::{Node, NodeData, Selector};
use crate::tree::Tree;

/// A mutable cursor on one node of a [`Tree`], for building documents by
/// chaining.
#[derive(Debug)]
pub struct NodeMut<'t, 's> {
    tree: &'t mut Tree<'s>,
    node: Node,
}

impl<'s> Tree<'s> {
    pub fn node_mut(&mut self, node: Node) -> NodeMut<'_, 's> {
        NodeMut { tree: self, node }
    }

    pub fn root_mut(&mut self) -> NodeMut<'_, 's> {
        let root = self.root();
        self.node_mut(root)
    }
}

impl<'t, 's> NodeMut<'t, 's> {
    pub fn id(&self) -> Node {
        self.node
    }

    pub fn data(&self) -> &NodeData {
        self.tree.node(self.node)
    }

    pub fn tree(&mut self) -> &mut Tree<'s> {
        self.tree
    }

    /// Moves to the parent, or stays at the root.
    pub fn parent(self) -> Self {
        let node = self.tree.parent(self.node).unwrap_or(self.node);
        Self { tree: self.tree, node }
    }

    pub fn add_child_line(self, name: &str) -> Result<Self, CreationError> {
        self.add_child_line_with(name, &Selector::default())
    }

    pub fn add_child_line_with(
        self,
        name: &str,
        selector: &Selector,
    ) -> Result<Self, CreationError> {
        let node = self.tree.add_child_line(self.node, name, selector)?;
        Ok(Self { tree: self.tree, node })
    }

    pub fn new_line(self) -> Result<Self, CreationError> {
        let node = self.tree.new_line(self.node)?;
        Ok(Self { tree: self.tree, node })
    }

    pub fn set_value(self, value: &str) -> Result<Self, FieldError> {
        let assignment = self.tree.set_value(self.node, value)?;
        self.accepted(assignment)
    }

    pub fn set_xref(self, xref: &str) -> Result<Self, FieldError> {
        let assignment = self.tree.set_xref(self.node, xref)?;
        self.accepted(assignment)
    }

    fn accepted(self, assignment: Assignment) -> Result<Self, FieldError> {
        match assignment {
            Assignment::Accepted => Ok(self),
            Assignment::Rejected(rejection) => Err(rejection.into()),
        }
    }
}

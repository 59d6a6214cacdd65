//! Documents instantiated from a lineage-linked grammar.
//!
//! A [`Tree`] is rooted at one grammar structure. Every node is either a tag
//! line, carrying an optional value and xref, or a structure wrapper grouping
//! the lines of an embedded structure. All additions are checked against the
//! grammar: lines must exist below their parent, cardinalities hold, and
//! values stay within closed enumerations.

mod error;
mod node;
mod node_mut;
mod path;
mod print;
mod tree;


pub use gedcom_store::SchemaAccessError;
use gedcom_store::Store;

pub use crate::error::{
    Assignment, CardinalityError, CreationError, FieldError, PathError, PathErrorKind, Rejection,
};
pub use crate::node::{
    Field, Node, NodeData, NodeKey, NodeKind, Selector, StructureNode, TagNode,
};
pub use crate::node_mut::NodeMut;
pub use crate::path::{FollowMode, PathStep};
pub use crate::print::{PrintLine, PrintOptions};
pub use crate::tree::{MandatoryFill, Tree};

pub trait HasTree {
    /// Starts an empty document rooted at structure `name`. `tag` picks the
    /// variation when the structure has several.
    fn tree(&self, name: &str, tag: Option<&str>) -> Result<Tree<'_>, SchemaAccessError>;
}

impl HasTree for Store {
    fn tree(&self, name: &str, tag: Option<&str>) -> Result<Tree<'_>, SchemaAccessError> {
        Tree::new(self, name, tag)
    }
}

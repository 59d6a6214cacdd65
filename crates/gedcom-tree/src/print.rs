use std::fmt;

use gedcom_store::TagPlacement;

use crate::node::{Node, NodeKind};
use crate::tree::Tree;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrintOptions {
    /// Drop tag lines without value or xref unless something below them is
    /// printed.
    pub skip_unset: bool,
}

/// A node in document order, ready for a GEDCOM writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintLine {
    pub node: Node,
    /// GEDCOM level. Structure wrappers share the level of their top lines.
    pub depth: usize,
    /// Wrappers are not part of the written document.
    pub is_structure_wrapper: bool,
    pub text: String,
}

impl fmt::Display for PrintLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.depth, self.text)
    }
}

impl Tree<'_> {
    /// Flattens the tree below the root, depth first.
    pub fn printable(&self, options: PrintOptions) -> Vec<PrintLine> {
        let mut lines = Vec::new();
        for &child in self.children(self.root()) {
            self.collect(child, 0, options, &mut lines);
        }
        lines
    }

    fn collect(&self, node: Node, depth: usize, options: PrintOptions, out: &mut Vec<PrintLine>) {
        let data = self.node(node);
        let mark = out.len();
        out.push(PrintLine {
            node,
            depth,
            is_structure_wrapper: data.is_structure(),
            text: self.render(node),
        });

        let child_depth = if data.is_structure() { depth } else { depth + 1 };
        for &child in data.children() {
            self.collect(child, child_depth, options, out);
        }

        let has_fields = data.is_value_set() || data.is_xref_set();
        if options.skip_unset && !has_fields && out.len() == mark + 1 {
            out.truncate(mark);
        }
    }

    /// `TAG [@xref@] [value]`, or `[@xref@] TAG [value]` when the grammar puts
    /// the xref first. Structure nodes render as `<<NAME>>`.
    pub fn render(&self, node: Node) -> String {
        let data = self.node(node);
        let tag = match data.kind() {
            NodeKind::Tag(tag) => tag,
            NodeKind::Structure(structure) => return format!("<<{}>>", structure.name()),
        };

        let placement = data.line().and_then(|line| self.store().line(line).tag_placement());
        let mut text = match (tag.xref().get(), placement) {
            (Some(xref), Some(TagPlacement::AfterXref)) => format!("@{xref}@ {}", tag.tag()),
            (Some(xref), _) => format!("{} @{xref}@", tag.tag()),
            (None, _) => tag.tag().to_owned(),
        };
        if let Some(value) = tag.value().get().filter(|value| !value.is_empty()) {
            text.push(' ');
            text.push_str(value);
        }
        text
    }

    /// Every node with its sibling key, indented by tree depth.
    pub fn debug_tree(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![(self.root(), 0)];
        while let Some((node, indent)) = stack.pop() {
            let data = self.node(node);
            let key = data.key();
            let text = self.render(node);
            out.push_str(&format!(
                "{:indent$}{text} [{}.{}]\n",
                "",
                key.position,
                key.sequence,
                indent = indent * 2
            ));
            stack.extend(data.children().iter().rev().map(|&child| (child, indent + 1)));
        }
        out
    }
}

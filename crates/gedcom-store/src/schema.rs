use std::fmt;

use gedcom_tokenizer::{LineDescriptor, LineShape, TagPlacement};
use la_arena::Idx;

use crate::FxIndexMap;

pub type Structure = Idx<StoreStructure>;
pub type Block = Idx<StoreBlock>;
pub type Line = Idx<StoreLine>;

/// One variation of a named grammar structure.
#[derive(Debug)]
pub struct StoreStructure {
    pub(crate) name: String,
    pub(crate) variation: usize,
    pub(crate) block: Block,
}

impl StoreStructure {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Index among the variations sharing this name, in declaration order.
    pub fn variation(&self) -> usize {
        self.variation
    }

    pub fn block(&self) -> Block {
        self.block
    }
}

#[derive(Debug)]
pub struct StoreBlock {
    pub(crate) parent: Option<Line>,
    pub(crate) level: u8,
    pub(crate) lines: Vec<Line>,
    pub(crate) mandatory: Vec<Line>,
    pub(crate) by_id: FxIndexMap<String, Line>,
}

impl StoreBlock {
    pub(crate) fn new(parent: Option<Line>, level: u8) -> Self {
        Self {
            parent,
            level,
            lines: Vec::new(),
            mandatory: Vec::new(),
            by_id: FxIndexMap::default(),
        }
    }

    pub fn parent(&self) -> Option<Line> {
        self.parent
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn mandatory_lines(&self) -> &[Line] {
        &self.mandatory
    }

    /// Looks a line up by any of its tags or by its structure name.
    pub fn line(&self, id: &str) -> Option<Line> {
        self.by_id.get(id).copied()
    }

    pub fn line_ids(&self) -> impl Iterator<Item = &str> {
        self.by_id.keys().map(String::as_str)
    }
}

#[derive(Debug)]
pub struct StoreLine {
    pub(crate) descriptor: LineDescriptor,
    pub(crate) position: u32,
    pub(crate) block: Block,
    pub(crate) child_block: Option<Block>,
    pub(crate) source_line: u32,
}

impl StoreLine {
    pub fn shape(&self) -> &LineShape {
        &self.descriptor.shape
    }

    /// The structure name of a structure line, the first tag otherwise.
    pub fn id(&self) -> &str {
        match &self.descriptor.shape {
            LineShape::Tag { names, .. } => names.first().map_or("", String::as_str),
            LineShape::Structure { name } => name,
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        let (tags, structure) = match &self.descriptor.shape {
            LineShape::Tag { names, .. } => (names.as_slice(), None),
            LineShape::Structure { name } => (&[][..], Some(name.as_str())),
        };
        tags.iter().map(String::as_str).chain(structure)
    }

    pub fn is_tag_line(&self) -> bool {
        matches!(self.descriptor.shape, LineShape::Tag { .. })
    }

    pub fn tag_names(&self) -> &[String] {
        match &self.descriptor.shape {
            LineShape::Tag { names, .. } => names,
            LineShape::Structure { .. } => &[],
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tag_names().iter().any(|name| name == tag)
    }

    pub fn tag_placement(&self) -> Option<TagPlacement> {
        match &self.descriptor.shape {
            LineShape::Tag { placement, .. } => Some(*placement),
            LineShape::Structure { .. } => None,
        }
    }

    pub fn structure_name(&self) -> Option<&str> {
        match &self.descriptor.shape {
            LineShape::Structure { name } => Some(name),
            LineShape::Tag { .. } => None,
        }
    }

    pub fn xref_names(&self) -> &[String] {
        &self.descriptor.xref_names
    }

    pub fn value_names(&self) -> &[String] {
        &self.descriptor.value_names
    }

    pub fn value_possibilities(&self) -> &[String] {
        &self.descriptor.value_possibilities
    }

    pub fn has_xref(&self) -> bool {
        !self.descriptor.xref_names.is_empty()
    }

    pub fn has_value(&self) -> bool {
        !self.descriptor.value_names.is_empty() || !self.descriptor.value_possibilities.is_empty()
    }

    /// Checks `value` against the closed enumeration, if the line has one.
    pub fn admits_value(&self, value: &str) -> bool {
        let possibilities = &self.descriptor.value_possibilities;
        possibilities.is_empty() || possibilities.iter().any(|possible| possible == value)
    }

    pub fn min(&self) -> u32 {
        self.descriptor.min
    }

    /// `0` means unbounded.
    pub fn max(&self) -> u32 {
        self.descriptor.max
    }

    pub fn is_mandatory(&self) -> bool {
        self.descriptor.min >= 1
    }

    pub fn allows_another(&self, count: usize) -> bool {
        self.descriptor.max == 0 || count < self.descriptor.max as usize
    }

    pub fn level(&self) -> u8 {
        self.descriptor.level
    }

    pub fn position(&self) -> u32 {
        self.position
    }

    pub fn block(&self) -> Block {
        self.block
    }

    pub fn child_block(&self) -> Option<Block> {
        self.child_block
    }

    /// 1-based line number in the grammar file.
    pub fn source_line(&self) -> u32 {
        self.source_line
    }
}

impl fmt::Display for StoreLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.descriptor, f)
    }
}

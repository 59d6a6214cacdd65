mod dump;
mod error;
mod parser;
mod schema;
mod validator;

#[cfg(test)]
mod tests;

use std::fmt;

use camino::Utf8PathBuf;
use gedcom_inputs::{GRAMMAR_EXTENSION, GrammarFile, LineCol};
pub use gedcom_tokenizer::{LineShape, TagPlacement};
use la_arena::Arena;

pub use dump::StructureDump;
pub use error::{LoadError, ParseError, ParseErrorKind, SchemaAccessError};
pub use schema::{Block, Line, StoreBlock, StoreLine, StoreStructure, Structure};
pub use validator::{FieldContext, LengthValidator, Validator};

pub(crate) type FxIndexMap<K, V> =
    indexmap::IndexMap<K, V, std::hash::BuildHasherDefault<rustc_hash::FxHasher>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub(crate) version: String,
    pub(crate) source: String,
    pub(crate) description: Vec<String>,
}

impl Header {
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn description(&self) -> &[String] {
        &self.description
    }
}

/// The parsed lineage-linked grammar. Immutable once parsed, apart from the
/// validator which is installed before trees are built.
pub struct Store {
    header: Header,
    structures: Arena<StoreStructure>,
    blocks: Arena<StoreBlock>,
    lines: Arena<StoreLine>,
    variations: FxIndexMap<String, Vec<Structure>>,
    by_line_id: FxIndexMap<String, FxIndexMap<String, Vec<Structure>>>,
    validator: Option<Box<dyn Validator>>,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("header", &self.header)
            .field("structures", &self.structures.len())
            .field("lines", &self.lines.len())
            .field("validator", &self.validator.is_some())
            .finish_non_exhaustive()
    }
}

impl Store {
    pub(crate) fn new(header: Header) -> Self {
        Self {
            header,
            structures: Arena::default(),
            blocks: Arena::default(),
            lines: Arena::default(),
            variations: FxIndexMap::default(),
            by_line_id: FxIndexMap::default(),
            validator: None,
        }
    }

    pub fn parse(text: &str) -> Result<Self, ParseError> {
        parser::parse(text)
    }

    pub fn parse_file(file: &GrammarFile) -> Result<Self, ParseError> {
        Self::parse(file.text())
    }

    pub fn open(path: impl Into<Utf8PathBuf>) -> Result<Self, LoadError> {
        let path = path.into();
        if path.extension() != Some(GRAMMAR_EXTENSION) {
            return Err(LoadError::Extension { path });
        }

        let file = match GrammarFile::read(path.clone()) {
            Ok(file) => file,
            Err(source) => return Err(LoadError::Io { path, source }),
        };
        Self::parse_file(&file).map_err(|source| {
            let LineCol { line, col } = file.line_index().line_col(source.range().start());
            LoadError::Parse { path, line: line + 1, column: col + 1, source }
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn version(&self) -> &str {
        &self.header.version
    }

    pub fn source(&self) -> &str {
        &self.header.source
    }

    pub fn description(&self) -> String {
        self.header.description.join("\n")
    }

    pub fn set_validator(&mut self, validator: impl Validator + 'static) {
        self.validator = Some(Box::new(validator));
    }

    pub fn validator(&self) -> Option<&dyn Validator> {
        self.validator.as_deref()
    }

    pub fn structure(&self, structure: Structure) -> &StoreStructure {
        &self.structures[structure]
    }

    pub fn block(&self, block: Block) -> &StoreBlock {
        &self.blocks[block]
    }

    pub fn line(&self, line: Line) -> &StoreLine {
        &self.lines[line]
    }

    /// Every parsed variation, in declaration order.
    pub fn structures(&self) -> impl Iterator<Item = (Structure, &StoreStructure)> {
        self.structures.iter()
    }

    pub fn structure_names(&self) -> impl Iterator<Item = &str> {
        self.variations.keys().map(String::as_str)
    }

    pub fn has_structure(&self, name: &str) -> bool {
        self.variations.contains_key(name)
    }

    pub fn variations(&self, name: &str) -> &[Structure] {
        self.variations.get(name).map_or(&[], Vec::as_slice)
    }

    pub fn variation_count(&self, name: &str) -> usize {
        self.variations(name).len()
    }

    /// All top-line ids the variations of `name` can be selected by.
    pub fn variation_tags(&self, name: &str) -> impl Iterator<Item = &str> {
        self.by_line_id.get(name).into_iter().flat_map(|ids| ids.keys().map(String::as_str))
    }

    pub fn has_line_id(&self, name: &str, line_id: &str) -> bool {
        self.by_line_id.get(name).is_some_and(|ids| ids.contains_key(line_id))
    }

    pub fn first_line_id(&self, structure: Structure) -> Option<&str> {
        let block = self.block(self.structure(structure).block);
        block.lines().first().map(|&line| self.line(line).id())
    }

    /// Resolves one variation of `name`.
    ///
    /// Without a `tag` the structure must have exactly one variation. With
    /// `xref_value` the variation whose top line for `tag` has exactly that
    /// xref/value presence is returned, otherwise the first one registered
    /// for `tag`. Asking a structure line for its xref/value presence is a
    /// [`SchemaAccessError::StructureLine`].
    pub fn get_structure(
        &self,
        name: &str,
        tag: Option<&str>,
        xref_value: Option<(bool, bool)>,
    ) -> Result<Structure, SchemaAccessError> {
        let Some(by_tag) = self.by_line_id.get(name) else {
            return Err(SchemaAccessError::UnknownStructure { name: name.to_owned() });
        };

        let tag = match (tag, self.variations(name)) {
            (Some(tag), _) => tag,
            (None, &[only]) => self.first_line_id(only).unwrap_or_default(),
            (None, _) => {
                return Err(SchemaAccessError::AmbiguousVariation {
                    name: name.to_owned(),
                    tags: self.variation_tags(name).map(str::to_owned).collect(),
                });
            }
        };

        let candidates = by_tag.get(tag).map_or(&[][..], Vec::as_slice);
        let unknown_tag = || SchemaAccessError::UnknownVariationTag {
            name: name.to_owned(),
            tag: tag.to_owned(),
        };

        let Some((with_xref, with_value)) = xref_value else {
            return candidates.first().copied().ok_or_else(unknown_tag);
        };

        let top_line = |structure: Structure| {
            let block = self.block(self.structure(structure).block);
            block.line(tag).map(|line| self.line(line))
        };
        let mut top_lines = candidates.iter().filter_map(|&structure| top_line(structure));
        match top_lines.next() {
            None => return Err(unknown_tag()),
            Some(line) if !line.is_tag_line() => {
                return Err(SchemaAccessError::StructureLine { name: tag.to_owned() });
            }
            Some(_) => {}
        }

        candidates
            .iter()
            .copied()
            .find(|&structure| {
                top_line(structure).is_some_and(|line| {
                    line.is_tag_line()
                        && line.has_xref() == with_xref
                        && line.has_value() == with_value
                })
            })
            .ok_or_else(|| SchemaAccessError::NoMatchingVariation {
                name: name.to_owned(),
                tag: tag.to_owned(),
                with_xref,
                with_value,
            })
    }

    pub fn dump(&self, name: &str) -> Option<StructureDump<'_>> {
        let (name, variations) = self.variations.get_key_value(name)?;
        Some(StructureDump { store: self, name, variations })
    }

    /// Dumps a single variation.
    pub fn dump_variation(&self, structure: Structure) -> StructureDump<'_> {
        let data = self.structure(structure);
        let variations = self.variations(&data.name);
        let index = data.variation;
        StructureDump { store: self, name: &data.name, variations: &variations[index..=index] }
    }
}

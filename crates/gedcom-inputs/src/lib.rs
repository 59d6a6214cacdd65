use std::cell::OnceCell;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
pub use line_index::{LineCol, LineIndex};

pub const GRAMMAR_EXTENSION: &str = "gedg";

#[derive(Debug)]
pub struct GrammarFile {
    path: Utf8PathBuf,
    text: String,
    line_index: OnceCell<LineIndex>,
}

impl GrammarFile {
    pub fn new(path: impl Into<Utf8PathBuf>, text: impl Into<String>) -> Self {
        Self { path: path.into(), text: text.into(), line_index: OnceCell::new() }
    }

    pub fn read(path: impl Into<Utf8PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let text = std::fs::read_to_string(&path)?;
        Ok(Self::new(path, text))
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn has_grammar_extension(&self) -> bool {
        self.path.extension() == Some(GRAMMAR_EXTENSION)
    }

    pub fn line_index(&self) -> &LineIndex {
        self.line_index.get_or_init(|| LineIndex::new(&self.text))
    }
}

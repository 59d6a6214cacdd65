use std::io;

use camino::Utf8PathBuf;
use gedcom_errors::Diagnostic;
use gedcom_inputs::GRAMMAR_EXTENSION;
use gedcom_tokenizer::{ClassError, FormatError, TokenError};
use text_size::TextRange;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} (line {line_number}: `{line}`)")]
pub struct ParseError {
    kind: ParseErrorKind,
    line_number: u32,
    line: String,
    range: TextRange,
}

impl ParseError {
    pub(crate) fn new(
        kind: impl Into<ParseErrorKind>,
        line_number: u32,
        line: &str,
        range: TextRange,
    ) -> Self {
        Self { kind: kind.into(), line_number, line: line.to_owned(), range }
    }

    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }

    /// 1-based.
    pub fn line_number(&self) -> u32 {
        self.line_number
    }

    pub fn line(&self) -> &str {
        &self.line
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let diagnostic =
            Diagnostic::error(self.kind.to_string(), self.range).with_label("in this line");
        match self.kind {
            ParseErrorKind::MissingHeader { .. } => diagnostic
                .with_note("a grammar starts with `VERSION=`, `SOURCE=` and `DESCRIPTION=` lines"),
            _ => diagnostic,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("missing header key `{key}=` before the first structure")]
    MissingHeader { key: &'static str },
    #[error(transparent)]
    Class(#[from] ClassError),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("structure `{name}` has no lines")]
    EmptyStructure { name: String },
    #[error("empty variation in structure `{name}`")]
    EmptyVariation { name: String },
    #[error("variations of structure `{name}` are not closed with `]`")]
    UnclosedVariations { name: String },
    #[error("unexpected variation divider in structure `{name}`")]
    UnexpectedDivider { name: String },
    #[error("content after the closing `]` of structure `{name}`")]
    ContentAfterVariations { name: String },
    #[error("line index is shallower than the first line of its block")]
    ShallowerIndex,
    #[error("line id `{id}` is declared twice in the same block")]
    DuplicateLineId { id: String },
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read `{path}`")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("`{path}` is not a grammar file, expected the `.{GRAMMAR_EXTENSION}` extension")]
    Extension { path: Utf8PathBuf },
    #[error("invalid grammar `{path}:{line}:{column}`: {source}")]
    Parse {
        path: Utf8PathBuf,
        /// 1-based, like `column`.
        line: u32,
        column: u32,
        #[source]
        source: ParseError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaAccessError {
    #[error("structure `{name}` does not exist")]
    UnknownStructure { name: String },
    #[error("structure `{name}` has several variations, pick one of the line ids {tags:?}")]
    AmbiguousVariation { name: String, tags: Vec<String> },
    #[error("structure `{name}` with line id `{tag}` does not exist")]
    UnknownVariationTag { name: String, tag: String },
    #[error(
        "structure `{name}` with line id `{tag}` {} an xref field and {} a value field does not exist",
        presence(.with_xref),
        presence(.with_value)
    )]
    NoMatchingVariation { name: String, tag: String, with_xref: bool, with_value: bool },
    #[error("`{parent}` has no line `{name}`, available lines are {available:?}")]
    UnknownLine { parent: String, name: String, available: Vec<String> },
    #[error("tag `{tag}` is not admissible for line `{line}`, expected one of {allowed:?}")]
    InvalidTag { line: String, tag: String, allowed: Vec<String> },
    #[error("line `{tag}` has no xref field")]
    NoXrefField { tag: String },
    #[error("line `{tag}` has no value field")]
    NoValueField { tag: String },
    #[error("`<<{name}>>` is a structure line and has no fields")]
    StructureLine { name: String },
    #[error("line `{line}` has no child lines")]
    NoChildLines { line: String },
    #[error("the node was removed from its tree")]
    RemovedNode,
    #[error("the root node has no line of its own")]
    RootNode,
}

fn presence(flag: &bool) -> &'static str {
    if *flag { "with" } else { "without" }
}

use std::iter::Peekable;

use gedcom_tokenizer::{
    ClassError, Divider, LineClass, LineDescriptor, check_format, classify_line, normalize,
    normalize_text, tokenize,
};
use text_size::{TextLen, TextRange, TextSize};
use tracing::{debug, trace, warn};

use crate::{
    Block, Header, Line, ParseError, ParseErrorKind, Store, StoreBlock, StoreLine, StoreStructure,
};

struct SourceLine<'a> {
    number: u32,
    raw: &'a str,
    range: TextRange,
    text: String,
}

impl SourceLine<'_> {
    fn error(&self, kind: impl Into<ParseErrorKind>) -> ParseError {
        ParseError::new(kind, self.number, self.raw, self.range)
    }

    fn class(&self) -> Result<LineClass<'_>, ParseError> {
        classify_line(&self.text).map_err(|err| self.error(err))
    }
}

fn source_lines(text: &str) -> impl Iterator<Item = SourceLine<'_>> {
    let mut offset = 0;

    text.split_inclusive('\n').enumerate().filter_map(move |(index, chunk)| {
        let start = offset;
        offset += chunk.len();

        let line = chunk.trim_end_matches(['\n', '\r']);
        let leading = line.len() - line.trim_start().len();
        let raw = line.trim();
        let normalized = normalize(raw);
        if normalized.is_empty() {
            return None;
        }

        let range = TextRange::at(TextSize::from((start + leading) as u32), raw.text_len());
        Some(SourceLine { number: index as u32 + 1, raw, range, text: normalized })
    })
}

pub(crate) fn parse(text: &str) -> Result<Store, ParseError> {
    let mut lines = source_lines(text).peekable();
    let header = header(&mut lines, text)?;
    let mut parser = Parser { store: Store::new(header) };

    while let Some(name_line) = lines.next() {
        let name = match name_line.class()? {
            LineClass::StructureName(name) => name.to_owned(),
            _ => {
                let line = name_line.text.clone();
                return Err(name_line.error(ClassError::StructureName { line }));
            }
        };

        let mut body = Vec::new();
        while let Some(line) = lines.next_if(|line| !is_structure_name(line)) {
            body.push(line);
        }

        parser.structure(&name, &name_line, &body)?;
    }

    debug!(structures = parser.store.structures.len(), "parsed grammar");
    Ok(parser.store)
}

fn is_structure_name(line: &SourceLine<'_>) -> bool {
    matches!(classify_line(&line.text), Ok(LineClass::StructureName(_)))
}

fn header<'a>(
    lines: &mut Peekable<impl Iterator<Item = SourceLine<'a>>>,
    text: &str,
) -> Result<Header, ParseError> {
    let mut version = None;
    let mut source = None;
    let mut description = Vec::new();
    let mut in_description = false;

    while let Some(line) = lines.next_if(|line| !line.text.ends_with(":=")) {
        let line = normalize_text(line.raw);

        if let Some(value) = line.strip_prefix("VERSION=") {
            version = Some(value.trim().to_owned()).filter(|value| !value.is_empty());
        } else if let Some(value) = line.strip_prefix("SOURCE=") {
            source = Some(value.trim().to_owned()).filter(|value| !value.is_empty());
        } else if let Some(value) = line.strip_prefix("DESCRIPTION=") {
            in_description = true;
            if !value.trim().is_empty() {
                description.push(value.trim().to_owned());
            }
        } else if in_description {
            description.push(line);
        } else {
            warn!(%line, "ignoring unrecognized header line");
        }
    }

    let missing = if version.is_none() {
        Some("VERSION")
    } else if source.is_none() {
        Some("SOURCE")
    } else if description.is_empty() {
        Some("DESCRIPTION")
    } else {
        None
    };

    match (missing, version, source) {
        (None, Some(version), Some(source)) => Ok(Header { version, source, description }),
        (key, ..) => {
            let kind = ParseErrorKind::MissingHeader { key: key.unwrap_or("VERSION") };
            Err(match lines.peek() {
                Some(line) => line.error(kind),
                None => ParseError::new(
                    kind,
                    text.lines().count() as u32 + 1,
                    "",
                    TextRange::empty(text.text_len()),
                ),
            })
        }
    }
}

struct Parser {
    store: Store,
}

impl Parser {
    fn structure(
        &mut self,
        name: &str,
        name_line: &SourceLine<'_>,
        body: &[SourceLine<'_>],
    ) -> Result<(), ParseError> {
        let Some(first) = body.first() else {
            return Err(name_line.error(ParseErrorKind::EmptyStructure { name: name.to_owned() }));
        };

        if first.class()? != LineClass::Divider(Divider::Open) {
            let lines = body
                .iter()
                .map(|line| match line.class()? {
                    LineClass::Divider(_) => Err(line
                        .error(ParseErrorKind::UnexpectedDivider { name: name.to_owned() })),
                    _ => Ok(line),
                })
                .collect::<Result<Vec<_>, _>>()?;
            return self.variation(name, &lines);
        }

        let mut segment = Vec::new();
        let mut closed = false;

        for line in &body[1..] {
            if closed {
                return Err(
                    line.error(ParseErrorKind::ContentAfterVariations { name: name.to_owned() })
                );
            }

            match line.class()? {
                LineClass::Divider(Divider::Open) => {
                    return Err(
                        line.error(ParseErrorKind::UnexpectedDivider { name: name.to_owned() })
                    );
                }
                LineClass::Divider(divider) => {
                    if segment.is_empty() {
                        return Err(
                            line.error(ParseErrorKind::EmptyVariation { name: name.to_owned() })
                        );
                    }
                    self.variation(name, &std::mem::take(&mut segment))?;
                    closed = divider == Divider::Close;
                }
                LineClass::Content | LineClass::StructureName(_) => segment.push(line),
            }
        }

        if closed {
            Ok(())
        } else {
            Err(name_line.error(ParseErrorKind::UnclosedVariations { name: name.to_owned() }))
        }
    }

    fn variation(&mut self, name: &str, lines: &[&SourceLine<'_>]) -> Result<(), ParseError> {
        let lines = lines
            .iter()
            .map(|&line| {
                check_format(&line.text).map_err(|err| line.error(err))?;
                let descriptor = tokenize(&line.text).map_err(|err| line.error(err))?;
                trace!(line = line.number, %descriptor, "classified grammar line");
                Ok((line, descriptor))
            })
            .collect::<Result<Vec<_>, ParseError>>()?;

        let block = self.block(&lines, None)?;

        let store = &mut self.store;
        let variations = store.variations.entry(name.to_owned()).or_default();
        let variation = variations.len();
        let structure =
            store.structures.alloc(StoreStructure { name: name.to_owned(), variation, block });
        variations.push(structure);

        let by_line_id = store.by_line_id.entry(name.to_owned()).or_default();
        for &line in &store.blocks[block].lines {
            for id in store.lines[line].ids() {
                by_line_id.entry(id.to_owned()).or_default().push(structure);
            }
        }

        debug!(structure = name, variation, lines = lines.len(), "parsed structure");
        Ok(())
    }

    fn block(
        &mut self,
        lines: &[(&SourceLine<'_>, LineDescriptor)],
        parent: Option<Line>,
    ) -> Result<Block, ParseError> {
        let level = lines.first().map_or(0, |(_, descriptor)| descriptor.level);
        let block = self.store.blocks.alloc(StoreBlock::new(parent, level));

        let mut rest = lines;
        while let Some(((source, descriptor), tail)) = rest.split_first() {
            if descriptor.level < level {
                return Err(source.error(ParseErrorKind::ShallowerIndex));
            }

            let nested = tail.iter().take_while(|(_, sub)| sub.level > level).count();
            let (children, next) = tail.split_at(nested);

            let position = self.store.blocks[block].lines.len() as u32;
            let line = self.store.lines.alloc(StoreLine {
                descriptor: descriptor.clone(),
                position,
                block,
                child_block: None,
                source_line: source.number,
            });

            if !children.is_empty() {
                let child = self.block(children, Some(line))?;
                self.store.lines[line].child_block = Some(child);
            }

            let data = &mut self.store.blocks[block];
            let store_line = &self.store.lines[line];
            for id in store_line.ids() {
                if data.by_id.insert(id.to_owned(), line).is_some() {
                    return Err(source.error(ParseErrorKind::DuplicateLineId { id: id.to_owned() }));
                }
            }
            data.lines.push(line);
            if store_line.is_mandatory() {
                data.mandatory.push(line);
            }

            rest = next;
        }

        Ok(block)
    }
}

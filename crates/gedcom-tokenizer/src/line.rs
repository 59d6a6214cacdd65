use std::fmt;

use crate::check::split_index;
use crate::token::{NULL, Token, classify};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagPlacement {
    BeforeXref,
    AfterXref,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineShape {
    Tag { names: Vec<String>, placement: TagPlacement },
    Structure { name: String },
}

/// Everything a single grammar line declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineDescriptor {
    pub level: u8,
    pub shape: LineShape,
    pub xref_names: Vec<String>,
    pub value_names: Vec<String>,
    /// Closed set of admissible values. `<NULL>` is stored as an empty string.
    pub value_possibilities: Vec<String>,
    pub min: u32,
    /// `0` means unbounded (`M`).
    pub max: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("invalid line index `{index}`, expected `n` or `+<1-99>`")]
    Index { index: String },
    #[error("unrecognized token `{token}`")]
    Unrecognized { token: String },
    #[error("duplicate {what} `{token}`")]
    Duplicate { what: &'static str, token: String },
    #[error("value possibilities `{token}` must directly follow the tag")]
    MisplacedPossibilities { token: String },
    #[error("invalid cardinality `{token}`, the maximum must be `M` or at least the minimum and 1")]
    Cardinality { token: String },
    #[error("missing `{{min:max}}` quantifier")]
    MissingCardinality,
    #[error("line declares neither a tag nor a structure reference")]
    NoTagOrStructure,
    #[error("line declares both a tag and the structure reference `<<{structure}>>`")]
    TagAndStructure { structure: String },
    #[error("structure reference `<<{structure}>>` cannot declare xref or value fields")]
    FieldsOnStructure { structure: String },
}

pub fn tokenize(line: &str) -> Result<LineDescriptor, TokenError> {
    let (level, content) = split_index(line).ok_or_else(|| TokenError::Index {
        index: line.split(' ').next().unwrap_or_default().to_owned(),
    })?;

    let mut tags: Option<(Vec<String>, TagPlacement)> = None;
    let mut structure: Option<String> = None;
    let mut xref_names = Vec::new();
    let mut value_names = Vec::new();
    let mut value_possibilities = Vec::new();
    let mut cardinality = None;
    let mut after_tag = false;

    for word in content.split(' ') {
        let token =
            classify(word).ok_or_else(|| TokenError::Unrecognized { token: word.to_owned() })?;
        let follows_tag = std::mem::replace(&mut after_tag, false);
        let duplicate = |what| TokenError::Duplicate { what, token: word.to_owned() };

        match token {
            Token::Tag(names)
                if follows_tag && value_possibilities.is_empty() && names.len() > 1 =>
            {
                value_possibilities = owned(names);
            }
            Token::Tag(names) => {
                if tags.is_some() {
                    return Err(duplicate("tag"));
                }
                let placement = if xref_names.is_empty() {
                    TagPlacement::BeforeXref
                } else {
                    TagPlacement::AfterXref
                };
                tags = Some((owned(names), placement));
                after_tag = true;
            }
            Token::Choice(choices) => {
                if !follows_tag || !value_possibilities.is_empty() {
                    return Err(TokenError::MisplacedPossibilities { token: word.to_owned() });
                }
                value_possibilities = choices
                    .into_iter()
                    .map(|choice| choice.unwrap_or_default().to_owned())
                    .collect();
            }
            Token::Xref(names) => {
                if !xref_names.is_empty() {
                    return Err(duplicate("xref"));
                }
                xref_names = owned(names);
            }
            Token::Value(names) => {
                if !value_names.is_empty() {
                    return Err(duplicate("value"));
                }
                value_names = owned(names);
            }
            Token::Structure(name) => {
                if structure.is_some() {
                    return Err(duplicate("structure reference"));
                }
                structure = Some(name.to_owned());
            }
            Token::Cardinality { min, max } => {
                if cardinality.is_some() {
                    return Err(duplicate("cardinality"));
                }
                let max = match max {
                    None => 0,
                    Some(max) if max >= 1 && max >= min => max,
                    Some(_) => return Err(TokenError::Cardinality { token: word.to_owned() }),
                };
                cardinality = Some((min, max));
            }
        }
    }

    let (min, max) = cardinality.ok_or(TokenError::MissingCardinality)?;

    let shape = match (tags, structure) {
        (Some((names, placement)), None) => LineShape::Tag { names, placement },
        (None, Some(name)) => {
            if !xref_names.is_empty() || !value_names.is_empty() {
                return Err(TokenError::FieldsOnStructure { structure: name });
            }
            LineShape::Structure { name }
        }
        (Some(_), Some(structure)) => return Err(TokenError::TagAndStructure { structure }),
        (None, None) => return Err(TokenError::NoTagOrStructure),
    };

    Ok(LineDescriptor { level, shape, xref_names, value_names, value_possibilities, min, max })
}

fn owned(names: Vec<&str>) -> Vec<String> {
    names.into_iter().map(str::to_owned).collect()
}

impl fmt::Display for LineDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.level == 0 { f.write_str("n")? } else { write!(f, "+{}", self.level)? }

        let possibilities = || {
            or_list(self.value_possibilities.iter().map(|value| {
                if value.is_empty() { format!("<{NULL}>") } else { value.clone() }
            }))
        };

        match &self.shape {
            LineShape::Tag { names, placement: TagPlacement::BeforeXref } => {
                write!(f, " {}", or_list(names.iter().cloned()))?;
                if !self.value_possibilities.is_empty() {
                    write!(f, " {}", possibilities())?;
                }
                if !self.xref_names.is_empty() {
                    write!(f, " {}", xrefs(&self.xref_names))?;
                }
            }
            LineShape::Tag { names, placement: TagPlacement::AfterXref } => {
                write!(f, " {} {}", xrefs(&self.xref_names), or_list(names.iter().cloned()))?;
                if !self.value_possibilities.is_empty() {
                    write!(f, " {}", possibilities())?;
                }
            }
            LineShape::Structure { name } => write!(f, " <<{name}>>")?,
        }

        if !self.value_names.is_empty() {
            write!(f, " {}", or_list(self.value_names.iter().map(|name| format!("<{name}>"))))?;
        }

        if self.max == 0 {
            write!(f, " {{{}:M}}", self.min)
        } else {
            write!(f, " {{{}:{}}}", self.min, self.max)
        }
    }
}

fn xrefs(names: &[String]) -> String {
    or_list(names.iter().map(|name| {
        if name == NULL { format!("<{NULL}>") } else { format!("@<{name}>@") }
    }))
}

fn or_list(items: impl Iterator<Item = String>) -> String {
    let items = items.collect::<Vec<_>>();
    if items.len() == 1 { items.concat() } else { format!("[{}]", items.join("|")) }
}

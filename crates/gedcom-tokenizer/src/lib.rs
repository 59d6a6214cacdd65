mod check;
mod cursor;
mod line;
mod normalize;
mod token;

#[cfg(test)]
mod tests;

pub use check::{FormatError, check_format};
pub use line::{LineDescriptor, LineShape, TagPlacement, TokenError, tokenize};
pub use normalize::{normalize, normalize_text};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Divider {
    Open,
    Or,
    Close,
}

/// What a normalized, non-empty grammar line is, judged by its shape alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass<'a> {
    StructureName(&'a str),
    Divider(Divider),
    Content,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassError {
    #[error("invalid structure name line `{line}`, names use `A-Z` and `_` and end with `:=`")]
    StructureName { line: String },
    #[error("unexpected text after variation divider in `{line}`")]
    Divider { line: String },
}

pub fn classify_line(line: &str) -> Result<LineClass<'_>, ClassError> {
    if let Some(name) = line.strip_suffix(":=") {
        let valid = !name.is_empty() && name.chars().all(|ch| ch.is_ascii_uppercase() || ch == '_');
        return if valid {
            Ok(LineClass::StructureName(name))
        } else {
            Err(ClassError::StructureName { line: line.to_owned() })
        };
    }

    let divider = match line.chars().next() {
        Some('[') => Divider::Open,
        Some('|') => Divider::Or,
        Some(']') => Divider::Close,
        _ => return Ok(LineClass::Content),
    };

    if line.len() == 1 {
        Ok(LineClass::Divider(divider))
    } else {
        Err(ClassError::Divider { line: line.to_owned() })
    }
}

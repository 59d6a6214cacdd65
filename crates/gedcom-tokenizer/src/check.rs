use crate::cursor::Cursor;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("line must start with `n` or `+<1-99>` followed by a space")]
    Index,
    #[error("line has no well-formed `{{min:max}}` quantifier")]
    MissingCardinality,
    #[error("missing space after `{fragment}`")]
    SpacingAfter { fragment: String },
    #[error("missing space before `{fragment}`")]
    SpacingBefore { fragment: String },
}

/// Sanity checks on a normalized content line, run before tokenization.
pub fn check_format(line: &str) -> Result<(), FormatError> {
    if split_index(line).is_none() {
        return Err(FormatError::Index);
    }

    if !has_cardinality(line) {
        return Err(FormatError::MissingCardinality);
    }

    let chars: Vec<(usize, char)> = line.char_indices().collect();
    for pair in chars.windows(2) {
        let (at, current) = pair[0];
        let (next_at, next) = pair[1];

        if matches!(current, '>' | '@' | ']')
            && !matches!(next, ' ' | '<' | '>' | '@' | ']' | '|')
        {
            return Err(FormatError::SpacingAfter { fragment: word_at(line, at).to_owned() });
        }

        if !matches!(current, ' ' | '<' | '>' | '@' | '[' | '|')
            && matches!(next, '<' | '@' | '[' | '{')
        {
            return Err(FormatError::SpacingBefore { fragment: word_at(line, next_at).to_owned() });
        }
    }

    Ok(())
}

/// Splits `+2 VERS <V> {0:1}` into level `2` and the remaining content.
pub(crate) fn split_index(line: &str) -> Option<(u8, &str)> {
    let mut cursor = Cursor::new(line);

    let level = if cursor.eat('n') {
        0
    } else if cursor.eat('+') {
        let digits = cursor.advance_while(|ch| ch.is_ascii_digit());
        if digits.is_empty() || digits.len() > 2 || digits.starts_with('0') {
            return None;
        }
        digits.parse().ok()?
    } else {
        return None;
    };

    if !cursor.eat(' ') || cursor.is_eof() {
        return None;
    }

    Some((level, cursor.rest()))
}

fn has_cardinality(line: &str) -> bool {
    line.match_indices('{').any(|(at, _)| {
        let mut cursor = Cursor::new(&line[at + 1..]);
        !cursor.advance_while(|ch| ch.is_ascii_digit()).is_empty()
            && cursor.eat(':')
            && (cursor.eat('M') || !cursor.advance_while(|ch| ch.is_ascii_digit()).is_empty())
            && cursor.eat('}')
    })
}

fn word_at(line: &str, at: usize) -> &str {
    let start = line[..at].rfind(' ').map_or(0, |space| space + 1);
    let end = line[at..].find(' ').map_or(line.len(), |space| at + space);
    &line[start..end]
}

use crate::cursor::Cursor;

pub(crate) const NULL: &str = "NULL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    Xref(Vec<&'a str>),
    Cardinality { min: u32, max: Option<u32> },
    Structure(&'a str),
    Value(Vec<&'a str>),
    Tag(Vec<&'a str>),
    /// Bare words mixed with `<NULL>`, e.g. `[Y|<NULL>]`. `None` stands for `<NULL>`.
    Choice(Vec<Option<&'a str>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Item<'a> {
    Xref(&'a str),
    Field(&'a str),
    Word(&'a str),
}

pub(crate) fn classify(word: &str) -> Option<Token<'_>> {
    match word.chars().next()? {
        '{' => cardinality(word),
        '[' => or_list(word.strip_prefix('[')?.strip_suffix(']')?),
        '<' if word.starts_with("<<") => {
            let name = word.strip_prefix("<<")?.strip_suffix(">>")?;
            is_name(name).then_some(Token::Structure(name))
        }
        _ => match item(word)? {
            Item::Xref(name) => Some(Token::Xref(vec![name])),
            Item::Field(name) => Some(Token::Value(vec![name])),
            Item::Word(tag) => is_tag(tag).then(|| Token::Tag(vec![tag])),
        },
    }
}

fn item(word: &str) -> Option<Item<'_>> {
    if let Some(inner) = word.strip_prefix("@<") {
        let name = inner.strip_suffix(">@")?;
        return is_name(name).then_some(Item::Xref(name));
    }

    if let Some(inner) = word.strip_prefix('<') {
        let name = inner.strip_suffix('>')?;
        return is_name(name).then_some(Item::Field(name));
    }

    let is_word =
        !word.is_empty() && word.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_');
    is_word.then_some(Item::Word(word))
}

fn or_list(inner: &str) -> Option<Token<'_>> {
    let items = inner.split('|').map(item).collect::<Option<Vec<_>>>()?;

    let is_null = |it: &Item<'_>| matches!(it, Item::Field(name) if *name == NULL);

    if items.iter().any(|it| matches!(it, Item::Xref(_))) {
        return items
            .iter()
            .map(|it| match it {
                Item::Xref(name) => Some(*name),
                Item::Field(_) if is_null(it) => Some(NULL),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .map(Token::Xref);
    }

    if items.iter().all(|it| matches!(it, Item::Field(_))) {
        let names = items.iter().filter_map(|it| match it {
            Item::Field(name) => Some(*name),
            _ => None,
        });
        return Some(Token::Value(names.collect()));
    }

    if items.iter().all(|it| matches!(it, Item::Word(word) if is_tag(word))) {
        let tags = items.iter().filter_map(|it| match it {
            Item::Word(word) => Some(*word),
            _ => None,
        });
        return Some(Token::Tag(tags.collect()));
    }

    items
        .iter()
        .map(|it| match it {
            Item::Word(word) => Some(Some(*word)),
            Item::Field(_) if is_null(it) => Some(None),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()
        .map(Token::Choice)
}

fn cardinality(word: &str) -> Option<Token<'_>> {
    let mut cursor = Cursor::new(word);
    cursor.eat('{');
    let min = cursor.advance_while(|ch| ch.is_ascii_digit()).parse().ok()?;
    if !cursor.eat(':') {
        return None;
    }
    let max = if cursor.eat('M') {
        None
    } else {
        Some(cursor.advance_while(|ch| ch.is_ascii_digit()).parse().ok()?)
    };
    if !cursor.eat('}') {
        return None;
    }
    cursor.eat('*');
    cursor.is_eof().then_some(Token::Cardinality { min, max })
}

pub(crate) fn is_tag(word: &str) -> bool {
    let word = word.strip_prefix('_').unwrap_or(word);
    word.starts_with(|ch: char| ch.is_ascii_uppercase())
        && word.chars().all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit() || ch == '_')
}

fn is_name(name: &str) -> bool {
    !name.is_empty()
        && name.chars().all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | ':' | '-'))
}

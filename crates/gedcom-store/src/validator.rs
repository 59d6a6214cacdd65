use crate::StoreLine;

/// The line a candidate value or xref is checked for.
#[derive(Debug, Clone, Copy)]
pub struct FieldContext<'a> {
    pub tag: &'a str,
    pub line: &'a StoreLine,
}

/// Consulted before a value or xref is committed to a tag node. Called once per
/// declared field name until one call returns `true`.
pub trait Validator {
    fn validate_value(&self, context: FieldContext<'_>, field: &str, value: &str) -> bool;

    fn validate_xref(&self, context: FieldContext<'_>, field: &str, xref: &str) -> bool;
}

/// Keeps a rendered line within the 255 character GEDCOM line limit and
/// restricts candidates to ASCII letters, digits, `_` and spaces.
#[derive(Debug, Clone, Copy, Default)]
pub struct LengthValidator;

impl LengthValidator {
    pub const MAX_LINE_LENGTH: usize = 255;

    fn accepts(tag: &str, candidate: &str) -> bool {
        tag.len() + 3 + candidate.len() <= Self::MAX_LINE_LENGTH
            && candidate.chars().all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | ' '))
    }
}

impl Validator for LengthValidator {
    fn validate_value(&self, context: FieldContext<'_>, _field: &str, value: &str) -> bool {
        Self::accepts(context.tag, value)
    }

    fn validate_xref(&self, context: FieldContext<'_>, _field: &str, xref: &str) -> bool {
        Self::accepts(context.tag, xref)
    }
}

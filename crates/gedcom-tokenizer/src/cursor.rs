use std::str::Chars;

pub(crate) const EOF_CHAR: char = '\0';

pub(crate) struct Cursor<'a> {
    text: &'a str,
    chars: Chars<'a>,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self { text, chars: text.chars() }
    }

    pub(crate) fn offset(&self) -> usize {
        self.text.len() - self.chars.as_str().len()
    }

    pub(crate) fn rest(&self) -> &'a str {
        self.chars.as_str()
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.chars.as_str().is_empty()
    }

    pub(crate) fn peek(&self) -> char {
        self.chars.clone().next().unwrap_or(EOF_CHAR)
    }

    pub(crate) fn second(&self) -> char {
        let mut chars = self.chars.clone();
        chars.next();
        chars.next().unwrap_or(EOF_CHAR)
    }

    pub(crate) fn advance(&mut self) -> char {
        self.chars.next().unwrap_or(EOF_CHAR)
    }

    pub(crate) fn eat(&mut self, ch: char) -> bool {
        if self.peek() == ch && !self.is_eof() {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn eat_str(&mut self, prefix: &str) -> bool {
        if self.rest().starts_with(prefix) {
            self.chars = self.chars.as_str()[prefix.len()..].chars();
            true
        } else {
            false
        }
    }

    pub(crate) fn advance_while(&mut self, f: impl Fn(char) -> bool + Copy) -> &'a str {
        let start = self.offset();
        while !self.is_eof() && f(self.peek()) {
            self.advance();
        }
        &self.text[start..self.offset()]
    }
}

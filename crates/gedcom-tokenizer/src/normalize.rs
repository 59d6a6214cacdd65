use crate::cursor::Cursor;

/// Strips `/* .. */` comments, trims the line, collapses whitespace runs to a
/// single space and removes the spaces inside OR-groups, so that
/// `n [ ANUL | CENS ]  {1:1}` becomes `n [ANUL|CENS] {1:1}`.
pub fn normalize(raw: &str) -> String {
    let mut cursor = Cursor::new(raw);
    let mut line = String::with_capacity(raw.len());
    let mut pending_space = false;

    while !cursor.is_eof() {
        match cursor.peek() {
            '/' if cursor.second() == '*' => {
                cursor.eat_str("/*");
                skip_comment(&mut cursor);
                pending_space = true;
            }
            ch if ch.is_whitespace() => {
                cursor.advance_while(char::is_whitespace);
                pending_space = true;
            }
            ch => {
                cursor.advance();
                if pending_space
                    && !line.is_empty()
                    && !matches!(ch, '|' | ']')
                    && !line.ends_with(['|', '['])
                {
                    line.push(' ');
                }
                pending_space = false;
                line.push(ch);
            }
        }
    }

    line
}

/// Like [`normalize`] but keeps OR-group characters untouched. Used for header
/// values, which are free text.
pub fn normalize_text(raw: &str) -> String {
    let mut cursor = Cursor::new(raw);
    let mut line = String::with_capacity(raw.len());

    while !cursor.is_eof() {
        match cursor.peek() {
            '/' if cursor.second() == '*' => {
                cursor.eat_str("/*");
                skip_comment(&mut cursor);
                if !line.is_empty() && !line.ends_with(' ') {
                    line.push(' ');
                }
            }
            ch if ch.is_whitespace() => {
                cursor.advance_while(char::is_whitespace);
                if !line.is_empty() && !line.ends_with(' ') {
                    line.push(' ');
                }
            }
            ch => {
                cursor.advance();
                line.push(ch);
            }
        }
    }

    line.truncate(line.trim_end().len());
    line
}

// An unterminated comment runs to the end of the line.
fn skip_comment(cursor: &mut Cursor<'_>) {
    while !cursor.is_eof() {
        if cursor.eat_str("*/") {
            return;
        }
        cursor.advance();
    }
}

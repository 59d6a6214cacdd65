use std::fmt::Display;

pub use annotate_snippets::Renderer;
use annotate_snippets::{Level, Snippet};
pub use text_size::TextRange;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    message: String,
    range: TextRange,
    label: &'static str,
    notes: Vec<String>,
}

impl Diagnostic {
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn error(message: impl Into<String>, range: TextRange) -> Self {
        Self { message: message.into(), range, label: "here", notes: Vec::new() }
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn with_label(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    /// Adds a `note:` footer below the snippet.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn render<'a>(
        &'a self,
        renderer: &'a Renderer,
        path: &'a str,
        text: &'a str,
    ) -> impl Display + 'a {
        let message = Level::Error
            .title(&self.message)
            .snippet(
                Snippet::source(text)
                    .origin(path)
                    .annotation(Level::Error.span(self.range.into()).label(self.label))
                    .fold(true),
            )
            .footers(self.notes.iter().map(|note| Level::Note.title(note)));
        renderer.render(message)
    }
}

#[cfg(test)]
mod tests {
    use text_size::TextSize;

    use super::*;

    #[test]
    fn renders_snippet_with_origin() {
        let text = "VERSION=5.5.1\nHEAD:=\nn HEAD{1:1}\n";
        let start = TextSize::from(21);
        let range = TextRange::at(start, 11.into());
        let diagnostic = Diagnostic::error("missing space before `{`", range)
            .with_note("quantifiers are separated from the line by a space");

        let rendered = diagnostic.render(&Renderer::plain(), "lineage.gedg", text).to_string();

        assert!(rendered.contains("error: missing space before `{`"), "{rendered}");
        assert!(rendered.contains("lineage.gedg"), "{rendered}");
        assert!(rendered.contains("n HEAD{1:1}"), "{rendered}");
        assert!(rendered.contains("note: quantifiers are separated"), "{rendered}");
        assert_eq!(diagnostic.notes().len(), 1);
    }
}

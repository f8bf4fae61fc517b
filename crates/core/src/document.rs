//! Text documents and their derived syntax trees.

use crate::model::{DocumentId, Position, Range};
use crate::syntax::{self, LineIndex, ParseError, Span, SyntaxNode};

/// A text edit as sent by editors. `range: None` replaces the whole text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChange {
    pub range: Option<Range>,
    pub text: String,
}

impl TextChange {
    pub fn full(text: impl Into<String>) -> Self {
        Self {
            range: None,
            text: text.into(),
        }
    }

    pub fn replace(range: Range, text: impl Into<String>) -> Self {
        Self {
            range: Some(range),
            text: text.into(),
        }
    }
}

/// One version of a document: its text, line table and parse result.
///
/// Everything derived is computed once in [`Document::new`]; a new version
/// is a new `Document`.
#[derive(Debug, Clone)]
pub struct Document {
    id: DocumentId,
    version: i32,
    text: String,
    line_index: LineIndex,
    tree: Result<SyntaxNode, ParseError>,
}

impl Document {
    pub fn new(id: DocumentId, version: i32, text: String) -> Self {
        let line_index = LineIndex::new(&text);
        let tree = syntax::parse(&text);
        Self {
            id,
            version,
            text,
            line_index,
            tree,
        }
    }

    /// Decode raw file contents. Invalid UTF-8 is replaced rather than
    /// rejected and a leading byte order mark is dropped.
    pub fn from_bytes(id: DocumentId, version: i32, bytes: &[u8]) -> Self {
        let text = String::from_utf8_lossy(bytes);
        let text = text.strip_prefix('\u{feff}').unwrap_or(&*text).to_string();
        Self::new(id, version, text)
    }

    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tree(&self) -> Result<&SyntaxNode, &ParseError> {
        self.tree.as_ref()
    }

    pub fn position_at(&self, offset: usize) -> Position {
        self.line_index.position_at(&self.text, offset)
    }

    pub fn offset_at(&self, position: Position) -> usize {
        self.line_index.offset_at(&self.text, position)
    }

    pub fn range_of(&self, span: Span) -> Range {
        Range::new(self.position_at(span.start), self.position_at(span.end))
    }

    /// Apply edits in order and produce the next version.
    pub fn apply_changes(&self, version: i32, changes: &[TextChange]) -> Document {
        let mut text = self.text.clone();
        for change in changes {
            match change.range {
                Some(range) => {
                    let index = LineIndex::new(&text);
                    let start = index.offset_at(&text, range.start);
                    let end = index.offset_at(&text, range.end).max(start);
                    text.replace_range(start..end, &change.text);
                }
                None => text = change.text.clone(),
            }
        }
        Document::new(self.id.clone(), version, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> DocumentId {
        DocumentId::parse("file:///mod/items.json").unwrap()
    }

    #[test]
    fn from_bytes_strips_bom() {
        let doc = Document::from_bytes(id(), 0, "\u{feff}[\"a\"]".as_bytes());
        assert_eq!(doc.text(), "[\"a\"]");
        assert!(doc.tree().is_ok());
    }

    #[test]
    fn malformed_text_keeps_error() {
        let doc = Document::new(id(), 1, "[{".to_string());
        assert!(doc.tree().is_err());
        assert_eq!(doc.version(), 1);
    }

    #[test]
    fn incremental_changes_apply_in_order() {
        let doc = Document::new(id(), 1, "[\"knife\"]\n".to_string());
        let next = doc.apply_changes(
            2,
            &[
                TextChange::replace(
                    Range::new(Position::new(0, 2), Position::new(0, 7)),
                    "spoon",
                ),
                TextChange::replace(
                    Range::new(Position::new(0, 8), Position::new(0, 8)),
                    ", \"fork\"",
                ),
            ],
        );
        assert_eq!(next.text(), "[\"spoon\", \"fork\"]\n");
        assert_eq!(next.version(), 2);
        assert!(next.tree().is_ok());
    }

    #[test]
    fn full_change_replaces_text() {
        let doc = Document::new(id(), 1, "[]".to_string());
        let next = doc.apply_changes(5, &[TextChange::full("{}")]);
        assert_eq!(next.text(), "{}");
    }

    #[test]
    fn range_of_span_uses_current_text() {
        let doc = Document::new(id(), 1, "[\n  \"a\"\n]".to_string());
        let range = doc.range_of(Span::new(4, 7));
        assert_eq!(range, Range::new(Position::new(1, 2), Position::new(1, 5)));
    }
}

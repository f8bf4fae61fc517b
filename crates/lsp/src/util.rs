use cdda_lsp_core::document::TextChange;
use cdda_lsp_core::{ChangeKind, DocumentId, FileChange, Location, Position, Range};
use tower_lsp::lsp_types;

pub fn to_core_position(position: lsp_types::Position) -> Position {
    Position::new(position.line, position.character)
}

pub fn to_core_range(range: lsp_types::Range) -> Range {
    Range::new(to_core_position(range.start), to_core_position(range.end))
}

pub fn to_lsp_range(range: Range) -> lsp_types::Range {
    lsp_types::Range {
        start: lsp_types::Position::new(range.start.line, range.start.character),
        end: lsp_types::Position::new(range.end.line, range.end.character),
    }
}

pub fn to_lsp_location(location: Location) -> lsp_types::Location {
    lsp_types::Location {
        uri: location.document.url().clone(),
        range: to_lsp_range(location.range),
    }
}

pub fn to_text_change(change: lsp_types::TextDocumentContentChangeEvent) -> TextChange {
    TextChange {
        range: change.range.map(to_core_range),
        text: change.text,
    }
}

pub fn to_file_change(event: lsp_types::FileEvent) -> Option<FileChange> {
    let kind = match event.typ {
        lsp_types::FileChangeType::CREATED => ChangeKind::Created,
        lsp_types::FileChangeType::CHANGED => ChangeKind::Modified,
        lsp_types::FileChangeType::DELETED => ChangeKind::Deleted,
        _ => return None,
    };
    Some(FileChange::new(DocumentId::new(event.uri), kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_lsp::lsp_types::{FileChangeType, FileEvent, Url};

    #[test]
    fn file_events_map_to_change_kinds() {
        let uri = Url::parse("file:///mod/items.json").unwrap();
        let change = to_file_change(FileEvent::new(uri.clone(), FileChangeType::DELETED)).unwrap();
        assert_eq!(change.kind, ChangeKind::Deleted);
        assert_eq!(change.id.url(), &uri);

        let change = to_file_change(FileEvent::new(uri, FileChangeType::CREATED)).unwrap();
        assert_eq!(change.kind, ChangeKind::Created);
    }

    #[test]
    fn ranges_convert_both_ways() {
        let lsp = lsp_types::Range {
            start: lsp_types::Position::new(3, 7),
            end: lsp_types::Position::new(4, 0),
        };
        assert_eq!(to_lsp_range(to_core_range(lsp)), lsp);
    }

    #[test]
    fn content_change_without_range_is_full() {
        let change = to_text_change(lsp_types::TextDocumentContentChangeEvent {
            range: None,
            range_length: None,
            text: "[]".to_string(),
        });
        assert_eq!(change, TextChange::full("[]"));
    }
}

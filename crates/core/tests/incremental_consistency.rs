mod common;

use cdda_lsp_core::coordinator::IndexOutcome;
use cdda_lsp_core::document::TextChange;
use cdda_lsp_core::{ChangeKind, EngineConfig, FileChange, IndexEngine, Position, Range};
use common::{MemoryHost, position_of};
use std::sync::Arc;
use std::time::Duration;

async fn indexed_engine(host: &Arc<MemoryHost>) -> IndexEngine {
    host.write("modinfo.json", r#"[{"type":"MOD_INFO","name":"Core"}]"#);
    let engine = IndexEngine::new(host.clone(), EngineConfig::default());
    engine.index_workspace().await;
    engine
}

fn snapshot(engine: &IndexEngine, value: &str) -> (usize, usize) {
    (
        engine.store().definitions_of(value).len(),
        engine.store().references_of(value).len(),
    )
}

#[tokio::test]
async fn created_modified_deleted() {
    let host = Arc::new(MemoryHost::new());
    let engine = indexed_engine(&host).await;

    let id = host.write("new.json", r#"[{"id":"fresh","type":"ITEM"}]"#);
    let outcome = engine
        .on_document_changed(FileChange::new(id.clone(), ChangeKind::Created))
        .await;
    assert!(matches!(outcome, Some(IndexOutcome::Indexed)));
    assert_eq!(snapshot(&engine, "fresh"), (1, 1));

    host.write("new.json", r#"[{"id":"renamed","type":"ITEM","of":"fresh"}]"#);
    engine
        .on_document_changed(FileChange::new(id.clone(), ChangeKind::Modified))
        .await;
    assert_eq!(snapshot(&engine, "fresh"), (0, 1));
    assert_eq!(snapshot(&engine, "renamed"), (1, 1));

    host.delete("new.json");
    engine
        .on_document_changed(FileChange::new(id.clone(), ChangeKind::Deleted))
        .await;
    assert_eq!(snapshot(&engine, "fresh"), (0, 0));
    assert_eq!(snapshot(&engine, "renamed"), (0, 0));
    assert!(!engine.store().contains(&id));
}

#[tokio::test]
async fn unchanged_text_reindexes_to_the_same_entry() {
    let host = Arc::new(MemoryHost::new());
    let id = host.write("a.json", "[\n {\"id\": \"a\", \"type\": \"T\", \"x\": [\"a\", \"b\"]}\n]");
    let engine = indexed_engine(&host).await;
    let before = engine.store().get(&id).unwrap();

    engine
        .on_document_changed(FileChange::new(id.clone(), ChangeKind::Modified))
        .await;
    let after = engine.store().get(&id).unwrap();
    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(*before, *after);
}

#[tokio::test]
async fn malformed_change_keeps_stale_entry() {
    let host = Arc::new(MemoryHost::new());
    let id = host.write("a.json", r#"[{"id":"a","type":"T"}]"#);
    let engine = indexed_engine(&host).await;
    let before = engine.store().get(&id).unwrap();

    host.write("a.json", r#"[{"id":"b","type":"T""#);
    let outcome = engine
        .on_document_changed(FileChange::new(id.clone(), ChangeKind::Modified))
        .await;
    assert!(matches!(outcome, Some(IndexOutcome::Failed(_))));
    assert!(Arc::ptr_eq(&before, &engine.store().get(&id).unwrap()));
    assert_eq!(snapshot(&engine, "a"), (1, 1));
    assert_eq!(snapshot(&engine, "b"), (0, 0));
}

#[tokio::test]
async fn deleting_an_unreadable_change_target_still_removes() {
    let host = Arc::new(MemoryHost::new());
    let id = host.write("a.json", r#"[{"id":"a","type":"T"}]"#);
    let engine = indexed_engine(&host).await;

    host.delete("a.json");
    let outcome = engine
        .on_document_changed(FileChange::new(id.clone(), ChangeKind::Modified))
        .await;
    assert!(matches!(outcome, Some(IndexOutcome::Failed(_))));
    assert_eq!(snapshot(&engine, "a"), (1, 1));

    engine
        .on_document_changed(FileChange::new(id.clone(), ChangeKind::Deleted))
        .await;
    assert_eq!(snapshot(&engine, "a"), (0, 0));
}

#[tokio::test]
async fn listener_sequences_delete_after_change() {
    let host = Arc::new(MemoryHost::new());
    let engine = indexed_engine(&host).await;
    let tx = engine.spawn_change_listener();

    let id = host.write("late.json", r#"[{"id":"late","type":"T"}]"#);
    tx.send(FileChange::new(id.clone(), ChangeKind::Created)).unwrap();
    tx.send(FileChange::new(id.clone(), ChangeKind::Deleted)).unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!engine.store().contains(&id));
    assert_eq!(snapshot(&engine, "late"), (0, 0));

    tx.send(FileChange::new(id.clone(), ChangeKind::Created)).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(snapshot(&engine, "late"), (1, 1));
    engine.shutdown();
}

#[tokio::test]
async fn open_document_edits_drive_queries() {
    let host = Arc::new(MemoryHost::new());
    let items = r#"[{"id":"knife","type":"ITEM"},{"id":"spoon","type":"ITEM"}]"#;
    host.write("items.json", items);
    let engine = indexed_engine(&host).await;

    let text = r#"[{"id":"use","type":"RECIPE","tool":"knife"}]"#;
    let id = host.write("use.json", text);
    engine.open_document(id.clone(), 1, text.to_string());
    let at = position_of(text, "knife", 0);
    assert_eq!(engine.definition_query(&id, at).unwrap().len(), 1);

    // Replace `knife` with `spoon` in the editor buffer only.
    let start = text.find("knife").unwrap() as u32;
    engine
        .change_document(
            &id,
            2,
            &[TextChange::replace(
                Range::new(Position::new(0, start), Position::new(0, start + 5)),
                "spoon",
            )],
        )
        .unwrap();
    let defs = engine.definition_query(&id, at).unwrap();
    assert_eq!(defs.len(), 1);
    let spoon = items.find(r#"{"id":"spoon""#).unwrap() as u32;
    assert_eq!(defs[0].range.start, Position::new(0, spoon));
    assert_eq!(engine.document(&id).unwrap().version(), 2);

    engine.close_document(&id);
    assert!(engine.definition_query(&id, at).is_err());
}

#[cfg(unix)]
#[tokio::test]
async fn symlinked_workspace_changes_hit_the_indexed_entry() {
    let dir = tempfile::tempdir().unwrap();
    let real = dir.path().join("real");
    let link = dir.path().join("link");
    std::fs::create_dir_all(&real).unwrap();
    std::fs::write(real.join("modinfo.json"), r#"[{"type":"MOD_INFO","name":"Core"}]"#).unwrap();
    std::fs::write(real.join("a.json"), r#"[{"id":"a","type":"T"}]"#).unwrap();
    std::os::unix::fs::symlink(&real, &link).unwrap();

    let engine = IndexEngine::local(link.clone(), EngineConfig::default());
    engine.index_workspace().await;
    assert_eq!(snapshot(&engine, "a"), (1, 1));

    // The editor reports paths under the directory it opened.
    let id = cdda_lsp_core::DocumentId::from_file_path(&link.join("a.json")).unwrap();
    engine
        .on_document_changed(FileChange::new(id.clone(), ChangeKind::Modified))
        .await;
    assert_eq!(snapshot(&engine, "a"), (1, 1));
    assert_eq!(engine.stats().documents, 2);

    std::fs::remove_file(real.join("a.json")).unwrap();
    engine
        .on_document_changed(FileChange::new(id, ChangeKind::Deleted))
        .await;
    assert_eq!(snapshot(&engine, "a"), (0, 0));
}

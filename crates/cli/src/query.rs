use crate::PositionArgs;
use cdda_lsp_core::host::absolute_path;
use cdda_lsp_core::{DocumentId, IndexEngine, Position};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Definition,
    References,
}

/// Index the workspace, then answer one query at a cursor and print each
/// location as `path:line:column`.
pub async fn run(args: PositionArgs, kind: QueryKind) -> Result<(), Box<dyn std::error::Error>> {
    let file = absolute_path(&args.file);
    let id = DocumentId::from_file_path(&file)?;
    let engine = IndexEngine::local(args.root.clone(), args.discovery.config());

    let report = engine.index_workspace().await;
    info!(
        "Indexed {} documents from {} mods",
        report.documents.indexed,
        report.mods.len()
    );

    engine.load_document(&id).await?;

    let position = Position::new(args.line.saturating_sub(1), args.column.saturating_sub(1));
    let locations = match kind {
        QueryKind::Definition => engine.definition_query(&id, position)?,
        QueryKind::References => engine.references_query(&id, position)?,
    };

    if locations.is_empty() {
        info!("No results at {}:{}:{}", file.display(), args.line, args.column);
    }
    for location in locations {
        println!("{}", location);
    }

    Ok(())
}

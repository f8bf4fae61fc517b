use cdda_lsp_core::watch::spawn_fs_watcher;
use cdda_lsp_core::{EngineConfig, IndexEngine};
use std::path::PathBuf;
use tracing::info;

pub async fn run(path: PathBuf, config: EngineConfig) -> Result<(), Box<dyn std::error::Error>> {
    let engine = IndexEngine::local(path.clone(), config);

    info!("Initializing: Indexing workspace at: {}...", path.display());
    let report = engine.index_workspace().await;
    info!(
        "Initial indexing complete: {} mods, {} documents.",
        report.mods.len(),
        report.documents.indexed
    );

    let changes = engine.spawn_change_listener();
    spawn_fs_watcher(
        engine.host().root().to_path_buf(),
        &engine.config().exclude,
        changes,
        engine.cancel_token().child_token(),
    )?;
    info!("File watcher started. Ready for changes.");
    info!("Press Ctrl+C to stop.");

    tokio::signal::ctrl_c().await?;
    engine.shutdown();

    let stats = engine.stats();
    info!(
        "Watcher stopped with {} documents, {} definitions, {} references.",
        stats.documents, stats.definitions, stats.references
    );

    Ok(())
}

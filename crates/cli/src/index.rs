use cdda_lsp_core::{EngineConfig, IndexEngine};
use std::path::PathBuf;
use tracing::info;

pub async fn run(path: PathBuf, config: EngineConfig) -> Result<(), Box<dyn std::error::Error>> {
    let engine = IndexEngine::local(path.clone(), config);

    info!("Indexing workspace at: {}...", path.display());
    let report = engine.index_workspace().await;
    let stats = engine.stats();

    info!("Indexing complete in {:?}", report.elapsed);
    info!("Mods: {}", report.mods.len());
    for name in &report.mods {
        info!(" - {}", name);
    }
    if report.skipped_manifests > 0 {
        info!("Skipped manifests: {}", report.skipped_manifests);
    }
    info!(
        "Documents: {} indexed, {} failed",
        report.documents.indexed, report.documents.failed
    );
    info!("Definitions: {}", stats.definitions);
    info!("References: {}", stats.references);

    Ok(())
}

use cdda_lsp_core::IndexEngine;
use std::sync::Arc;
use tower_lsp::Client;
use tower_lsp::lsp_types::MessageType;

/// Index the whole workspace in the background, reporting to the client.
pub fn spawn_indexer(engine: Arc<IndexEngine>, client: Client) {
    tokio::spawn(async move {
        let root = engine.host().root().to_path_buf();
        client
            .log_message(
                MessageType::INFO,
                format!("Listing mod manifests under {}", root.display()),
            )
            .await;

        let report = engine.index_workspace().await;

        for name in &report.mods {
            client
                .log_message(MessageType::LOG, format!("Done reading mod {}", name))
                .await;
        }
        if report.skipped_manifests > 0 {
            client
                .log_message(
                    MessageType::WARNING,
                    format!(
                        "Skipped {} unreadable mod manifests, see the server log",
                        report.skipped_manifests
                    ),
                )
                .await;
        }

        let stats = engine.stats();
        client
            .log_message(
                MessageType::INFO,
                format!(
                    "Indexing complete in {:?}: {} mods, {} documents ({} failed), {} definitions",
                    report.elapsed,
                    report.mods.len(),
                    stats.documents,
                    report.documents.failed,
                    stats.definitions
                ),
            )
            .await;
    });
}

//! The engine facade: wires host, resolver, store, queries and change
//! handling together and owns the set of open documents.

use crate::config::EngineConfig;
use crate::coordinator::{BatchReport, ChangeCoordinator, IndexOutcome};
use crate::document::{Document, TextChange};
use crate::error::{CddaError, Result};
use crate::host::{LocalHost, WorkspaceHost};
use crate::model::{DocumentId, FileChange, Location, Position};
use crate::mods::ModResolver;
use crate::query::QueryEngine;
use crate::store::{IndexStats, IndexStore};
use dashmap::DashMap;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Summary of a full workspace index.
#[derive(Debug, Clone, Default)]
pub struct IndexReport {
    pub mods: Vec<String>,
    pub skipped_manifests: usize,
    pub documents: BatchReport,
    pub elapsed: Duration,
}

pub struct IndexEngine {
    config: EngineConfig,
    host: Arc<dyn WorkspaceHost>,
    store: Arc<IndexStore>,
    resolver: ModResolver,
    coordinator: Arc<ChangeCoordinator>,
    query: QueryEngine,
    documents: DashMap<DocumentId, Arc<Document>>,
    cancel_token: CancellationToken,
}

impl IndexEngine {
    pub fn new(host: Arc<dyn WorkspaceHost>, config: EngineConfig) -> Self {
        let store = Arc::new(IndexStore::new());
        Self {
            resolver: ModResolver::new(host.clone(), config.clone()),
            coordinator: Arc::new(ChangeCoordinator::new(host.clone(), store.clone())),
            query: QueryEngine::new(store.clone()),
            documents: DashMap::new(),
            cancel_token: CancellationToken::new(),
            config,
            host,
            store,
        }
    }

    /// Engine over the local file system rooted at `root`.
    pub fn local(root: PathBuf, config: EngineConfig) -> Self {
        let host = LocalHost::new(root).with_exclude(config.exclude.clone());
        Self::new(Arc::new(host), config)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn host(&self) -> &Arc<dyn WorkspaceHost> {
        &self.host
    }

    pub fn store(&self) -> &Arc<IndexStore> {
        &self.store
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel_token
    }

    /// Discover every mod and index its documents, one mod at a time.
    ///
    /// Never fails: broken manifests and documents are logged and counted,
    /// and an unreadable workspace leaves the index empty.
    pub async fn index_workspace(&self) -> IndexReport {
        let start = Instant::now();
        let mut report = IndexReport::default();
        let mut seen = HashSet::new();

        info!("Listing mod manifests under {}", self.host.root().display());
        let manifests = match self.resolver.manifests().await {
            Ok(manifests) => manifests,
            Err(e) => {
                warn!("Failed to list manifests: {}", e);
                report.elapsed = start.elapsed();
                return report;
            }
        };

        for manifest in manifests {
            let resolved = async {
                let descriptor = self.resolver.resolve_manifest(&manifest).await?;
                let documents = self.resolver.documents(&descriptor).await?;
                Ok::<_, CddaError>((descriptor, documents))
            }
            .await;

            let (descriptor, documents) = match resolved {
                Ok(resolved) => resolved,
                Err(e) => {
                    warn!("Error reading mod info at {}: {}", manifest, e);
                    report.skipped_manifests += 1;
                    continue;
                }
            };

            let name = descriptor.display_name();
            let documents: Vec<_> = documents
                .into_iter()
                .filter(|id| seen.insert(id.clone()))
                .collect();
            info!("Reading mod {} ({} documents)", name, documents.len());
            let batch = self
                .coordinator
                .index_documents(documents, self.config.max_concurrent_reads)
                .await;
            info!(
                "Done reading mod {}: {} indexed, {} failed",
                name, batch.indexed, batch.failed
            );
            report.documents += batch;
            report.mods.push(name);
        }

        report.elapsed = start.elapsed();
        let stats = self.stats();
        info!(
            "Indexed {} mods in {:?}: {} documents, {} definitions, {} references",
            report.mods.len(),
            report.elapsed,
            stats.documents,
            stats.definitions,
            stats.references
        );
        report
    }

    /// Apply one lifecycle notification and wait for it to finish.
    pub async fn on_document_changed(&self, change: FileChange) -> Option<IndexOutcome> {
        self.coordinator.apply(change).await
    }

    /// Start a background task consuming change notifications. The task
    /// stops with [`IndexEngine::shutdown`] or when every sender is dropped.
    pub fn spawn_change_listener(&self) -> mpsc::UnboundedSender<FileChange> {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(
            self.coordinator
                .clone()
                .run(rx, self.cancel_token.child_token()),
        );
        tx
    }

    pub fn open_document(&self, id: DocumentId, version: i32, text: String) {
        let doc = Document::new(id.clone(), version, text);
        self.documents.insert(id, Arc::new(doc));
    }

    /// Open a document with its on-disk content, as the CLI does for the
    /// file it queries.
    pub async fn load_document(&self, id: &DocumentId) -> Result<Arc<Document>> {
        let bytes = self.host.read_file(id).await?;
        let doc = Arc::new(Document::from_bytes(id.clone(), 0, &bytes));
        self.documents.insert(id.clone(), doc.clone());
        Ok(doc)
    }

    pub fn change_document(
        &self,
        id: &DocumentId,
        version: i32,
        changes: &[TextChange],
    ) -> Result<()> {
        let mut entry = self
            .documents
            .get_mut(id)
            .ok_or_else(|| CddaError::DocumentNotOpen(id.to_string()))?;
        let next = entry.apply_changes(version, changes);
        *entry = Arc::new(next);
        Ok(())
    }

    pub fn close_document(&self, id: &DocumentId) {
        self.documents.remove(id);
    }

    pub fn document(&self, id: &DocumentId) -> Option<Arc<Document>> {
        self.documents.get(id).map(|d| d.clone())
    }

    /// Definitions of the string under `position` in an open document.
    pub fn definition_query(&self, id: &DocumentId, position: Position) -> Result<Vec<Location>> {
        let doc = self
            .document(id)
            .ok_or_else(|| CddaError::DocumentNotOpen(id.to_string()))?;
        Ok(self.query.on_definition(&doc, position))
    }

    /// Every occurrence of the string under `position` in an open document.
    pub fn references_query(&self, id: &DocumentId, position: Position) -> Result<Vec<Location>> {
        let doc = self
            .document(id)
            .ok_or_else(|| CddaError::DocumentNotOpen(id.to_string()))?;
        Ok(self.query.on_references(&doc, position))
    }

    pub fn stats(&self) -> IndexStats {
        self.store.stats()
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}

//! Keeps the index in step with document lifecycle notifications.
//!
//! Per document the state is either unindexed (no entry) or indexed. A
//! created or modified notification re-reads, re-parses and re-indexes the
//! document and swaps the result in; a deleted notification drops the entry.
//! When the new text cannot be read or parsed the previous entry stays in
//! place: a stale index is more useful than none while the user is editing.

use crate::document::Document;
use crate::error::{CddaError, Result};
use crate::host::WorkspaceHost;
use crate::indexer::index_document;
use crate::model::{ChangeKind, DocumentId, FileChange};
use crate::store::{IndexStore, Ticket};
use futures::StreamExt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// What happened to one indexing request.
#[derive(Debug)]
pub enum IndexOutcome {
    /// The new index is installed.
    Indexed,
    /// A later change or a deletion claimed the document first.
    Superseded,
    /// Reading or parsing failed; any previous entry is untouched.
    Failed(CddaError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub indexed: usize,
    pub superseded: usize,
    pub failed: usize,
}

impl std::ops::AddAssign for BatchReport {
    fn add_assign(&mut self, other: BatchReport) {
        self.indexed += other.indexed;
        self.superseded += other.superseded;
        self.failed += other.failed;
    }
}

pub struct ChangeCoordinator {
    host: Arc<dyn WorkspaceHost>,
    store: Arc<IndexStore>,
}

impl ChangeCoordinator {
    pub fn new(host: Arc<dyn WorkspaceHost>, store: Arc<IndexStore>) -> Self {
        Self { host, store }
    }

    /// Read, parse and index one document, then install it.
    pub async fn index_document(&self, document: DocumentId) -> IndexOutcome {
        let ticket = self.store.begin(document);
        self.index_with_ticket(ticket).await
    }

    async fn index_with_ticket(&self, ticket: Ticket) -> IndexOutcome {
        let document = ticket.document().clone();
        match self.build(&document).await {
            Ok(index) => {
                if self.store.commit(ticket, index) {
                    IndexOutcome::Indexed
                } else {
                    debug!("Discarding superseded index of {}", document);
                    IndexOutcome::Superseded
                }
            }
            Err(e) => {
                warn!("Failed to index {}: {}", document, e);
                IndexOutcome::Failed(e)
            }
        }
    }

    async fn build(&self, document: &DocumentId) -> Result<crate::indexer::FileIndex> {
        let bytes = self.host.read_file(document).await?;
        // Nothing below suspends: the index is built and installed in one step.
        let doc = Document::from_bytes(document.clone(), 0, &bytes);
        Ok(index_document(&doc)?)
    }

    /// Index many documents concurrently.
    ///
    /// `limit` bounds how many reads are outstanding; `None` starts them all.
    pub async fn index_documents(
        &self,
        documents: Vec<DocumentId>,
        limit: Option<usize>,
    ) -> BatchReport {
        let indexed = AtomicUsize::new(0);
        let superseded = AtomicUsize::new(0);
        let failed = AtomicUsize::new(0);

        futures::stream::iter(documents)
            .for_each_concurrent(limit, |document| {
                let (indexed, superseded, failed) = (&indexed, &superseded, &failed);
                async move {
                    let counter = match self.index_document(document).await {
                        IndexOutcome::Indexed => indexed,
                        IndexOutcome::Superseded => superseded,
                        IndexOutcome::Failed(_) => failed,
                    };
                    counter.fetch_add(1, Ordering::Relaxed);
                }
            })
            .await;

        BatchReport {
            indexed: indexed.into_inner(),
            superseded: superseded.into_inner(),
            failed: failed.into_inner(),
        }
    }

    /// Handle one notification to completion.
    pub async fn apply(&self, change: FileChange) -> Option<IndexOutcome> {
        match change.kind {
            ChangeKind::Deleted => {
                if self.store.remove(&change.id) {
                    debug!("Removed {} from the index", change.id);
                }
                None
            }
            ChangeKind::Created | ChangeKind::Modified => {
                Some(self.index_document(change.id).await)
            }
        }
    }

    /// Consume a notification stream until it closes or `cancel` fires.
    ///
    /// Tickets are taken in arrival order before any read starts, so the last
    /// notification for a document decides its final state even when reads
    /// complete out of order.
    pub async fn run(
        self: Arc<Self>,
        mut changes: mpsc::UnboundedReceiver<FileChange>,
        cancel: CancellationToken,
    ) {
        info!("Change coordinator started");
        loop {
            let change = tokio::select! {
                _ = cancel.cancelled() => break,
                change = changes.recv() => match change {
                    Some(change) => change,
                    None => break,
                },
            };

            match change.kind {
                ChangeKind::Deleted => {
                    self.store.remove(&change.id);
                    debug!("Removed {} from the index", change.id);
                }
                ChangeKind::Created | ChangeKind::Modified => {
                    let ticket = self.store.begin(change.id);
                    let coordinator = Arc::clone(&self);
                    tokio::spawn(async move {
                        coordinator.index_with_ticket(ticket).await;
                    });
                }
            }
        }
        info!("Change coordinator stopped");
    }
}

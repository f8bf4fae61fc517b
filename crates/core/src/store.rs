//! The global index: one [`FileIndex`] per document.
//!
//! Writers either `put` directly or go through [`IndexStore::begin`] /
//! [`IndexStore::commit`]. Every document slot carries a generation; `begin`
//! moves it forward, `remove` drops the slot, and `commit` only installs a
//! result whose ticket still matches. A deletion or a newer change therefore always wins
//! over an indexing task that started before it.

use crate::indexer::{DefinitionEntry, FileIndex, ReferenceEntry};
use crate::model::DocumentId;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    index: Option<Arc<FileIndex>>,
}

/// Write permission for one document, valid until superseded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    document: DocumentId,
    generation: u64,
}

impl Ticket {
    pub fn document(&self) -> &DocumentId {
        &self.document
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndexStats {
    pub documents: usize,
    pub definitions: usize,
    pub references: usize,
}

#[derive(Debug, Default)]
pub struct IndexStore {
    entries: DashMap<DocumentId, Slot>,
    generation: AtomicU64,
}

impl IndexStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Claim the next write for `document`, invalidating older tickets.
    pub fn begin(&self, document: DocumentId) -> Ticket {
        let mut slot = self.entries.entry(document.clone()).or_default();
        let generation = self.next_generation();
        slot.generation = generation;
        drop(slot);
        Ticket {
            document,
            generation,
        }
    }

    /// Install `index` if `ticket` is still the latest for its document.
    pub fn commit(&self, ticket: Ticket, index: FileIndex) -> bool {
        match self.entries.get_mut(&ticket.document) {
            Some(mut slot) if slot.generation == ticket.generation => {
                slot.index = Some(Arc::new(index));
                true
            }
            _ => false,
        }
    }

    /// Replace (or insert) the entry for `document` unconditionally.
    pub fn put(&self, document: DocumentId, index: FileIndex) {
        let ticket = self.begin(document);
        self.commit(ticket, index);
    }

    /// Drop the entry for `document`. Returns whether it had one.
    ///
    /// The slot goes with it: generations are global, so a later `begin`
    /// starts above every outstanding ticket and those can never commit.
    pub fn remove(&self, document: &DocumentId) -> bool {
        self.entries
            .remove(document)
            .is_some_and(|(_, slot)| slot.index.is_some())
    }

    /// Forget everything. Outstanding tickets are invalidated.
    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn get(&self, document: &DocumentId) -> Option<Arc<FileIndex>> {
        self.entries.get(document).and_then(|slot| slot.index.clone())
    }

    pub fn contains(&self, document: &DocumentId) -> bool {
        self.get(document).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|slot| slot.index.is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the current entries, in document iteration order.
    fn snapshot(&self) -> Vec<Arc<FileIndex>> {
        self.entries
            .iter()
            .filter_map(|slot| slot.index.clone())
            .collect()
    }

    /// All definitions of `id` across documents.
    pub fn definitions_of(&self, id: &str) -> Vec<DefinitionEntry> {
        self.snapshot()
            .iter()
            .flat_map(|index| index.definitions(id).iter().cloned())
            .collect()
    }

    /// All string tokens equal to `value` across documents.
    pub fn references_of(&self, value: &str) -> Vec<ReferenceEntry> {
        self.snapshot()
            .iter()
            .flat_map(|index| index.references(value).iter().cloned())
            .collect()
    }

    pub fn documents(&self) -> Vec<DocumentId> {
        self.snapshot()
            .iter()
            .map(|index| index.document().clone())
            .collect()
    }

    pub fn stats(&self) -> IndexStats {
        self.snapshot()
            .iter()
            .fold(IndexStats::default(), |mut stats, index| {
                stats.documents += 1;
                stats.definitions += index.definition_count();
                stats.references += index.reference_count();
                stats
            })
    }
}

//! Point queries: definition and references of the string under the cursor.

use crate::document::Document;
use crate::indexer::{DefinitionEntry, ReferenceEntry};
use crate::model::{Location, Position};
use crate::store::IndexStore;
use crate::syntax::{self, Span, SyntaxNode};
use std::sync::Arc;
use tracing::debug;

/// The string token under a position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedString {
    pub span: Span,
    pub text: String,
}

pub struct QueryEngine {
    store: Arc<IndexStore>,
}

impl QueryEngine {
    pub fn new(store: Arc<IndexStore>) -> Self {
        Self { store }
    }

    /// The string token at `position`, if any.
    ///
    /// Well-formed documents use their syntax tree. A document that does not
    /// parse (the user is mid-edit) falls back to the error-recovering tree.
    pub fn resolve_position(&self, doc: &Document, position: Position) -> Option<ResolvedString> {
        let offset = doc.offset_at(position);
        match doc.tree() {
            Ok(root) => match root.node_at(offset)? {
                SyntaxNode::String { span, text } => Some(ResolvedString {
                    span: *span,
                    text: text.clone(),
                }),
                _ => None,
            },
            Err(_) => {
                let (span, text) = syntax::string_at(doc.text(), offset)?;
                Some(ResolvedString { span, text })
            }
        }
    }

    pub fn definitions_at(&self, doc: &Document, position: Position) -> Vec<DefinitionEntry> {
        let Some(resolved) = self.resolve_position(doc, position) else {
            return Vec::new();
        };
        let entries = self.store.definitions_of(&resolved.text);
        debug!("{} definitions of {:?}", entries.len(), resolved.text);
        entries
    }

    pub fn references_at(&self, doc: &Document, position: Position) -> Vec<ReferenceEntry> {
        let Some(resolved) = self.resolve_position(doc, position) else {
            return Vec::new();
        };
        let entries = self.store.references_of(&resolved.text);
        debug!("{} references of {:?}", entries.len(), resolved.text);
        entries
    }

    pub fn on_definition(&self, doc: &Document, position: Position) -> Vec<Location> {
        self.definitions_at(doc, position)
            .into_iter()
            .map(|d| d.location)
            .collect()
    }

    pub fn on_references(&self, doc: &Document, position: Position) -> Vec<Location> {
        self.references_at(doc, position)
            .into_iter()
            .map(|r| r.location)
            .collect()
    }
}

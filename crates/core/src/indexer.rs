//! Extraction of definitions and references from one document.

use crate::document::Document;
use crate::model::{DocumentId, Location};
use crate::syntax::{ParseError, SyntaxNode};
use std::collections::HashMap;

/// The declaring occurrence of an identifier: a top-level object carrying
/// string `id` and `type` fields. The location spans the whole object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DefinitionEntry {
    pub id: String,
    pub kind: String,
    pub location: Location,
}

/// A string token. Definition ids are references to themselves too.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReferenceEntry {
    pub value: String,
    pub location: Location,
}

/// Everything one document version contributes to the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileIndex {
    document: DocumentId,
    version: i32,
    definitions: HashMap<String, Vec<DefinitionEntry>>,
    references: HashMap<String, Vec<ReferenceEntry>>,
}

impl FileIndex {
    pub fn new(document: DocumentId, version: i32) -> Self {
        Self {
            document,
            version,
            definitions: HashMap::new(),
            references: HashMap::new(),
        }
    }

    pub fn document(&self) -> &DocumentId {
        &self.document
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn add_definition(&mut self, entry: DefinitionEntry) {
        self.definitions
            .entry(entry.id.clone())
            .or_default()
            .push(entry);
    }

    pub fn add_reference(&mut self, entry: ReferenceEntry) {
        self.references
            .entry(entry.value.clone())
            .or_default()
            .push(entry);
    }

    pub fn definitions(&self, id: &str) -> &[DefinitionEntry] {
        self.definitions.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn references(&self, value: &str) -> &[ReferenceEntry] {
        self.references.get(value).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn definition_count(&self) -> usize {
        self.definitions.values().map(Vec::len).sum()
    }

    pub fn reference_count(&self) -> usize {
        self.references.values().map(Vec::len).sum()
    }

    pub fn defined_ids(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }
}

/// Index a parsed document.
///
/// Only the elements of a top-level array are considered, and of those only
/// objects. Any other shape yields an empty index.
pub fn index_document(doc: &Document) -> Result<FileIndex, ParseError> {
    let root = doc.tree().map_err(Clone::clone)?;
    let mut index = FileIndex::new(doc.id().clone(), doc.version());

    let SyntaxNode::Array { elements, .. } = root else {
        return Ok(index);
    };

    for record in elements {
        if !matches!(record, SyntaxNode::Object { .. }) {
            continue;
        }

        let id = record.property("id").and_then(SyntaxNode::as_str);
        let kind = record.property("type").and_then(SyntaxNode::as_str);
        if let (Some(id), Some(kind)) = (id, kind) {
            index.add_definition(DefinitionEntry {
                id: id.to_string(),
                kind: kind.to_string(),
                location: Location::new(doc.id().clone(), doc.range_of(record.span())),
            });
        }

        record.walk_values(&mut |node| {
            if let SyntaxNode::String { span, text } = node {
                index.add_reference(ReferenceEntry {
                    value: text.clone(),
                    location: Location::new(doc.id().clone(), doc.range_of(*span)),
                });
            }
        });
    }

    Ok(index)
}

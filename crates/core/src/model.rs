//! Shared value types: document identifiers, positions and locations.

use crate::error::{CddaError, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// Stable URI key of a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(Url);

impl DocumentId {
    pub fn new(url: Url) -> Self {
        Self(url)
    }

    pub fn parse(uri: &str) -> Result<Self> {
        Url::parse(uri)
            .map(Self)
            .map_err(|e| CddaError::InvalidUri(format!("{uri}: {e}")))
    }

    pub fn from_file_path(path: &Path) -> Result<Self> {
        Url::from_file_path(path)
            .map(Self)
            .map_err(|_| CddaError::InvalidUri(path.display().to_string()))
    }

    pub fn url(&self) -> &Url {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Local path for `file://` identifiers.
    pub fn to_file_path(&self) -> Option<PathBuf> {
        self.0.to_file_path().ok()
    }

    /// The path component of the URI, percent-decoded.
    pub fn path(&self) -> PathBuf {
        self.to_file_path()
            .unwrap_or_else(|| PathBuf::from(self.0.path()))
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl From<Url> for DocumentId {
    fn from(url: Url) -> Self {
        Self(url)
    }
}

/// Zero-based line and UTF-16 column, as editors count them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location {
    pub document: DocumentId,
    pub range: Range,
}

impl Location {
    pub fn new(document: DocumentId, range: Range) -> Self {
        Self { document, range }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.document.path();
        write!(
            f,
            "{}:{}:{}",
            path.display(),
            self.range.start.line + 1,
            self.range.start.character + 1
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Created,
    Modified,
    Deleted,
}

/// A document lifecycle notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub id: DocumentId,
    pub kind: ChangeKind,
}

impl FileChange {
    pub fn new(id: DocumentId, kind: ChangeKind) -> Self {
        Self { id, kind }
    }
}

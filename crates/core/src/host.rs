//! File discovery and reads.
//!
//! The engine never touches the file system directly; it goes through a
//! [`WorkspaceHost`]. [`LocalHost`] is the implementation backed by the local
//! disk.

use crate::error::{CddaError, Result};
use crate::model::DocumentId;
use async_trait::async_trait;
use ignore::WalkBuilder;
use ignore::overrides::{Override, OverrideBuilder};
use std::path::{Component, Path, PathBuf};

#[async_trait]
pub trait WorkspaceHost: Send + Sync {
    /// Workspace root that globs are relative to.
    fn root(&self) -> &Path;

    /// Every file under the root matching `glob`, in no particular order.
    async fn find_files(&self, glob: &str) -> Result<Vec<DocumentId>>;

    /// Full contents of one file.
    async fn read_file(&self, document: &DocumentId) -> Result<Vec<u8>>;
}

/// Resolve `.` and `..` without touching the file system.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Absolute, lexically normalised form of `path`.
///
/// Symlinks are kept: editors and file watchers report paths under the
/// directory the user opened, so document ids must be built from the same
/// spelling.
pub fn absolute_path(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    normalize(&absolute)
}

/// The `exclude` patterns of a workspace, for paths that did not come from
/// a walk (file watcher events).
pub struct ExcludeFilter {
    root: PathBuf,
    overrides: Override,
}

impl ExcludeFilter {
    pub fn new(root: &Path, exclude: &[String]) -> Result<Self> {
        let mut overrides = OverrideBuilder::new(root);
        for pattern in exclude {
            overrides.add(&format!("!{pattern}"))?;
        }
        Ok(Self {
            root: root.to_path_buf(),
            overrides: overrides.build()?,
        })
    }

    /// Whether `path` or any directory between it and the root is excluded.
    pub fn is_excluded(&self, path: &Path) -> bool {
        if self.overrides.matched(path, false).is_ignore() {
            return true;
        }
        path.ancestors()
            .skip(1)
            .take_while(|dir| dir.starts_with(&self.root) && *dir != self.root.as_path())
            .any(|dir| self.overrides.matched(dir, true).is_ignore())
    }
}

pub struct LocalHost {
    root: PathBuf,
    exclude: Vec<String>,
}

impl LocalHost {
    pub fn new(root: PathBuf) -> Self {
        let root = absolute_path(&root);
        Self {
            root,
            exclude: Vec::new(),
        }
    }

    pub fn with_exclude(mut self, exclude: impl IntoIterator<Item = String>) -> Self {
        self.exclude.extend(exclude);
        self
    }

    fn collect(root: &Path, glob: &str, exclude: &[String]) -> Result<Vec<PathBuf>> {
        let mut overrides = OverrideBuilder::new(root);
        overrides.add(glob)?;
        for pattern in exclude {
            overrides.add(&format!("!{pattern}"))?;
        }
        let overrides = overrides.build()?;

        let paths = WalkBuilder::new(root)
            .overrides(overrides)
            .follow_links(false)
            .build()
            .filter_map(|entry| {
                let entry = entry.ok()?;
                let path = entry.path();
                if entry.file_type().is_some_and(|t| t.is_file()) {
                    return Some(path.to_path_buf());
                }
                None
            })
            .collect();
        Ok(paths)
    }
}

#[async_trait]
impl WorkspaceHost for LocalHost {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn find_files(&self, glob: &str) -> Result<Vec<DocumentId>> {
        let root = self.root.clone();
        let glob = glob.to_string();
        let exclude = self.exclude.clone();
        let paths = tokio::task::spawn_blocking(move || Self::collect(&root, &glob, &exclude))
            .await
            .map_err(|e| CddaError::Internal(e.to_string()))??;

        paths
            .iter()
            .map(|path| DocumentId::from_file_path(path))
            .collect()
    }

    async fn read_file(&self, document: &DocumentId) -> Result<Vec<u8>> {
        let path = document
            .to_file_path()
            .ok_or_else(|| CddaError::InvalidUri(document.to_string()))?;
        Ok(tokio::fs::read(path).await?)
    }
}

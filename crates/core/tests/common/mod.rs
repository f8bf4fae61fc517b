#![allow(dead_code)]

use async_trait::async_trait;
use cdda_lsp_core::host::WorkspaceHost;
use cdda_lsp_core::{CddaError, DocumentId, Position, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Calls made against a [`MemoryHost`], in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    FindFiles(String),
    ReadFile(String),
}

/// In-memory workspace rooted at `/ws`. Globs understand the two shapes the
/// engine produces: `**/<name>` and `<prefix>/**/*.json`.
pub struct MemoryHost {
    root: PathBuf,
    files: Mutex<BTreeMap<String, String>>,
    calls: Mutex<Vec<HostCall>>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self {
            root: PathBuf::from("/ws"),
            files: Mutex::new(BTreeMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Add or replace a file; `relative` is relative to the root.
    pub fn write(&self, relative: &str, text: &str) -> DocumentId {
        self.files
            .lock()
            .unwrap()
            .insert(relative.to_string(), text.to_string());
        id(relative)
    }

    pub fn delete(&self, relative: &str) -> DocumentId {
        self.files.lock().unwrap().remove(relative);
        id(relative)
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().unwrap().clone()
    }

    fn matches(glob: &str, relative: &str) -> bool {
        if let Some(name) = glob.strip_prefix("**/") {
            if name == "*.json" {
                return relative.ends_with(".json");
            }
            return relative == name || relative.ends_with(&format!("/{name}"));
        }
        match glob.split_once("/**/") {
            Some((prefix, "*.json")) => {
                relative.starts_with(&format!("{prefix}/")) && relative.ends_with(".json")
            }
            _ => false,
        }
    }
}

pub fn id(relative: &str) -> DocumentId {
    DocumentId::from_file_path(&Path::new("/ws").join(relative)).unwrap()
}

#[async_trait]
impl WorkspaceHost for MemoryHost {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn find_files(&self, glob: &str) -> Result<Vec<DocumentId>> {
        self.calls
            .lock()
            .unwrap()
            .push(HostCall::FindFiles(glob.to_string()));
        Ok(self
            .files
            .lock()
            .unwrap()
            .keys()
            .filter(|relative| Self::matches(glob, relative))
            .map(|relative| id(relative))
            .collect())
    }

    async fn read_file(&self, document: &DocumentId) -> Result<Vec<u8>> {
        let path = document.to_file_path().unwrap();
        let relative = path
            .strip_prefix(&self.root)
            .unwrap()
            .to_string_lossy()
            .to_string();
        self.calls
            .lock()
            .unwrap()
            .push(HostCall::ReadFile(relative.clone()));
        self.files
            .lock()
            .unwrap()
            .get(&relative)
            .map(|text| text.clone().into_bytes())
            .ok_or_else(|| {
                CddaError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    relative,
                ))
            })
    }
}

/// Position of the `nth` occurrence of `needle` in `text`, one character in.
pub fn position_of(text: &str, needle: &str, nth: usize) -> Position {
    let offset = text.match_indices(needle).nth(nth).unwrap().0 + 1;
    let before = &text[..offset];
    let line = before.matches('\n').count() as u32;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let character = before[line_start..].encode_utf16().count() as u32;
    Position::new(line, character)
}

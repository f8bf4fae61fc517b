//! Mod discovery: manifests, content roots and the documents under them.

use crate::config::EngineConfig;
use crate::error::{CddaError, Result};
use crate::host::{WorkspaceHost, normalize};
use crate::model::DocumentId;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

pub const MOD_INFO_TYPE: &str = "MOD_INFO";

/// The `MOD_INFO` record of a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModInfo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Content root relative to the manifest's directory.
    #[serde(default)]
    pub path: Option<String>,
}

/// A manifest resolved to its content root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModDescriptor {
    pub info: ModInfo,
    pub manifest: DocumentId,
    /// Absolute, lexically normalised content root.
    pub root: PathBuf,
    /// Glob handed to [`WorkspaceHost::find_files`] for this mod.
    pub pattern: String,
}

impl ModDescriptor {
    pub fn display_name(&self) -> String {
        self.info
            .name
            .clone()
            .or_else(|| self.info.id.clone())
            .unwrap_or_else(|| self.manifest.to_string())
    }
}

pub struct ModResolver {
    host: Arc<dyn WorkspaceHost>,
    config: EngineConfig,
}

impl ModResolver {
    pub fn new(host: Arc<dyn WorkspaceHost>, config: EngineConfig) -> Self {
        Self { host, config }
    }

    /// Every manifest under the workspace root.
    pub async fn manifests(&self) -> Result<Vec<DocumentId>> {
        self.host.find_files(&self.config.manifest_glob).await
    }

    /// Read one manifest and compute its content root.
    pub async fn resolve_manifest(&self, manifest: &DocumentId) -> Result<ModDescriptor> {
        let bytes = self.host.read_file(manifest).await?;
        let info = parse_manifest(&bytes).map_err(|reason| CddaError::manifest(manifest, reason))?;

        let manifest_path = manifest.path();
        let manifest_dir = manifest_path.parent().unwrap_or(Path::new("/"));
        let root = normalize(&manifest_dir.join(info.path.as_deref().unwrap_or(".")));

        let workspace_root = normalize(self.host.root());
        let relative = relative_to(&root, &workspace_root);
        if relative.starts_with("..") {
            warn!(
                "Mod root {} lies outside the workspace {}",
                root.display(),
                workspace_root.display()
            );
        }

        Ok(ModDescriptor {
            info,
            manifest: manifest.clone(),
            root,
            pattern: content_pattern(&relative, &self.config.content_glob),
        })
    }

    /// Documents belonging to a resolved mod.
    pub async fn documents(&self, descriptor: &ModDescriptor) -> Result<Vec<DocumentId>> {
        debug!("Listing {} for mod {}", descriptor.pattern, descriptor.display_name());
        self.host.find_files(&descriptor.pattern).await
    }
}

/// Find the `MOD_INFO` record in manifest contents.
pub fn parse_manifest(bytes: &[u8]) -> std::result::Result<ModInfo, String> {
    let bytes = bytes.strip_prefix("\u{feff}".as_bytes()).unwrap_or(bytes);
    let items: Vec<serde_json::Value> = serde_json::from_slice(bytes).map_err(|e| e.to_string())?;
    let record = items
        .into_iter()
        .find(|item| item.get("type").and_then(|t| t.as_str()) == Some(MOD_INFO_TYPE))
        .ok_or_else(|| format!("no {MOD_INFO_TYPE} entry"))?;
    serde_json::from_value(record).map_err(|e| e.to_string())
}

fn content_pattern(relative_root: &Path, content_glob: &str) -> String {
    let prefix = relative_root
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    if prefix.is_empty() {
        content_glob.to_string()
    } else {
        format!("{prefix}/{content_glob}")
    }
}

/// `path` expressed relative to `base`; both must be normalised.
fn relative_to(path: &Path, base: &Path) -> PathBuf {
    let path: Vec<_> = path.components().collect();
    let base: Vec<_> = base.components().collect();
    let common = path
        .iter()
        .zip(base.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut out = PathBuf::new();
    for _ in common..base.len() {
        out.push("..");
    }
    for component in &path[common..] {
        out.push(component.as_os_str());
    }
    out
}

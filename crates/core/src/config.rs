//! Engine configuration.
//!
//! Every field has a default, so an empty object (or no options at all)
//! yields a working configuration. Editors pass overrides through the LSP
//! `initializationOptions`; the CLI builds one from its flags.

use serde::{Deserialize, Serialize};

pub const DEFAULT_MANIFEST_GLOB: &str = "**/modinfo.json";
pub const DEFAULT_CONTENT_GLOB: &str = "**/*.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Glob locating mod manifests, relative to the workspace root.
    pub manifest_glob: String,
    /// Glob appended to each mod's content root.
    pub content_glob: String,
    /// Paths excluded from discovery (gitignore syntax).
    pub exclude: Vec<String>,
    /// Upper bound on documents read at once during a bulk index.
    /// `None` means every document of a mod is in flight together.
    pub max_concurrent_reads: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            manifest_glob: DEFAULT_MANIFEST_GLOB.to_string(),
            content_glob: DEFAULT_CONTENT_GLOB.to_string(),
            // Game checkouts carry a symlinked android tree that mirrors `data/`.
            exclude: vec!["android".to_string()],
            max_concurrent_reads: None,
        }
    }
}

impl EngineConfig {
    /// Read the config from LSP `initializationOptions`.
    ///
    /// Malformed options fall back to defaults with a warning rather than
    /// failing the handshake.
    pub fn from_init_options(options: Option<serde_json::Value>) -> Self {
        match options {
            None | Some(serde_json::Value::Null) => Self::default(),
            Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed initialization options: {}", e);
                Self::default()
            }),
        }
    }
}

//! Definition and reference index over a tree of mod JSON documents.
//!
//! Documents are JSON arrays of records. A record with string `id` and
//! `type` fields defines its id; every string value anywhere in a record is
//! a reference. [`engine::IndexEngine`] discovers mods through their
//! manifests, indexes their documents, keeps the index current as files
//! change and answers point queries on open documents.

pub mod config;
pub mod coordinator;
pub mod document;
pub mod engine;
pub mod error;
pub mod host;
pub mod indexer;
pub mod logging;
pub mod model;
pub mod mods;
pub mod query;
pub mod store;
pub mod syntax;
pub mod watch;

pub use config::EngineConfig;
pub use engine::{IndexEngine, IndexReport};
pub use error::{CddaError, Result};
pub use model::{ChangeKind, DocumentId, FileChange, Location, Position, Range};

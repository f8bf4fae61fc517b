pub mod capabilities;
pub mod goto;
pub mod indexer;
pub mod util;

use cdda_lsp_core::{DocumentId, EngineConfig, FileChange, IndexEngine};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{RwLock, mpsc};
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

pub struct LspServer {
    client: Client,
    pub engine: Arc<RwLock<Option<Arc<IndexEngine>>>>,
    changes: RwLock<Option<mpsc::UnboundedSender<FileChange>>>,
    root: RwLock<Option<PathBuf>>,
}

impl LspServer {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            engine: Arc::new(RwLock::new(None)),
            changes: RwLock::new(None),
            root: RwLock::new(None),
        }
    }

    pub async fn engine(&self) -> Option<Arc<IndexEngine>> {
        self.engine.read().await.clone()
    }
}

#[allow(deprecated)]
fn workspace_root(params: &InitializeParams) -> Option<PathBuf> {
    params
        .workspace_folders
        .as_ref()
        .and_then(|folders| folders.first())
        .map(|folder| folder.uri.clone())
        .or_else(|| params.root_uri.clone())
        .and_then(|uri| uri.to_file_path().ok())
}

#[tower_lsp::async_trait]
impl LanguageServer for LspServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let config = EngineConfig::from_init_options(params.initialization_options.clone());
        let root = workspace_root(&params);

        let engine_root = root
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
        let engine = Arc::new(IndexEngine::local(engine_root, config));
        *self.engine.write().await = Some(engine);
        *self.root.write().await = root;

        Ok(InitializeResult {
            server_info: Some(ServerInfo {
                name: "cdda-json-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
            capabilities: capabilities::server_capabilities(),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        let Some(engine) = self.engine().await else {
            return;
        };

        if let Err(e) = self
            .client
            .register_capability(vec![capabilities::watched_files_registration()])
            .await
        {
            self.client
                .log_message(
                    MessageType::WARNING,
                    format!("Client refused file watching, index will not follow disk changes: {}", e),
                )
                .await;
        }

        *self.changes.write().await = Some(engine.spawn_change_listener());

        if self.root.read().await.is_some() {
            indexer::spawn_indexer(engine, self.client.clone());
        } else {
            self.client
                .log_message(MessageType::WARNING, "No workspace folder open, nothing to index")
                .await;
        }
    }

    async fn shutdown(&self) -> Result<()> {
        if let Some(engine) = self.engine().await {
            engine.shutdown();
        }
        self.changes.write().await.take();
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let Some(engine) = self.engine().await else {
            return;
        };
        let doc = params.text_document;
        engine.open_document(DocumentId::new(doc.uri), doc.version, doc.text);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let Some(engine) = self.engine().await else {
            return;
        };
        let id = DocumentId::new(params.text_document.uri);
        let changes: Vec<_> = params
            .content_changes
            .into_iter()
            .map(util::to_text_change)
            .collect();
        if let Err(e) = engine.change_document(&id, params.text_document.version, &changes) {
            tracing::warn!("Ignoring change: {}", e);
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        if let Some(engine) = self.engine().await {
            engine.close_document(&DocumentId::new(params.text_document.uri));
        }
    }

    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        let changes = self.changes.read().await;
        let Some(tx) = changes.as_ref() else {
            return;
        };
        for change in params.changes.into_iter().filter_map(util::to_file_change) {
            tracing::debug!("File {:?}: {}", change.kind, change.id);
            if tx.send(change).is_err() {
                tracing::warn!("Change listener has stopped");
                break;
            }
        }
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let pos = params.text_document_position_params.position;
        tracing::debug!(
            "textDocument/definition uri={} pos={}:{}",
            uri,
            pos.line,
            pos.character
        );
        let result = goto::definition(self, params).await;
        match &result {
            Ok(Some(GotoDefinitionResponse::Scalar(_))) => tracing::debug!("found 1 location"),
            Ok(Some(GotoDefinitionResponse::Array(v))) => {
                tracing::debug!("found {} locations", v.len())
            }
            Ok(_) => tracing::debug!("no definition found"),
            Err(e) => tracing::error!("definition failed: {}", e),
        }
        result
    }

    async fn references(&self, params: ReferenceParams) -> Result<Option<Vec<Location>>> {
        let uri = &params.text_document_position.text_document.uri;
        let pos = params.text_document_position.position;
        tracing::debug!(
            "textDocument/references uri={} pos={}:{}",
            uri,
            pos.line,
            pos.character
        );
        let result = goto::references(self, params).await;
        if let Ok(Some(locs)) = &result {
            tracing::debug!("found {} references", locs.len());
        }
        result
    }
}

pub async fn run_server() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = tower_lsp::LspService::new(LspServer::new);
    tower_lsp::Server::new(stdin, stdout, socket)
        .serve(service)
        .await;

    Ok(())
}

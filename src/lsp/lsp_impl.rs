use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use arc_swap::ArcSwap;
use tower_lsp_server::jsonrpc::Result;
use tower_lsp_server::ls_types::{
    DidChangeTextDocumentParams, DidCloseTextDocumentParams, DidOpenTextDocumentParams,
    InitializeParams, InitializeResult, InitializedParams, SemanticTokensParams,
    SemanticTokensRangeParams, SemanticTokensRangeResult, SemanticTokensResult, ServerInfo, Uri,
};
use tower_lsp_server::{Client, LanguageServer};
use url::Url;

use crate::config::WorkspaceSettings;
use crate::document::{DocumentStore, DocumentVersion};
use crate::error::LockResultExt;
use crate::tsserver::{
    TsServerClient, TsServerConfig, file_id_for_uri, script_kind_for_language,
};

use super::capabilities::server_capabilities;
use super::client::ClientNotifier;
use super::semantic_request_tracker::SemanticRequestTracker;
use super::settings::load_settings;
use super::text_sync::apply_content_changes;

mod text_document;

/// Convert an LSP `Uri` into a `Url`.
pub(crate) fn uri_to_url(uri: &Uri) -> Option<Url> {
    Url::parse(uri.as_str()).ok()
}

/// Workspace root: first workspace folder, then root URI, then the current
/// directory.
fn resolve_root_path(params: &InitializeParams) -> Option<PathBuf> {
    if let Some(folders) = &params.workspace_folders
        && let Some(folder) = folders.first()
    {
        return uri_to_url(&folder.uri).and_then(|url| url.to_file_path().ok());
    }

    #[allow(deprecated)] // Support for older LSP clients
    if let Some(root_uri) = &params.root_uri {
        return uri_to_url(root_uri).and_then(|url| url.to_file_path().ok());
    }

    std::env::current_dir().ok()
}

pub struct TsClassifyLs {
    notifier: ClientNotifier,
    documents: DocumentStore,
    settings: ArcSwap<WorkspaceSettings>,
    backend: RwLock<Option<Arc<TsServerClient>>>,
    semantic_tokens_registered: AtomicBool,
    semantic_request_tracker: SemanticRequestTracker,
}

impl std::fmt::Debug for TsClassifyLs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TsClassifyLs")
            .field("notifier", &self.notifier)
            .field("settings", &self.settings.load())
            .field(
                "semantic_tokens_registered",
                &self.semantic_tokens_registered(),
            )
            .finish_non_exhaustive()
    }
}

impl TsClassifyLs {
    pub fn new(client: Client) -> Self {
        Self {
            notifier: ClientNotifier::new(client),
            documents: DocumentStore::new(),
            settings: ArcSwap::from_pointee(WorkspaceSettings::default()),
            backend: RwLock::new(None),
            semantic_tokens_registered: AtomicBool::new(false),
            semantic_request_tracker: SemanticRequestTracker::new(),
        }
    }

    pub(crate) fn backend(&self) -> Option<Arc<TsServerClient>> {
        self.backend.read().recover_poison("backend.read").clone()
    }

    pub(crate) fn semantic_tokens_registered(&self) -> bool {
        self.semantic_tokens_registered.load(Ordering::SeqCst)
    }

    /// Start tsserver and decide whether semantic tokens can be served.
    async fn start_backend(&self, settings: &WorkspaceSettings) -> bool {
        let config = TsServerConfig {
            cmd: settings.tsserver_cmd.clone(),
            request_timeout: settings.request_timeout,
        };
        let backend = match TsServerClient::spawn(&config) {
            Ok(backend) => Arc::new(backend),
            Err(e) => {
                log::warn!(target: "tsclassify::lsp", "Failed to start tsserver: {}", e);
                self.notifier
                    .log_warning(format!("Failed to start tsserver: {}", e))
                    .await;
                return false;
            }
        };
        self.notifier
            .log_info(format!("Started tsserver: {}", config.cmd.join(" ")))
            .await;

        let version = match settings.tsserver_version {
            Some(version) => Some(version),
            None => match backend.status().await {
                Ok(version) => Some(version),
                Err(e) => {
                    log::warn!(target: "tsclassify::lsp", "tsserver version probe failed: {}", e);
                    None
                }
            },
        };

        let supported = match version {
            Some(version) if version.supports_semantic_tokens() => {
                self.notifier
                    .log_info(format!("tsserver API {}: semantic tokens enabled", version))
                    .await;
                true
            }
            Some(version) => {
                self.notifier
                    .log_info(format!(
                        "tsserver API {} is too old for semantic tokens",
                        version
                    ))
                    .await;
                false
            }
            None => {
                self.notifier
                    .log_warning("tsserver version unknown: semantic tokens disabled")
                    .await;
                false
            }
        };

        // Only semantic tokens need tsserver.
        if supported {
            *self.backend.write().recover_poison("backend.write") = Some(backend);
        } else {
            backend.shutdown().await;
        }
        supported
    }

    async fn sync_document(&self, uri: &Url) {
        let Some(backend) = self.backend() else {
            return;
        };
        let Some((text, language_id)) = self
            .documents
            .get(uri)
            .map(|doc| (doc.text().to_string(), doc.language_id().to_string()))
        else {
            return;
        };

        let file_id = file_id_for_uri(uri);
        if let Err(e) = backend
            .open_file(&file_id, &text, script_kind_for_language(&language_id))
            .await
        {
            log::warn!(target: "tsclassify::lsp", "Failed to sync {} to tsserver: {}", uri, e);
        }
    }
}

impl LanguageServer for TsClassifyLs {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let root_path = resolve_root_path(&params);
        if let Some(path) = &root_path {
            log::info!(target: "tsclassify::lsp", "Workspace root: {}", path.display());
        }

        let outcome = load_settings(root_path.as_deref(), params.initialization_options);
        for event in &outcome.events {
            log::debug!(target: "tsclassify::config", "{}", event.message);
        }
        self.notifier.log_settings_events(&outcome.events).await;

        let settings = outcome.settings;
        let registered = if settings.semantic_tokens_enabled {
            self.start_backend(&settings).await
        } else {
            self.notifier
                .log_info("Semantic tokens disabled by configuration")
                .await;
            false
        };
        self.semantic_tokens_registered
            .store(registered, Ordering::SeqCst);
        self.settings.store(Arc::new(settings));

        Ok(InitializeResult {
            capabilities: server_capabilities(registered),
            server_info: Some(ServerInfo {
                name: "tsclassify".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
            ..Default::default()
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.notifier.log_info("server is ready").await;
    }

    async fn shutdown(&self) -> Result<()> {
        self.semantic_request_tracker.cancel_all();
        let backend = self.backend.write().recover_poison("backend.write").take();
        if let Some(backend) = backend {
            backend.shutdown().await;
        }
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let Some(uri) = uri_to_url(&params.text_document.uri) else {
            return;
        };
        self.documents.open(
            uri.clone(),
            params.text_document.text,
            DocumentVersion::new(params.text_document.version),
            params.text_document.language_id,
        );
        self.sync_document(&uri).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let Some(uri) = uri_to_url(&params.text_document.uri) else {
            return;
        };
        let Some(old_text) = self.documents.get(&uri).map(|doc| doc.text().to_string()) else {
            log::warn!(target: "tsclassify::lsp", "Change for unopened document {}", uri);
            return;
        };

        let text = apply_content_changes(&old_text, params.content_changes);
        self.documents.update(
            &uri,
            text,
            DocumentVersion::new(params.text_document.version),
        );
        self.sync_document(&uri).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let Some(uri) = uri_to_url(&params.text_document.uri) else {
            return;
        };
        self.semantic_request_tracker.cancel_all_for_uri(&uri);
        self.documents.remove(&uri);

        if let Some(backend) = self.backend()
            && let Err(e) = backend.close_file(&file_id_for_uri(&uri)).await
        {
            log::warn!(target: "tsclassify::lsp", "Failed to close {} in tsserver: {}", uri, e);
        }
    }

    async fn semantic_tokens_full(
        &self,
        params: SemanticTokensParams,
    ) -> Result<Option<SemanticTokensResult>> {
        self.semantic_tokens_full_impl(params).await
    }

    async fn semantic_tokens_range(
        &self,
        params: SemanticTokensRangeParams,
    ) -> Result<Option<SemanticTokensRangeResult>> {
        self.semantic_tokens_range_impl(params).await
    }
}

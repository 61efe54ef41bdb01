//! Server capabilities advertised in the `initialize` response.

use tower_lsp_server::ls_types::{
    SemanticTokensFullOptions, SemanticTokensOptions, SemanticTokensServerCapabilities,
    ServerCapabilities, TextDocumentSyncCapability, TextDocumentSyncKind, TextDocumentSyncOptions,
    WorkDoneProgressOptions,
};

use crate::analysis::legend;

/// Capabilities for a server whose semantic token provider is registered
/// only when `semantic_tokens` is true.
pub fn server_capabilities(semantic_tokens: bool) -> ServerCapabilities {
    let semantic_tokens_provider = semantic_tokens.then(|| {
        SemanticTokensServerCapabilities::SemanticTokensOptions(SemanticTokensOptions {
            work_done_progress_options: WorkDoneProgressOptions::default(),
            legend: legend(),
            full: Some(SemanticTokensFullOptions::Bool(true)),
            range: Some(true),
        })
    });

    ServerCapabilities {
        text_document_sync: Some(TextDocumentSyncCapability::Options(
            TextDocumentSyncOptions {
                open_close: Some(true),
                change: Some(TextDocumentSyncKind::INCREMENTAL),
                ..Default::default()
            },
        )),
        semantic_tokens_provider,
        ..ServerCapabilities::default()
    }
}

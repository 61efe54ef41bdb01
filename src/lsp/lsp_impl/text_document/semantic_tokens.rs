//! Semantic token methods for TsClassifyLs.

use tower_lsp_server::jsonrpc::Result;
use tower_lsp_server::ls_types::{
    SemanticTokens, SemanticTokensParams, SemanticTokensRangeParams, SemanticTokensRangeResult,
    SemanticTokensResult,
};
use url::Url;

use crate::analysis::{SemanticTokensProvider, TokenRequestOptions, encode_tokens};
use crate::tsserver::file_id_for_uri;

use super::super::{TsClassifyLs, uri_to_url};

/// Why a semantic token request answered `null`.
#[derive(Debug, Clone, Copy)]
enum CancellationReason {
    NotRegistered,
    BackendUnavailable,
    Superseded,
    Aborted,
    OutOfOrder,
}

impl TsClassifyLs {
    pub(crate) async fn semantic_tokens_full_impl(
        &self,
        params: SemanticTokensParams,
    ) -> Result<Option<SemanticTokensResult>> {
        let Some(uri) = uri_to_url(&params.text_document.uri) else {
            return Ok(None);
        };
        let tokens = self
            .compute_semantic_tokens(&uri, TokenRequestOptions::full())
            .await;
        Ok(tokens.map(SemanticTokensResult::Tokens))
    }

    pub(crate) async fn semantic_tokens_range_impl(
        &self,
        params: SemanticTokensRangeParams,
    ) -> Result<Option<SemanticTokensRangeResult>> {
        let Some(uri) = uri_to_url(&params.text_document.uri) else {
            return Ok(None);
        };
        let tokens = self
            .compute_semantic_tokens(&uri, TokenRequestOptions::ranges(vec![params.range]))
            .await;
        Ok(tokens.map(SemanticTokensRangeResult::Tokens))
    }

    async fn compute_semantic_tokens(
        &self,
        uri: &Url,
        options: TokenRequestOptions,
    ) -> Option<SemanticTokens> {
        match self.try_compute_semantic_tokens(uri, options).await {
            Ok(tokens) => Some(tokens),
            Err((request_id, reason)) => {
                self.notifier
                    .log_trace(format!(
                        "[SEMANTIC_TOKENS] CANCELLED uri={} req={} reason={:?}",
                        uri, request_id, reason
                    ))
                    .await;
                None
            }
        }
    }

    async fn try_compute_semantic_tokens(
        &self,
        uri: &Url,
        options: TokenRequestOptions,
    ) -> std::result::Result<SemanticTokens, (u64, CancellationReason)> {
        if !self.semantic_tokens_registered() {
            return Err((0, CancellationReason::NotRegistered));
        }
        let backend = self
            .backend()
            .ok_or((0, CancellationReason::BackendUnavailable))?;

        // Supersedes any previous request for this URI
        let request = self.semantic_request_tracker.start_request(uri);
        self.notifier
            .log_trace(format!(
                "[SEMANTIC_TOKENS] START uri={} req={}",
                uri, request.id
            ))
            .await;

        let document = self.documents.live(uri, file_id_for_uri(uri));
        let provider = SemanticTokensProvider::new(backend);
        let tokens = provider
            .provide_semantic_tokens(&document, &options, &request.cancel)
            .await;
        self.semantic_request_tracker
            .finish_request(uri, request.id);

        let Some(tokens) = tokens else {
            let reason = if request.cancel.is_cancelled() {
                CancellationReason::Superseded
            } else {
                CancellationReason::Aborted
            };
            return Err((request.id, reason));
        };

        let encoded = encode_tokens(&tokens).map_err(|e| {
            log::debug!(target: "tsclassify::lsp", "Discarding tokens for {}: {}", uri, e);
            (request.id, CancellationReason::OutOfOrder)
        })?;

        self.notifier
            .log_trace(format!(
                "[SEMANTIC_TOKENS] DONE uri={} req={} tokens={}",
                uri,
                request.id,
                encoded.data.len()
            ))
            .await;
        Ok(encoded)
    }
}

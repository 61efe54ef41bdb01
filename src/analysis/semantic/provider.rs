//! Semantic tokens provider: plan, fetch, validate, decode, split.

use std::sync::LazyLock;

use tokio_util::sync::CancellationToken;
use tower_lsp_server::ls_types::{Range, SemanticTokensLegend};

use crate::document::LiveDocument;
use crate::error::ClassifyError;

use super::classification::decode_spans;
use super::legend::legend;
use super::line_split::{DecodedSemanticToken, split_span};
use super::range::plan_requests;
use super::source::{ClassificationResponse, ClassificationSource};
use super::staleness::{Stale, StalenessGuard};

static LEGEND: LazyLock<SemanticTokensLegend> = LazyLock::new(legend);

/// Options of one semantic tokens operation.
#[derive(Debug, Clone, Default)]
pub struct TokenRequestOptions {
    /// Ranges to classify; `None` classifies the whole document.
    pub ranges: Option<Vec<Range>>,
}

impl TokenRequestOptions {
    pub fn full() -> Self {
        Self::default()
    }

    pub fn ranges(ranges: Vec<Range>) -> Self {
        Self {
            ranges: Some(ranges),
        }
    }
}

/// Why an operation produced no result.
#[derive(Debug)]
enum AbortReason {
    DocumentClosed,
    Cancelled,
    Stale(Stale),
    Backend(ClassifyError),
}

/// Produces decoded semantic tokens for a document from a classification
/// backend.
#[derive(Debug, Clone)]
pub struct SemanticTokensProvider<S> {
    source: S,
}

impl<S: ClassificationSource> SemanticTokensProvider<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// The legend every produced token indexes into.
    pub fn legend() -> &'static SemanticTokensLegend {
        &LEGEND
    }

    /// Compute the semantic tokens of `document`.
    ///
    /// Returns `None` when any backend call fails, the document is edited or
    /// closed while requests are in flight, or `cancel` fires. A partial
    /// token list is never returned.
    pub async fn provide_semantic_tokens<D>(
        &self,
        document: &D,
        options: &TokenRequestOptions,
        cancel: &CancellationToken,
    ) -> Option<Vec<DecodedSemanticToken>>
    where
        D: LiveDocument + Sync + ?Sized,
    {
        match self.try_provide(document, options, cancel).await {
            Ok(tokens) => {
                log::debug!(
                    target: "tsclassify::semantic",
                    "[SEMANTIC_TOKENS] DONE file={} tokens={}",
                    document.file_id(),
                    tokens.len()
                );
                Some(tokens)
            }
            Err(reason) => {
                log::debug!(
                    target: "tsclassify::semantic",
                    "[SEMANTIC_TOKENS] ABORTED file={} ({:?})",
                    document.file_id(),
                    reason
                );
                None
            }
        }
    }

    async fn try_provide<D>(
        &self,
        document: &D,
        options: &TokenRequestOptions,
        cancel: &CancellationToken,
    ) -> Result<Vec<DecodedSemanticToken>, AbortReason>
    where
        D: LiveDocument + Sync + ?Sized,
    {
        if cancel.is_cancelled() {
            return Err(AbortReason::Cancelled);
        }

        let snapshot = document.snapshot().ok_or(AbortReason::DocumentClosed)?;
        let requests = plan_requests(
            document.file_id(),
            snapshot.line_index(),
            options.ranges.as_deref(),
        );

        let guard = StalenessGuard::capture(document).ok_or(AbortReason::DocumentClosed)?;
        if guard.version() != snapshot.version() {
            return Err(AbortReason::Stale(Stale {
                before: snapshot.version(),
                after: Some(guard.version()),
            }));
        }

        let mut responses: Vec<ClassificationResponse> = Vec::with_capacity(requests.len());
        for request in &requests {
            let response = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(AbortReason::Cancelled),
                result = self.source.classify(request, cancel) => result,
            };
            match response {
                Ok(response) => responses.push(response),
                Err(error) if error.is_cancelled() => return Err(AbortReason::Cancelled),
                Err(error) => return Err(AbortReason::Backend(error)),
            }
        }

        guard.validate(document).map_err(AbortReason::Stale)?;
        if cancel.is_cancelled() {
            return Err(AbortReason::Cancelled);
        }

        let line_index = snapshot.line_index();
        let mut tokens = Vec::new();
        for (request, response) in requests.iter().zip(&responses) {
            if response.spans.len() % 3 != 0 {
                log::warn!(
                    target: "tsclassify::semantic",
                    "Span array of length {} for {}+{} is not made of triplets",
                    response.spans.len(),
                    request.start,
                    request.length
                );
            }
            for span in decode_spans(&response.spans) {
                split_span(&span, line_index, &mut tokens);
            }
        }

        Ok(tokens)
    }
}

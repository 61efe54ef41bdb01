//! Semantic tokens from backend classifications.
//!
//! Data flows Planner → Source → Staleness Guard → Decoder → Line Splitter →
//! Builder:
//!
//! - `range` plans one classification request per requested range
//! - `source` is the backend contract the requests go through
//! - `staleness` invalidates results when the document changed meanwhile
//! - `classification` resolves each span's code to a token type
//! - `line_split` cuts spans into single-line tokens
//! - `finalize` delta-encodes tokens for the LSP client

pub mod classification;
pub mod finalize;
pub mod legend;
pub mod line_split;
pub mod provider;
pub mod range;
pub mod source;
pub mod staleness;

pub use classification::{
    ClassificationScheme, ClassificationType, ENRICHED_CODE_THRESHOLD, ResolvedSpan,
    decode_classification, decode_spans,
};
pub use finalize::{SemanticTokensBuilder, encode_tokens};
pub use legend::{TOKEN_MODIFIERS, TOKEN_TYPES, legend, token_modifier, token_type};
pub use line_split::{DecodedSemanticToken, split_span};
pub use provider::{SemanticTokensProvider, TokenRequestOptions};
pub use range::plan_requests;
pub use source::{
    ClassificationRequest, ClassificationResponse, ClassificationSource, EndOfLineState,
};
pub use staleness::{Stale, StalenessGuard};

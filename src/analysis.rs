pub mod semantic;

// Re-export main types and functions
pub use semantic::{
    DecodedSemanticToken, SemanticTokensBuilder, SemanticTokensProvider, TOKEN_MODIFIERS,
    TOKEN_TYPES, TokenRequestOptions, encode_tokens, legend,
};

pub mod analysis;
pub mod config;
pub mod document;
pub mod error;
pub mod lsp;
pub mod tsserver;

pub use analysis::{DecodedSemanticToken, SemanticTokensProvider, TokenRequestOptions};
pub use error::{ClassifyError, ClassifyResult};

// Re-export the main server implementation
pub use lsp::TsClassifyLs;

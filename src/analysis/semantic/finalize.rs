//! Token stream building and LSP delta encoding.
//!
//! The builder accepts decoded tokens in document order and produces the
//! relative `SemanticToken` encoding the LSP client expects. Out-of-order
//! input is rejected rather than sorted.

use tower_lsp_server::ls_types::{SemanticToken, SemanticTokens};

use crate::error::{ClassifyError, ClassifyResult};

use super::line_split::DecodedSemanticToken;

/// Accumulates single-line tokens into a delta-encoded token stream.
#[derive(Debug, Default)]
pub struct SemanticTokensBuilder {
    data: Vec<SemanticToken>,
    /// Absolute position of the last pushed token
    last: Option<(u32, u32)>,
}

impl SemanticTokensBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            last: None,
        }
    }

    /// Append a token that must not precede the previously pushed one.
    pub fn push(&mut self, token: &DecodedSemanticToken) -> ClassifyResult<()> {
        let (delta_line, delta_start) = match self.last {
            None => (token.line, token.start_char),
            Some((last_line, last_start)) => {
                if (token.line, token.start_char) < (last_line, last_start) {
                    return Err(ClassifyError::OutOfOrderToken {
                        line: token.line,
                        start_char: token.start_char,
                        previous_line: last_line,
                        previous_start_char: last_start,
                    });
                }
                let delta_line = token.line - last_line;
                let delta_start = if delta_line == 0 {
                    token.start_char - last_start
                } else {
                    token.start_char
                };
                (delta_line, delta_start)
            }
        };

        self.data.push(SemanticToken {
            delta_line,
            delta_start,
            length: token.length,
            token_type: token.token_type,
            token_modifiers_bitset: token.token_modifiers,
        });
        self.last = Some((token.line, token.start_char));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn build(self, result_id: Option<String>) -> SemanticTokens {
        SemanticTokens {
            result_id,
            data: self.data,
        }
    }
}

/// Delta-encode a complete, ordered token sequence.
pub fn encode_tokens(tokens: &[DecodedSemanticToken]) -> ClassifyResult<SemanticTokens> {
    let mut builder = SemanticTokensBuilder::with_capacity(tokens.len());
    for token in tokens {
        builder.push(token)?;
    }
    Ok(builder.build(None))
}

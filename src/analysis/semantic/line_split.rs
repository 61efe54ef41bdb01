//! Splitting of offset spans into single-line semantic tokens.

use serde::Serialize;

use crate::document::LineIndex;

use super::classification::ResolvedSpan;

/// A semantic token confined to one line, in absolute coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedSemanticToken {
    pub line: u32,
    pub start_char: u32,
    pub length: u32,
    pub token_type: u32,
    pub token_modifiers: u32,
}

/// Split `span` into one token per line it touches and append them to `out`.
///
/// The first piece starts at the span's start character, later pieces start
/// at column zero; every piece but the last runs to the end of its line.
/// Pieces that would be empty (e.g. a span ending exactly at a line start)
/// are not emitted.
pub fn split_span(span: &ResolvedSpan, index: &LineIndex, out: &mut Vec<DecodedSemanticToken>) {
    let start = index.offset_to_position(span.offset);
    let end = index.offset_to_position(span.offset.saturating_add(span.length));

    for line in start.line..=end.line {
        let start_char = if line == start.line { start.character } else { 0 };
        let end_char = if line == end.line {
            end.character
        } else {
            index.line_length(line).unwrap_or(start_char)
        };

        if end_char <= start_char {
            continue;
        }

        out.push(DecodedSemanticToken {
            line,
            start_char,
            length: end_char - start_char,
            token_type: span.token_type,
            token_modifiers: span.token_modifiers,
        });
    }
}

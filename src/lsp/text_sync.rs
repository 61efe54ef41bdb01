//! Text synchronization for `didChange` handling.
//!
//! Incremental changes carry a UTF-16 range; a change without a range
//! replaces the whole document. Changes apply in order, each against the
//! text produced by the previous one.

use tower_lsp_server::ls_types::TextDocumentContentChangeEvent;

use crate::document::{LineIndex, utf16_offset_to_byte};

/// Apply content changes to `old_text` and return the new text.
pub(crate) fn apply_content_changes(
    old_text: &str,
    content_changes: Vec<TextDocumentContentChangeEvent>,
) -> String {
    let mut text = old_text.to_string();

    for change in content_changes {
        match change.range {
            Some(range) => {
                let index = LineIndex::new(&text);
                let start = index.position_to_offset(range.start);
                let end = index.position_to_offset(range.end).max(start);
                let start_byte = utf16_offset_to_byte(&text, start);
                let end_byte = utf16_offset_to_byte(&text, end);
                text.replace_range(start_byte..end_byte, &change.text);
            }
            None => text = change.text,
        }
    }

    text
}

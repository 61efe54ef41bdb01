//! UTF-16 line index for offset/position conversion.
//!
//! The backend reports spans as UTF-16 code unit offsets (JavaScript string
//! indices) and LSP positions default to UTF-16 characters, so the whole
//! index works in UTF-16 units. Recognised line terminators are `\n`,
//! `\r\n` and a lone `\r`.

use tower_lsp_server::ls_types::Position;

/// Precomputed line starts and lengths of a document, in UTF-16 code units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    /// Offset of the first character of each line
    line_starts: Vec<u32>,
    /// Length of each line excluding its terminator
    line_lengths: Vec<u32>,
    /// Total document length
    len: u32,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        let mut line_lengths = Vec::new();
        let mut offset = 0u32;
        let mut line_start = 0u32;
        let mut chars = text.chars().peekable();

        while let Some(ch) = chars.next() {
            match ch {
                '\n' => {
                    line_lengths.push(offset - line_start);
                    offset += 1;
                }
                '\r' => {
                    line_lengths.push(offset - line_start);
                    offset += 1;
                    if chars.peek() == Some(&'\n') {
                        chars.next();
                        offset += 1;
                    }
                }
                _ => {
                    offset += ch.len_utf16() as u32;
                    continue;
                }
            }
            line_start = offset;
            line_starts.push(line_start);
        }
        line_lengths.push(offset - line_start);

        Self {
            line_starts,
            line_lengths,
            len: offset,
        }
    }

    /// Total document length in UTF-16 code units.
    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of lines; an empty document has one empty line.
    pub fn line_count(&self) -> u32 {
        self.line_starts.len() as u32
    }

    /// Length of `line` excluding its terminator.
    pub fn line_length(&self, line: u32) -> Option<u32> {
        self.line_lengths.get(line as usize).copied()
    }

    /// Convert an offset to a position.
    ///
    /// Offsets past the end clamp to the end of the document; an offset
    /// inside a `\r\n` terminator maps to the end of its line.
    pub fn offset_to_position(&self, offset: u32) -> Position {
        let offset = offset.min(self.len);
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let character = (offset - self.line_starts[line]).min(self.line_lengths[line]);

        Position {
            line: line as u32,
            character,
        }
    }

    /// Convert a position to an offset, clamping the character to the line
    /// length and lines past the end to the document length.
    pub fn position_to_offset(&self, position: Position) -> u32 {
        let line = position.line as usize;
        match (self.line_starts.get(line), self.line_lengths.get(line)) {
            (Some(&start), Some(&length)) => start + position.character.min(length),
            _ => self.len,
        }
    }
}

/// Convert a UTF-16 offset into a byte offset of `text`.
///
/// Offsets past the end, or falling inside a surrogate pair, resolve to the
/// next character boundary.
pub fn utf16_offset_to_byte(text: &str, offset: u32) -> usize {
    let mut utf16 = 0u32;
    for (byte, ch) in text.char_indices() {
        if utf16 >= offset {
            return byte;
        }
        utf16 += ch.len_utf16() as u32;
    }
    text.len()
}

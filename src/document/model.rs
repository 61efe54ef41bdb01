use std::fmt;
use std::sync::Arc;

use super::position::LineIndex;

/// Version of a document as reported by the editor.
///
/// Only equality is meaningful: two equal samples mean no edit happened in
/// between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentVersion(i32);

impl DocumentVersion {
    pub const fn new(version: i32) -> Self {
        Self(version)
    }

    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for DocumentVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Immutable view of a document at one version.
///
/// Cheap to clone; the line index is shared with the owning [`Document`].
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
    version: DocumentVersion,
    line_index: Arc<LineIndex>,
}

impl DocumentSnapshot {
    pub fn new(version: DocumentVersion, line_index: Arc<LineIndex>) -> Self {
        Self {
            version,
            line_index,
        }
    }

    /// Build a snapshot directly from text, mostly useful in tests and tools.
    pub fn from_text(version: DocumentVersion, text: &str) -> Self {
        Self::new(version, Arc::new(LineIndex::new(text)))
    }

    pub fn version(&self) -> DocumentVersion {
        self.version
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }
}

/// An open document owned by the editor.
#[derive(Debug, Clone)]
pub struct Document {
    text: String,
    version: DocumentVersion,
    language_id: String,
    line_index: Arc<LineIndex>,
}

impl Document {
    pub fn new(text: String, version: DocumentVersion, language_id: impl Into<String>) -> Self {
        let line_index = Arc::new(LineIndex::new(&text));
        Self {
            text,
            version,
            language_id: language_id.into(),
            line_index,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn version(&self) -> DocumentVersion {
        self.version
    }

    pub fn language_id(&self) -> &str {
        &self.language_id
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    pub fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot::new(self.version, Arc::clone(&self.line_index))
    }

    /// Replace the content and version, rebuilding the line index.
    pub fn update(&mut self, text: String, version: DocumentVersion) {
        self.line_index = Arc::new(LineIndex::new(&text));
        self.text = text;
        self.version = version;
    }
}

/// Read access to a document whose content may change while a request is
/// in flight.
///
/// `version` must sample the live state on every call; `snapshot` captures
/// the position model at the moment it is called.
pub trait LiveDocument {
    /// Identifier the backend knows this document by.
    fn file_id(&self) -> &str;

    /// Current version, or `None` once the document is closed.
    fn version(&self) -> Option<DocumentVersion>;

    /// Current content model, or `None` once the document is closed.
    fn snapshot(&self) -> Option<DocumentSnapshot>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_rebuilds_line_index_and_version() {
        let mut doc = Document::new("a\nb".to_string(), DocumentVersion::new(1), "typescript");
        assert_eq!(doc.line_index().line_count(), 2);

        doc.update("a\nb\nc".to_string(), DocumentVersion::new(2));

        assert_eq!(doc.text(), "a\nb\nc");
        assert_eq!(doc.version(), DocumentVersion::new(2));
        assert_eq!(doc.line_index().line_count(), 3);
        assert_eq!(doc.language_id(), "typescript");
    }

    #[test]
    fn snapshot_keeps_old_index_after_update() {
        let mut doc = Document::new("abc".to_string(), DocumentVersion::new(1), "typescript");
        let snapshot = doc.snapshot();

        doc.update("abc\ndef".to_string(), DocumentVersion::new(2));

        assert_eq!(snapshot.version(), DocumentVersion::new(1));
        assert_eq!(snapshot.line_index().line_count(), 1);
        assert_eq!(doc.snapshot().line_index().line_count(), 2);
    }

    #[test]
    fn version_display_is_prefixed() {
        assert_eq!(DocumentVersion::new(12).to_string(), "v12");
    }
}

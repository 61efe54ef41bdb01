//! Editor-owned document model: content, version and UTF-16 position mapping.

pub mod position;
pub mod store;

mod model;

// Re-export main types
pub use model::{Document, DocumentSnapshot, DocumentVersion, LiveDocument};
pub use position::{LineIndex, utf16_offset_to_byte};
pub use store::{DocumentHandle, DocumentStore, StoredDocument};

//! Detection of document edits that race with an in-flight classification.
//!
//! The guard samples the document version before the first backend request
//! and compares it with a second sample once every response has arrived. Any
//! difference invalidates the whole operation; nothing is partially kept.

use crate::document::{DocumentVersion, LiveDocument};

/// Version sample taken before the first backend request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StalenessGuard {
    before: DocumentVersion,
}

/// The document changed (or closed) while requests were in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stale {
    pub before: DocumentVersion,
    pub after: Option<DocumentVersion>,
}

impl StalenessGuard {
    /// Sample the current version; `None` if the document is already closed.
    pub fn capture<D: LiveDocument + ?Sized>(document: &D) -> Option<Self> {
        document.version().map(Self::from_version)
    }

    pub fn from_version(before: DocumentVersion) -> Self {
        Self { before }
    }

    pub fn version(&self) -> DocumentVersion {
        self.before
    }

    /// Sample the version again and compare it with the captured one.
    pub fn validate<D: LiveDocument + ?Sized>(&self, document: &D) -> Result<(), Stale> {
        let after = document.version();
        if after == Some(self.before) {
            Ok(())
        } else {
            Err(Stale {
                before: self.before,
                after,
            })
        }
    }
}

use crate::document::{Document, DocumentSnapshot, DocumentVersion, LiveDocument};
use dashmap::DashMap;
use dashmap::mapref::one::Ref;
use std::ops::Deref;
use url::Url;

// The central store for all open documents.
pub struct DocumentStore {
    documents: DashMap<Url, Document>,
}

pub struct DocumentHandle<'a> {
    inner: Ref<'a, Url, Document>,
}

impl<'a> DocumentHandle<'a> {
    fn new(inner: Ref<'a, Url, Document>) -> Self {
        Self { inner }
    }
}

impl<'a> Deref for DocumentHandle<'a> {
    type Target = Document;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self {
            documents: DashMap::new(),
        }
    }
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self, uri: Url, text: String, version: DocumentVersion, language_id: String) {
        self.documents
            .insert(uri, Document::new(text, version, language_id));
    }

    /// Replace the content of an open document.
    ///
    /// Returns `false` if the document is not open.
    pub fn update(&self, uri: &Url, text: String, version: DocumentVersion) -> bool {
        match self.documents.get_mut(uri) {
            Some(mut doc) => {
                doc.update(text, version);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, uri: &Url) -> Option<DocumentHandle<'_>> {
        self.documents.get(uri).map(DocumentHandle::new)
    }

    pub fn version(&self, uri: &Url) -> Option<DocumentVersion> {
        self.documents.get(uri).map(|doc| doc.version())
    }

    pub fn snapshot(&self, uri: &Url) -> Option<DocumentSnapshot> {
        self.documents.get(uri).map(|doc| doc.snapshot())
    }

    pub fn remove(&self, uri: &Url) -> Option<Document> {
        self.documents.remove(uri).map(|(_, doc)| doc)
    }

    /// Borrow a document as a [`LiveDocument`] known to the backend as
    /// `file_id`.
    pub fn live<'a>(&'a self, uri: &'a Url, file_id: String) -> StoredDocument<'a> {
        StoredDocument {
            store: self,
            uri,
            file_id,
        }
    }
}

/// A [`LiveDocument`] that reads through to the store on every call.
///
/// No map guard is held between calls, so it can be kept across await points
/// while edits land in the store.
pub struct StoredDocument<'a> {
    store: &'a DocumentStore,
    uri: &'a Url,
    file_id: String,
}

impl LiveDocument for StoredDocument<'_> {
    fn file_id(&self) -> &str {
        &self.file_id
    }

    fn version(&self) -> Option<DocumentVersion> {
        self.store.version(self.uri)
    }

    fn snapshot(&self) -> Option<DocumentSnapshot> {
        self.store.snapshot(self.uri)
    }
}

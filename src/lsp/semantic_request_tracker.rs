//! Supersession of in-flight semantic token requests.
//!
//! A new semantic token request for a URI cancels any older in-flight request
//! for that URI through its `CancellationToken`. The older request then stops
//! awaiting the backend and answers `null`.

use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Monotonically increasing request ID for tracking
static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

fn next_request_id() -> u64 {
    NEXT_REQUEST_ID.fetch_add(1, Ordering::SeqCst)
}

/// A tracked request: its ID and the token cancelled when it is superseded.
#[derive(Debug, Clone)]
pub struct TrackedRequest {
    pub id: u64,
    pub cancel: CancellationToken,
}

/// Tracks the newest semantic token request of each URI
#[derive(Debug, Clone, Default)]
pub struct SemanticRequestTracker {
    active_requests: Arc<DashMap<Url, TrackedRequest>>,
}

impl SemanticRequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a request for `uri`, cancelling the previous one.
    pub fn start_request(&self, uri: &Url) -> TrackedRequest {
        let request = TrackedRequest {
            id: next_request_id(),
            cancel: CancellationToken::new(),
        };
        if let Some(previous) = self.active_requests.insert(uri.clone(), request.clone()) {
            previous.cancel.cancel();
        }
        request
    }

    /// Whether `request_id` is still the newest request for `uri`.
    pub fn is_active(&self, uri: &Url, request_id: u64) -> bool {
        self.active_requests
            .get(uri)
            .map(|entry| entry.id == request_id)
            .unwrap_or(false)
    }

    /// Stop tracking a request if it is still the newest one.
    pub fn finish_request(&self, uri: &Url, request_id: u64) {
        self.active_requests
            .remove_if(uri, |_, request| request.id == request_id);
    }

    /// Cancel the in-flight request for `uri`, e.g. when it is closed.
    pub fn cancel_all_for_uri(&self, uri: &Url) {
        if let Some((_, request)) = self.active_requests.remove(uri) {
            request.cancel.cancel();
        }
    }

    /// Cancel every in-flight request.
    pub fn cancel_all(&self) {
        for entry in self.active_requests.iter() {
            entry.cancel.cancel();
        }
        self.active_requests.clear();
    }
}

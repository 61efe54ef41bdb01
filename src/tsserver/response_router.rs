//! Routing of tsserver responses to the tasks awaiting them.
//!
//! A request is registered under its `seq` before it is written; the reader
//! task routes each response by `request_seq` to the matching oneshot sender.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::oneshot;

use super::protocol::Response;

/// Outcome delivered to a waiter: the response, or the reason the connection
/// gave up on it.
pub type Routed = Result<Response, String>;

pub(crate) struct ResponseRouter {
    pending: Mutex<HashMap<u64, oneshot::Sender<Routed>>>,
}

impl ResponseRouter {
    pub(crate) fn new() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Register `seq` and return the receiver for its response.
    ///
    /// Returns `None` if `seq` is already pending.
    pub(crate) fn register(&self, seq: u64) -> Option<oneshot::Receiver<Routed>> {
        let (tx, rx) = oneshot::channel();
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if pending.contains_key(&seq) {
            return None;
        }
        pending.insert(seq, tx);
        Some(rx)
    }

    /// Deliver a response to its waiter.
    ///
    /// Returns `false` when nobody waits for it (unknown, abandoned or
    /// already answered).
    pub(crate) fn route(&self, response: Response) -> bool {
        let tx = {
            let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
            pending.remove(&response.request_seq)
        };
        match tx {
            Some(sender) => sender.send(Ok(response)).is_ok(),
            None => false,
        }
    }

    /// Forget a pending request without answering it.
    pub(crate) fn remove(&self, seq: u64) -> bool {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        pending.remove(&seq).is_some()
    }

    pub(crate) fn pending_count(&self) -> usize {
        let pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        pending.len()
    }

    /// Fail every pending request, e.g. when the reader hits end of stream.
    pub(crate) fn fail_all(&self, reason: &str) {
        let entries: Vec<_> = {
            let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
            pending.drain().collect()
        };
        for (_, tx) in entries {
            let _ = tx.send(Err(reason.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(request_seq: u64) -> Response {
        Response {
            request_seq,
            command: "status".to_string(),
            success: true,
            message: None,
            body: None,
        }
    }

    #[test]
    fn register_tracks_pending_requests() {
        let router = ResponseRouter::new();
        assert_eq!(router.pending_count(), 0);

        let rx = router.register(1);
        assert!(rx.is_some());
        assert_eq!(router.pending_count(), 1);
    }

    #[test]
    fn duplicate_seq_is_refused() {
        let router = ResponseRouter::new();
        let _rx = router.register(1).unwrap();
        assert!(router.register(1).is_none());
        assert_eq!(router.pending_count(), 1);
    }

    #[tokio::test]
    async fn route_delivers_to_waiter() {
        let router = ResponseRouter::new();
        let rx = router.register(42).unwrap();

        assert!(router.route(response(42)));

        let received = rx.await.unwrap().unwrap();
        assert_eq!(received.request_seq, 42);
        assert_eq!(router.pending_count(), 0);
    }

    #[test]
    fn route_for_unknown_seq_is_dropped() {
        let router = ResponseRouter::new();
        assert!(!router.route(response(999)));
    }

    #[test]
    fn route_after_remove_is_dropped() {
        let router = ResponseRouter::new();
        let _rx = router.register(5).unwrap();

        assert!(router.remove(5));
        assert!(!router.remove(5));
        assert!(!router.route(response(5)));
    }

    #[tokio::test]
    async fn fail_all_answers_every_waiter() {
        let router = ResponseRouter::new();
        let rx1 = router.register(1).unwrap();
        let rx2 = router.register(2).unwrap();

        router.fail_all("tsserver exited");

        assert_eq!(rx1.await.unwrap().unwrap_err(), "tsserver exited");
        assert_eq!(rx2.await.unwrap().unwrap_err(), "tsserver exited");
        assert_eq!(router.pending_count(), 0);
    }
}

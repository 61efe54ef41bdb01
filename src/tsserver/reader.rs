//! Background task draining tsserver stdout.
//!
//! Responses are routed to their waiters; events are logged and dropped.
//! On end of stream or a read error every pending request is failed.

use std::sync::Arc;

use log::{debug, warn};
use tokio::io::AsyncRead;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::connection::MessageReader;
use super::protocol::Message;
use super::response_router::ResponseRouter;

/// Handle to a running reader task; cancels it on drop.
pub(crate) struct ReaderTaskHandle {
    join_handle: JoinHandle<()>,
    cancel_token: CancellationToken,
}

impl ReaderTaskHandle {
    pub(crate) fn is_finished(&self) -> bool {
        self.join_handle.is_finished()
    }
}

impl Drop for ReaderTaskHandle {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

pub(crate) fn spawn_reader_task<R>(
    reader: MessageReader<R>,
    router: Arc<ResponseRouter>,
) -> ReaderTaskHandle
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let cancel_token = CancellationToken::new();
    let join_handle = tokio::spawn(reader_loop(reader, router, cancel_token.clone()));
    ReaderTaskHandle {
        join_handle,
        cancel_token,
    }
}

async fn reader_loop<R>(
    mut reader: MessageReader<R>,
    router: Arc<ResponseRouter>,
    cancel_token: CancellationToken,
) where
    R: AsyncRead + Unpin,
{
    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => {
                debug!(target: "tsclassify::tsserver::reader", "Reader task cancelled");
                router.fail_all("tsserver connection shut down");
                break;
            }
            result = reader.read_message() => match result {
                Ok(Some(message)) => handle_message(message, &router),
                Ok(None) => {
                    debug!(target: "tsclassify::tsserver::reader", "tsserver stdout closed");
                    router.fail_all("tsserver exited");
                    break;
                }
                Err(e) => {
                    warn!(
                        target: "tsclassify::tsserver::reader",
                        "Reader error: {}, failing pending requests",
                        e
                    );
                    router.fail_all(&format!("tsserver reader error: {}", e));
                    break;
                }
            }
        }
    }
}

fn handle_message(message: Message, router: &ResponseRouter) {
    match message {
        Message::Response(response) => {
            let seq = response.request_seq;
            if !router.route(response) {
                debug!(
                    target: "tsclassify::tsserver::reader",
                    "Response for abandoned request {}, dropping",
                    seq
                );
            }
        }
        Message::Event(event) => {
            debug!(
                target: "tsclassify::tsserver::reader",
                "Received event: {}, skipping",
                event.event
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tsserver::protocol::{Event, Response};
    use tokio::io::AsyncWriteExt;

    #[test]
    fn handle_message_routes_response() {
        let router = ResponseRouter::new();
        let _rx = router.register(1).unwrap();

        handle_message(
            Message::Response(Response {
                request_seq: 1,
                command: "status".to_string(),
                success: true,
                message: None,
                body: None,
            }),
            &router,
        );

        assert_eq!(router.pending_count(), 0);
    }

    #[test]
    fn handle_message_ignores_events() {
        let router = ResponseRouter::new();
        let _rx = router.register(1).unwrap();

        handle_message(
            Message::Event(Event {
                event: "projectLoadingStart".to_string(),
                body: None,
            }),
            &router,
        );

        assert_eq!(router.pending_count(), 1);
    }

    #[tokio::test]
    async fn reader_task_routes_then_fails_rest_on_eof() {
        let (mut server_side, client_side) = tokio::io::duplex(4096);
        let router = Arc::new(ResponseRouter::new());
        let answered = router.register(1).unwrap();
        let orphaned = router.register(2).unwrap();

        let _handle = spawn_reader_task(MessageReader::new(client_side), Arc::clone(&router));

        let body = r#"{"seq":0,"type":"response","command":"status","request_seq":1,"success":true}"#;
        server_side
            .write_all(format!("Content-Length: {}\r\n\r\n{}\n", body.len(), body).as_bytes())
            .await
            .unwrap();
        drop(server_side);

        let response = answered.await.unwrap().unwrap();
        assert!(response.success);
        assert_eq!(orphaned.await.unwrap().unwrap_err(), "tsserver exited");
    }

    #[tokio::test]
    async fn dropping_handle_fails_pending_requests() {
        let (_server_side, client_side) = tokio::io::duplex(64);
        let router = Arc::new(ResponseRouter::new());
        let rx = router.register(9).unwrap();

        let handle = spawn_reader_task(MessageReader::new(client_side), Arc::clone(&router));
        drop(handle);

        assert!(rx.await.unwrap().is_err());
    }
}

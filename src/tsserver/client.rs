//! Request/response client over a running tsserver.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;
use serde_json::json;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::process::Child;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::analysis::semantic::{
    ClassificationRequest, ClassificationResponse, ClassificationSource,
};
use crate::error::{ClassifyError, ClassifyResult};

use super::connection::{MessageReader, MessageWriter, TsServerProcess};
use super::protocol::{
    EncodedSemanticClassificationsArgs, OpenFile, Request, Response,
    SemanticClassificationFormat, StatusBody, UpdateOpenArgs, command,
};
use super::reader::{ReaderTaskHandle, spawn_reader_task};
use super::response_router::ResponseRouter;
use super::version::ApiVersion;

/// How long `shutdown` waits for tsserver to exit on its own.
const EXIT_GRACE_PERIOD: Duration = Duration::from_secs(1);

type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Options for starting a tsserver.
#[derive(Debug, Clone)]
pub struct TsServerConfig {
    /// Program followed by its arguments
    pub cmd: Vec<String>,
    /// Per-request timeout; `None` waits indefinitely
    pub request_timeout: Option<Duration>,
}

/// Unregisters a waiter when the request future completes or is dropped.
struct PendingGuard<'a> {
    router: &'a ResponseRouter,
    seq: u64,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.router.remove(self.seq);
    }
}

/// Connection to one tsserver process.
pub struct TsServerClient {
    writer: Mutex<MessageWriter<BoxedWriter>>,
    router: Arc<ResponseRouter>,
    reader: ReaderTaskHandle,
    child: Mutex<Option<Child>>,
    next_seq: AtomicU64,
    request_timeout: Option<Duration>,
}

impl std::fmt::Debug for TsServerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TsServerClient")
            .field("next_seq", &self.next_seq.load(Ordering::SeqCst))
            .field("pending", &self.router.pending_count())
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl TsServerClient {
    /// Spawn tsserver and start draining its output.
    pub fn spawn(config: &TsServerConfig) -> ClassifyResult<Self> {
        let TsServerProcess {
            child,
            writer,
            reader,
        } = TsServerProcess::spawn(&config.cmd)?;

        let writer: MessageWriter<BoxedWriter> = MessageWriter::new(Box::new(writer.into_inner()));
        let mut client = Self::from_streams(reader, writer, config.request_timeout);
        client.child = Mutex::new(Some(child));
        Ok(client)
    }

    /// Build a client over arbitrary streams, without a child process.
    pub fn from_streams<R>(
        reader: MessageReader<R>,
        writer: MessageWriter<BoxedWriter>,
        request_timeout: Option<Duration>,
    ) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let router = Arc::new(ResponseRouter::new());
        let reader = spawn_reader_task(reader, Arc::clone(&router));
        Self {
            writer: Mutex::new(writer),
            router,
            reader,
            child: Mutex::new(None),
            next_seq: AtomicU64::new(1),
            request_timeout,
        }
    }

    /// Whether the reader task is still draining tsserver output.
    pub fn is_alive(&self) -> bool {
        !self.reader.is_finished()
    }

    fn next_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::SeqCst)
    }

    async fn write_request<A: Serialize>(
        &self,
        seq: u64,
        command: &str,
        arguments: A,
    ) -> ClassifyResult<()> {
        let mut writer = self.writer.lock().await;
        writer
            .write_message(&Request::new(seq, command, arguments))
            .await
    }

    /// Send a request and wait for its successful response.
    pub async fn execute<A: Serialize>(
        &self,
        command: &str,
        arguments: A,
        cancel: &CancellationToken,
    ) -> ClassifyResult<Response> {
        let seq = self.next_seq();
        let rx = self
            .router
            .register(seq)
            .ok_or_else(|| ClassifyError::protocol(format!("Sequence {} already pending", seq)))?;
        let _pending = PendingGuard {
            router: &self.router,
            seq,
        };
        if !self.is_alive() {
            return Err(ClassifyError::ConnectionClosed);
        }

        log::trace!(target: "tsclassify::tsserver", "-> {} #{}", command, seq);
        self.write_request(seq, command, arguments).await?;

        let timeout = async {
            match self.request_timeout {
                Some(duration) => tokio::time::sleep(duration).await,
                None => std::future::pending().await,
            }
        };

        let routed = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ClassifyError::Cancelled),
            routed = rx => routed.map_err(|_| ClassifyError::ConnectionClosed)?,
            _ = timeout => {
                let timeout_ms = self
                    .request_timeout
                    .map(|d| d.as_millis() as u64)
                    .unwrap_or_default();
                return Err(ClassifyError::Timeout {
                    command: command.to_string(),
                    timeout_ms,
                });
            }
        };

        let response = routed.map_err(|reason| {
            log::debug!(target: "tsclassify::tsserver", "{} #{} failed: {}", command, seq, reason);
            ClassifyError::ConnectionClosed
        })?;

        if !response.success {
            return Err(ClassifyError::backend(
                command,
                response.message.unwrap_or_default(),
            ));
        }
        Ok(response)
    }

    /// Send a request whose response nobody waits for.
    pub async fn execute_without_response<A: Serialize>(
        &self,
        command: &str,
        arguments: A,
    ) -> ClassifyResult<()> {
        let seq = self.next_seq();
        log::trace!(target: "tsclassify::tsserver", "-> {} #{} (no wait)", command, seq);
        self.write_request(seq, command, arguments).await
    }

    /// Ask tsserver for its version.
    pub async fn status(&self) -> ClassifyResult<ApiVersion> {
        let response = self
            .execute(command::STATUS, json!({}), &CancellationToken::new())
            .await?;
        let body = response
            .body
            .ok_or_else(|| ClassifyError::missing_body(command::STATUS))?;
        let status: StatusBody = serde_json::from_value(body)?;
        status.version.parse()
    }

    /// Open or replace the content of a file.
    pub async fn open_file(
        &self,
        file: &str,
        content: &str,
        script_kind: Option<&'static str>,
    ) -> ClassifyResult<()> {
        let args = UpdateOpenArgs {
            open_files: vec![OpenFile {
                file,
                file_content: content,
                script_kind_name: script_kind,
            }],
            ..Default::default()
        };
        self.execute_without_response(command::UPDATE_OPEN, args)
            .await
    }

    pub async fn close_file(&self, file: &str) -> ClassifyResult<()> {
        let args = UpdateOpenArgs {
            closed_files: vec![file],
            ..Default::default()
        };
        self.execute_without_response(command::UPDATE_OPEN, args)
            .await
    }

    /// Ask tsserver to exit, then kill it if it lingers.
    pub async fn shutdown(&self) {
        if let Err(e) = self
            .execute_without_response(command::EXIT, json!({}))
            .await
        {
            log::debug!(target: "tsclassify::tsserver", "Failed to send exit: {}", e);
        }

        let Some(mut child) = self.child.lock().await.take() else {
            return;
        };
        match tokio::time::timeout(EXIT_GRACE_PERIOD, child.wait()).await {
            Ok(Ok(status)) => {
                log::info!(target: "tsclassify::tsserver", "tsserver exited with {}", status);
            }
            Ok(Err(e)) => {
                log::warn!(target: "tsclassify::tsserver", "Failed to wait for tsserver: {}", e);
            }
            Err(_) => {
                log::warn!(target: "tsclassify::tsserver", "tsserver did not exit, killing it");
                if let Err(e) = child.kill().await {
                    log::warn!(target: "tsclassify::tsserver", "Failed to kill tsserver: {}", e);
                }
            }
        }
    }
}

impl ClassificationSource for TsServerClient {
    async fn classify(
        &self,
        request: &ClassificationRequest,
        cancel: &CancellationToken,
    ) -> ClassifyResult<ClassificationResponse> {
        let args = EncodedSemanticClassificationsArgs {
            file: &request.file,
            start: request.start,
            length: request.length,
            format: SemanticClassificationFormat::TwentyTwenty,
        };
        let response = self
            .execute(command::ENCODED_SEMANTIC_CLASSIFICATIONS_FULL, args, cancel)
            .await?;
        let body = response.body.ok_or_else(|| {
            ClassifyError::missing_body(command::ENCODED_SEMANTIC_CLASSIFICATIONS_FULL)
        })?;
        Ok(serde_json::from_value(body)?)
    }
}

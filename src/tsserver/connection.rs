//! Process handle and message framing for a tsserver child process.
//!
//! tsserver reads one JSON request per line on stdin and writes every message
//! on stdout as `Content-Length: N\r\n\r\n{json}`, usually followed by a
//! newline that is not counted in `N`.

use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use crate::error::{ClassifyError, ClassifyResult};

use super::protocol::Message;

const CONTENT_LENGTH: &str = "Content-Length:";

/// A spawned tsserver with its stdio split into writer and reader halves.
pub struct TsServerProcess {
    pub child: Child,
    pub writer: MessageWriter<ChildStdin>,
    pub reader: MessageReader<ChildStdout>,
}

impl std::fmt::Debug for TsServerProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TsServerProcess")
            .field("pid", &self.child.id())
            .finish()
    }
}

impl TsServerProcess {
    /// Spawn `cmd[0]` with `cmd[1..]` as arguments.
    ///
    /// The child is killed when the handle is dropped.
    pub fn spawn(cmd: &[String]) -> ClassifyResult<Self> {
        let (program, args) = cmd
            .split_first()
            .ok_or_else(|| ClassifyError::config("tsserver command is empty"))?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ClassifyError::Spawn {
                command: program.clone(),
                source,
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ClassifyError::protocol(format!("No stdin for {}", program)))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ClassifyError::protocol(format!("No stdout for {}", program)))?;

        log::info!(
            target: "tsclassify::tsserver",
            "Spawned {} (pid {:?})",
            program,
            child.id()
        );

        Ok(Self {
            child,
            writer: MessageWriter::new(stdin),
            reader: MessageReader::new(stdout),
        })
    }
}

/// Writes line-delimited JSON requests.
pub struct MessageWriter<W> {
    inner: W,
}

impl<W: AsyncWrite + Unpin> MessageWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    pub async fn write_message<T: serde::Serialize>(&mut self, message: &T) -> ClassifyResult<()> {
        let mut line = serde_json::to_vec(message)?;
        line.push(b'\n');
        self.inner.write_all(&line).await?;
        self.inner.flush().await?;
        Ok(())
    }
}

/// Reads `Content-Length` framed messages.
pub struct MessageReader<R> {
    inner: BufReader<R>,
}

impl<R: AsyncRead + Unpin> MessageReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner: BufReader::new(inner),
        }
    }

    /// Read the next message.
    ///
    /// Returns `Ok(None)` on a clean end of stream between messages.
    pub async fn read_message(&mut self) -> ClassifyResult<Option<Message>> {
        let Some(length) = self.read_header().await? else {
            return Ok(None);
        };

        let mut body = vec![0u8; length];
        self.inner.read_exact(&mut body).await?;
        let message = serde_json::from_slice(&body)?;
        Ok(Some(message))
    }

    /// Parse header lines up to the blank separator, skipping the stray
    /// newline that trails the previous body.
    async fn read_header(&mut self) -> ClassifyResult<Option<usize>> {
        let mut content_length = None;
        let mut line = String::new();

        loop {
            line.clear();
            if self.inner.read_line(&mut line).await? == 0 {
                return match content_length {
                    None => Ok(None),
                    Some(_) => Err(ClassifyError::ConnectionClosed),
                };
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                if let Some(length) = content_length {
                    return Ok(Some(length));
                }
                continue;
            }

            match trimmed.strip_prefix(CONTENT_LENGTH) {
                Some(value) => {
                    let length = value.trim().parse::<usize>().map_err(|e| {
                        ClassifyError::protocol(format!("Invalid Content-Length {:?}: {}", value, e))
                    })?;
                    content_length = Some(length);
                }
                // Other headers are tolerated.
                None if content_length.is_some() || trimmed.contains(':') => {}
                None => {
                    return Err(ClassifyError::protocol(format!(
                        "Expected Content-Length header, got {:?}",
                        trimmed
                    )));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;

    fn frame(body: &str) -> String {
        format!("Content-Length: {}\r\n\r\n{}\n", body.len(), body)
    }

    #[tokio::test]
    async fn reads_consecutive_framed_messages() {
        let first = r#"{"seq":0,"type":"event","event":"typingsInstallerPid","body":{"pid":7}}"#;
        let second = r#"{"seq":0,"type":"response","command":"status","request_seq":1,"success":true,"body":{"version":"5.4.5"}}"#;
        let input = format!("{}{}", frame(first), frame(second));
        let mut reader = MessageReader::new(Cursor::new(input.into_bytes()));

        let event = reader.read_message().await.unwrap().unwrap();
        assert!(matches!(event, Message::Event(e) if e.event == "typingsInstallerPid"));

        let response = reader.read_message().await.unwrap().unwrap();
        assert!(matches!(response, Message::Response(r) if r.request_seq == 1));

        assert!(reader.read_message().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn body_length_counts_bytes_not_chars() {
        let body = r#"{"seq":0,"type":"event","event":"é"}"#;
        let mut reader = MessageReader::new(Cursor::new(frame(body).into_bytes()));

        let message = reader.read_message().await.unwrap().unwrap();
        assert!(matches!(message, Message::Event(e) if e.event == "é"));
    }

    #[tokio::test]
    async fn garbage_header_is_a_protocol_error() {
        let mut reader = MessageReader::new(Cursor::new(b"hello world\r\n\r\n".to_vec()));
        let error = reader.read_message().await.unwrap_err();
        assert!(matches!(error, ClassifyError::Protocol { .. }));
    }

    #[tokio::test]
    async fn truncated_header_is_connection_closed() {
        let mut reader = MessageReader::new(Cursor::new(b"Content-Length: 10\r\n".to_vec()));
        let error = reader.read_message().await.unwrap_err();
        assert!(matches!(error, ClassifyError::ConnectionClosed));
    }

    #[tokio::test]
    async fn writer_emits_one_json_line_per_request() {
        let mut buffer = Vec::new();
        {
            let mut writer = MessageWriter::new(&mut buffer);
            writer
                .write_message(&json!({ "seq": 1, "type": "request", "command": "status" }))
                .await
                .unwrap();
            writer
                .write_message(&json!({ "seq": 2, "type": "request", "command": "exit" }))
                .await
                .unwrap();
        }

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["command"], "status");
    }

    #[test]
    fn empty_command_is_rejected() {
        let error = TsServerProcess::spawn(&[]).unwrap_err();
        assert!(matches!(error, ClassifyError::Config { .. }));
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let error =
            TsServerProcess::spawn(&["tsclassify-no-such-program".to_string()]).unwrap_err();
        assert!(matches!(error, ClassifyError::Spawn { .. }));
    }
}

//! LSP client for E2E tests.
//!
//! Talks JSON-RPC 2.0 to the tsclassify binary over stdin/stdout.

use serde_json::{Value, json};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{Duration, Instant};

/// LSP client driving a tsclassify child process.
///
/// Handles Content-Length framing, request/response matching and skips
/// server-initiated notifications.
pub struct LspClient {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
    request_id: i64,
}

impl LspClient {
    /// Spawn tsclassify with `config_home` as its user config directory, so
    /// the developer's own config never leaks into tests.
    pub fn new(config_home: &Path) -> Self {
        let mut child = Command::new(env!("CARGO_BIN_EXE_tsclassify"))
            .env("XDG_CONFIG_HOME", config_home)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("Failed to spawn tsclassify binary");

        let stdin = child.stdin.take().expect("Failed to get stdin");
        let stdout = BufReader::new(child.stdout.take().expect("Failed to get stdout"));

        Self {
            child,
            stdin: Some(stdin),
            stdout,
            request_id: 0,
        }
    }

    /// Send an LSP request and wait for its response.
    pub fn send_request(&mut self, method: &str, params: Value) -> Value {
        self.request_id += 1;
        let request_id = self.request_id;

        let mut request = serde_json::Map::new();
        request.insert("jsonrpc".to_string(), json!("2.0"));
        request.insert("id".to_string(), json!(request_id));
        request.insert("method".to_string(), json!(method));
        if !params.is_null() {
            request.insert("params".to_string(), params);
        }

        self.send_message(&Value::Object(request));
        self.receive_response_for_id(request_id)
    }

    pub fn send_notification(&mut self, method: &str, params: Value) {
        let mut notification = serde_json::Map::new();
        notification.insert("jsonrpc".to_string(), json!("2.0"));
        notification.insert("method".to_string(), json!(method));
        if !params.is_null() {
            notification.insert("params".to_string(), params);
        }

        self.send_message(&Value::Object(notification));
    }

    /// `initialize` + `initialized` with the given initialization options.
    pub fn initialize(&mut self, root: &Path, initialization_options: Value) -> Value {
        let root_uri = format!("file://{}", root.display());
        let response = self.send_request(
            "initialize",
            json!({
                "processId": std::process::id(),
                "rootUri": root_uri,
                "capabilities": {},
                "initializationOptions": initialization_options,
            }),
        );
        self.send_notification("initialized", json!({}));
        response
    }

    /// `shutdown` + `exit`, then wait for the process to terminate.
    pub fn shutdown(&mut self) -> Option<i32> {
        let response = self.send_request("shutdown", Value::Null);
        assert!(response.get("error").is_none(), "shutdown failed: {response}");
        self.send_notification("exit", Value::Null);
        self.stdin = None;

        let deadline = Instant::now() + Duration::from_secs(10);
        while Instant::now() < deadline {
            if let Ok(Some(status)) = self.child.try_wait() {
                return status.code();
            }
            std::thread::sleep(Duration::from_millis(20));
        }
        panic!("tsclassify did not exit after shutdown");
    }

    fn send_message(&mut self, message: &Value) {
        let body = serde_json::to_string(message).expect("Failed to serialize message");
        let header = format!("Content-Length: {}\r\n\r\n", body.len());

        let stdin = self.stdin.as_mut().expect("stdin already closed");
        stdin
            .write_all(header.as_bytes())
            .expect("Failed to write header");
        stdin
            .write_all(body.as_bytes())
            .expect("Failed to write body");
        stdin.flush().expect("Failed to flush stdin");
    }

    /// Receive the response for `expected_id`, skipping notifications and
    /// server-to-client requests. Gives up after 30 seconds or 1000 messages.
    fn receive_response_for_id(&mut self, expected_id: i64) -> Value {
        const MAX_MESSAGES: u32 = 1000;
        const TIMEOUT: Duration = Duration::from_secs(30);

        let start_time = Instant::now();
        let mut message_count = 0u32;

        loop {
            if start_time.elapsed() > TIMEOUT {
                panic!("Timeout waiting for response with id {}", expected_id);
            }
            if message_count >= MAX_MESSAGES {
                panic!(
                    "Exceeded {} messages waiting for response with id {}",
                    MAX_MESSAGES, expected_id
                );
            }

            let message = self.receive_message();
            message_count += 1;

            if message.get("method").is_some() {
                continue;
            }
            if message.get("id").and_then(Value::as_i64) == Some(expected_id) {
                return message;
            }
        }
    }

    fn receive_message(&mut self) -> Value {
        let mut header = String::new();
        loop {
            header.clear();
            let read = self
                .stdout
                .read_line(&mut header)
                .expect("Failed to read header line");
            assert!(read > 0, "tsclassify closed stdout");

            if let Some(value) = header.strip_prefix("Content-Length:") {
                let len: usize = value.trim().parse().expect("Invalid Content-Length");

                let mut empty = String::new();
                self.stdout
                    .read_line(&mut empty)
                    .expect("Failed to read empty line");

                let mut body = vec![0u8; len];
                std::io::Read::read_exact(&mut self.stdout, &mut body)
                    .expect("Failed to read body");

                return serde_json::from_slice(&body).expect("Failed to parse message");
            }
        }
    }
}

impl Drop for LspClient {
    fn drop(&mut self) {
        let _ = self.child.kill();
    }
}

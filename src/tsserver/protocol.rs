//! Typed messages of the tsserver protocol used by this crate.
//!
//! Requests are `{"seq", "type": "request", "command", "arguments"}` objects.
//! The server answers with `response` messages correlated by `request_seq`
//! and emits unsolicited `event` messages.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

/// Command names.
pub mod command {
    pub const ENCODED_SEMANTIC_CLASSIFICATIONS_FULL: &str = "encodedSemanticClassifications-full";
    pub const UPDATE_OPEN: &str = "updateOpen";
    pub const STATUS: &str = "status";
    pub const EXIT: &str = "exit";
}

/// Outgoing request envelope.
#[derive(Debug, Serialize)]
pub struct Request<'a, A> {
    pub seq: u64,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub command: &'a str,
    pub arguments: A,
}

impl<'a, A: Serialize> Request<'a, A> {
    pub fn new(seq: u64, command: &'a str, arguments: A) -> Self {
        Self {
            seq,
            kind: "request",
            command,
            arguments,
        }
    }
}

/// Incoming message.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Message {
    Response(Response),
    Event(Event),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Response {
    pub request_seq: u64,
    pub command: String,
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub body: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    pub event: String,
    #[serde(default)]
    pub body: Option<Value>,
}

/// Encoding of classification codes in a semantic classification response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SemanticClassificationFormat {
    /// Base classification identifiers only
    #[serde(rename = "original")]
    Original,
    /// Packed token type and modifiers, with base identifiers as fallback
    #[serde(rename = "2020")]
    TwentyTwenty,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedSemanticClassificationsArgs<'a> {
    pub file: &'a str,
    pub start: u32,
    pub length: u32,
    pub format: SemanticClassificationFormat,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenFile<'a> {
    pub file: &'a str,
    pub file_content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_kind_name: Option<&'static str>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOpenArgs<'a> {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub open_files: Vec<OpenFile<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub closed_files: Vec<&'a str>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusBody {
    pub version: String,
}

/// Prefix tsserver uses for files that do not live on disk.
const IN_MEMORY_PREFIX: &str = "^";

/// Map a document URI to the file name tsserver knows it by.
///
/// `file:` URIs become filesystem paths; anything else becomes an in-memory
/// name `^/<scheme>/<authority>/<path>`.
pub fn file_id_for_uri(uri: &Url) -> String {
    if uri.scheme() == "file"
        && let Ok(path) = uri.to_file_path()
    {
        return path.to_string_lossy().into_owned();
    }

    let authority = match uri.host_str() {
        Some(host) if !host.is_empty() => host,
        _ => "ts-nul-authority",
    };
    // Opaque paths such as `untitled:Untitled-1` have no leading slash
    format!(
        "{}/{}/{}/{}",
        IN_MEMORY_PREFIX,
        uri.scheme(),
        authority,
        uri.path().trim_start_matches('/')
    )
}

/// tsserver script kind for an LSP language id.
pub fn script_kind_for_language(language_id: &str) -> Option<&'static str> {
    match language_id {
        "typescript" => Some("TS"),
        "typescriptreact" => Some("TSX"),
        "javascript" => Some("JS"),
        "javascriptreact" => Some("JSX"),
        _ => None,
    }
}

//! End-to-end semantic token tests against a scripted tsserver.

#![cfg(unix)]

mod helpers;

use helpers::fake_tsserver;
use helpers::lsp_client::LspClient;
use serde_json::{Value, json};
use tempfile::TempDir;

const URI: &str = "file:///project/src/a.ts";
const TEXT: &str = "class A {}\nfunction f() {}\n";

fn start(dir: &TempDir, version: &str, spans: &[u32]) -> (LspClient, Value) {
    let cmd = fake_tsserver::install(dir.path(), version, spans);
    let mut client = LspClient::new(dir.path());
    let response = client.initialize(dir.path(), json!({ "tsserver": { "cmd": cmd } }));

    client.send_notification(
        "textDocument/didOpen",
        json!({
            "textDocument": {
                "uri": URI,
                "languageId": "typescript",
                "version": 1,
                "text": TEXT
            }
        }),
    );
    (client, response)
}

#[test]
fn registers_legend_for_supported_tsserver() {
    let dir = TempDir::new().unwrap();
    let (mut client, response) = start(&dir, "5.4.5", &[]);

    let provider = &response["result"]["capabilities"]["semanticTokensProvider"];
    assert_eq!(provider["full"], json!(true));
    assert_eq!(provider["range"], json!(true));
    assert_eq!(provider["legend"]["tokenTypes"][0], "class");
    assert_eq!(provider["legend"]["tokenModifiers"][0], "declaration");

    client.shutdown();
}

#[test]
fn full_request_returns_encoded_tokens() {
    let dir = TempDir::new().unwrap();
    let (mut client, _) = start(&dir, "5.4.5", &[6, 1, 257, 20, 1, 2817]);

    let response = client.send_request(
        "textDocument/semanticTokens/full",
        json!({ "textDocument": { "uri": URI } }),
    );

    // class A (declaration) at 0:6, function f (declaration) at 1:9
    assert_eq!(
        response["result"]["data"],
        json!([0, 6, 1, 0, 1, 1, 9, 1, 10, 1]),
        "{response}"
    );
    client.shutdown();
}

#[test]
fn range_request_returns_encoded_tokens() {
    let dir = TempDir::new().unwrap();
    let (mut client, _) = start(&dir, "5.4.5", &[6, 1, 11]);

    let response = client.send_request(
        "textDocument/semanticTokens/range",
        json!({
            "textDocument": { "uri": URI },
            "range": {
                "start": { "line": 0, "character": 0 },
                "end": { "line": 0, "character": 10 }
            }
        }),
    );

    assert_eq!(response["result"]["data"], json!([0, 6, 1, 0, 0]), "{response}");
    client.shutdown();
}

#[test]
fn old_tsserver_does_not_register_semantic_tokens() {
    let dir = TempDir::new().unwrap();
    let (mut client, response) = start(&dir, "3.6.2", &[6, 1, 257]);

    assert!(
        response["result"]["capabilities"]
            .get("semanticTokensProvider")
            .is_none()
    );

    let tokens = client.send_request(
        "textDocument/semanticTokens/full",
        json!({ "textDocument": { "uri": URI } }),
    );
    assert!(tokens["result"].is_null());
    client.shutdown();
}

#[test]
fn unknown_document_answers_null() {
    let dir = TempDir::new().unwrap();
    let (mut client, _) = start(&dir, "5.4.5", &[6, 1, 257]);

    let response = client.send_request(
        "textDocument/semanticTokens/full",
        json!({ "textDocument": { "uri": "file:///project/src/unopened.ts" } }),
    );
    assert!(response.get("error").is_none(), "{response}");
    assert!(response["result"].is_null());
    client.shutdown();
}

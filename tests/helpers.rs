//! Shared test helpers for E2E tests.

#[path = "helpers_lsp_client.rs"]
pub mod lsp_client;

#[path = "helpers_fake_tsserver.rs"]
pub mod fake_tsserver;

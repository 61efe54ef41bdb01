//! Client notification wrapper.
//!
//! `ClientNotifier` wraps `tower_lsp_server::Client` so every message shown
//! in the client's log goes through one place.

use tower_lsp_server::Client;
use tower_lsp_server::ls_types::MessageType;

use super::settings::{SettingsEvent, SettingsEventKind};

/// Maps a settings event to the LSP message type it is logged with.
pub(crate) fn message_type_for(kind: SettingsEventKind) -> MessageType {
    match kind {
        SettingsEventKind::Info => MessageType::INFO,
        SettingsEventKind::Warning => MessageType::WARNING,
    }
}

#[derive(Clone)]
pub(crate) struct ClientNotifier {
    client: Client,
}

impl std::fmt::Debug for ClientNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientNotifier")
            .field("client", &self.client)
            .finish()
    }
}

impl ClientNotifier {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    pub(crate) async fn log(&self, level: MessageType, message: impl Into<String>) {
        self.client.log_message(level, message.into()).await;
    }

    pub(crate) async fn log_info(&self, message: impl Into<String>) {
        self.log(MessageType::INFO, message).await;
    }

    pub(crate) async fn log_warning(&self, message: impl Into<String>) {
        self.log(MessageType::WARNING, message).await;
    }

    /// Log a trace message (LOG level in LSP).
    pub(crate) async fn log_trace(&self, message: impl Into<String>) {
        self.log(MessageType::LOG, message).await;
    }

    pub(crate) async fn log_settings_events(&self, events: &[SettingsEvent]) {
        for event in events {
            self.log(message_type_for(event.kind), event.message.clone())
                .await;
        }
    }
}

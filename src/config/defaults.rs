//! Programmed defaults, the lowest configuration layer.

use super::settings::{
    DEFAULT_REQUEST_TIMEOUT_MS, SemanticTokensSettings, TsClassifySettings, TsServerSettings,
};

/// Defaults expressed as a fully populated layer, except for the version,
/// which is probed from tsserver unless configured.
pub fn default_settings() -> TsClassifySettings {
    TsClassifySettings {
        tsserver: Some(TsServerSettings {
            cmd: Some(vec!["tsserver".to_string()]),
            version: None,
            request_timeout_ms: Some(DEFAULT_REQUEST_TIMEOUT_MS),
        }),
        semantic_tokens: Some(SemanticTokensSettings {
            enabled: Some(true),
        }),
    }
}

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::tsserver::ApiVersion;

pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// One configuration layer as written by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TsClassifySettings {
    pub tsserver: Option<TsServerSettings>,
    pub semantic_tokens: Option<SemanticTokensSettings>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TsServerSettings {
    /// Program and arguments used to start tsserver
    pub cmd: Option<Vec<String>>,
    /// API version to assume instead of asking tsserver
    pub version: Option<String>,
    /// Per-request timeout; `0` disables it
    pub request_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticTokensSettings {
    pub enabled: Option<bool>,
}

impl TsClassifySettings {
    /// Overlay `higher` on `self`, field by field.
    pub fn merge(self, higher: Self) -> Self {
        Self {
            tsserver: merge_option(self.tsserver, higher.tsserver, TsServerSettings::merge),
            semantic_tokens: merge_option(
                self.semantic_tokens,
                higher.semantic_tokens,
                SemanticTokensSettings::merge,
            ),
        }
    }
}

impl TsServerSettings {
    fn merge(self, higher: Self) -> Self {
        Self {
            cmd: higher.cmd.or(self.cmd),
            version: higher.version.or(self.version),
            request_timeout_ms: higher.request_timeout_ms.or(self.request_timeout_ms),
        }
    }
}

impl SemanticTokensSettings {
    fn merge(self, higher: Self) -> Self {
        Self {
            enabled: higher.enabled.or(self.enabled),
        }
    }
}

fn merge_option<T>(lower: Option<T>, higher: Option<T>, merge: fn(T, T) -> T) -> Option<T> {
    match (lower, higher) {
        (Some(lower), Some(higher)) => Some(merge(lower, higher)),
        (lower, higher) => higher.or(lower),
    }
}

/// Settings resolved into the values the server runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceSettings {
    pub tsserver_cmd: Vec<String>,
    pub tsserver_version: Option<ApiVersion>,
    pub request_timeout: Option<Duration>,
    pub semantic_tokens_enabled: bool,
}

impl Default for WorkspaceSettings {
    fn default() -> Self {
        Self {
            tsserver_cmd: vec!["tsserver".to_string()],
            tsserver_version: None,
            request_timeout: Some(Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS)),
            semantic_tokens_enabled: true,
        }
    }
}

impl WorkspaceSettings {
    /// Resolve merged settings, collecting a warning for each value that
    /// could not be used.
    pub fn resolve(settings: TsClassifySettings, warnings: &mut Vec<String>) -> Self {
        let mut resolved = Self::default();

        if let Some(tsserver) = settings.tsserver {
            match tsserver.cmd {
                Some(cmd) if cmd.is_empty() => {
                    warnings.push("tsserver.cmd is empty, using the default".to_string());
                }
                Some(cmd) => resolved.tsserver_cmd = cmd,
                None => {}
            }

            if let Some(version) = tsserver.version {
                match version.parse::<ApiVersion>() {
                    Ok(version) => resolved.tsserver_version = Some(version),
                    Err(e) => warnings.push(format!("Ignoring tsserver.version: {}", e)),
                }
            }

            if let Some(timeout_ms) = tsserver.request_timeout_ms {
                resolved.request_timeout =
                    (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms));
            }
        }

        if let Some(enabled) = settings.semantic_tokens.and_then(|s| s.enabled) {
            resolved.semantic_tokens_enabled = enabled;
        }

        resolved
    }
}

//! Configuration model and layer merging.
//!
//! Settings come from four layers, lowest to highest precedence: programmed
//! defaults, the user config file, the project config file and the client's
//! `initializationOptions`. Layers merge field by field; a value set in a
//! higher layer wins.

pub mod defaults;
pub mod settings;
pub mod user;

pub use settings::{
    DEFAULT_REQUEST_TIMEOUT_MS, SemanticTokensSettings, TsClassifySettings, TsServerSettings,
    WorkspaceSettings,
};
pub use user::{UserConfigError, UserConfigResult, load_user_config, user_config_path};

/// File name of both the user and the project config file.
pub const CONFIG_FILE_NAME: &str = "tsclassify.toml";

/// Merge layers in order; later layers override earlier ones.
///
/// Returns `None` only when every layer is `None`.
pub fn merge_all(layers: &[Option<TsClassifySettings>]) -> Option<TsClassifySettings> {
    layers
        .iter()
        .flatten()
        .cloned()
        .reduce(|lower, higher| lower.merge(higher))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_cmd(cmd: &[&str]) -> TsClassifySettings {
        TsClassifySettings {
            tsserver: Some(TsServerSettings {
                cmd: Some(cmd.iter().map(|s| s.to_string()).collect()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn merge_all_of_nothing_is_none() {
        assert_eq!(merge_all(&[]), None);
        assert_eq!(merge_all(&[None, None]), None);
    }

    #[test]
    fn later_layers_win() {
        let merged = merge_all(&[
            Some(with_cmd(&["tsserver"])),
            None,
            Some(with_cmd(&["node", "tsserver.js"])),
        ])
        .unwrap();

        assert_eq!(
            merged.tsserver.unwrap().cmd.unwrap(),
            vec!["node".to_string(), "tsserver.js".to_string()]
        );
    }

    #[test]
    fn unset_fields_fall_through() {
        let lower = TsClassifySettings {
            tsserver: Some(TsServerSettings {
                version: Some("5.4.5".to_string()),
                request_timeout_ms: Some(500),
                ..Default::default()
            }),
            semantic_tokens: Some(SemanticTokensSettings {
                enabled: Some(false),
            }),
        };

        let merged = merge_all(&[Some(lower), Some(with_cmd(&["tsserver", "--stdio"]))]).unwrap();

        let tsserver = merged.tsserver.unwrap();
        assert_eq!(tsserver.version.as_deref(), Some("5.4.5"));
        assert_eq!(tsserver.request_timeout_ms, Some(500));
        assert_eq!(tsserver.cmd.unwrap().len(), 2);
        assert_eq!(merged.semantic_tokens.unwrap().enabled, Some(false));
    }
}

use crate::config::{
    CONFIG_FILE_NAME, TsClassifySettings, WorkspaceSettings, defaults::default_settings,
    load_user_config, merge_all,
};
use serde_json::Value;
use std::fs;
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingsEventKind {
    Info,
    Warning,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettingsEvent {
    pub kind: SettingsEventKind,
    pub message: String,
}

impl SettingsEvent {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: SettingsEventKind::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: SettingsEventKind::Warning,
            message: message.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct SettingsLoadOutcome {
    pub settings: WorkspaceSettings,
    pub events: Vec<SettingsEvent>,
}

/// Load and resolve all configuration layers.
///
/// A layer that cannot be read or parsed is skipped with a warning event.
pub fn load_settings(
    root_path: Option<&Path>,
    initialization_options: Option<Value>,
) -> SettingsLoadOutcome {
    let mut events = Vec::new();

    // Layer 1: programmed defaults
    let defaults = Some(default_settings());

    // Layer 2: user config
    let user_config = load_user_config_with_events(&mut events);

    // Layer 3: project config at <root>/tsclassify.toml
    let project_settings = load_toml_settings(root_path, &mut events);

    // Layer 4: initializationOptions
    let override_settings =
        initialization_options.and_then(|value| parse_override_settings(value, &mut events));

    let merged = merge_all(&[defaults, user_config, project_settings, override_settings])
        .unwrap_or_default();

    let mut warnings = Vec::new();
    let settings = WorkspaceSettings::resolve(merged, &mut warnings);
    events.extend(warnings.into_iter().map(SettingsEvent::warning));

    SettingsLoadOutcome { settings, events }
}

fn load_user_config_with_events(events: &mut Vec<SettingsEvent>) -> Option<TsClassifySettings> {
    match load_user_config() {
        Ok(Some(settings)) => {
            events.push(SettingsEvent::info("Loaded user config"));
            Some(settings)
        }
        Ok(None) => None,
        Err(err) => {
            events.push(SettingsEvent::warning(format!(
                "Failed to load user config: {}",
                err
            )));
            None
        }
    }
}

fn load_toml_settings(
    root_path: Option<&Path>,
    events: &mut Vec<SettingsEvent>,
) -> Option<TsClassifySettings> {
    let root = root_path?;
    let config_path = root.join(CONFIG_FILE_NAME);
    if !config_path.exists() {
        return None;
    }

    events.push(SettingsEvent::info(format!(
        "Found config file: {}",
        config_path.display()
    )));

    match fs::read_to_string(&config_path) {
        Ok(contents) => match toml::from_str::<TsClassifySettings>(&contents) {
            Ok(settings) => Some(settings),
            Err(err) => {
                events.push(SettingsEvent::warning(format!(
                    "Failed to parse {}: {}",
                    CONFIG_FILE_NAME, err
                )));
                None
            }
        },
        Err(err) => {
            events.push(SettingsEvent::warning(format!(
                "Failed to read {}: {}",
                CONFIG_FILE_NAME, err
            )));
            None
        }
    }
}

fn parse_override_settings(
    value: Value,
    events: &mut Vec<SettingsEvent>,
) -> Option<TsClassifySettings> {
    if value.is_null() {
        return None;
    }
    match serde_json::from_value::<TsClassifySettings>(value) {
        Ok(settings) => {
            events.push(SettingsEvent::info("Parsed initialization options"));
            Some(settings)
        }
        Err(err) => {
            events.push(SettingsEvent::warning(format!(
                "Failed to parse initialization options: {}",
                err
            )));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tsserver::ApiVersion;
    use serial_test::serial;
    use std::env;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Point XDG_CONFIG_HOME at `dir` for the duration of `f`.
    fn with_user_config_dir<T>(dir: &Path, f: impl FnOnce() -> T) -> T {
        let original_xdg = env::var_os("XDG_CONFIG_HOME");
        // SAFETY: #[serial(xdg_env)] prevents concurrent modification of XDG_CONFIG_HOME
        unsafe {
            env::set_var("XDG_CONFIG_HOME", dir);
        }
        let result = f();
        // SAFETY: #[serial(xdg_env)] prevents concurrent modification of XDG_CONFIG_HOME
        unsafe {
            match original_xdg {
                Some(val) => env::set_var("XDG_CONFIG_HOME", val),
                None => env::remove_var("XDG_CONFIG_HOME"),
            }
        }
        result
    }

    fn write_user_config(dir: &TempDir, contents: &str) {
        let config_dir = dir.path().join("tsclassify");
        fs::create_dir_all(&config_dir).expect("failed to create config dir");
        fs::write(config_dir.join(CONFIG_FILE_NAME), contents).expect("failed to write user config");
    }

    #[test]
    #[serial(xdg_env)]
    fn test_load_settings_without_any_config_uses_defaults() {
        let user_dir = TempDir::new().unwrap();
        let outcome = with_user_config_dir(user_dir.path(), || load_settings(None, None));

        assert_eq!(outcome.settings, WorkspaceSettings::default());
        assert!(outcome.events.is_empty(), "Events: {:?}", outcome.events);
    }

    #[test]
    #[serial(xdg_env)]
    fn test_project_config_overrides_user_config() {
        let user_dir = TempDir::new().unwrap();
        let project_dir = TempDir::new().unwrap();
        write_user_config(
            &user_dir,
            r#"
            [tsserver]
            cmd = ["node", "/user/tsserver.js"]
            requestTimeoutMs = 100
            "#,
        );
        fs::write(
            project_dir.path().join(CONFIG_FILE_NAME),
            r#"
            [tsserver]
            requestTimeoutMs = 200
            "#,
        )
        .unwrap();

        let outcome = with_user_config_dir(user_dir.path(), || {
            load_settings(Some(project_dir.path()), None)
        });

        assert_eq!(
            outcome.settings.tsserver_cmd,
            vec!["node".to_string(), "/user/tsserver.js".to_string()],
            "User cmd should be inherited"
        );
        assert_eq!(
            outcome.settings.request_timeout,
            Some(Duration::from_millis(200)),
            "Project timeout should override the user one"
        );
    }

    #[test]
    #[serial(xdg_env)]
    fn test_initialization_options_have_highest_precedence() {
        let user_dir = TempDir::new().unwrap();
        let project_dir = TempDir::new().unwrap();
        write_user_config(&user_dir, "[semanticTokens]\nenabled = false\n");
        fs::write(
            project_dir.path().join(CONFIG_FILE_NAME),
            "[semanticTokens]\nenabled = false\n",
        )
        .unwrap();

        let outcome = with_user_config_dir(user_dir.path(), || {
            load_settings(
                Some(project_dir.path()),
                Some(serde_json::json!({
                    "semanticTokens": { "enabled": true },
                    "tsserver": { "version": "5.4.5" }
                })),
            )
        });

        assert!(outcome.settings.semantic_tokens_enabled);
        assert_eq!(
            outcome.settings.tsserver_version,
            Some(ApiVersion::new(5, 4, 5))
        );
    }

    #[test]
    #[serial(xdg_env)]
    fn test_malformed_layers_warn_and_are_skipped() {
        let user_dir = TempDir::new().unwrap();
        let project_dir = TempDir::new().unwrap();
        write_user_config(&user_dir, "[tsserver\n");
        fs::write(project_dir.path().join(CONFIG_FILE_NAME), "semanticTokens = 3\n").unwrap();

        let outcome = with_user_config_dir(user_dir.path(), || {
            load_settings(
                Some(project_dir.path()),
                Some(serde_json::json!({ "tsserver": { "cmd": "not-a-list" } })),
            )
        });

        assert_eq!(outcome.settings, WorkspaceSettings::default());
        let warnings = outcome
            .events
            .iter()
            .filter(|e| e.kind == SettingsEventKind::Warning)
            .count();
        assert_eq!(warnings, 3, "Events: {:?}", outcome.events);
    }

    #[test]
    #[serial(xdg_env)]
    fn test_unparseable_version_is_reported() {
        let user_dir = TempDir::new().unwrap();
        let outcome = with_user_config_dir(user_dir.path(), || {
            load_settings(
                None,
                Some(serde_json::json!({ "tsserver": { "version": "next" } })),
            )
        });

        assert_eq!(outcome.settings.tsserver_version, None);
        assert!(
            outcome
                .events
                .iter()
                .any(|e| e.kind == SettingsEventKind::Warning && e.message.contains("version"))
        );
    }
}

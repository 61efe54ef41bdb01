//! User configuration loading.
//!
//! User config location: `$XDG_CONFIG_HOME/tsclassify/tsclassify.toml`,
//! falling back to the platform config directory.

use std::fs;
use std::path::PathBuf;

use thiserror::Error;

use super::CONFIG_FILE_NAME;
use super::settings::TsClassifySettings;

#[derive(Debug, Error)]
pub enum UserConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type UserConfigResult<T> = Result<T, UserConfigError>;

/// Path of the user config file, if a config directory can be determined.
pub fn user_config_path() -> Option<PathBuf> {
    let base = match std::env::var_os("XDG_CONFIG_HOME") {
        Some(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => dirs::config_dir()?,
    };
    Some(base.join("tsclassify").join(CONFIG_FILE_NAME))
}

/// Load the user config file; `Ok(None)` when there is none.
pub fn load_user_config() -> UserConfigResult<Option<TsClassifySettings>> {
    let Some(path) = user_config_path() else {
        return Ok(None);
    };
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(&path).map_err(|source| UserConfigError::Read {
        path: path.clone(),
        source,
    })?;
    toml::from_str(&contents)
        .map(Some)
        .map_err(|source| UserConfigError::Parse { path, source })
}

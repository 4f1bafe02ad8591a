/// Server configuration.
///
/// Settings come from three layers, later ones overriding earlier ones
/// field by field:
///
/// 1. built-in defaults,
/// 2. the user file `<config dir>/phake-lsp/config.toml`,
/// 3. `.phake-lsp.toml` in the workspace root.
///
/// A missing file is skipped.  A file that cannot be read or parsed is
/// logged and skipped; it never prevents the server from starting.
use std::fs;
use std::path::{Path, PathBuf};

use etcetera::BaseStrategy;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// File name looked up in the workspace root.
pub const WORKSPACE_CONFIG_FILE: &str = ".phake-lsp.toml";

/// Directory (under the platform config dir) holding the user file.
pub const USER_CONFIG_DIR: &str = "phake-lsp";

pub const DEFAULT_ANSWER_BINDER: &str = "Phake_Proxies_AnswerBinderProxy";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhakeConfig {
    /// Class that a stubbed method's `thenReturn()` etc. resolve against.
    pub answer_binder: String,
}

impl Default for PhakeConfig {
    fn default() -> Self {
        Self {
            answer_binder: DEFAULT_ANSWER_BINDER.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Directory names skipped during the workspace scan, in addition to
    /// whatever `.gitignore` / `.ignore` already exclude.
    pub exclude: Vec<String>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            exclude: vec!["node_modules".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub phake: PhakeConfig,
    pub index: IndexConfig,
    pub log: LogConfig,
}

// ─── On-disk layer ──────────────────────────────────────────────────────────

/// One config file as written: every field optional so that a layer only
/// overrides what it mentions.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    phake: PhakeSection,
    #[serde(default)]
    index: IndexSection,
    #[serde(default)]
    log: LogSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PhakeSection {
    answer_binder: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct IndexSection {
    exclude: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LogSection {
    level: Option<String>,
}

impl Config {
    /// Load the layered configuration for a workspace.
    pub fn load(workspace_root: Option<&Path>) -> Self {
        let mut config = Config::default();
        let layers = user_config_path()
            .into_iter()
            .chain(workspace_root.map(|root| root.join(WORKSPACE_CONFIG_FILE)));

        for path in layers {
            match read_layer(&path) {
                Ok(Some(layer)) => {
                    tracing::info!("loaded config from {}", path.display());
                    config.apply(layer);
                }
                Ok(None) => {}
                Err(e) => tracing::warn!("ignoring config: {}", e),
            }
        }
        config
    }

    /// Parse a single TOML document on top of the defaults.
    pub fn from_toml_str(text: &str) -> std::result::Result<Self, toml::de::Error> {
        let layer: ConfigFile = toml::from_str(text)?;
        let mut config = Config::default();
        config.apply(layer);
        Ok(config)
    }

    fn apply(&mut self, layer: ConfigFile) {
        if let Some(binder) = layer.phake.answer_binder {
            self.phake.answer_binder = binder;
        }
        if let Some(exclude) = layer.index.exclude {
            self.index.exclude = exclude;
        }
        if let Some(level) = layer.log.level {
            self.log.level = level;
        }
    }
}

fn user_config_path() -> Option<PathBuf> {
    let strategy = etcetera::choose_base_strategy().ok()?;
    Some(
        strategy
            .config_dir()
            .join(USER_CONFIG_DIR)
            .join("config.toml"),
    )
}

fn read_layer(path: &Path) -> Result<Option<ConfigFile>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(Error::io(path, e)),
    };
    toml::from_str(&text)
        .map(Some)
        .map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.phake.answer_binder, DEFAULT_ANSWER_BINDER);
        assert_eq!(config.index.exclude, vec!["node_modules"]);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let config = Config::from_toml_str("[log]\nlevel = \"debug\"\n").unwrap();
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.phake.answer_binder, DEFAULT_ANSWER_BINDER);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::from_toml_str("[phake]\nbinder = \"X\"\n").is_err());
    }

    #[test]
    fn workspace_file_is_applied() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(WORKSPACE_CONFIG_FILE),
            "[phake]\nanswer_binder = \"My\\\\Binder\"\n[index]\nexclude = [\"vendor\"]\n",
        )
        .unwrap();
        let config = Config::load(Some(dir.path()));
        assert_eq!(config.phake.answer_binder, "My\\Binder");
        assert_eq!(config.index.exclude, vec!["vendor"]);
    }

    #[test]
    fn malformed_workspace_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(WORKSPACE_CONFIG_FILE), "[phake\n").unwrap();
        assert!(read_layer(&dir.path().join(WORKSPACE_CONFIG_FILE)).is_err());
        assert_eq!(Config::load(Some(dir.path())), Config::load(None));
    }
}

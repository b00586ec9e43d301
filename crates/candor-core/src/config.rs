//! Configuration management for Candor.
//!
//! Loads configuration from ${CANDOR_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::thread::{DEFAULT_REPLY_PAGE_SIZE, DEFAULT_ROOT_PAGE_SIZE, PageSizes, SortMode};

/// Environment variable that overrides `api.base_url`.
pub const API_BASE_URL_ENV: &str = "CANDOR_API_BASE_URL";

/// Returns the default config template with comments.
///
/// This is embedded from default_config.toml at compile time.
/// To update, run `cargo run -p xtask -- update-default-config`.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

/// Merges user config values into the default template.
///
/// New comments/sections from the template are always present, while the
/// user's customized values are preserved.
fn merge_with_template(user_config: &str) -> Result<String> {
    use toml_edit::DocumentMut;

    let mut doc: DocumentMut = default_config_template()
        .parse()
        .context("Failed to parse default config template")?;

    let user_doc: DocumentMut = user_config.parse().context("Failed to parse user config")?;

    merge_items(doc.as_table_mut(), user_doc.as_table());

    Ok(doc.to_string())
}

/// Recursively merges items from source table into target table.
fn merge_items(target: &mut toml_edit::Table, source: &toml_edit::Table) {
    use toml_edit::Item;

    for (key, value) in source {
        match value {
            Item::Value(v) => {
                target[key] = Item::Value(v.clone());
            }
            Item::Table(src_table) => {
                if let Some(Item::Table(target_table)) = target.get_mut(key) {
                    merge_items(target_table, src_table);
                } else {
                    target[key] = Item::Table(src_table.clone());
                }
            }
            Item::ArrayOfTables(src_arr) => {
                target[key] = Item::ArrayOfTables(src_arr.clone());
            }
            Item::None => {}
        }
    }
}

pub mod paths {
    //! Path resolution for Candor configuration and data directories.
    //!
    //! `CANDOR_HOME` resolution order:
    //! 1. `CANDOR_HOME` environment variable (if set)
    //! 2. ~/.config/candor (default)

    use std::path::PathBuf;

    /// Returns the Candor home directory.
    pub fn candor_home() -> PathBuf {
        if let Ok(home) = std::env::var("CANDOR_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".candor"),
            |h| h.join(".config").join("candor"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        candor_home().join("config.toml")
    }

    /// Returns the path of the stored anonymous session id.
    pub fn session_path() -> PathBuf {
        candor_home().join("session_id")
    }

    /// Returns the log directory.
    pub fn logs_dir() -> PathBuf {
        candor_home().join("logs")
    }
}

/// Connection settings for the feedback server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the feedback server.
    pub base_url: String,
    /// Request timeout in seconds (0 disables).
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Config::DEFAULT_BASE_URL.to_string(),
            timeout_secs: Config::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ApiConfig {
    /// Returns the base URL, honoring `CANDOR_API_BASE_URL`.
    ///
    /// Empty values fall through; a trailing slash is stripped.
    pub fn effective_base_url(&self) -> String {
        let from_env = std::env::var(API_BASE_URL_ENV)
            .ok()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());
        let url = from_env.unwrap_or_else(|| self.base_url.trim().to_string());
        url.trim_end_matches('/').to_string()
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// Thread view defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadConfig {
    pub default_sort: SortMode,
    pub root_page_size: usize,
    pub reply_page_size: usize,
}

impl Default for ThreadConfig {
    fn default() -> Self {
        Self {
            default_sort: SortMode::default(),
            root_page_size: DEFAULT_ROOT_PAGE_SIZE,
            reply_page_size: DEFAULT_REPLY_PAGE_SIZE,
        }
    }
}

impl ThreadConfig {
    pub fn page_sizes(&self) -> PageSizes {
        PageSizes::new(self.root_page_size, self.reply_page_size)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `CANDOR_LOG` is unset.
    pub level: String,
    /// Write the feed view's logs to a file under `CANDOR_HOME/logs`.
    pub file: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Config::DEFAULT_LOG_LEVEL.to_string(),
            file: true,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub thread: ThreadConfig,
    pub log: LogConfig,
}

impl Config {
    const DEFAULT_BASE_URL: &'static str = "http://localhost:3000";
    const DEFAULT_TIMEOUT_SECS: u64 = 10;
    const DEFAULT_LOG_LEVEL: &'static str = "warn";

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Saves only `thread.default_sort` to the config file.
    pub fn save_default_sort(mode: SortMode) -> Result<()> {
        Self::save_default_sort_to(&paths::config_path(), mode)
    }

    /// Saves only `thread.default_sort` to a specific config file path.
    ///
    /// Creates the file with default template if it doesn't exist.
    /// If file exists, merges user values into the latest template.
    pub fn save_default_sort_to(path: &Path, mode: SortMode) -> Result<()> {
        use toml_edit::{DocumentMut, value};

        let contents = if path.exists() {
            let user_config = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            merge_with_template(&user_config)?
        } else {
            default_config_template().to_string()
        };

        let mut doc: DocumentMut = contents
            .parse()
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        doc["thread"]["default_sort"] = value(mode.as_str());

        Self::write_config(path, &doc.to_string())
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Generates a fresh config TOML from Rust defaults.
    ///
    /// Used by `xtask update-default-config` to keep `default_config.toml`
    /// in sync with the values above. Comments come from the embedded
    /// template; values come from `Config::default()`.
    pub fn generate() -> Result<String> {
        use toml_edit::DocumentMut;

        let generated_toml = toml::to_string(&Config::default())
            .context("Failed to serialize default config to TOML")?;

        let mut doc: DocumentMut = default_config_template()
            .parse()
            .context("Failed to parse default config template")?;
        let generated_doc: DocumentMut = generated_toml
            .parse()
            .context("Failed to parse generated config")?;

        merge_items(doc.as_table_mut(), generated_doc.as_table());

        Ok(doc.to_string())
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("nonexistent.toml");

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:3000");
        assert_eq!(config.thread.default_sort, SortMode::Best);
        assert_eq!(config.thread.page_sizes(), PageSizes::new(3, 2));
    }

    #[test]
    fn test_load_partial_config_merges_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(
            &config_path,
            "[thread]\ndefault_sort = \"newest\"\nreply_page_size = 5\n",
        )
        .unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.thread.default_sort, SortMode::Newest);
        assert_eq!(config.thread.root_page_size, 3);
        assert_eq!(config.thread.reply_page_size, 5);
        assert_eq!(config.api.timeout_secs, 10);
    }

    #[test]
    fn test_load_rejects_unknown_sort() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "[thread]\ndefault_sort = \"hot\"\n").unwrap();

        assert!(Config::load_from(&config_path).is_err());
    }

    #[test]
    fn test_load_accepts_short_sort_names() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "[thread]\ndefault_sort = \"new\"\n").unwrap();
        assert_eq!(
            Config::load_from(&config_path).unwrap().thread.default_sort,
            SortMode::Newest
        );

        fs::write(&config_path, "[thread]\ndefault_sort = \"old\"\n").unwrap();
        assert_eq!(
            Config::load_from(&config_path).unwrap().thread.default_sort,
            SortMode::Oldest
        );
    }

    #[test]
    fn test_template_parses_to_defaults() {
        let config: Config = toml::from_str(default_config_template()).unwrap();
        let defaults = Config::default();
        assert_eq!(config.api.base_url, defaults.api.base_url);
        assert_eq!(config.api.timeout_secs, defaults.api.timeout_secs);
        assert_eq!(config.thread.default_sort, defaults.thread.default_sort);
        assert_eq!(config.thread.root_page_size, defaults.thread.root_page_size);
        assert_eq!(config.thread.reply_page_size, defaults.thread.reply_page_size);
        assert_eq!(config.log.level, defaults.log.level);
        assert_eq!(config.log.file, defaults.log.file);
    }

    #[test]
    fn test_init_creates_config_with_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("subdir").join("config.toml");

        Config::init(&config_path).unwrap();

        assert!(config_path.exists());
        let contents = fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("# Candor Configuration"));
        assert!(contents.contains("default_sort = \"best\""));
    }

    #[test]
    fn test_init_fails_if_exists() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(&config_path, "").unwrap();

        assert!(Config::init(&config_path).is_err());
    }

    #[test]
    fn test_save_default_sort_creates_file_with_template() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        Config::save_default_sort_to(&config_path, SortMode::Oldest).unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.thread.default_sort, SortMode::Oldest);
        let contents = fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("# Root comments revealed"));
    }

    #[test]
    fn test_save_default_sort_preserves_user_values() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(
            &config_path,
            "[api]\nbase_url = \"https://feedback.example.com\"\n",
        )
        .unwrap();

        Config::save_default_sort_to(&config_path, SortMode::Newest).unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.api.base_url, "https://feedback.example.com");
        assert_eq!(config.thread.default_sort, SortMode::Newest);
    }

    #[test]
    fn test_generate_matches_defaults() {
        let generated = Config::generate().unwrap();
        let config: Config = toml::from_str(&generated).unwrap();
        assert_eq!(config.thread.default_sort, SortMode::Best);
        assert!(generated.contains("# Candor Configuration"));
    }

    #[test]
    fn test_timeout_zero_disables() {
        let config = ApiConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.timeout(), None);
    }
}

//! Configuration management.
//!
//! Settings come from defaults, then an optional TOML file, then
//! `MULTINETICS_SEARCH__*` environment variables, e.g.
//! `MULTINETICS_SEARCH__SEARCH__DEBOUNCE_MS=300`.

mod file_config;

pub use file_config::ConfigFileError;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::engine::{FilterKey, FilterSet, Matcher, DEFAULT_DEBOUNCE};

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "MULTINETICS_SEARCH";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Data file settings
    #[serde(default)]
    pub data: DataConfig,

    /// Search behaviour
    #[serde(default)]
    pub search: SearchConfig,

    /// Filter keys offered to the user
    #[serde(default)]
    pub filters: FiltersConfig,

    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Data file configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path to the articles JSON file
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
        }
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("data/articles.json")
}

/// Search configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Quiet period before a typed query is searched, in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Match strategy name: `exact` or `similarity`
    #[serde(default = "default_strategy")]
    pub strategy: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            strategy: default_strategy(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE.as_millis() as u64
}

fn default_strategy() -> String {
    "exact".to_string()
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Build the matcher for the configured strategy
    pub fn matcher(&self) -> Matcher {
        Matcher::from_name(&self.strategy)
    }
}

/// Filter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiltersConfig {
    /// Declared filter keys
    #[serde(default = "default_filter_keys")]
    pub keys: Vec<FilterKey>,
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            keys: default_filter_keys(),
        }
    }
}

fn default_filter_keys() -> Vec<FilterKey> {
    vec![FilterKey::Volume, FilterKey::Issue]
}

impl FiltersConfig {
    pub fn filter_set(&self) -> FilterSet {
        FilterSet::new(self.keys.iter().copied())
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level when neither `RUST_LOG` nor `-v`/`-q` is given
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Load configuration from an optional file plus environment overrides
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigFileError> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigFileError::NotFound(path.to_path_buf()));
        }
        builder = builder.add_source(config::File::from(path));
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("filters.keys")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Default config file location: `<config dir>/multinetics-search/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("multinetics-search").join("config.toml"))
}

/// The default config file, if one exists
pub fn find_config_file() -> Option<PathBuf> {
    default_config_path().filter(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data.path, PathBuf::from("data/articles.json"));
        assert_eq!(config.search.debounce(), Duration::from_millis(200));
        assert_eq!(config.search.strategy, "exact");
        assert_eq!(config.filters.keys, vec![FilterKey::Volume, FilterKey::Issue]);
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[data]
path = "/srv/catalog/articles.json"

[search]
debounce_ms = 350
strategy = "similarity"

[filters]
keys = ["volume", "issue", "year"]

[logging]
level = "debug"
format = "json"
"#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.data.path, PathBuf::from("/srv/catalog/articles.json"));
        assert_eq!(config.search.debounce_ms, 350);
        assert_eq!(config.search.strategy, "similarity");
        assert_eq!(config.filters.keys, FilterKey::ALL.to_vec());
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[search]\ndebounce_ms = 50\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.search.debounce_ms, 50);
        assert_eq!(config.search.strategy, "exact");
        assert_eq!(config.filters, FiltersConfig::default());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = load_config(Some(Path::new("/nonexistent/config.toml")));
        assert!(matches!(result, Err(ConfigFileError::NotFound(_))));
    }

    #[test]
    fn test_invalid_value_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[filters]\nkeys = [\"page\"]\n").unwrap();

        assert!(matches!(
            load_config(Some(&path)),
            Err(ConfigFileError::Load(_))
        ));
    }

    #[test]
    fn test_filter_set_from_config() {
        let filters = FiltersConfig {
            keys: vec![FilterKey::Year],
        };
        let set = filters.filter_set();
        assert_eq!(set.keys().collect::<Vec<_>>(), vec![FilterKey::Year]);
    }

    #[test]
    fn test_default_config_path_name() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("multinetics-search/config.toml"));
        }
    }
}

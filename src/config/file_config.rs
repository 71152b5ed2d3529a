//! Writing the configuration back out as TOML.
//!
//! # Configuration File Format
//!
//! ```toml
//! [data]
//! path = "data/articles.json"
//!
//! [search]
//! debounce_ms = 200
//! strategy = "exact"
//!
//! [filters]
//! keys = ["volume", "issue"]
//!
//! [logging]
//! level = "warn"
//! format = "text"
//! ```

use std::path::{Path, PathBuf};

use super::Config;

/// Configuration file errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl Config {
    /// Render the configuration as TOML
    pub fn to_toml(&self) -> Result<String, ConfigFileError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write the configuration to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{load_config, LogFormat};
    use crate::engine::FilterKey;
    use tempfile::tempdir;

    #[test]
    fn test_to_toml_sections() {
        let toml = Config::default().to_toml().unwrap();
        assert!(toml.contains("[data]"));
        assert!(toml.contains("debounce_ms = 200"));
        assert!(toml.contains("strategy = \"exact\""));
        assert!(toml.contains("\"volume\""));
        assert!(toml.contains("format = \"text\""));
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.search.debounce_ms = 75;
        config.filters.keys = vec![FilterKey::Year, FilterKey::Volume];
        config.logging.format = LogFormat::Json;
        config.save(&path).unwrap();

        let loaded = load_config(Some(&path)).unwrap();
        assert_eq!(loaded, config);
    }
}

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Directory holding the database file (default: ./data)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Database file name inside `data_dir` (default: clinic.db)
    #[serde(default = "default_database_file")]
    pub database_file: String,
    /// Full database path; takes precedence over `data_dir`/`database_file`
    #[serde(default)]
    pub database: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            database_file: default_database_file(),
            database: None,
        }
    }
}

impl StoreConfig {
    pub fn database_path(&self) -> PathBuf {
        match &self.database {
            Some(path) => path.clone(),
            None => self.data_dir.join(&self.database_file),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_database_file() -> String {
    "clinic.db".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Quiet by default so command output is not interleaved with logs
fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| "Failed to parse configuration file")?;
            Ok(config)
        } else {
            info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = Config::load(&temp_dir.path().join("absent.toml")).unwrap();

        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.store.database_path(), PathBuf::from("./data/clinic.db"));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[store]\ndata_dir = \"/var/lib/clinic\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.store.database_path(), PathBuf::from("/var/lib/clinic/clinic.db"));
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_explicit_database_path_wins() {
        let config: Config = toml::from_str(
            r#"
            [store]
            data_dir = "/ignored"
            database = "/tmp/other.db"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.store.database_path(), PathBuf::from("/tmp/other.db"));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[store\ndata_dir = 3").unwrap();
        assert!(Config::load(file.path()).is_err());
    }
}

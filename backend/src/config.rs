//! # Application Configuration
//!
//! Settings come from a YAML file with environment overrides on top:
//!
//! 1. the file named by `DAYBOOK_CONFIG`, if set
//! 2. otherwise `<default data directory>/daybook.yaml`, if it exists
//! 3. otherwise built-in defaults
//!
//! Then `DAYBOOK_DATA_DIR`, `DAYBOOK_BIND`, `DAYBOOK_STORAGE`, `DAYBOOK_YEAR`
//! and `RUST_LOG` replace the matching fields. Any value that fails to parse
//! is a startup error.

use anyhow::{bail, Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::storage::CsvConnection;

pub const CONFIG_FILE_NAME: &str = "daybook.yaml";

/// Where day records are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One CSV file per collection in the data directory
    #[default]
    Csv,
    /// Process memory only; everything is lost on exit
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(StorageBackend::Csv),
            "memory" => Ok(StorageBackend::Memory),
            other => bail!("Unknown storage backend {:?} (expected csv or memory)", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data_directory: PathBuf,
    pub bind_address: SocketAddr,
    /// Origin allowed by CORS, e.g. the dev server of a web frontend
    pub allowed_origin: String,
    /// Directory of static UI assets served for non-API paths
    pub static_dir: Option<PathBuf>,
    pub storage: StorageBackend,
    /// Collection that holds day records
    pub collection: String,
    /// The one year the calendar and day routes refer to
    pub calendar_year: i32,
    pub quiet_window_ms: u64,
    pub expense_alert_threshold: f64,
    /// `EnvFilter` directive for the server log
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_directory: CsvConnection::default_data_directory(),
            bind_address: SocketAddr::from(([127, 0, 0, 1], 3000)),
            allowed_origin: "http://localhost:8080".to_string(),
            static_dir: None,
            storage: StorageBackend::Csv,
            collection: "calendarDays".to_string(),
            calendar_year: 2025,
            quiet_window_ms: 500,
            expense_alert_threshold: 3000.0,
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn load() -> Result<Self> {
        Self::load_with(|name| std::env::var(name).ok())
    }

    /// Load configuration reading variables through `env`
    pub fn load_with<F>(env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = match env("DAYBOOK_CONFIG") {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => {
                let data_directory = env("DAYBOOK_DATA_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(CsvConnection::default_data_directory);
                let default_path = data_directory.join(CONFIG_FILE_NAME);
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    debug!("No config file at {}, using defaults", default_path.display());
                    Self::default()
                }
            }
        };

        let config = config.with_overrides(env)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let yaml_content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: AppConfig = serde_yaml::from_str(&yaml_content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn with_overrides<F>(mut self, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = env("DAYBOOK_DATA_DIR") {
            self.data_directory = PathBuf::from(dir);
        }
        if let Some(bind) = env("DAYBOOK_BIND") {
            self.bind_address = bind
                .parse()
                .with_context(|| format!("DAYBOOK_BIND {:?} is not a socket address", bind))?;
        }
        if let Some(storage) = env("DAYBOOK_STORAGE") {
            self.storage = storage.parse().context("Invalid DAYBOOK_STORAGE")?;
        }
        if let Some(year) = env("DAYBOOK_YEAR") {
            self.calendar_year = year
                .trim()
                .parse()
                .with_context(|| format!("DAYBOOK_YEAR {:?} is not a year", year))?;
        }
        if let Some(filter) = env("RUST_LOG") {
            self.log_filter = filter;
        }
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        if !(1..=9999).contains(&self.calendar_year) {
            bail!("calendar_year {} is out of range", self.calendar_year);
        }
        if self.collection.trim().is_empty() {
            bail!("collection must not be empty");
        }
        if !self.expense_alert_threshold.is_finite() || self.expense_alert_threshold < 0.0 {
            bail!(
                "expense_alert_threshold must be a non-negative number, got {}",
                self.expense_alert_threshold
            );
        }
        Ok(())
    }

    pub fn quiet_window(&self) -> Duration {
        Duration::from_millis(self.quiet_window_ms)
    }
}

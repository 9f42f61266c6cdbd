/// Service configuration loader - parses climate_service.toml
///
/// Settings resolve in layers: built-in defaults, then the TOML file,
/// then environment / command-line overrides. The database URL has no
/// default; everything else does.

use crate::model::{DEFAULT_CUTOFF_DATE, DEFAULT_STATION_ID};
use crate::query::QueryLayer;
use chrono::NaiveDate;
use clap::Args;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_PATH: &str = "climate_service.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("cutoff_date '{0}' is not a yyyy-mm-dd date")]
    InvalidCutoffDate(String),

    #[error("station_id must not be empty")]
    EmptyStationId,

    #[error("workers must be at least 1")]
    NoWorkers,

    #[error("query_timeout_secs must be at least 1")]
    ZeroTimeout,
}

/// Resolved service settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Connection string for the pre-populated store.
    pub database_url: Option<String>,

    pub bind: String,
    pub port: u16,

    /// Request-handling threads; each holds at most one store session.
    pub workers: usize,

    /// Upper bound on a single query, also used as the connect timeout.
    pub query_timeout_secs: u64,

    /// Start of the trailing window (exclusive) for precipitation and tobs.
    pub cutoff_date: String,

    /// Station served by the tobs route.
    pub station_id: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            bind: "0.0.0.0".to_string(),
            port: 5000,
            workers: 4,
            query_timeout_secs: 30,
            cutoff_date: DEFAULT_CUTOFF_DATE.to_string(),
            station_id: DEFAULT_STATION_ID.to_string(),
        }
    }
}

/// Command-line / environment overrides. Unset fields keep the file value.
#[derive(Debug, Clone, Default, Args)]
pub struct Overrides {
    /// Store connection string (postgres://..., sqlite://PATH, or a file path)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Address to listen on
    #[arg(long)]
    pub bind: Option<String>,

    /// Port to listen on
    #[arg(long, short = 'p')]
    pub port: Option<u16>,

    /// Number of request-handling threads
    #[arg(long)]
    pub workers: Option<usize>,

    /// Per-query timeout in seconds
    #[arg(long)]
    pub query_timeout_secs: Option<u64>,

    /// Exclusive start date of the trailing window
    #[arg(long)]
    pub cutoff_date: Option<String>,

    /// Station served by /api/v1.0/tobs
    #[arg(long)]
    pub station_id: Option<String>,
}

impl ServiceConfig {
    pub fn from_toml_str(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(url) = overrides.database_url {
            self.database_url = Some(url);
        }
        if let Some(bind) = overrides.bind {
            self.bind = bind;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(workers) = overrides.workers {
            self.workers = workers;
        }
        if let Some(secs) = overrides.query_timeout_secs {
            self.query_timeout_secs = secs;
        }
        if let Some(cutoff) = overrides.cutoff_date {
            self.cutoff_date = cutoff;
        }
        if let Some(station) = overrides.station_id {
            self.station_id = station;
        }
    }

    /// Check settings that would otherwise fail confusingly at request time.
    ///
    /// The cutoff is parsed only to catch typos; queries still compare it
    /// as a string.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if NaiveDate::parse_from_str(&self.cutoff_date, "%Y-%m-%d").is_err()
            || self.cutoff_date.len() != 10
        {
            return Err(ConfigError::InvalidCutoffDate(self.cutoff_date.clone()));
        }
        if self.station_id.trim().is_empty() {
            return Err(ConfigError::EmptyStationId);
        }
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if self.query_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    pub fn query_layer(&self) -> QueryLayer {
        QueryLayer::new(self.cutoff_date.clone(), self.station_id.clone())
    }
}

/// Load configuration from `path`, or from [`DEFAULT_CONFIG_PATH`] if it
/// exists, or fall back to defaults.
///
/// An explicitly named file must exist; the default file is optional.
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    let (path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
    };

    if !required && !path.exists() {
        log::debug!("No {} found, using defaults", path.display());
        return Ok(ServiceConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    let config = ServiceConfig::from_toml_str(&contents, &path)?;
    log::info!("Loaded configuration from {}", path.display());
    Ok(config)
}

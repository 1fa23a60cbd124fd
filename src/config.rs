use crate::error::{AppError, Result};
use crate::ml::ClusterConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file consulted when neither `--config` nor `PORT_CLUSTER_CONFIG` is given
const DEFAULT_CONFIG_FILE: &str = "port-cluster.toml";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Scan-results store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Clustering configuration
    #[serde(default)]
    pub analysis: ClusterConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from the embedded defaults, a TOML file and the environment.
    ///
    /// An explicit `path` must exist; the fallback file (`PORT_CLUSTER_CONFIG`
    /// or `port-cluster.toml`) is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (config_path, required) = match path {
            Some(p) => (p.to_string_lossy().into_owned(), true),
            None => (
                std::env::var("PORT_CLUSTER_CONFIG")
                    .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string()),
                false,
            ),
        };

        let config: Config = config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file
            .add_source(config::File::with_name(&config_path).required(required))
            // Override with environment variables (prefix: PORT_CLUSTER__)
            .add_source(
                config::Environment::with_prefix("PORT_CLUSTER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        tracing::debug!(config_file = %config_path, "Configuration loaded");
        Ok(config)
    }

    /// Apply command-line overrides on top of the loaded values
    pub fn with_overrides(
        mut self,
        store_path: Option<PathBuf>,
        clusters: Option<usize>,
        seed: Option<u64>,
    ) -> Result<Self> {
        if let Some(path) = store_path {
            self.store.path = path;
        }
        if let Some(k) = clusters {
            self.analysis.clusters = k;
        }
        if seed.is_some() {
            self.analysis.seed = seed;
        }
        self.validate()?;
        Ok(self)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.store.validate()?;
        self.analysis.validate_all()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path of the SQLite scan-results database
    #[serde(default = "default_store_path")]
    pub path: PathBuf,

    /// Table holding recorded scan results
    #[serde(default = "default_table")]
    pub table: String,

    /// Integer column holding the observed port number
    #[serde(default = "default_port_column")]
    pub port_column: String,
}

impl StoreConfig {
    /// Create a store configuration for `path` with the default table layout
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Table and column names are spliced into SQL, so only plain identifiers are accepted
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [("table", &self.table), ("port_column", &self.port_column)] {
            if !is_sql_identifier(value) {
                return Err(AppError::Configuration(format!(
                    "store.{} must be a plain SQL identifier, got {:?}",
                    field, value
                )));
            }
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            table: default_table(),
            port_column: default_port_column(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit JSON log lines instead of human-readable ones
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

fn is_sql_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// Default value functions
fn default_store_path() -> PathBuf {
    PathBuf::from("network_scanner.db")
}

fn default_table() -> String {
    "port_scans".to_string()
}

fn default_port_column() -> String {
    "port".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

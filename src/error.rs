use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// The scan-results store could not be opened
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Expected table or port column is missing
    #[error("Schema error: {0}")]
    Schema(String),

    /// Any other failure while reading observations
    #[error("Query error: {0}")]
    Query(String),

    /// Clustering could not produce the requested centroids
    #[error("Fit error: {0}")]
    Fit(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Get error code string
    pub fn error_code(&self) -> &str {
        match self {
            AppError::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
            AppError::Schema(_) => "SCHEMA_ERROR",
            AppError::Query(_) => "QUERY_ERROR",
            AppError::Fit(_) => "FIT_ERROR",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Io(_) => "IO_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Configuration(_) => 2,
            AppError::StorageUnavailable(_) => 3,
            AppError::Schema(_) | AppError::Query(_) => 4,
            AppError::Fit(_) => 5,
            AppError::Io(_) | AppError::Serialization(_) => 1,
        }
    }
}

/// Conversion from serde_json::Error
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Conversion from validator::ValidationErrors
impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Configuration(err.to_string())
    }
}

/// Conversion from config::ConfigError
impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AppError>;

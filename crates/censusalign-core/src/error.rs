//! Error types for the CensusAlign workspace.

/// Errors that can occur across the CensusAlign pipeline.
///
/// All error variants are marked with `#[non_exhaustive]` to allow
/// adding new error types without breaking changes.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// HTTP transport error (download failures, bad status codes, etc.)
    #[error("HTTP error: {message}")]
    Http {
        /// Human-readable error message
        message: String,
        /// Source error if available
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Archive extraction error (bad ZIP, missing members)
    #[error("Archive error: {message}")]
    Archive {
        /// What went wrong with the archive
        message: String,
    },

    /// CSV parsing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Shapefile decoding error
    #[error("Shapefile error: {message}")]
    Shapefile {
        /// What went wrong while reading the shapefile
        message: String,
    },

    /// I/O error (file operations, temp dirs, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML catalog parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic
        message: String,
    },

    /// A required column is absent from an input table
    #[error("Missing column {column:?} in {table} data")]
    MissingColumn {
        /// Column name that was expected
        column: String,
        /// Which table was being read
        table: String,
    },

    /// A GEOID string could not be normalized
    #[error("Invalid GEOID {value:?}: {message}")]
    InvalidGeoId {
        /// The offending input
        value: String,
        /// Why it was rejected
        message: String,
    },

    /// A graph operation referenced a GEOID with no node
    #[error("Node not found in graph: {geoid}")]
    NodeNotFound {
        /// GEOID that was not found
        geoid: String,
    },

    /// Input validation error
    #[error("Validation error: {message}")]
    Validation {
        /// Field or aspect that failed validation
        field: Option<String>,
        /// What went wrong
        message: String,
    },
}

/// Convenience `Result` type alias for CensusAlign operations.
///
/// This is the standard Result type used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns whether this error is retryable.
    ///
    /// Retryable errors are transient failures like network hiccups and
    /// filesystem races. Schema, config, and validation errors are permanent.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http { .. } => true,
            Error::Io(_) => true,
            Error::Archive { .. } => false,
            Error::Csv(_) => false,
            Error::Shapefile { .. } => false,
            Error::Yaml(_) => false,
            Error::Serialization(_) => false,
            Error::Config { .. } => false,
            Error::MissingColumn { .. } => false,
            Error::InvalidGeoId { .. } => false,
            Error::NodeNotFound { .. } => false,
            Error::Validation { .. } => false,
        }
    }

    /// Creates a new HTTP error with a message.
    pub fn http<S: Into<String>>(message: S) -> Self {
        Error::Http {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new HTTP error with a message and source error.
    pub fn http_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Http {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new archive error.
    pub fn archive<S: Into<String>>(message: S) -> Self {
        Error::Archive {
            message: message.into(),
        }
    }

    /// Creates a new shapefile error.
    pub fn shapefile<S: Into<String>>(message: S) -> Self {
        Error::Shapefile {
            message: message.into(),
        }
    }

    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Creates a new missing-column error.
    pub fn missing_column<C, T>(column: C, table: T) -> Self
    where
        C: Into<String>,
        T: Into<String>,
    {
        Error::MissingColumn {
            column: column.into(),
            table: table.into(),
        }
    }

    /// Creates a new invalid-GEOID error.
    pub fn invalid_geoid<V, M>(value: V, message: M) -> Self
    where
        V: Into<String>,
        M: Into<String>,
    {
        Error::InvalidGeoId {
            value: value.into(),
            message: message.into(),
        }
    }

    /// Creates a new node-not-found error.
    pub fn node_not_found<S: Into<String>>(geoid: S) -> Self {
        Error::NodeNotFound {
            geoid: geoid.into(),
        }
    }

    /// Creates a new validation error.
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Error::Validation {
            field: None,
            message: message.into(),
        }
    }

    /// Creates a new validation error with a field name.
    pub fn validation_field<F, M>(field: F, message: M) -> Self
    where
        F: Into<String>,
        M: Into<String>,
    {
        Error::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::http("connection reset");
        assert_eq!(err.to_string(), "HTTP error: connection reset");
    }

    #[test]
    fn test_retryable_classification() {
        assert!(Error::http("test").is_retryable());
        assert!(!Error::config("test").is_retryable());
        assert!(!Error::validation("test").is_retryable());
        assert!(!Error::archive("test").is_retryable());
    }

    #[test]
    fn test_io_error_is_retryable() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_error.into();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_missing_column_display() {
        let err = Error::missing_column("SRPREC_KEY", "vote");
        assert_eq!(err.to_string(), "Missing column \"SRPREC_KEY\" in vote data");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_invalid_geoid_display() {
        let err = Error::invalid_geoid("abc", "not a digit string");
        assert_eq!(err.to_string(), "Invalid GEOID \"abc\": not a digit string");
    }

    #[test]
    fn test_validation_error_with_field() {
        let err = Error::validation_field("level", "unsupported aggregation level");
        let Error::Validation { field, message } = err else {
            unreachable!("Expected Validation error variant");
        };
        assert_eq!(field, Some("level".to_string()));
        assert_eq!(message, "unsupported aggregation level");
    }

    #[test]
    fn test_http_error_with_source() {
        let io_error = std::io::Error::other("network failure");
        let err = Error::http_with_source("download failed", io_error);
        assert!(err.to_string().contains("download failed"));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_serde_error_not_retryable() {
        let json = "{invalid json}";
        let serde_err = serde_json::from_str::<serde_json::Value>(json).unwrap_err();
        let err: Error = serde_err.into();
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_error_implements_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }

    #[test]
    fn test_node_not_found_display() {
        let err = Error::node_not_found("060750101011");
        assert_eq!(err.to_string(), "Node not found in graph: 060750101011");
    }
}

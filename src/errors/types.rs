//! # Error Types
//!
//! Comprehensive error types for the Gangway topology core using `thiserror`.
//!
//! Every variant here is a construction-time failure: the core runs once, and
//! any error aborts the whole build before a plan is emitted. Runtime
//! conditions (unhealthy replicas, unmatched paths) are the managed routing
//! layer's concern and never surface through these types.

/// Custom result type for Gangway operations
pub type Result<T> = std::result::Result<T, GangwayError>;

/// Main error type for the Gangway topology core
#[derive(thiserror::Error, Debug)]
pub enum GangwayError {
    /// Configuration errors (bad CIDR, zone count over availability,
    /// malformed image reference)
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Validation errors on an otherwise well-formed topology
    #[error("Validation error: {message}")]
    Validation { message: String, field: Option<String> },

    /// Resource conflict errors (e.g., duplicate rule priority)
    #[error("Resource conflict: {message}")]
    Conflict { message: String, resource_type: String },

    /// Resource not found errors
    #[error("Resource not found: {resource_type} with ID '{id}'")]
    NotFound { resource_type: String, id: String },

    /// Dependency-ordering errors (e.g., bridge built before its listener)
    #[error("Dependency ordering error: {resource} requires {dependency}")]
    DependencyOrder { resource: String, dependency: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {context}")]
    Serialization {
        #[source]
        source: serde_json::Error,
        context: String,
    },

    /// I/O errors with additional context
    #[error("I/O error: {context}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },

    /// Internal errors (invariants the builder itself must uphold)
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl GangwayError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into(), source: None }
    }

    /// Create a configuration error with source
    pub fn config_with_source<S: Into<String>>(
        message: S,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Config { message: message.into(), source: Some(source) }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation { message: message.into(), field: None }
    }

    /// Create a validation error with field information
    pub fn validation_field<S: Into<String>, F: Into<String>>(message: S, field: F) -> Self {
        Self::Validation { message: message.into(), field: Some(field.into()) }
    }

    /// Create a conflict error
    pub fn conflict<M: Into<String>, R: Into<String>>(message: M, resource_type: R) -> Self {
        Self::Conflict { message: message.into(), resource_type: resource_type.into() }
    }

    /// Create a not found error
    pub fn not_found<R: Into<String>, I: Into<String>>(resource_type: R, id: I) -> Self {
        Self::NotFound { resource_type: resource_type.into(), id: id.into() }
    }

    /// Create a dependency-ordering error
    pub fn dependency_order<R: Into<String>, D: Into<String>>(resource: R, dependency: D) -> Self {
        Self::DependencyOrder { resource: resource.into(), dependency: dependency.into() }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal { message: message.into(), source: None }
    }

    /// Whether this error was caused by operator-supplied configuration,
    /// as opposed to a builder invariant breaking.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            GangwayError::Config { .. }
                | GangwayError::Validation { .. }
                | GangwayError::Conflict { .. }
                | GangwayError::NotFound { .. }
        )
    }
}

// Error conversions for common external error types
impl From<std::io::Error> for GangwayError {
    fn from(error: std::io::Error) -> Self {
        Self::Io { source: error, context: "I/O operation failed".to_string() }
    }
}

impl From<serde_json::Error> for GangwayError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization { source: error, context: "JSON serialization failed".to_string() }
    }
}

impl From<config::ConfigError> for GangwayError {
    fn from(error: config::ConfigError) -> Self {
        Self::config_with_source("Configuration loading failed", Box::new(error))
    }
}

impl From<ipnetwork::IpNetworkError> for GangwayError {
    fn from(error: ipnetwork::IpNetworkError) -> Self {
        Self::config_with_source("Invalid CIDR block", Box::new(error))
    }
}

impl From<validator::ValidationErrors> for GangwayError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let error_messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string())
                    })
                    .collect();
                format!("{}: {}", field, error_messages.join(", "))
            })
            .collect::<Vec<_>>()
            .join("; ");

        Self::validation(format!("Validation failed: {}", message))
    }
}

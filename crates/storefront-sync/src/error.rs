//! # Sync Error Types
//!
//! Error types for the synchronization layer.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Sync Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │  Transport (a)  │  │     Backend (b)         │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Connection     │  │  Http { status }        │ │
//! │  │  InvalidUrl     │  │  Timeout        │  │  NotFound(id)           │ │
//! │  │  ConfigLoad/Save│  │  Request        │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │    Protocol     │  │  Resource (c)   │  │       Domain            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Serialization  │  │  HandleRevoked  │  │  Core(CoreError)        │ │
//! │  │  Deserialization│  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Logical misuse (removing an absent cart line, updating an id the catalog
//! does not hold) is not an error anywhere in this crate.

use storefront_core::{CoreError, ProductId, ValidationError};
use thiserror::Error;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Every failure the synchronization layer can report.
#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Base URL or endpoint could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// Backend could not be reached.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request or connect timeout elapsed.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Any other failure while sending a request or reading its body.
    #[error("Request failed: {0}")]
    RequestFailed(String),

    // =========================================================================
    // Backend Errors
    // =========================================================================
    /// Backend answered with a non-success status.
    #[error("Backend responded {status}: {message}")]
    Http { status: u16, message: String },

    /// Backend has no product with this id.
    #[error("Product {0} not found")]
    NotFound(ProductId),

    // =========================================================================
    // Protocol Errors
    // =========================================================================
    /// Failed to encode a request body.
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Response body did not have the expected shape.
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    // =========================================================================
    // Resource Errors
    // =========================================================================
    /// An image handle was used after it had been released.
    #[error("Image handle {0} has been revoked")]
    HandleRevoked(String),

    // =========================================================================
    // Domain Errors
    // =========================================================================
    #[error(transparent)]
    Core(#[from] CoreError),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<ValidationError> for SyncError {
    fn from(err: ValidationError) -> Self {
        SyncError::Core(CoreError::Validation(err))
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SyncError::Timeout(err.to_string())
        } else if err.is_connect() {
            SyncError::ConnectionFailed(err.to_string())
        } else if err.is_decode() {
            SyncError::DeserializationFailed(err.to_string())
        } else if err.is_builder() {
            SyncError::InvalidConfig(err.to_string())
        } else if let Some(status) = err.status() {
            SyncError::Http {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            SyncError::RequestFailed(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            SyncError::DeserializationFailed(err.to_string())
        } else {
            SyncError::SerializationFailed(err.to_string())
        }
    }
}

impl From<url::ParseError> for SyncError {
    fn from(err: url::ParseError) -> Self {
        SyncError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SyncError {
    fn from(err: toml::ser::Error) -> Self {
        SyncError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl SyncError {
    /// Network-level failure: the backend never produced an answer.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            SyncError::ConnectionFailed(_) | SyncError::Timeout(_) | SyncError::RequestFailed(_)
        )
    }

    /// The backend answered, and the answer was an error.
    pub fn is_backend(&self) -> bool {
        matches!(self, SyncError::Http { .. } | SyncError::NotFound(_))
    }

    /// Returns true if repeating the same request could succeed.
    ///
    /// ## Retryable Errors
    /// - Transport failures
    /// - 5xx responses, 408 and 429
    ///
    /// This layer never retries on its own; the flag is for callers.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Http { status, .. } => *status >= 500 || *status == 408 || *status == 429,
            other => other.is_transport(),
        }
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SyncError::InvalidConfig(_)
                | SyncError::InvalidUrl(_)
                | SyncError::ConfigLoadFailed(_)
                | SyncError::ConfigSaveFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert!(SyncError::ConnectionFailed("refused".into()).is_transport());
        assert!(SyncError::NotFound(7).is_backend());
        assert!(!SyncError::NotFound(7).is_transport());
        assert!(SyncError::InvalidUrl("nope".into()).is_config_error());
    }

    #[test]
    fn test_retryable_errors() {
        assert!(SyncError::Timeout("10s".into()).is_retryable());
        assert!(SyncError::Http {
            status: 503,
            message: String::new()
        }
        .is_retryable());

        assert!(!SyncError::Http {
            status: 400,
            message: String::new()
        }
        .is_retryable());
        assert!(!SyncError::NotFound(1).is_retryable());
        assert!(!SyncError::InvalidConfig("bad".into()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = SyncError::Http {
            status: 500,
            message: "boom".into(),
        };
        assert_eq!(err.to_string(), "Backend responded 500: boom");
        assert_eq!(SyncError::NotFound(42).to_string(), "Product 42 not found");
    }

    #[test]
    fn test_validation_error_wraps_into_core() {
        let err: SyncError = ValidationError::Required {
            field: "code".into(),
        }
        .into();
        assert!(matches!(err, SyncError::Core(CoreError::Validation(_))));
    }

    #[test]
    fn test_json_error_is_deserialization() {
        let err: SyncError = serde_json::from_str::<bool>("{").unwrap_err().into();
        assert!(matches!(err, SyncError::DeserializationFailed(_)));
    }
}

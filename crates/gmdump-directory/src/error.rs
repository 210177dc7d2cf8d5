//! Directory error types
//!
//! Error definitions with stable error codes.

use thiserror::Error;

/// Error that can occur while querying a directory or resolving membership.
#[derive(Debug, Error)]
pub enum DirectoryError {
    // Connection errors
    /// Failed to establish connection to the directory server.
    #[error("connection failed: {message}")]
    ConnectionFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Connection timed out.
    #[error("connection timeout after {timeout_secs} seconds")]
    ConnectionTimeout { timeout_secs: u64 },

    // Authentication errors
    /// Invalid credentials provided.
    #[error("authentication failed: invalid credentials")]
    AuthenticationFailed,

    // Configuration errors
    /// Gateway configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    // Query errors
    /// A search request failed at the transport or protocol level.
    #[error("search under '{root}' failed: {message}")]
    SearchFailed {
        root: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The search root does not exist.
    #[error("no such object: '{root}'")]
    NoSuchObject { root: String },

    // Resolution errors
    /// A group is (transitively) a member of itself.
    #[error("cycle detected: group '{identity}' is already being expanded (path: {})", .path.join(" -> "))]
    CycleDetected { identity: String, path: Vec<String> },

    /// Group nesting is deeper than the configured limit.
    #[error("maximum nesting depth {max_depth} exceeded at group '{identity}'")]
    MaxDepthExceeded { identity: String, max_depth: u32 },
}

impl DirectoryError {
    /// Get an error code for classification.
    pub fn error_code(&self) -> &'static str {
        match self {
            DirectoryError::ConnectionFailed { .. } => "CONNECTION_FAILED",
            DirectoryError::ConnectionTimeout { .. } => "CONNECTION_TIMEOUT",
            DirectoryError::AuthenticationFailed => "AUTH_FAILED",
            DirectoryError::InvalidConfiguration { .. } => "INVALID_CONFIG",
            DirectoryError::SearchFailed { .. } => "SEARCH_FAILED",
            DirectoryError::NoSuchObject { .. } => "NO_SUCH_OBJECT",
            DirectoryError::CycleDetected { .. } => "CYCLE_DETECTED",
            DirectoryError::MaxDepthExceeded { .. } => "MAX_DEPTH_EXCEEDED",
        }
    }

    // Convenience constructors

    /// Create a connection failed error.
    pub fn connection_failed(message: impl Into<String>) -> Self {
        DirectoryError::ConnectionFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection failed error with source.
    pub fn connection_failed_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        DirectoryError::ConnectionFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a search failed error.
    pub fn search_failed(root: impl Into<String>, message: impl Into<String>) -> Self {
        DirectoryError::SearchFailed {
            root: root.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a search failed error with source.
    pub fn search_failed_with_source(
        root: impl Into<String>,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        DirectoryError::SearchFailed {
            root: root.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        DirectoryError::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Create a no such object error.
    pub fn no_such_object(root: impl Into<String>) -> Self {
        DirectoryError::NoSuchObject { root: root.into() }
    }
}

/// Result type for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(DirectoryError::AuthenticationFailed.error_code(), "AUTH_FAILED");
        assert_eq!(
            DirectoryError::search_failed("cn=x", "boom").error_code(),
            "SEARCH_FAILED"
        );
        assert_eq!(
            DirectoryError::MaxDepthExceeded {
                identity: "cn=x".to_string(),
                max_depth: 3
            }
            .error_code(),
            "MAX_DEPTH_EXCEEDED"
        );
        assert_eq!(
            DirectoryError::no_such_object("ou=typo,dc=ex").error_code(),
            "NO_SUCH_OBJECT"
        );
    }

    #[test]
    fn test_error_display() {
        let err = DirectoryError::ConnectionTimeout { timeout_secs: 30 };
        assert_eq!(err.to_string(), "connection timeout after 30 seconds");

        let err = DirectoryError::CycleDetected {
            identity: "cn=a,dc=ex".to_string(),
            path: vec!["cn=a,dc=ex".to_string(), "cn=b,dc=ex".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "cycle detected: group 'cn=a,dc=ex' is already being expanded (path: cn=a,dc=ex -> cn=b,dc=ex)"
        );

        let err = DirectoryError::search_failed("cn=g,dc=ex", "busy");
        assert_eq!(err.to_string(), "search under 'cn=g,dc=ex' failed: busy");

        let err = DirectoryError::no_such_object("ou=typo,dc=ex");
        assert_eq!(err.to_string(), "no such object: 'ou=typo,dc=ex'");
    }

    #[test]
    fn test_error_with_source() {
        let source_err = std::io::Error::new(std::io::ErrorKind::Other, "underlying error");
        let err = DirectoryError::connection_failed_with_source("failed", source_err);

        assert_eq!(err.error_code(), "CONNECTION_FAILED");
        if let DirectoryError::ConnectionFailed { source, .. } = &err {
            assert!(source.is_some());
        } else {
            panic!("Expected ConnectionFailed variant");
        }
    }
}

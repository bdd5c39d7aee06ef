//! Error types for fsrctl operations

use thiserror::Error;

/// Main error type shared by the core and the CLI
#[derive(Error, Debug)]
pub enum FsrError {
    /// Caller input problem: missing server, missing or conflicting auth
    #[error("{0}")]
    Usage(String),

    /// Credential selection or token exchange failed
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Transport or HTTP status failure while a command talks to the API
    #[error("API error: {0}")]
    Api(String),
}

impl FsrError {
    /// Shorthand for a usage error
    pub fn usage(message: impl Into<String>) -> Self {
        FsrError::Usage(message.into())
    }

    /// Shorthand for an authentication error
    pub fn authentication(message: impl Into<String>) -> Self {
        FsrError::Authentication(message.into())
    }
}

/// Result type alias for fsrctl operations
pub type FsrResult<T> = Result<T, FsrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authentication_prefix() {
        let err = FsrError::authentication("No token in response");
        assert_eq!(err.to_string(), "Authentication failed: No token in response");
    }

    #[test]
    fn test_usage_is_verbatim() {
        let err = FsrError::usage("Server must be provided");
        assert_eq!(err.to_string(), "Server must be provided");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: FsrError = io.into();
        assert!(matches!(err, FsrError::Io(_)));
        assert!(err.to_string().contains("read-only"));
    }
}

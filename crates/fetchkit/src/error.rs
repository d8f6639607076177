//! Error types for fetch and filesystem operations.
//!
//! Errors are categorized so callers can tell a transport failure from a
//! filesystem failure and report each with the right advice.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Result type alias for fetchkit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of fetchkit errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Connection, DNS, TLS or timeout failure.
    Network,
    /// The server answered with a non-success status.
    Http,
    /// Local filesystem failure.
    Filesystem,
    /// Permission denied on a local path.
    Permission,
    /// The source URI is not usable.
    InvalidSource,
    /// Other/unknown errors.
    Other,
}

impl ErrorCategory {
    /// Whether the failure happened while talking to the remote side.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network | Self::Http)
    }

    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "Network connectivity issue",
            Self::Http => "Server rejected the request",
            Self::Filesystem => "Filesystem error",
            Self::Permission => "Permission denied",
            Self::InvalidSource => "Invalid source URI",
            Self::Other => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Network => "Check your internet connection and try again",
            Self::Http => "Verify the source URI points at an existing file",
            Self::Filesystem => "Check that the destination directory exists and has free space",
            Self::Permission => "Check directory permissions or run with appropriate access",
            Self::InvalidSource => "Use an http:// or https:// URI",
            Self::Other => "Check the error details for more information",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur during fetch and filesystem operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The server answered with a non-2xx status.
    #[error("HTTP error {status} fetching {uri}")]
    Status {
        /// Requested URI.
        uri: String,
        /// HTTP status code.
        status: u16,
    },

    /// The request could not be completed (connection, TLS, protocol).
    #[error("transport error fetching {uri}: {message}")]
    Transport {
        /// Requested URI.
        uri: String,
        /// Error message.
        message: String,
    },

    /// The response body failed while it was being streamed.
    #[error("error reading response body: {0}")]
    Read(#[source] io::Error),

    /// The source URI was rejected before any request was made.
    #[error("invalid source URI: {0}")]
    InvalidSource(String),

    /// IO error during file operations.
    #[error("IO error at {}: {source}", .path.display())]
    Io {
        /// Path involved in the error.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Generic error.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an IO error with path context.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Build an error from a ureq failure for the given URI.
    pub fn from_ureq(uri: &str, err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(status) => Self::Status {
                uri: uri.to_string(),
                status,
            },
            ureq::Error::Io(source) => Self::Transport {
                uri: uri.to_string(),
                message: source.to_string(),
            },
            ureq::Error::BadUri(_) => Self::InvalidSource(uri.to_string()),
            // The request could not be built; nothing went over the wire.
            ureq::Error::Http(e) => Self::Other(e.to_string()),
            ureq::Error::Other(e) => Self::Other(e.to_string()),
            other => Self::Transport {
                uri: uri.to_string(),
                message: other.to_string(),
            },
        }
    }

    /// HTTP status code, when the server answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Status { .. } => ErrorCategory::Http,
            Error::Transport { .. } | Error::Read(_) => ErrorCategory::Network,
            Error::InvalidSource(_) => ErrorCategory::InvalidSource,
            Error::Io { source, .. } => {
                if source.kind() == io::ErrorKind::PermissionDenied {
                    ErrorCategory::Permission
                } else {
                    ErrorCategory::Filesystem
                }
            }
            Error::Other(_) => ErrorCategory::Other,
        }
    }

    /// Whether the failure happened while talking to the remote side.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        self.category().is_transport()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_category() {
        let err = Error::Status {
            uri: "https://example.com/f".to_string(),
            status: 404,
        };
        assert_eq!(err.category(), ErrorCategory::Http);
        assert_eq!(err.status(), Some(404));
        assert!(err.is_transport());
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn test_transport_error_category() {
        let err = Error::Transport {
            uri: "https://example.com/f".to_string(),
            message: "connection refused".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Network);
        assert_eq!(err.status(), None);
        assert!(err.is_transport());
    }

    #[test]
    fn test_read_error_is_transport() {
        let err = Error::Read(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
        assert_eq!(err.category(), ErrorCategory::Network);
        assert!(err.is_transport());
    }

    #[test]
    fn test_io_permission_denied_category() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "permission denied");
        let err = Error::io("/var/lib/tempfetch", io_err);
        assert_eq!(err.category(), ErrorCategory::Permission);
        assert!(!err.is_transport());
    }

    #[test]
    fn test_io_other_category() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "not found");
        let err = Error::io("/some/path", io_err);
        assert_eq!(err.category(), ErrorCategory::Filesystem);
        assert!(err.to_string().contains("/some/path"));
    }

    #[test]
    fn test_from_ureq_status() {
        let err = Error::from_ureq("https://example.com/x", ureq::Error::StatusCode(503));
        assert_eq!(err.status(), Some(503));
    }

    #[test]
    fn test_from_ureq_bad_uri_is_invalid_source() {
        let err = Error::from_ureq("http://[::1", ureq::Error::BadUri("bad".to_string()));
        assert_eq!(err.category(), ErrorCategory::InvalidSource);
    }

    #[test]
    fn test_from_ureq_other_is_not_transport() {
        let inner = io::Error::other("agent misconfigured");
        let err = Error::from_ureq("https://example.com/x", ureq::Error::Other(Box::new(inner)));
        assert_eq!(err.category(), ErrorCategory::Other);
        assert!(!err.is_transport());
        assert_eq!(err.to_string(), "agent misconfigured");
    }

    #[test]
    fn test_category_display_is_description() {
        assert_eq!(ErrorCategory::Http.to_string(), "Server rejected the request");
    }

    #[test]
    fn test_category_advice_not_empty() {
        for category in [
            ErrorCategory::Network,
            ErrorCategory::Http,
            ErrorCategory::Filesystem,
            ErrorCategory::Permission,
            ErrorCategory::InvalidSource,
            ErrorCategory::Other,
        ] {
            assert!(!category.description().is_empty());
            assert!(!category.advice().is_empty());
        }
    }
}

//! Errors raised while declaring or converging temporary files.

use fetchkit::ErrorCategory;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors for `temporary_file` and friends.
///
/// Transport failures and filesystem failures are kept apart so the
/// message tells the operator which side to look at.
#[derive(Debug, Error)]
pub enum TemporaryFileError {
    /// Source is not an http(s) URI. Raised at declaration time.
    #[error("Invalid source '{0}': must be an http:// or https:// URI")]
    InvalidSource(String),

    /// Destination path given but not absolute.
    #[error("Invalid path '{0}': must be absolute")]
    RelativePath(String),

    /// The remote side failed: connection, TLS, or a non-2xx answer.
    #[error("Failed to download {source_uri}: {}{message}", status_prefix(.status))]
    Transport {
        source_uri: String,
        status: Option<u16>,
        message: String,
    },

    /// Directory creation, file write, or permission change failed.
    #[error(
        "Could not create file at {}: {source}. Ensure parent directories exist and are writable",
        .path.display()
    )]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Removing a file failed.
    #[error("Could not remove {}: {source}", .path.display())]
    Removal {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("An unexpected error occurred during download of {source_uri}: {message}")]
    Unexpected { source_uri: String, message: String },

    /// Kinds that are only ever generated, never declared.
    #[error("Resource kind '{0}' cannot be declared directly")]
    UndeclarableKind(String),

    #[error("Duplicate resource {0}")]
    DuplicateResource(String),

    /// A resource that lists itself in `require`.
    #[error("{0} cannot require itself")]
    SelfRequire(String),

    /// A `require` entry that is not of the form `Kind[name]`.
    #[error("Invalid resource reference '{0}': expected Kind[name]")]
    InvalidReference(String),

    /// Required attribute missing or of the wrong type.
    #[error("{resource}: attribute '{attribute}' {problem}")]
    InvalidAttribute {
        resource: String,
        attribute: String,
        problem: String,
    },
}

fn status_prefix(status: &Option<u16>) -> String {
    status.map(|s| format!("HTTP Error {s} - ")).unwrap_or_default()
}

impl TemporaryFileError {
    /// Translate a fetch-service error for `source_uri`.
    ///
    /// Filesystem errors keep their path; everything that happened on the
    /// wire becomes [`TemporaryFileError::Transport`].
    pub fn from_fetch(source_uri: &str, err: fetchkit::Error) -> Self {
        match err {
            fetchkit::Error::Status { status, .. } => Self::Transport {
                source_uri: source_uri.to_string(),
                status: Some(status),
                message: "server returned an error status".to_string(),
            },
            fetchkit::Error::Transport { message, .. } => Self::Transport {
                source_uri: source_uri.to_string(),
                status: None,
                message,
            },
            fetchkit::Error::Read(source) => Self::Transport {
                source_uri: source_uri.to_string(),
                status: None,
                message: source.to_string(),
            },
            fetchkit::Error::InvalidSource(uri) => Self::InvalidSource(uri),
            fetchkit::Error::Io { path, source } => Self::Filesystem { path, source },
            fetchkit::Error::Other(message) => Self::Unexpected {
                source_uri: source_uri.to_string(),
                message,
            },
        }
    }

    /// Category of a fetch or removal failure. Declaration errors have none.
    pub fn category(&self) -> Option<ErrorCategory> {
        match self {
            Self::Transport { status: Some(_), .. } => Some(ErrorCategory::Http),
            Self::Transport { .. } => Some(ErrorCategory::Network),
            Self::Filesystem { source, .. } | Self::Removal { source, .. } => {
                if source.kind() == io::ErrorKind::PermissionDenied {
                    Some(ErrorCategory::Permission)
                } else {
                    Some(ErrorCategory::Filesystem)
                }
            }
            Self::InvalidSource(_) => Some(ErrorCategory::InvalidSource),
            Self::Unexpected { .. } => Some(ErrorCategory::Other),
            Self::RelativePath(_)
            | Self::UndeclarableKind(_)
            | Self::DuplicateResource(_)
            | Self::SelfRequire(_)
            | Self::InvalidReference(_)
            | Self::InvalidAttribute { .. } => None,
        }
    }

    /// Error for the apply report, followed by advice for its category.
    pub fn into_report(self) -> anyhow::Error {
        match self.category() {
            Some(category) => anyhow::anyhow!("{self}. {category}: {}", category.advice()),
            None => anyhow::Error::new(self),
        }
    }

    /// Whether the failure happened on the remote side.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Whether the failure happened on the local filesystem.
    pub fn is_filesystem(&self) -> bool {
        matches!(self, Self::Filesystem { .. } | Self::Removal { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_becomes_transport_with_code() {
        let err = TemporaryFileError::from_fetch(
            "https://example.com/a",
            fetchkit::Error::Status {
                uri: "https://example.com/a".to_string(),
                status: 404,
            },
        );

        assert!(err.is_transport());
        let msg = err.to_string();
        assert!(msg.contains("https://example.com/a"));
        assert!(msg.contains("HTTP Error 404"));
    }

    #[test]
    fn test_connection_failure_has_no_status() {
        let err = TemporaryFileError::from_fetch(
            "https://example.com/a",
            fetchkit::Error::Transport {
                uri: "https://example.com/a".to_string(),
                message: "connection refused".to_string(),
            },
        );

        assert!(matches!(
            err,
            TemporaryFileError::Transport { status: None, .. }
        ));
        assert!(!err.to_string().contains("HTTP Error"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_io_becomes_filesystem() {
        let err = TemporaryFileError::from_fetch(
            "https://example.com/a",
            fetchkit::Error::io(
                "/var/lib/x/a",
                io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
            ),
        );

        assert!(err.is_filesystem());
        assert!(!err.is_transport());
        assert!(err.to_string().contains("/var/lib/x/a"));
    }

    #[test]
    fn test_report_carries_category_advice() {
        let err = TemporaryFileError::from_fetch(
            "https://example.com/a",
            fetchkit::Error::Status {
                uri: "https://example.com/a".to_string(),
                status: 503,
            },
        );
        assert_eq!(err.category(), Some(ErrorCategory::Http));

        let report = format!("{:#}", err.into_report());
        assert!(report.starts_with("Failed to download https://example.com/a: HTTP Error 503"));
        assert!(report.contains(ErrorCategory::Http.advice()));
    }

    #[test]
    fn test_permission_denied_category() {
        let err = TemporaryFileError::Removal {
            path: PathBuf::from("/srv/x"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.category(), Some(ErrorCategory::Permission));
    }

    #[test]
    fn test_declaration_errors_report_without_advice() {
        let err = TemporaryFileError::RelativePath("x".to_string());
        assert_eq!(err.category(), None);
        assert_eq!(
            err.into_report().to_string(),
            "Invalid path 'x': must be absolute"
        );
    }

    #[test]
    fn test_other_becomes_unexpected() {
        let err = TemporaryFileError::from_fetch(
            "https://example.com/a",
            fetchkit::Error::Other("boom".to_string()),
        );
        assert!(matches!(err, TemporaryFileError::Unexpected { .. }));
    }
}

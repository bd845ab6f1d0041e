use thiserror::Error;

/// Structured error type for a single relay run.
///
/// Each stage of the pipeline returns one of these variants; the pipeline matches on
/// the variant to pick the user-facing reply. `Display` yields only the inner cause so
/// it can be embedded into reply texts and log lines as-is.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Message text is empty or does not start with an http(s) URL
    #[error("{0}")]
    InvalidInput(String),
    /// Extraction engine failures (network, unsupported URL, bad exit code, timeout)
    #[error("{0}")]
    Extraction(String),
    /// Engine reported success but left no file in the workspace
    #[error("{0}")]
    NotFound(String),
    /// Staged artifact exceeds the configured ceiling
    #[error("file is too large: {size_bytes} bytes (limit {limit_bytes} bytes)")]
    TooLarge { size_bytes: u64, limit_bytes: u64 },
    /// Failed to hand the artifact to the outbound transport
    #[error("{0}")]
    Delivery(String),
}

impl RelayError {
    /// Returns subcategory for log lines
    pub fn subcategory(&self) -> &'static str {
        match self {
            RelayError::InvalidInput(_) => "invalid_input",
            RelayError::Extraction(_) => "extraction",
            RelayError::NotFound(_) => "not_found",
            RelayError::TooLarge { .. } => "too_large",
            RelayError::Delivery(_) => "delivery",
        }
    }

    /// Whether the failure follows from what the user asked for (bad input, a quality
    /// too large to send) rather than from the source or the transport
    pub fn is_user_error(&self) -> bool {
        matches!(self, RelayError::InvalidInput(_) | RelayError::TooLarge { .. })
    }
}

impl From<std::io::Error> for RelayError {
    fn from(err: std::io::Error) -> Self {
        RelayError::Extraction(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relay_error_display() {
        let err = RelayError::Extraction("Unable to download webpage".into());
        assert_eq!(err.to_string(), "Unable to download webpage");

        let err = RelayError::TooLarge {
            size_bytes: 2048,
            limit_bytes: 1024,
        };
        assert_eq!(err.to_string(), "file is too large: 2048 bytes (limit 1024 bytes)");
    }

    #[test]
    fn test_relay_error_subcategory() {
        assert_eq!(RelayError::InvalidInput("".into()).subcategory(), "invalid_input");
        assert_eq!(RelayError::Extraction("".into()).subcategory(), "extraction");
        assert_eq!(RelayError::NotFound("".into()).subcategory(), "not_found");
        assert_eq!(
            RelayError::TooLarge {
                size_bytes: 1,
                limit_bytes: 0
            }
            .subcategory(),
            "too_large"
        );
        assert_eq!(RelayError::Delivery("".into()).subcategory(), "delivery");
    }

    #[test]
    fn test_io_error_counts_as_extraction() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: RelayError = io.into();
        assert!(matches!(err, RelayError::Extraction(_)));
        assert!(!err.is_user_error());
    }

    #[test]
    fn test_user_errors() {
        assert!(RelayError::InvalidInput("not a URL".into()).is_user_error());
        assert!(RelayError::TooLarge {
            size_bytes: 2,
            limit_bytes: 1
        }
        .is_user_error());
        assert!(!RelayError::Delivery("timeout".into()).is_user_error());
    }
}

//! Error types.
//!
//! Two layers, mirroring the capability boundary:
//!   `PlatformError` -- failures reported by an injected hook/inject backend
//!   (permission missing, surface unavailable, backend-specific faults).
//!   `Error` -- operation-level outcomes of the core engine. Every variant is
//!   recoverable at the operation boundary; none terminates the process.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Capability-boundary errors
// ---------------------------------------------------------------------------

/// Error returned by an injected platform capability (monitor or injector).
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The OS capability for global observation/injection is not granted.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The backend cannot operate in the current environment.
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// Any other backend failure.
    #[error("{0}")]
    Other(String),
}

// ---------------------------------------------------------------------------
// Operation-level errors
// ---------------------------------------------------------------------------

/// Error returned by the core record/replay operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Capability check failed; the operation was aborted before any
    /// side effect. Surfaced to the consumer as a single status event.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The playback payload was not a sequence of event records. Rejected
    /// at the boundary with no partial processing.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Playback requested while recording, or recording requested while
    /// playing. Aborted before any side effect.
    #[error("operation conflict: {0}")]
    ConcurrencyConflict(String),

    /// A platform backend failed outside the permission path.
    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file failed to parse; message includes line/column.
    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_error_converts_into_error() {
        let err: Error = PlatformError::Unavailable("no display".into()).into();
        assert!(matches!(err, Error::Platform(_)));
    }

    #[test]
    fn messages_name_the_failure() {
        let err = Error::ConcurrencyConflict("cannot play while recording".into());
        assert!(err.to_string().contains("cannot play while recording"));
    }
}

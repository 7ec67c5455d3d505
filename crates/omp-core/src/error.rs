//! Error types for the OMP engine.

use thiserror::Error;

/// Main error type for engine operations.
///
/// These are connection-level faults, not protocol-level command failures.
/// A command that fails validation or a backend lookup still produces a
/// protocol error response; the variants here end up terminating or
/// suspending the connection instead.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from the underlying byte stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed XML from the client; the stream cannot be resynchronized.
    #[error("XML error: {message}")]
    Xml { message: String },

    /// The output sink cannot accept more bytes right now.
    ///
    /// This is backpressure, not failure: the caller should retry the
    /// write later rather than report an error to the client.
    #[error("output buffer full")]
    BufferFull,

    /// A single command accumulated more text than the configured limit.
    #[error("command payload exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    /// The backend reported an unrecoverable internal condition.
    #[error("backend failure: {message}")]
    Backend { message: String },

    /// An internal invariant was violated; the connection must not
    /// continue with corrupted state.
    #[error("internal error: {message}")]
    Internal { message: String },

    /// A second fork-shaped operation was attempted in a process that
    /// already forked a scan worker.
    #[error("process has already forked a scan worker")]
    AlreadyForked,
}

impl Error {
    /// Returns true if the connection can be resumed after this error.
    ///
    /// Only backpressure is resumable; everything else terminates the
    /// connection.
    pub fn is_backpressure(&self) -> bool {
        matches!(self, Error::BufferFull)
    }

    /// Returns true if this error must fail fast rather than attempt a
    /// best-effort protocol response.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Internal { .. } | Error::AlreadyForked | Error::Backend { .. }
        )
    }
}

/// Convenience result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_full_is_backpressure_not_fatal() {
        let err = Error::BufferFull;
        assert!(err.is_backpressure());
        assert!(!err.is_fatal());
    }

    #[test]
    fn invariant_violations_are_fatal() {
        let err = Error::Internal {
            message: "resource count went negative".into(),
        };
        assert!(err.is_fatal());
        assert!(Error::AlreadyForked.is_fatal());
    }

    #[test]
    fn display_includes_limit() {
        let err = Error::PayloadTooLarge { limit: 16 };
        assert_eq!(err.to_string(), "command payload exceeds 16 bytes");
    }
}

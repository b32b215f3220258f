//! Error types for dirlookup-wire.
//!
//! The variants split into three families that callers treat differently:
//!
//! - **Retryable**: [`WireError::BufferTooSmall`]. The scratch arena was too
//!   small; re-issue the whole call with a larger one.
//! - **Connection fatal**: [`WireError::Read`], [`WireError::Write`] and
//!   [`WireError::Malformed`]. The stream is out of sync and must be dropped.
//! - **Normal outcome**: [`WireError::NotFound`]. Well-formed data without a
//!   usable record.

use thiserror::Error;

/// Main error type for all codec and decoder operations.
#[derive(Debug, Error)]
pub enum WireError {
    /// Short read or broken stream while decoding.
    #[error("read error: {0}")]
    Read(#[source] std::io::Error),

    /// The stream refused bytes while encoding.
    #[error("write error: {0}")]
    Write(#[source] std::io::Error),

    /// The scratch arena cannot hold the next value.
    #[error("buffer too small: {needed} bytes needed, {available} available")]
    BufferTooSmall {
        /// Bytes the failed reservation asked for.
        needed: usize,
        /// Bytes left in the arena at the time.
        available: usize,
    },

    /// A decoded length, count or tag is out of range.
    #[error("malformed stream: {0}")]
    Malformed(String),

    /// Well-formed data but no usable record.
    #[error("not found")]
    NotFound,

    /// Configuration file could not be parsed.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    /// Configuration file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration values are inconsistent.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl WireError {
    /// True when retrying the whole call with a larger arena may succeed.
    #[inline]
    pub fn is_retryable(&self) -> bool {
        matches!(self, WireError::BufferTooSmall { .. })
    }

    /// True when the stream can no longer be used.
    #[inline]
    pub fn is_connection_fatal(&self) -> bool {
        matches!(
            self,
            WireError::Read(_) | WireError::Write(_) | WireError::Malformed(_)
        )
    }

    /// True for the "no usable record" outcome.
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, WireError::NotFound)
    }
}

/// Result type alias using WireError.
pub type Result<T> = std::result::Result<T, WireError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_error_is_retryable_not_fatal() {
        let err = WireError::BufferTooSmall {
            needed: 10,
            available: 3,
        };
        assert!(err.is_retryable());
        assert!(!err.is_connection_fatal());
        assert!(err.to_string().contains("10 bytes needed"));
    }

    #[test]
    fn test_stream_errors_are_fatal() {
        let read = WireError::Read(std::io::ErrorKind::UnexpectedEof.into());
        let write = WireError::Write(std::io::ErrorKind::BrokenPipe.into());
        let malformed = WireError::Malformed("negative length -1".to_string());

        for err in [read, write, malformed] {
            assert!(err.is_connection_fatal());
            assert!(!err.is_retryable());
        }
    }

    #[test]
    fn test_not_found_is_neither() {
        let err = WireError::NotFound;
        assert!(err.is_not_found());
        assert!(!err.is_retryable());
        assert!(!err.is_connection_fatal());
    }
}

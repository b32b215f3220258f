//! Lookup outcomes and arena growth.
//!
//! A name-service stub reports every lookup as an [`NssStatus`] plus an
//! `errno` and an `h_errno`. [`Outcome::of`] performs that mapping for any
//! decoder result. [`with_growing_buffer`] re-runs a whole lookup with a
//! larger arena while it keeps failing with `BufferTooSmall`.

use crate::config::BridgeConfig;
use crate::error::{Result, WireError};
use crate::protocol::Arena;

/// `errno` for a result that did not fit the caller's buffer.
pub const ERANGE: i32 = 34;

/// `errno` for a lookup that found nothing.
pub const ENOENT: i32 = 2;

/// `errno` for a broken daemon connection.
pub const EIO: i32 = 5;

/// `h_errno` values.
pub mod h_errno {
    /// Authoritative "no such host".
    pub const HOST_NOT_FOUND: i32 = 1;
    /// Temporary failure; try again.
    pub const TRY_AGAIN: i32 = 2;
    /// Non-recoverable failure.
    pub const NO_RECOVERY: i32 = 3;
}

/// Name-service status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum NssStatus {
    /// Retry, typically with a larger buffer.
    TryAgain = -2,
    /// Service unavailable.
    Unavail = -1,
    /// No such entry.
    NotFound = 0,
    /// Entry returned.
    Success = 1,
}

impl NssStatus {
    /// Status reported for `err`.
    pub fn from_error(err: &WireError) -> Self {
        match err {
            WireError::BufferTooSmall { .. } => NssStatus::TryAgain,
            WireError::NotFound => NssStatus::NotFound,
            _ => NssStatus::Unavail,
        }
    }

    /// Numeric value as returned by a name-service module.
    #[inline]
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

/// Status with its `errno` and `h_errno`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub status: NssStatus,
    pub errno: i32,
    pub h_errno: i32,
}

impl Outcome {
    /// Successful lookup.
    pub const SUCCESS: Outcome = Outcome {
        status: NssStatus::Success,
        errno: 0,
        h_errno: 0,
    };

    /// Map a decoder result.
    pub fn of<T>(result: &Result<T>) -> Self {
        match result {
            Ok(_) => Self::SUCCESS,
            Err(err) => Self::from_error(err),
        }
    }

    /// Map a decoder error.
    pub fn from_error(err: &WireError) -> Self {
        let status = NssStatus::from_error(err);
        let (errno, h_errno) = match status {
            NssStatus::TryAgain => (ERANGE, h_errno::TRY_AGAIN),
            NssStatus::NotFound => (ENOENT, h_errno::HOST_NOT_FOUND),
            NssStatus::Unavail => (EIO, h_errno::NO_RECOVERY),
            NssStatus::Success => (0, 0),
        };
        Self {
            status,
            errno,
            h_errno,
        }
    }
}

/// Run `call` with a fresh arena of `initial` bytes, doubling the arena on
/// `BufferTooSmall` until it succeeds or `max` has been tried.
///
/// `call` must perform the whole lookup (request, response, decode) since a
/// short arena leaves the stream mid-record. Its output cannot borrow the
/// arena; copy what you need out of it (for example
/// [`HostEnt::to_record`](crate::hosts::HostEnt::to_record)).
pub fn with_growing_buffer<T, F>(initial: usize, max: usize, mut call: F) -> Result<T>
where
    F: FnMut(&mut Arena<'_>) -> Result<T>,
{
    if initial == 0 || initial > max {
        return Err(WireError::InvalidConfig(format!(
            "buffer sizes {}..{} are not usable",
            initial, max
        )));
    }

    let mut size = initial;
    loop {
        let mut buf = vec![0u8; size];
        let mut arena = Arena::new(&mut buf);
        match call(&mut arena) {
            Err(err) if err.is_retryable() && size < max => {
                let next = size.saturating_mul(2).min(max);
                tracing::warn!(
                    "Lookup needs a larger buffer ({}), growing {} -> {}",
                    err,
                    size,
                    next
                );
                size = next;
            }
            Err(err) if err.is_retryable() => {
                tracing::warn!("Lookup still short at max buffer size {}", max);
                return Err(err);
            }
            other => return other,
        }
    }
}

/// [`with_growing_buffer`] with sizes from `config`.
pub fn with_config<T, F>(config: &BridgeConfig, call: F) -> Result<T>
where
    F: FnMut(&mut Arena<'_>) -> Result<T>,
{
    with_growing_buffer(config.initial_buffer_size, config.max_buffer_size, call)
}

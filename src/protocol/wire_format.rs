//! Wire format constants and decode limits.
//!
//! Every frame is built from one primitive, a big-endian signed 32-bit
//! integer:
//! ```text
//! INT32              4 bytes, int32 BE
//! STRING             INT32 len │ len raw bytes (no terminator)
//! STRINGLIST         INT32 count │ count × STRING
//! ```
//!
//! Counted and sentinel-terminated string lists share the same wire form; the
//! difference only shows on the decode side, where the sentinel form gets an
//! extra end-of-list slot.

use serde::{Deserialize, Serialize};

use crate::error::{Result, WireError};

/// Size of an INT32 frame in bytes.
pub const INT32_SIZE: usize = 4;

/// Size of one pointer slot in the scratch arena.
pub const SLOT_SIZE: usize = std::mem::size_of::<usize>();

/// Slot value marking the end of a sentinel-terminated list.
pub const SLOT_SENTINEL: usize = usize::MAX;

/// Protocol version exchanged in request and response headers.
pub const PROTOCOL_VERSION: i32 = 0x0000_0002;

/// Default maximum length accepted for a single STRING frame.
pub const DEFAULT_MAX_STRING_LEN: usize = 64 * 1024;

/// Default maximum entry count accepted for a STRINGLIST or address list.
pub const DEFAULT_MAX_LIST_LEN: usize = 4096;

/// Action codes carried in request headers.
pub mod action {
    /// Look up a host by name.
    pub const HOST_BYNAME: i32 = 0x0005_0001;
    /// Look up a host by address.
    pub const HOST_BYADDR: i32 = 0x0005_0002;
    /// Enumerate all hosts.
    pub const HOST_ALL: i32 = 0x0005_0008;
}

/// Result codes preceding records in a response stream.
pub mod result {
    /// A record follows.
    pub const BEGIN: i32 = 1;
    /// No more records.
    pub const END: i32 = 2;
}

/// Upper bounds applied to decoded lengths and counts.
///
/// A value above these limits is treated as a malformed stream rather than a
/// buffer sizing problem, so a garbled length never turns into an endless
/// grow-and-retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum STRING length in bytes.
    pub max_string_len: usize,
    /// Maximum entries in a STRINGLIST or address list.
    pub max_list_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_string_len: DEFAULT_MAX_STRING_LEN,
            max_list_len: DEFAULT_MAX_LIST_LEN,
        }
    }
}

impl Limits {
    /// Validate a decoded string length.
    pub fn check_string_len(&self, len: i32) -> Result<usize> {
        let len = non_negative(len, "string length")?;
        if len > self.max_string_len {
            tracing::warn!("Rejecting string length {} (max {})", len, self.max_string_len);
            return Err(WireError::Malformed(format!(
                "string length {} exceeds maximum {}",
                len, self.max_string_len
            )));
        }
        Ok(len)
    }

    /// Validate a decoded list count.
    pub fn check_list_len(&self, count: i32) -> Result<usize> {
        let count = non_negative(count, "list count")?;
        if count > self.max_list_len {
            tracing::warn!("Rejecting list count {} (max {})", count, self.max_list_len);
            return Err(WireError::Malformed(format!(
                "list count {} exceeds maximum {}",
                count, self.max_list_len
            )));
        }
        Ok(count)
    }
}

fn non_negative(value: i32, what: &str) -> Result<usize> {
    usize::try_from(value).map_err(|_| {
        tracing::warn!("Rejecting negative {} {}", what, value);
        WireError::Malformed(format!("negative {} {}", what, value))
    })
}

/// Convert a host-side length to its INT32 wire value.
pub fn wire_len(len: usize) -> Result<i32> {
    i32::try_from(len)
        .map_err(|_| WireError::Malformed(format!("length {} does not fit in INT32", len)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_length_is_malformed() {
        let limits = Limits::default();
        let err = limits.check_string_len(-1).unwrap_err();
        assert!(matches!(err, WireError::Malformed(_)));
        assert!(err.to_string().contains("negative"));
    }

    #[test]
    fn test_absurd_length_is_malformed() {
        let limits = Limits {
            max_string_len: 16,
            max_list_len: 2,
        };
        assert_eq!(limits.check_string_len(16).unwrap(), 16);
        assert!(limits.check_string_len(17).is_err());
        assert_eq!(limits.check_list_len(2).unwrap(), 2);
        assert!(limits.check_list_len(3).is_err());
    }

    #[test]
    fn test_zero_is_valid() {
        let limits = Limits::default();
        assert_eq!(limits.check_string_len(0).unwrap(), 0);
        assert_eq!(limits.check_list_len(0).unwrap(), 0);
    }

    #[test]
    fn test_wire_len() {
        assert_eq!(wire_len(5).unwrap(), 5);
        assert!(wire_len(i32::MAX as usize + 1).is_err());
    }

    #[test]
    fn test_result_codes_distinct() {
        assert_ne!(result::BEGIN, result::END);
        assert_ne!(action::HOST_BYNAME, action::HOST_BYADDR);
    }
}

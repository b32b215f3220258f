//! Read path of the wire codec.
//!
//! [`WireReader`] wraps any `std::io::Read`. It offers three kinds of reads:
//!
//! - stream level: INT32 values and fixed-size byte blocks
//! - skips: discard a STRING or STRINGLIST without materializing it
//! - arena backed: decode strings and string arrays straight into a
//!   caller-owned [`Arena`]
//!
//! A short read is [`WireError::Read`]; a negative or oversized length is
//! [`WireError::Malformed`]; an arena that cannot hold the value is
//! [`WireError::BufferTooSmall`]. Only the last one is retryable.

use std::io::{self, Read};

use super::arena::{Arena, ArenaStr, SlotArray};
use super::wire_format::{Limits, INT32_SIZE, SLOT_SENTINEL};
use crate::error::{Result, WireError};

/// Frame reader over a byte stream.
pub struct WireReader<R> {
    inner: R,
    limits: Limits,
}

impl<R: Read> WireReader<R> {
    /// Wrap a stream using the default limits.
    pub fn new(inner: R) -> Self {
        Self::with_limits(inner, Limits::default())
    }

    /// Wrap a stream with custom limits.
    pub fn with_limits(inner: R, limits: Limits) -> Self {
        Self { inner, limits }
    }

    /// Limits applied to decoded lengths and counts.
    #[inline]
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Get a reference to the underlying stream.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Get a mutable reference to the underlying stream.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Unwrap the underlying stream.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Fill `buf` completely from the stream.
    pub fn read_into(&mut self, buf: &mut [u8]) -> Result<()> {
        read_full(&mut self.inner, buf)
    }

    /// Read exactly `N` bytes.
    pub fn read_exact_bytes<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.read_into(&mut buf)?;
        Ok(buf)
    }

    /// Read an INT32 frame.
    pub fn read_int32(&mut self) -> Result<i32> {
        let raw = self.read_exact_bytes::<INT32_SIZE>()?;
        let value = i32::from_be_bytes(raw);
        tracing::trace!("READ_INT32: {}", value);
        Ok(value)
    }

    /// Read a STRING length and validate it against the limits.
    pub fn read_string_len(&mut self) -> Result<usize> {
        let len = self.read_int32()?;
        self.limits.check_string_len(len)
    }

    /// Read a list count and validate it against the limits.
    pub fn read_list_len(&mut self) -> Result<usize> {
        let count = self.read_int32()?;
        self.limits.check_list_len(count)
    }

    /// Discard `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        tracing::trace!("SKIP: {} bytes", n);
        let copied = io::copy(&mut (&mut self.inner).take(n as u64), &mut io::sink())
            .map_err(WireError::Read)?;
        if copied < n as u64 {
            return Err(WireError::Read(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("stream ended after {} of {} skipped bytes", copied, n),
            )));
        }
        Ok(())
    }

    /// Discard a STRING frame.
    pub fn skip_string(&mut self) -> Result<()> {
        let len = self.read_string_len()?;
        self.skip(len)
    }

    /// Discard a STRINGLIST frame.
    pub fn skip_string_array(&mut self) -> Result<()> {
        let count = self.read_list_len()?;
        tracing::trace!("SKIP_STRLST: {} strings", count);
        for _ in 0..count {
            self.skip_string()?;
        }
        Ok(())
    }

    /// Read a STRING frame into a freshly allocated `String`.
    ///
    /// For callers without a scratch arena, e.g. the daemon side reading
    /// request arguments.
    pub fn read_string_owned(&mut self) -> Result<String> {
        let len = self.read_string_len()?;
        let mut buf = vec![0u8; len];
        self.read_into(&mut buf)?;
        String::from_utf8(buf)
            .map_err(|_| WireError::Malformed("string is not valid UTF-8".to_string()))
    }

    /// Read a STRING frame into the arena, NUL-terminated.
    ///
    /// The arena is checked for `len + 1` bytes before any payload byte is
    /// consumed.
    pub fn read_string_into(&mut self, arena: &mut Arena<'_>) -> Result<ArenaStr> {
        let len = self.read_string_len()?;
        let inner = &mut self.inner;
        let offset = arena.reserve_with(len + 1, |region| {
            read_full(inner, &mut region[..len])?;
            if std::str::from_utf8(&region[..len]).is_err() {
                return Err(WireError::Malformed(
                    "string is not valid UTF-8".to_string(),
                ));
            }
            region[len] = 0;
            Ok(())
        })?;
        tracing::trace!("READ_STRING: len={} at={}", len, offset);
        Ok(ArenaStr { offset, len })
    }

    /// Read a counted STRINGLIST into the arena.
    ///
    /// Reserves `count` slots, then stores each string and its offset.
    pub fn read_string_array_counted_into(&mut self, arena: &mut Arena<'_>) -> Result<SlotArray> {
        let count = self.read_list_len()?;
        tracing::trace!("READ_STRLST: num={}", count);
        let slots = arena.reserve_slots(count)?;
        self.fill_slots(arena, slots, count)?;
        Ok(SlotArray {
            offset: slots,
            len: count,
            terminated: false,
        })
    }

    /// Read a STRINGLIST into the arena with a trailing sentinel slot.
    pub fn read_string_array_sentinel_into(&mut self, arena: &mut Arena<'_>) -> Result<SlotArray> {
        let count = self.read_list_len()?;
        tracing::trace!("READ_STRLST: num={} (terminated)", count);
        let slots = arena.reserve_slots(count + 1)?;
        self.fill_slots(arena, slots, count)?;
        arena.set_slot(slots, count, SLOT_SENTINEL);
        Ok(SlotArray {
            offset: slots,
            len: count,
            terminated: true,
        })
    }

    fn fill_slots(&mut self, arena: &mut Arena<'_>, slots: usize, count: usize) -> Result<()> {
        for index in 0..count {
            let stored = self.read_string_into(arena)?;
            arena.set_slot(slots, index, stored.offset);
        }
        Ok(())
    }
}

fn read_full<R: Read>(inner: &mut R, buf: &mut [u8]) -> Result<()> {
    inner.read_exact(buf).map_err(|e| {
        tracing::debug!("Read of {} bytes failed: {}", buf.len(), e);
        WireError::Read(e)
    })
}

//! Write path of the wire codec.
//!
//! [`WireWriter`] wraps any `std::io::Write` and emits INT32, STRING and
//! STRINGLIST frames. A failed write leaves the stream in an unknown state:
//! the caller must drop the connection, there is no partial-frame retry.
//!
//! # Example
//!
//! ```
//! use dirlookup_wire::protocol::WireWriter;
//!
//! let mut writer = WireWriter::buffered();
//! writer.write_string("host1").unwrap();
//! let bytes = writer.finish();
//! assert_eq!(&bytes[..], &[0, 0, 0, 5, b'h', b'o', b's', b't', b'1']);
//! ```

use std::io::Write;

use bytes::buf::Writer;
use bytes::{BufMut, Bytes, BytesMut};

use super::wire_format::wire_len;
use crate::error::{Result, WireError};

/// Default initial capacity for in-memory writers.
const DEFAULT_BUFFER_CAPACITY: usize = 1024;

/// Frame writer over a byte stream.
pub struct WireWriter<W> {
    inner: W,
}

impl<W: Write> WireWriter<W> {
    /// Wrap a stream.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Get a reference to the underlying stream.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Get a mutable reference to the underlying stream.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Unwrap the underlying stream.
    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Write raw bytes with no framing.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes).map_err(|e| {
            tracing::debug!("Write of {} bytes failed: {}", bytes.len(), e);
            WireError::Write(e)
        })
    }

    /// Write an INT32 frame (big-endian).
    pub fn write_int32(&mut self, value: i32) -> Result<()> {
        tracing::trace!("WRITE_INT32: {}", value);
        self.write_bytes(&value.to_be_bytes())
    }

    /// Write a STRING frame: length then raw bytes, no terminator.
    pub fn write_string(&mut self, value: &str) -> Result<()> {
        let len = wire_len(value.len())?;
        tracing::trace!("WRITE_STRING: len={}", len);
        self.write_int32(len)?;
        if len > 0 {
            self.write_bytes(value.as_bytes())?;
        }
        Ok(())
    }

    /// Write a counted STRINGLIST frame.
    pub fn write_string_array_counted<S: AsRef<str>>(&mut self, list: &[S]) -> Result<()> {
        let count = wire_len(list.len())?;
        tracing::trace!("WRITE_STRLST: num={}", count);
        self.write_int32(count)?;
        for item in list {
            self.write_string(item.as_ref())?;
        }
        Ok(())
    }

    /// Write a STRINGLIST frame from a sentinel-terminated sequence.
    ///
    /// Entries up to the first `None` are written; anything after the
    /// sentinel is ignored. A sequence without a sentinel is written whole.
    pub fn write_string_array_sentinel<S: AsRef<str>>(&mut self, seq: &[Option<S>]) -> Result<()> {
        let len = seq.iter().take_while(|item| item.is_some()).count();
        let count = wire_len(len)?;
        tracing::trace!("WRITE_STRLST: num={}", count);
        self.write_int32(count)?;
        for item in seq.iter().map_while(|item| item.as_ref()) {
            self.write_string(item.as_ref())?;
        }
        Ok(())
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush().map_err(|e| {
            tracing::debug!("Flush failed: {}", e);
            WireError::Write(e)
        })
    }
}

impl WireWriter<Writer<BytesMut>> {
    /// Create a writer that accumulates frames in memory.
    pub fn buffered() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_CAPACITY)
    }

    /// Create an in-memory writer with the given initial capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(BytesMut::with_capacity(capacity).writer())
    }

    /// Number of bytes accumulated so far.
    pub fn len(&self) -> usize {
        self.inner.get_ref().len()
    }

    /// Check if nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.inner.get_ref().is_empty()
    }

    /// Freeze the accumulated frames.
    pub fn finish(self) -> Bytes {
        self.inner.into_inner().freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};

    /// Writer that accepts `budget` bytes and then reports a broken pipe.
    struct BrokenPipe {
        budget: usize,
    }

    impl Write for BrokenPipe {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.budget == 0 {
                return Err(io::ErrorKind::BrokenPipe.into());
            }
            let n = buf.len().min(self.budget);
            self.budget -= n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::ErrorKind::BrokenPipe.into())
        }
    }

    #[test]
    fn test_int32_big_endian() {
        let mut writer = WireWriter::new(Cursor::new(Vec::new()));
        writer.write_int32(0x0102_0304).unwrap();
        writer.write_int32(-1).unwrap();

        let bytes = writer.into_inner().into_inner();
        assert_eq!(bytes, vec![1, 2, 3, 4, 0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn test_empty_string_is_length_only() {
        let mut writer = WireWriter::buffered();
        writer.write_string("").unwrap();
        assert_eq!(&writer.finish()[..], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_counted_list_layout() {
        let mut writer = WireWriter::buffered();
        writer.write_string_array_counted(&["a", "bc"]).unwrap();

        let expected: &[u8] = &[0, 0, 0, 2, 0, 0, 0, 1, b'a', 0, 0, 0, 2, b'b', b'c'];
        assert_eq!(&writer.finish()[..], expected);
    }

    #[test]
    fn test_sentinel_list_stops_at_sentinel() {
        let mut counted = WireWriter::buffered();
        counted.write_string_array_counted(&["a", "bc"]).unwrap();

        let mut sentinel = WireWriter::buffered();
        sentinel
            .write_string_array_sentinel(&[Some("a"), Some("bc"), None, Some("ignored")])
            .unwrap();

        // Both list flavors share the wire form
        assert_eq!(counted.finish(), sentinel.finish());
    }

    #[test]
    fn test_sentinel_list_only_sentinel() {
        let mut writer = WireWriter::buffered();
        writer.write_string_array_sentinel::<&str>(&[None]).unwrap();
        assert_eq!(&writer.finish()[..], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_write_failure_maps_to_write_error() {
        let mut writer = WireWriter::new(BrokenPipe { budget: 2 });
        let err = writer.write_int32(7).unwrap_err();
        assert!(matches!(err, WireError::Write(_)));
        assert!(err.is_connection_fatal());
    }

    #[test]
    fn test_flush_failure_maps_to_write_error() {
        let mut writer = WireWriter::new(BrokenPipe { budget: 100 });
        writer.write_string("ok").unwrap();
        assert!(matches!(writer.flush(), Err(WireError::Write(_))));
    }

    #[test]
    fn test_buffered_len() {
        let mut writer = WireWriter::buffered();
        assert!(writer.is_empty());
        writer.write_int32(1).unwrap();
        assert_eq!(writer.len(), 4);
    }
}

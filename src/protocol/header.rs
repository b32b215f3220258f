//! Request and response headers.
//!
//! Every exchange starts with the same two INT32 frames:
//! ```text
//! ┌──────────┬──────────┐
//! │ Version  │ Action   │
//! │ int32 BE │ int32 BE │
//! └──────────┴──────────┘
//! ```
//! The client sends them followed by the request arguments. The daemon
//! echoes them and then streams `result::BEGIN` + record pairs, closed by a
//! single `result::END`.

use std::io::{Read, Write};

use super::reader::WireReader;
use super::wire_format::{result, PROTOCOL_VERSION};
use super::writer::WireWriter;
use crate::error::{Result, WireError};

/// Version and action pair opening a request or a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Protocol version.
    pub version: i32,
    /// Action code (see `wire_format::action`).
    pub action: i32,
}

impl Header {
    /// Header for `action` at the current protocol version.
    pub fn new(action: i32) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            action,
        }
    }

    /// Write the header frames.
    pub fn write<W: Write>(&self, writer: &mut WireWriter<W>) -> Result<()> {
        writer.write_int32(self.version)?;
        writer.write_int32(self.action)
    }

    /// Read a header without validating it.
    pub fn read<R: Read>(reader: &mut WireReader<R>) -> Result<Self> {
        let version = reader.read_int32()?;
        let action = reader.read_int32()?;
        Ok(Self { version, action })
    }

    /// Read a response header and check it answers `action`.
    pub fn expect<R: Read>(reader: &mut WireReader<R>, action: i32) -> Result<Self> {
        let header = Self::read(reader)?;
        header.validate(action)?;
        Ok(header)
    }

    /// Check version and action.
    pub fn validate(&self, action: i32) -> Result<()> {
        if self.version != PROTOCOL_VERSION {
            tracing::warn!(
                "Protocol version mismatch: got {:#x}, expected {:#x}",
                self.version,
                PROTOCOL_VERSION
            );
            return Err(WireError::Malformed(format!(
                "protocol version {:#x} does not match {:#x}",
                self.version, PROTOCOL_VERSION
            )));
        }
        if self.action != action {
            tracing::warn!(
                "Action mismatch: got {:#x}, expected {:#x}",
                self.action,
                action
            );
            return Err(WireError::Malformed(format!(
                "action {:#x} does not match request {:#x}",
                self.action, action
            )));
        }
        Ok(())
    }
}

/// Result code preceding each record of a response stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultCode {
    /// A record follows.
    Begin,
    /// End of the response.
    End,
}

impl ResultCode {
    /// Wire value.
    #[inline]
    pub fn as_i32(self) -> i32 {
        match self {
            ResultCode::Begin => result::BEGIN,
            ResultCode::End => result::END,
        }
    }

    /// Parse a wire value; unknown codes are malformed.
    pub fn from_i32(value: i32) -> Result<Self> {
        match value {
            result::BEGIN => Ok(ResultCode::Begin),
            result::END => Ok(ResultCode::End),
            other => Err(WireError::Malformed(format!(
                "unknown result code {}",
                other
            ))),
        }
    }

    /// Read a result code.
    pub fn read<R: Read>(reader: &mut WireReader<R>) -> Result<Self> {
        Self::from_i32(reader.read_int32()?)
    }

    /// Write a result code.
    pub fn write<W: Write>(self, writer: &mut WireWriter<W>) -> Result<()> {
        writer.write_int32(self.as_i32())
    }
}

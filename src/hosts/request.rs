//! Host lookup requests.
//!
//! ```text
//! HOST_BYNAME: header │ STRING name
//! HOST_BYADDR: header │ INT32 family │ INT32 len │ len bytes
//! HOST_ALL:    header
//! ```

use std::io::{Read, Write};
use std::net::IpAddr;

use super::family::{self, AddressFamily};
use crate::error::{Result, WireError};
use crate::protocol::{action, wire_len, Header, WireReader, WireWriter};

/// A host lookup the client sends to the daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostRequest {
    /// Look up by name.
    ByName(String),
    /// Reverse lookup by address.
    ByAddr(IpAddr),
    /// Enumerate every host.
    All,
}

impl HostRequest {
    /// Action code for this request.
    pub fn action(&self) -> i32 {
        match self {
            HostRequest::ByName(_) => action::HOST_BYNAME,
            HostRequest::ByAddr(_) => action::HOST_BYADDR,
            HostRequest::All => action::HOST_ALL,
        }
    }

    /// Write header and arguments, then flush.
    pub fn write<W: Write>(&self, writer: &mut WireWriter<W>) -> Result<()> {
        Header::new(self.action()).write(writer)?;
        match self {
            HostRequest::ByName(name) => writer.write_string(name)?,
            HostRequest::ByAddr(addr) => {
                let (raw, width) = family::octets(addr);
                writer.write_int32(AddressFamily::of(addr).as_i32())?;
                writer.write_int32(wire_len(width)?)?;
                writer.write_bytes(&raw[..width])?;
            }
            HostRequest::All => {}
        }
        tracing::trace!("Sent host request {:?}", self);
        writer.flush()
    }

    /// Read a request on the daemon side.
    ///
    /// Unknown actions and a version mismatch are `Malformed`.
    pub fn read<R: Read>(reader: &mut WireReader<R>) -> Result<Self> {
        let header = Header::read(reader)?;
        header.validate(header.action)?;
        let request = match header.action {
            action::HOST_BYNAME => HostRequest::ByName(reader.read_string_owned()?),
            action::HOST_BYADDR => HostRequest::ByAddr(read_address(reader)?),
            action::HOST_ALL => HostRequest::All,
            other => {
                tracing::warn!("Unknown host action {:#x}", other);
                return Err(WireError::Malformed(format!(
                    "unknown host action {:#x}",
                    other
                )));
            }
        };
        tracing::trace!("Received host request {:?}", request);
        Ok(request)
    }
}

fn read_address<R: Read>(reader: &mut WireReader<R>) -> Result<IpAddr> {
    let family = AddressFamily::from_i32(reader.read_int32()?)?;
    let len = reader.read_int32()?;
    if usize::try_from(len).ok() != Some(family.width()) {
        return Err(WireError::Malformed(format!(
            "address length {} does not match family {:?}",
            len, family
        )));
    }
    let mut block = [0u8; family::IN6ADDRSZ];
    let block = &mut block[..family.width()];
    reader.read_into(block)?;
    family::from_block(family, block)
}

//! # dirlookup-wire
//!
//! Data plane of a directory-lookup bridge: the binary stream protocol a
//! name-service stub speaks with its lookup daemon, and the decoder that lays
//! host records out in a caller-supplied buffer.
//!
//! ## Layers
//!
//! - **Wire codec** ([`protocol`]): INT32, STRING and STRINGLIST frames,
//!   request/response headers, and a bump [`Arena`] over the caller's buffer
//! - **Value set** ([`set`]): case-insensitive deduplication for aliases
//! - **Host records** ([`hosts`]): family policy, decoding from directory
//!   attributes or from the wire, and the record codec
//! - **Lookup** ([`lookup`]): status mapping and arena growth on `ERANGE`
//!
//! ## Example
//!
//! ```ignore
//! use std::os::unix::net::UnixStream;
//!
//! use dirlookup_wire::hosts::{read_host_result, FamilyFilter, HostRequest};
//! use dirlookup_wire::lookup::with_config;
//! use dirlookup_wire::protocol::{action, Header, WireReader, WireWriter};
//! use dirlookup_wire::BridgeConfig;
//!
//! let config = BridgeConfig::from_json_file("/etc/dirlookup.json")?;
//! let record = with_config(&config, |arena| {
//!     let stream = UnixStream::connect(&config.socket_path)?;
//!     HostRequest::ByName("host1".into()).write(&mut WireWriter::new(&stream))?;
//!     let mut reader = WireReader::with_limits(&stream, config.limits);
//!     Header::expect(&mut reader, action::HOST_BYNAME)?;
//!     let ent = read_host_result(&mut reader, arena, FamilyFilter::Inet, &config.resolver)?;
//!     Ok(ent.to_record())
//! })?;
//! ```

pub mod config;
pub mod error;
pub mod hosts;
pub mod lookup;
pub mod protocol;
pub mod set;

pub use config::{BridgeConfig, ResolverOptions};
pub use error::{Result, WireError};
pub use hosts::{FamilyFilter, HostEnt, HostRecord};
pub use protocol::{Arena, WireReader, WireWriter};
pub use set::ValueSet;

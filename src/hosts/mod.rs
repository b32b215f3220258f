//! Host records: family policy, decoding into a caller arena, and the wire
//! codec shared by the daemon and the lookup stub.

pub mod codec;
pub mod family;
pub mod parse;
pub mod record;
pub mod request;

pub use codec::{
    decode_address_record, encode_address_record, read_host_result, write_host_response,
};
pub use family::{admit, classify, AddressFamily, FamilyFilter};
pub use parse::{parse_host, HostAttributes};
pub use record::{address_table_need, HostEnt, HostRecord, RawAddresses};
pub use request::HostRequest;

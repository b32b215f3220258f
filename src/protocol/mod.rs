//! Protocol module - wire format, scratch arena, and frame codec.
//!
//! This module implements the binary protocol spoken between the lookup
//! daemon and its client stubs:
//! - INT32 / STRING / STRINGLIST framing ([`WireWriter`], [`WireReader`])
//! - zero-allocation decoding into a caller-owned [`Arena`]
//! - request/response headers and result codes

mod arena;
mod header;
mod reader;
mod wire_format;
mod writer;

pub use arena::{padding, Arena, ArenaStr, ArenaView, SlotArray, Strings};
pub use header::{Header, ResultCode};
pub use reader::WireReader;
pub use wire_format::{
    action, result, wire_len, Limits, DEFAULT_MAX_LIST_LEN, DEFAULT_MAX_STRING_LEN, INT32_SIZE,
    PROTOCOL_VERSION, SLOT_SENTINEL, SLOT_SIZE,
};
pub use writer::WireWriter;

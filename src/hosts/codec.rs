//! Host record wire codec.
//!
//! A host record travels as:
//! ```text
//! STRING name │ STRINGLIST aliases │ INT32 family │ INT32 width │ INT32 count │ count × width bytes
//! ```
//! Inside a response stream each record is preceded by `result::BEGIN`, and
//! the stream is closed by `result::END`.

use std::io::{Read, Write};

use super::family::{self, admit, AddressFamily, FamilyFilter};
use super::record::{AddressTable, HostEnt, HostRecord};
use crate::config::ResolverOptions;
use crate::error::{Result, WireError};
use crate::protocol::{
    wire_len, Arena, ResultCode, SlotArray, WireReader, WireWriter, SLOT_SENTINEL,
};
use crate::set::ValueSet;

/// Write one host record.
///
/// The record is validated before the first byte goes out, so a family
/// mismatch never leaves a half-written frame on the stream.
pub fn encode_address_record<W: Write>(
    writer: &mut WireWriter<W>,
    record: &HostRecord,
) -> Result<()> {
    record.validate()?;
    let count = wire_len(record.addresses.len())?;

    writer.write_string(&record.name)?;
    writer.write_string_array_counted(&record.aliases)?;
    writer.write_int32(record.family.as_i32())?;
    writer.write_int32(wire_len(record.width())?)?;
    writer.write_int32(count)?;
    for addr in &record.addresses {
        let (raw, width) = family::octets(addr);
        writer.write_bytes(&raw[..width])?;
    }
    Ok(())
}

/// Read one host record into `arena`.
///
/// Aliases are deduplicated ignoring ASCII case. Address blocks are run
/// through the family filter; every block is consumed even when rejected so
/// the stream stays in step.
///
/// # Errors
///
/// - `BufferTooSmall`: the arena is too small; retry the whole request
/// - `NotFound`: no address survived the filter
/// - `Read` / `Malformed`: the connection is unusable
pub fn decode_address_record<'a, R: Read>(
    reader: &mut WireReader<R>,
    arena: &'a mut Arena<'_>,
    filter: FamilyFilter,
    options: &ResolverOptions,
) -> Result<HostEnt<'a>> {
    let name = reader.read_string_into(arena)?;
    let mut aliases = reader.read_string_array_sentinel_into(arena)?;
    aliases.len = dedup_aliases(arena, aliases);

    let family = AddressFamily::from_i32(reader.read_int32()?)?;
    let width = reader.read_int32()?;
    if usize::try_from(width).ok() != Some(family.width()) {
        return Err(WireError::Malformed(format!(
            "address width {} does not match family {:?}",
            width, family
        )));
    }
    let count = reader.read_list_len()?;
    if count == 0 {
        tracing::debug!("Host record {} has no addresses", arena.view().str(name));
        return Err(WireError::NotFound);
    }

    let mut table = AddressTable::reserve(arena, count, filter.max_width(options))?;
    let mut block = [0u8; family::IN6ADDRSZ];
    for _ in 0..count {
        let block = &mut block[..family.width()];
        reader.read_into(block)?;
        let addr = family::from_block(family, block)?;
        match admit(addr, filter, options) {
            Some(accepted) => {
                table.push(arena, &accepted);
            }
            None => tracing::debug!("Skipping address {} for filter {:?}", addr, filter),
        }
    }
    let list = table.finish()?;

    let arena: &'a Arena<'_> = arena;
    Ok(HostEnt::new(arena.view(), name, aliases, list))
}

/// Compact a sentinel-terminated alias array in place, dropping entries
/// equal to an earlier one ignoring ASCII case. Returns the new length.
fn dedup_aliases(arena: &mut Arena<'_>, aliases: SlotArray) -> usize {
    let mut seen = ValueSet::with_capacity(aliases.len);
    let mut kept = 0;
    for index in 0..aliases.len {
        let offset = arena.slot(aliases.offset, index);
        let alias = arena.view().cstr_at(offset);
        if !seen.add(alias) {
            tracing::debug!("Dropping duplicate alias {:?}", alias);
            continue;
        }
        arena.set_slot(aliases.offset, kept, offset);
        kept += 1;
    }
    if kept < aliases.len {
        arena.set_slot(aliases.offset, kept, SLOT_SENTINEL);
    }
    kept
}

/// Read the result code and, if a record follows, the record itself.
///
/// `result::END` means the daemon has nothing (more) to send: `NotFound`.
pub fn read_host_result<'a, R: Read>(
    reader: &mut WireReader<R>,
    arena: &'a mut Arena<'_>,
    filter: FamilyFilter,
    options: &ResolverOptions,
) -> Result<HostEnt<'a>> {
    match ResultCode::read(reader)? {
        ResultCode::Begin => decode_address_record(reader, arena, filter, options),
        ResultCode::End => Err(WireError::NotFound),
    }
}

/// Write a complete response body: each record behind `BEGIN`, then `END`.
pub fn write_host_response<W: Write>(
    writer: &mut WireWriter<W>,
    records: &[HostRecord],
) -> Result<()> {
    for record in records {
        ResultCode::Begin.write(writer)?;
        encode_address_record(writer, record)?;
    }
    ResultCode::End.write(writer)?;
    writer.flush()
}

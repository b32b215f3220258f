//! Host record types and the address table.
//!
//! [`HostEnt`] is the decoded fixed layout living in a scratch arena:
//!
//! ```text
//! name\0 │ alias slots … SENTINEL │ alias\0 … │ pad │ addr slots … SENTINEL │ addr bytes …
//! ```
//!
//! [`HostRecord`] is the owned form handed to the encoder, or produced from
//! a `HostEnt` when a record must outlive its arena.

use std::net::IpAddr;

use super::family::{self, AddressFamily};
use crate::error::{Result, WireError};
use crate::protocol::{
    padding, Arena, ArenaStr, ArenaView, SlotArray, Strings, SLOT_SENTINEL, SLOT_SIZE,
};

/// Owned host record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRecord {
    /// Canonical name.
    pub name: String,
    /// Alias names.
    pub aliases: Vec<String>,
    /// Family shared by every address.
    pub family: AddressFamily,
    /// Addresses, all of `family`.
    pub addresses: Vec<IpAddr>,
}

impl HostRecord {
    /// Build a record whose family is taken from the first address.
    ///
    /// Returns `None` when `addresses` is empty.
    pub fn new(
        name: impl Into<String>,
        aliases: Vec<String>,
        addresses: Vec<IpAddr>,
    ) -> Option<Self> {
        let family = AddressFamily::of(addresses.first()?);
        Some(Self {
            name: name.into(),
            aliases,
            family,
            addresses,
        })
    }

    /// Address block width.
    #[inline]
    pub fn width(&self) -> usize {
        self.family.width()
    }

    /// Check that every address has the record's family.
    pub fn validate(&self) -> Result<()> {
        if let Some(bad) = self
            .addresses
            .iter()
            .find(|addr| AddressFamily::of(addr) != self.family)
        {
            return Err(WireError::Malformed(format!(
                "address {} does not match record family {:?}",
                bad, self.family
            )));
        }
        Ok(())
    }
}

/// Decoded host record borrowed from a scratch arena.
#[derive(Debug, Clone, Copy)]
pub struct HostEnt<'a> {
    view: ArenaView<'a>,
    name: ArenaStr,
    aliases: SlotArray,
    family: AddressFamily,
    addresses: SlotArray,
}

impl<'a> HostEnt<'a> {
    pub(crate) fn new(
        view: ArenaView<'a>,
        name: ArenaStr,
        aliases: SlotArray,
        table: AddressList,
    ) -> Self {
        Self {
            view,
            name,
            aliases,
            family: table.family,
            addresses: table.slots,
        }
    }

    /// Canonical name.
    pub fn name(&self) -> &'a str {
        self.view.str(self.name)
    }

    /// Alias names.
    pub fn aliases(&self) -> Strings<'a> {
        self.view.strings(self.aliases)
    }

    /// Address family.
    #[inline]
    pub fn family(&self) -> AddressFamily {
        self.family
    }

    /// Address block width.
    #[inline]
    pub fn length(&self) -> usize {
        self.family.width()
    }

    /// Number of addresses.
    #[inline]
    pub fn address_count(&self) -> usize {
        self.addresses.len
    }

    /// Raw address blocks, each `length()` bytes.
    pub fn raw_addresses(&self) -> RawAddresses<'a> {
        RawAddresses {
            view: self.view,
            slots: self.addresses,
            width: self.family.width(),
            index: 0,
        }
    }

    /// Addresses as `IpAddr`.
    pub fn addresses(&self) -> impl Iterator<Item = IpAddr> + 'a {
        let family = self.family;
        self.raw_addresses()
            .filter_map(move |block| family::from_block(family, block).ok())
    }

    /// Copy into an owned record.
    pub fn to_record(&self) -> HostRecord {
        HostRecord {
            name: self.name().to_string(),
            aliases: self.aliases().map(str::to_string).collect(),
            family: self.family,
            addresses: self.addresses().collect(),
        }
    }
}

/// Iterator over the raw address blocks of a [`HostEnt`].
pub struct RawAddresses<'a> {
    view: ArenaView<'a>,
    slots: SlotArray,
    width: usize,
    index: usize,
}

impl<'a> Iterator for RawAddresses<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.slots.len {
            return None;
        }
        let offset = self.view.slot(self.slots.offset, self.index);
        if offset == SLOT_SENTINEL {
            return None;
        }
        self.index += 1;
        Some(self.view.block(offset, self.width))
    }
}

/// Finished address list inside an arena.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AddressList {
    slots: SlotArray,
    family: AddressFamily,
}

/// Worst-case arena bytes needed for an address table of `count`
/// candidates at `width` bytes each, starting at cursor `position`.
///
/// Slot padding, `count + 1` slots, and `count + 1` blocks.
pub fn address_table_need(position: usize, count: usize, width: usize) -> usize {
    let entries = count + 1;
    padding(position, SLOT_SIZE) + entries * SLOT_SIZE + entries * width
}

/// Address table under construction.
///
/// The slot array and the byte region are reserved up front for the worst
/// case; accepted addresses are packed at the width of the family that the
/// first accepted address fixed.
pub(crate) struct AddressTable {
    slots: usize,
    bytes: usize,
    capacity: usize,
    len: usize,
    family: Option<AddressFamily>,
}

impl AddressTable {
    /// Reserve room for `count` candidates of at most `width` bytes.
    ///
    /// Checks the full worst case before touching the arena, so a short
    /// arena fails without moving the cursor.
    pub(crate) fn reserve(arena: &mut Arena<'_>, count: usize, width: usize) -> Result<Self> {
        let need = address_table_need(arena.position(), count, width);
        arena.check(need)?;

        let slots = arena.reserve_slots(count + 1)?;
        let bytes = arena.reserve((count + 1) * width)?;
        arena.set_slot(slots, 0, SLOT_SENTINEL);
        Ok(Self {
            slots,
            bytes,
            capacity: count,
            len: 0,
            family: None,
        })
    }

    /// Append an accepted address.
    ///
    /// The first address fixes the table's family; an address of the other
    /// family is dropped and `false` returned.
    pub(crate) fn push(&mut self, arena: &mut Arena<'_>, addr: &IpAddr) -> bool {
        if self.len == self.capacity {
            return false;
        }
        let addr_family = AddressFamily::of(addr);
        match self.family {
            None => self.family = Some(addr_family),
            Some(family) if family != addr_family => {
                tracing::debug!(
                    "Skipping address {}: record family already fixed to {:?}",
                    addr,
                    family
                );
                return false;
            }
            Some(_) => {}
        }

        let (raw, width) = family::octets(addr);
        let offset = self.bytes + self.len * width;
        arena.write_at(offset, &raw[..width]);
        arena.set_slot(self.slots, self.len, offset);
        self.len += 1;
        arena.set_slot(self.slots, self.len, SLOT_SENTINEL);
        true
    }

    /// Close the table; an empty table is `NotFound`.
    pub(crate) fn finish(self) -> Result<AddressList> {
        match self.family {
            Some(family) if self.len > 0 => Ok(AddressList {
                slots: SlotArray {
                    offset: self.slots,
                    len: self.len,
                    terminated: true,
                },
                family,
            }),
            _ => {
                tracing::debug!("No usable address in record");
                Err(WireError::NotFound)
            }
        }
    }
}

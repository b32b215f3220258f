//! Scratch arena for zero-allocation decoding.
//!
//! The arena is a bump allocator over a caller-owned byte buffer. Decoded
//! strings and slot arrays are carved out of it and referred to by offset
//! handles ([`ArenaStr`], [`SlotArray`]); nothing here allocates or frees.
//!
//! ```text
//! ┌──────────────────────────────┬──────────────────┐
//! │ used (0..pos)                │ free (pos..cap)  │
//! └──────────────────────────────┴──────────────────┘
//! ```
//!
//! Every carve-out goes through [`Arena::reserve`] or
//! [`Arena::reserve_slots`]: either the whole region fits and the cursor
//! advances by exactly that amount, or the call fails with
//! [`WireError::BufferTooSmall`] and the cursor does not move.
//!
//! Slots are pointer-sized cells holding native-endian offsets into the same
//! buffer. [`SLOT_SENTINEL`] marks the end of a sentinel-terminated array.
//!
//! # Example
//!
//! ```
//! use dirlookup_wire::protocol::Arena;
//!
//! let mut buf = [0u8; 64];
//! let mut arena = Arena::new(&mut buf);
//! let name = arena.push_str("host1").unwrap();
//! assert_eq!(arena.position(), 6); // "host1" + NUL
//! assert_eq!(arena.view().str(name), "host1");
//! ```

use super::wire_format::{SLOT_SENTINEL, SLOT_SIZE};
use crate::error::{Result, WireError};

/// Handle to a NUL-terminated string stored in an arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaStr {
    /// Offset of the first byte.
    pub offset: usize,
    /// Length in bytes, excluding the NUL.
    pub len: usize,
}

/// Handle to an array of pointer-sized slots stored in an arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotArray {
    /// Offset of the first slot.
    pub offset: usize,
    /// Number of entries, excluding the sentinel.
    pub len: usize,
    /// Whether a sentinel slot follows the last entry.
    pub terminated: bool,
}

impl SlotArray {
    /// Slots occupied in the arena, including the sentinel.
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.len + usize::from(self.terminated)
    }
}

/// Bump allocator over a caller-owned scratch buffer.
pub struct Arena<'buf> {
    buf: &'buf mut [u8],
    pos: usize,
}

impl<'buf> Arena<'buf> {
    /// Wrap a scratch buffer. The cursor starts at 0.
    pub fn new(buf: &'buf mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Total capacity in bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Current cursor.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left after the cursor.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Rewind the cursor so the buffer can be reused for another call.
    pub fn reset(&mut self) {
        self.pos = 0;
    }

    /// Fail with `BufferTooSmall` unless `n` more bytes fit.
    #[inline]
    pub fn check(&self, n: usize) -> Result<()> {
        match self.pos.checked_add(n) {
            Some(end) if end <= self.buf.len() => Ok(()),
            _ => {
                tracing::trace!(
                    "Arena check failed: {} bytes needed, {} available",
                    n,
                    self.remaining()
                );
                Err(WireError::BufferTooSmall {
                    needed: n,
                    available: self.remaining(),
                })
            }
        }
    }

    /// Reserve `n` bytes and return the offset of the region.
    pub fn reserve(&mut self, n: usize) -> Result<usize> {
        self.check(n)?;
        let start = self.pos;
        self.pos += n;
        Ok(start)
    }

    /// Reserve `n` bytes and hand back the region for filling.
    ///
    /// The cursor is advanced only if `fill` succeeds, so a failed read into
    /// the region leaves the arena untouched.
    pub fn reserve_with<F>(&mut self, n: usize, fill: F) -> Result<usize>
    where
        F: FnOnce(&mut [u8]) -> Result<()>,
    {
        self.check(n)?;
        let start = self.pos;
        fill(&mut self.buf[start..start + n])?;
        self.pos += n;
        Ok(start)
    }

    /// Padding needed to bring the cursor to a multiple of `align`.
    #[inline]
    pub fn padding_for(&self, align: usize) -> usize {
        padding(self.pos, align)
    }

    /// Reserve `count` slots aligned to the slot size.
    ///
    /// Padding and slots are checked together; on failure the cursor is
    /// unchanged. The slots are left uninitialized (zero or stale bytes).
    pub fn reserve_slots(&mut self, count: usize) -> Result<usize> {
        let pad = self.padding_for(SLOT_SIZE);
        let bytes = count
            .checked_mul(SLOT_SIZE)
            .and_then(|b| b.checked_add(pad))
            .ok_or_else(|| WireError::BufferTooSmall {
                needed: usize::MAX,
                available: self.remaining(),
            })?;
        self.check(bytes)?;
        let start = self.pos + pad;
        self.pos += bytes;
        Ok(start)
    }

    /// Store `value` in slot `index` of the array starting at `slots`.
    #[inline]
    pub fn set_slot(&mut self, slots: usize, index: usize, value: usize) {
        let at = slots + index * SLOT_SIZE;
        self.buf[at..at + SLOT_SIZE].copy_from_slice(&value.to_ne_bytes());
    }

    /// Read slot `index` of the array starting at `slots`.
    #[inline]
    pub fn slot(&self, slots: usize, index: usize) -> usize {
        read_slot(self.buf, slots, index)
    }

    /// Copy raw bytes into the arena.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> Result<usize> {
        let start = self.reserve(bytes.len())?;
        self.buf[start..start + bytes.len()].copy_from_slice(bytes);
        Ok(start)
    }

    /// Copy raw bytes to an offset inside an already reserved region.
    #[inline]
    pub fn write_at(&mut self, offset: usize, bytes: &[u8]) {
        self.buf[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    /// Copy a string into the arena followed by a NUL byte.
    pub fn push_str(&mut self, s: &str) -> Result<ArenaStr> {
        let len = s.len();
        let offset = self.reserve_with(len + 1, |region| {
            region[..len].copy_from_slice(s.as_bytes());
            region[len] = 0;
            Ok(())
        })?;
        Ok(ArenaStr { offset, len })
    }

    /// Copy a list of strings into the arena as a sentinel-terminated array.
    ///
    /// The slot array is reserved first, then each string in order.
    pub fn push_str_list<'s, I>(&mut self, items: I) -> Result<SlotArray>
    where
        I: IntoIterator<Item = &'s str>,
        I::IntoIter: ExactSizeIterator,
    {
        let items = items.into_iter();
        let len = items.len();
        let slots = self.reserve_slots(len + 1)?;
        for (index, item) in items.enumerate() {
            let stored = self.push_str(item)?;
            self.set_slot(slots, index, stored.offset);
        }
        self.set_slot(slots, len, SLOT_SENTINEL);
        Ok(SlotArray {
            offset: slots,
            len,
            terminated: true,
        })
    }

    /// Read-only view over the bytes written so far.
    pub fn view(&self) -> ArenaView<'_> {
        ArenaView {
            buf: &self.buf[..self.pos],
        }
    }

    /// Consume the mutable borrow and return a view with the buffer's lifetime.
    pub fn into_view(self) -> ArenaView<'buf> {
        let buf: &'buf [u8] = self.buf;
        ArenaView {
            buf: &buf[..self.pos],
        }
    }
}

/// Read-only access to decoded values inside an arena.
#[derive(Debug, Clone, Copy)]
pub struct ArenaView<'a> {
    buf: &'a [u8],
}

impl<'a> ArenaView<'a> {
    /// Build a view over already written arena bytes.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    /// Bytes covered by this view.
    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.buf
    }

    /// Resolve a string handle.
    ///
    /// Strings enter the arena through `&str` or after UTF-8 validation, so
    /// the fallback is never taken for handles produced by this crate.
    pub fn str(&self, s: ArenaStr) -> &'a str {
        std::str::from_utf8(&self.buf[s.offset..s.offset + s.len]).unwrap_or_default()
    }

    /// Resolve a slot value pointing at a NUL-terminated string.
    pub fn cstr_at(&self, offset: usize) -> &'a str {
        let tail = &self.buf[offset..];
        let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
        std::str::from_utf8(&tail[..end]).unwrap_or_default()
    }

    /// Read slot `index` of the array starting at `slots`.
    #[inline]
    pub fn slot(&self, slots: usize, index: usize) -> usize {
        read_slot(self.buf, slots, index)
    }

    /// Fixed-width byte block at `offset`.
    #[inline]
    pub fn block(&self, offset: usize, width: usize) -> &'a [u8] {
        &self.buf[offset..offset + width]
    }

    /// Iterate the strings referenced by a slot array.
    pub fn strings(&self, array: SlotArray) -> Strings<'a> {
        Strings {
            view: *self,
            array,
            index: 0,
        }
    }
}

/// Iterator over the strings of a [`SlotArray`].
pub struct Strings<'a> {
    view: ArenaView<'a>,
    array: SlotArray,
    index: usize,
}

impl<'a> Iterator for Strings<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.array.len {
            return None;
        }
        let offset = self.view.slot(self.array.offset, self.index);
        if offset == SLOT_SENTINEL {
            return None;
        }
        self.index += 1;
        Some(self.view.cstr_at(offset))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.array.len.saturating_sub(self.index);
        (0, Some(left))
    }
}

#[inline]
fn read_slot(buf: &[u8], slots: usize, index: usize) -> usize {
    let at = slots + index * SLOT_SIZE;
    let mut raw = [0u8; SLOT_SIZE];
    raw.copy_from_slice(&buf[at..at + SLOT_SIZE]);
    usize::from_ne_bytes(raw)
}

/// Padding needed to bring `pos` to a multiple of `align`.
#[inline]
pub fn padding(pos: usize, align: usize) -> usize {
    (align - pos % align) % align
}

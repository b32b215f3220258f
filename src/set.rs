//! Case-insensitive value set.
//!
//! Deduplicates multi-valued directory attributes before they are emitted.
//! Two values are equal when they match after ASCII lowercasing (the C
//! locale `strcasecmp` rule); the first-seen spelling is the one kept.
//!
//! # Ownership
//!
//! The set owns its strings. [`ValueSet::to_sequence`] returns a separate
//! allocation (the index) whose entries borrow those strings. Releasing the
//! two is a split responsibility: dropping the set frees the strings and the
//! lookup table, dropping the sequence frees the index. The borrow checker
//! keeps the set alive for as long as the sequence exists.
//!
//! # Example
//!
//! ```
//! use dirlookup_wire::set::ValueSet;
//!
//! let mut set = ValueSet::new();
//! set.add("abc");
//! set.add("ABC");
//! set.add("AbC");
//! assert_eq!(set.len(), 1);
//! assert_eq!(set.to_sequence(), vec![Some("abc"), None]);
//! ```

use std::collections::HashMap;

/// String set with case-insensitive membership.
///
/// Iteration follows insertion order.
#[derive(Debug, Clone, Default)]
pub struct ValueSet {
    /// Lowercased key to position in `values`.
    index: HashMap<String, usize>,
    /// First-seen spellings, in insertion order.
    values: Vec<String>,
}

impl ValueSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty set with room for `capacity` values.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            index: HashMap::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }

    /// Insert `value` unless an equal value (ignoring ASCII case) is present.
    ///
    /// Returns `true` if the value was inserted.
    pub fn add(&mut self, value: &str) -> bool {
        let key = value.to_ascii_lowercase();
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key, self.values.len());
        self.values.push(value.to_string());
        true
    }

    /// Check membership, ignoring ASCII case.
    pub fn contains(&self, value: &str) -> bool {
        self.index.contains_key(&value.to_ascii_lowercase())
    }

    /// Number of distinct values.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the set is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate the stored spellings in insertion order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.values.iter().map(String::as_str)
    }

    /// Snapshot the values as a sentinel-terminated sequence.
    ///
    /// One allocation for the returned index; entries borrow the stored
    /// strings. The last entry is always `None`.
    pub fn to_sequence(&self) -> Vec<Option<&str>> {
        let mut seq = Vec::with_capacity(self.values.len() + 1);
        seq.extend(self.values.iter().map(|v| Some(v.as_str())));
        seq.push(None);
        seq
    }
}

impl<'a> Extend<&'a str> for ValueSet {
    fn extend<I: IntoIterator<Item = &'a str>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

impl<'a> FromIterator<&'a str> for ValueSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = ValueSet::new();
        set.extend(iter);
        set
    }
}

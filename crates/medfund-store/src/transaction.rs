use std::collections::btree_map;
use std::collections::BTreeMap;

use crate::error::{StoreError, StoreResult};
use crate::traits::LedgerStore;

/// An ordered set of pending writes.
///
/// Writing the same key twice keeps only the last value, so a write set never
/// contains more entries than distinct keys.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteSet {
    entries: BTreeMap<String, Vec<u8>>,
}

impl WriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage `value` under `key`, replacing any earlier staged value.
    pub fn put(&mut self, key: impl Into<String>, value: Vec<u8>) -> StoreResult<()> {
        let key = key.into();
        if key.is_empty() {
            return Err(StoreError::EmptyKey);
        }
        self.entries.insert(key, value);
        Ok(())
    }

    /// The staged value for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Staged keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl IntoIterator for WriteSet {
    type Item = (String, Vec<u8>);
    type IntoIter = btree_map::IntoIter<String, Vec<u8>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Invocation-scoped transaction over a [`LedgerStore`].
///
/// Reads see the transaction's own staged writes first, then the committed
/// store. Nothing reaches the store until [`Transaction::commit`]; dropping
/// the transaction discards every staged write.
pub struct Transaction<'s, S: LedgerStore + ?Sized> {
    store: &'s S,
    writes: WriteSet,
}

impl<'s, S: LedgerStore + ?Sized> Transaction<'s, S> {
    pub fn begin(store: &'s S) -> Self {
        Self {
            store,
            writes: WriteSet::new(),
        }
    }

    /// Read `key`, preferring a value staged in this transaction.
    pub fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        if key.is_empty() {
            return Err(StoreError::EmptyKey);
        }
        match self.writes.get(key) {
            Some(staged) => Ok(Some(staged.to_vec())),
            None => self.store.get(key),
        }
    }

    /// Returns `true` if `key` holds a value (staged or committed).
    pub fn exists(&self, key: &str) -> StoreResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Stage a write.
    pub fn put(&mut self, key: impl Into<String>, value: Vec<u8>) -> StoreResult<()> {
        self.writes.put(key, value)
    }

    /// Apply every staged write atomically. Returns the number of keys written.
    pub fn commit(self) -> StoreResult<usize> {
        let count = self.writes.len();
        if count > 0 {
            self.store.apply(self.writes)?;
        }
        Ok(count)
    }
}

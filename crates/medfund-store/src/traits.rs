use std::sync::Arc;

use crate::error::StoreResult;
use crate::transaction::WriteSet;

/// Exact-key byte store provided by the host ledger.
///
/// All implementations must satisfy these invariants:
/// - `get` returns exactly what the last committed `put` for that key wrote.
/// - `apply` makes every write in the set visible, or none of them.
/// - Keys are compared byte-for-byte; there is no ordering or prefix query.
pub trait LedgerStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key was never written.
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Write a single value, replacing any previous value under `key`.
    fn put(&self, key: &str, value: Vec<u8>) -> StoreResult<()>;

    /// Apply a write set atomically.
    ///
    /// The default implementation issues one `put` per entry. That is only
    /// atomic when the host buffers puts for the whole invocation and commits
    /// them together (as a chaincode runtime does); standalone backends
    /// override it.
    fn apply(&self, writes: WriteSet) -> StoreResult<()> {
        for (key, value) in writes {
            self.put(&key, value)?;
        }
        Ok(())
    }
}

impl<S: LedgerStore + ?Sized> LedgerStore for Arc<S> {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: Vec<u8>) -> StoreResult<()> {
        (**self).put(key, value)
    }

    fn apply(&self, writes: WriteSet) -> StoreResult<()> {
        (**self).apply(writes)
    }
}

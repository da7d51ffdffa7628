//! Ledger adapter for medfund.
//!
//! The workflow engine needs exactly two primitives from the host ledger:
//! exact-key `get` and `put` over opaque byte values. This crate defines that
//! boundary and the invocation-scoped transaction the engine builds on it.
//!
//! # Backends
//!
//! All backends implement the [`LedgerStore`] trait:
//!
//! - [`InMemoryLedgerStore`] -- `HashMap`-based store for tests and embedding
//! - [`FileLedgerStore`] -- single JSON file, rewritten atomically per commit
//!
//! # Design Rules
//!
//! 1. Every read is an exact-key lookup. There are no range scans.
//! 2. The store never interprets values -- it is a pure key-value store.
//! 3. A [`WriteSet`] is applied all-or-nothing by [`LedgerStore::apply`].
//! 4. Writes staged in a [`Transaction`] are invisible to other callers until
//!    commit, and are discarded if the transaction is dropped.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod file;
pub mod memory;
pub mod traits;
pub mod transaction;

pub use error::{StoreError, StoreResult};
pub use file::FileLedgerStore;
pub use memory::InMemoryLedgerStore;
pub use traits::LedgerStore;
pub use transaction::{Transaction, WriteSet};

//! # Storage Module
//!
//! Durable persistence for the ledger: three logical categories (summary,
//! transactions, settings) behind the [`LedgerStore`] trait so the domain
//! layer never names a concrete backend.
//!
//! Backends:
//!
//! - [`sqlite::SqliteStore`]: the production backend, an embedded SQLite
//!   database managed through `sqlx`.
//! - [`memory::MemoryStore`]: a volatile backend used as the injected test
//!   double, with failure hooks for exercising error paths.
//!
//! Stores are constructed explicitly and passed into the ledger; there is no
//! process-wide store instance.

pub mod memory;
pub mod sqlite;
pub mod traits;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{LedgerStore, StorageError, StoreCategory};

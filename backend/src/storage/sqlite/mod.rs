//! SQLite-backed persistence, the production [`LedgerStore`] implementation.
//!
//! [`LedgerStore`]: crate::storage::LedgerStore

pub mod db;

pub use db::SqliteStore;

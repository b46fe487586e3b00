//! # Money Tracker Backend
//!
//! The ledger engine for a single-user personal finance tracker: a running
//! balance, income and expense totals, and an append-only transaction
//! history, kept mutually consistent and persisted to a local embedded
//! database across sessions.
//!
//! The crate has two layers:
//!
//! - [`domain`]: the [`domain::Ledger`] service that owns the in-memory
//!   state and exposes the commands (`record_transaction`,
//!   `change_language`, `reset`) and queries the presentation layer
//!   consumes.
//! - [`storage`]: the [`storage::LedgerStore`] abstraction with a SQLite
//!   backend for durability and an in-memory backend for tests and
//!   ephemeral use.
//!
//! Presentation concerns (forms, rendering, localization, formatting) live
//! outside this crate and talk to it through the `shared` types.

pub mod domain;
pub mod storage;

pub use domain::{Ledger, LedgerError, RecordOutcome};
pub use storage::{LedgerStore, StorageError, StoreCategory};

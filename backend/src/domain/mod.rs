//! # Domain Module
//!
//! The business core of the tracker: the [`Ledger`] service owning the
//! running balance, the income and expense totals, and the append-only
//! transaction history.
//!
//! ## Key Responsibilities
//!
//! - **Transaction Recording**: validating and applying income/expense
//!   events, stamping each with its before/after balance snapshots
//! - **Invariant Enforcement**: `balance == income - expenses` and the
//!   balance chain across the history hold after every operation
//! - **State Lifecycle**: loading persisted state at startup, resetting to
//!   the zeroed defaults on demand
//! - **Preferences**: the display-language setting, persisted alongside the
//!   financial state but orthogonal to it
//!
//! The domain layer is storage agnostic: it talks to a
//! [`LedgerStore`](crate::storage::LedgerStore) injected at construction,
//! never to a concrete database.

pub mod ledger;

pub use ledger::{Ledger, LedgerError, RecordOutcome};

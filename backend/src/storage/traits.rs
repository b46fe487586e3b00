//! # Storage Traits
//!
//! The storage abstraction the domain layer works against, allowing the
//! SQLite backend and the in-memory backend to be used interchangeably.

use async_trait::async_trait;
use shared::{Settings, Summary, Transaction};
use thiserror::Error;

/// Failures at the storage seam.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The embedded database could not be opened at all.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// A read, write, or clear against an open store failed.
    #[error("storage i/o failure: {0}")]
    Io(String),
}

impl StorageError {
    pub(crate) fn unavailable(err: impl std::fmt::Display) -> Self {
        StorageError::Unavailable(err.to_string())
    }

    pub(crate) fn io(err: impl std::fmt::Display) -> Self {
        StorageError::Io(err.to_string())
    }
}

/// The three logical record categories a store persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreCategory {
    /// Single aggregate record: balance, income, expenses
    Summary,
    /// Append-only collection, one entry per recorded transaction
    Transactions,
    /// Single display-preferences record
    Settings,
}

impl StoreCategory {
    /// All categories, in the order a full reset clears them.
    pub const ALL: [StoreCategory; 3] = [
        StoreCategory::Summary,
        StoreCategory::Transactions,
        StoreCategory::Settings,
    ];
}

/// Trait defining the interface for ledger persistence operations
///
/// `load_*` return `None` / an empty sequence when nothing has been stored
/// yet; absence is not an error. Writes within one category apply in call
/// order.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Overwrite the single summary record.
    async fn save_summary(&self, summary: &Summary) -> Result<(), StorageError>;

    /// Load the summary record, if one was ever written.
    async fn load_summary(&self) -> Result<Option<Summary>, StorageError>;

    /// Insert a new transaction record. Never overwrites an existing one.
    async fn append_transaction(&self, transaction: &Transaction) -> Result<(), StorageError>;

    /// Load all transaction records in storage-insertion order.
    async fn load_transactions(&self) -> Result<Vec<Transaction>, StorageError>;

    /// Overwrite the single settings record.
    async fn save_settings(&self, settings: &Settings) -> Result<(), StorageError>;

    /// Load the settings record, if one was ever written.
    async fn load_settings(&self) -> Result<Option<Settings>, StorageError>;

    /// Empty the named categories.
    async fn clear(&self, categories: &[StoreCategory]) -> Result<(), StorageError>;
}

//! Volatile [`LedgerStore`] backend.
//!
//! Used as the injected store in unit tests and anywhere durability is not
//! wanted. The failure hooks let tests exercise the ledger's degraded-mode
//! paths without a broken database on hand.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::storage::traits::{LedgerStore, StorageError, StoreCategory};
use shared::{Settings, Summary, Transaction};

#[derive(Default)]
struct Records {
    summary: Option<Summary>,
    transactions: Vec<Transaction>,
    settings: Option<Settings>,
}

/// In-memory store over the three record categories.
#[derive(Default)]
pub struct MemoryStore {
    // Lock is never held across an await point
    records: Mutex<Records>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write or clear fail with an I/O error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent read fail with an I/O error.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    fn check_write(&self) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Io("injected write failure".to_string()));
        }
        Ok(())
    }

    fn check_read(&self) -> Result<(), StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Io("injected read failure".to_string()));
        }
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Records> {
        // A poisoned lock only means a test panicked mid-assertion
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn save_summary(&self, summary: &Summary) -> Result<(), StorageError> {
        self.check_write()?;
        self.lock().summary = Some(*summary);
        Ok(())
    }

    async fn load_summary(&self) -> Result<Option<Summary>, StorageError> {
        self.check_read()?;
        Ok(self.lock().summary)
    }

    async fn append_transaction(&self, transaction: &Transaction) -> Result<(), StorageError> {
        self.check_write()?;
        self.lock().transactions.push(transaction.clone());
        Ok(())
    }

    async fn load_transactions(&self) -> Result<Vec<Transaction>, StorageError> {
        self.check_read()?;
        Ok(self.lock().transactions.clone())
    }

    async fn save_settings(&self, settings: &Settings) -> Result<(), StorageError> {
        self.check_write()?;
        self.lock().settings = Some(settings.clone());
        Ok(())
    }

    async fn load_settings(&self) -> Result<Option<Settings>, StorageError> {
        self.check_read()?;
        Ok(self.lock().settings.clone())
    }

    async fn clear(&self, categories: &[StoreCategory]) -> Result<(), StorageError> {
        self.check_write()?;
        let mut records = self.lock();
        for category in categories {
            match category {
                StoreCategory::Summary => records.summary = None,
                StoreCategory::Transactions => records.transactions.clear(),
                StoreCategory::Settings => records.settings = None,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared::TransactionType;

    fn transaction(id: &str) -> Transaction {
        Transaction {
            id: id.to_string(),
            transaction_type: TransactionType::Income,
            amount: 10.0,
            category: "gift".to_string(),
            balance_start: 0.0,
            balance_end: 10.0,
            note: None,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn append_preserves_insertion_order() {
        let store = MemoryStore::new();
        store.append_transaction(&transaction("a")).await.unwrap();
        store.append_transaction(&transaction("b")).await.unwrap();

        let loaded = store.load_transactions().await.unwrap();
        let ids: Vec<&str> = loaded.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[tokio::test]
    async fn injected_write_failures_surface_as_io_errors() {
        let store = MemoryStore::new();
        store.fail_writes(true);

        let err = store
            .save_summary(&Summary::default())
            .await
            .expect_err("write should fail");
        assert!(matches!(err, StorageError::Io(_)));

        // Reads still work, and nothing was stored
        assert!(store.load_summary().await.unwrap().is_none());

        store.fail_writes(false);
        store.save_summary(&Summary::default()).await.unwrap();
        assert!(store.load_summary().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn clear_is_selective() {
        let store = MemoryStore::new();
        store.save_summary(&Summary::default()).await.unwrap();
        store.save_settings(&Settings::default()).await.unwrap();

        store.clear(&[StoreCategory::Summary]).await.unwrap();
        assert!(store.load_summary().await.unwrap().is_none());
        assert!(store.load_settings().await.unwrap().is_some());
    }
}

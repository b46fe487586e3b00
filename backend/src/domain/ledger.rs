//! Ledger service: the single owner of the tracker's financial state.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

use crate::storage::{LedgerStore, StorageError, StoreCategory};
use shared::{NewTransaction, Settings, Summary, Transaction, TransactionType, DEFAULT_LANGUAGE};

/// Failures at the ledger boundary.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Malformed input: non-positive amount or a category that does not
    /// belong to the transaction type. The operation performed no state
    /// mutation.
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),
    /// The persistence layer failed. Whether in-memory state changed depends
    /// on the operation; see the method docs.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result of a successful [`Ledger::record_transaction`].
#[derive(Debug)]
pub struct RecordOutcome {
    /// The transaction as recorded, balance snapshots stamped.
    pub transaction: Transaction,
    /// Present when the in-memory update succeeded but the durable write
    /// failed: the change applies for this session and is not saved.
    pub persistence_warning: Option<StorageError>,
}

/// The in-memory authoritative state of balance, totals, and history.
///
/// Exactly one logical caller mutates a ledger at a time; `&mut self` on
/// every command encodes that, so no locking happens here. Each command
/// fully applies its in-memory mutation before any persistence await, so a
/// read immediately after a completed call always reflects it.
pub struct Ledger<S: LedgerStore> {
    store: Arc<S>,
    balance: f64,
    income: f64,
    expenses: f64,
    transactions: Vec<Transaction>,
    language: String,
}

impl<S: LedgerStore> Ledger<S> {
    /// A zeroed ledger over an injected store. Call [`initialize`] to
    /// restore persisted state.
    ///
    /// [`initialize`]: Ledger::initialize
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            balance: 0.0,
            income: 0.0,
            expenses: 0.0,
            transactions: Vec::new(),
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    /// Load the prior session's snapshot from the store.
    ///
    /// All-or-nothing: summary, transactions, and settings are fetched into
    /// temporaries and committed together, so a mid-load failure leaves the
    /// zeroed defaults fully intact and returns [`LedgerError::Storage`].
    /// The caller decides between degraded in-memory mode and halting. A
    /// store that was simply never written to is not an error; the defaults
    /// stand.
    pub async fn initialize(&mut self) -> Result<(), LedgerError> {
        let summary = self.store.load_summary().await?;
        let transactions = self.store.load_transactions().await?;
        let settings = self.store.load_settings().await?;

        if let Some(summary) = summary {
            self.balance = summary.balance;
            self.income = summary.income;
            self.expenses = summary.expenses;
        }
        if !transactions.is_empty() {
            self.transactions = transactions;
        }
        if let Some(settings) = settings {
            self.language = settings.language;
        }

        info!(
            transactions = self.transactions.len(),
            balance = self.balance,
            "ledger state loaded"
        );
        Ok(())
    }

    /// Record one income or expense event.
    ///
    /// The input collector pre-validates, but the ledger does not trust it:
    /// the amount must be a positive finite number and the category must
    /// belong to the type's fixed set, or the call fails with
    /// [`LedgerError::InvalidTransaction`] and mutates nothing.
    ///
    /// Expenses may drive the balance negative; there is no overdraft floor.
    /// Warning the user about over-budget spending is the UI's business.
    ///
    /// A persistence failure does not roll the in-memory change back. The
    /// recorded transaction is returned either way, with the storage error
    /// attached as a warning on the outcome.
    pub async fn record_transaction(
        &mut self,
        request: NewTransaction,
    ) -> Result<RecordOutcome, LedgerError> {
        if !request.amount.is_finite() || request.amount <= 0.0 {
            return Err(LedgerError::InvalidTransaction(format!(
                "amount must be a positive number, got {}",
                request.amount
            )));
        }
        if !request.transaction_type.allows_category(&request.category) {
            return Err(LedgerError::InvalidTransaction(format!(
                "'{}' is not a valid {} category",
                request.category, request.transaction_type
            )));
        }

        let timestamp = Utc::now();
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        let balance_start = self.balance;
        match request.transaction_type {
            TransactionType::Income => {
                self.balance += request.amount;
                self.income += request.amount;
            }
            TransactionType::Expense => {
                self.balance -= request.amount;
                self.expenses += request.amount;
            }
        }

        let transaction = Transaction {
            id: Transaction::generate_id(request.transaction_type, timestamp_ms),
            transaction_type: request.transaction_type,
            amount: request.amount,
            category: request.category,
            balance_start,
            balance_end: self.balance,
            note: request.note.filter(|n| !n.is_empty()),
            timestamp,
        };
        self.transactions.push(transaction.clone());

        info!(
            id = %transaction.id,
            category = %transaction.category,
            balance = self.balance,
            "transaction recorded"
        );

        // In-memory state is final at this point; the durable write comes
        // after and its failure is a warning, not a rollback
        let persistence_warning = match self.persist_transaction(&transaction).await {
            Ok(()) => None,
            Err(e) => {
                warn!(id = %transaction.id, error = %e, "change applied this session, not saved");
                Some(e)
            }
        };

        Ok(RecordOutcome {
            transaction,
            persistence_warning,
        })
    }

    async fn persist_transaction(&self, transaction: &Transaction) -> Result<(), StorageError> {
        self.store.save_summary(&self.summary()).await?;
        self.store.append_transaction(transaction).await?;
        Ok(())
    }

    /// Switch the display language and persist the preference.
    ///
    /// The in-memory setting stands even when the settings write fails.
    pub async fn change_language(&mut self, language: impl Into<String>) -> Result<(), LedgerError> {
        self.language = language.into();
        let settings = Settings {
            language: self.language.clone(),
        };
        self.store.save_settings(&settings).await?;
        Ok(())
    }

    /// Wipe the ledger back to the zeroed defaults and clear the store.
    ///
    /// Destructive and unconditional; confirmation belongs to the calling
    /// layer. The in-memory reset happens first and survives a failed
    /// durable clear, which is reported separately as
    /// [`LedgerError::Storage`] (the store may still hold stale data until a
    /// later clear succeeds).
    pub async fn reset(&mut self) -> Result<(), LedgerError> {
        self.balance = 0.0;
        self.income = 0.0;
        self.expenses = 0.0;
        self.transactions.clear();
        self.language = DEFAULT_LANGUAGE.to_string();

        info!("ledger reset to defaults");
        self.store.clear(&StoreCategory::ALL).await?;
        Ok(())
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn income(&self) -> f64 {
        self.income
    }

    pub fn expenses(&self) -> f64 {
        self.expenses
    }

    /// The aggregate snapshot as persisted in the summary record.
    pub fn summary(&self) -> Summary {
        Summary {
            balance: self.balance,
            income: self.income,
            expenses: self.expenses,
        }
    }

    /// The recorded history in append order. Callers wanting a different
    /// display order clone and sort their copy; the slice itself cannot be
    /// reordered through this borrow.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn language(&self) -> &str {
        &self.language
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn income(amount: f64, category: &str) -> NewTransaction {
        NewTransaction {
            transaction_type: TransactionType::Income,
            amount,
            category: category.to_string(),
            note: None,
        }
    }

    fn expense(amount: f64, category: &str) -> NewTransaction {
        NewTransaction {
            transaction_type: TransactionType::Expense,
            amount,
            category: category.to_string(),
            note: None,
        }
    }

    fn ledger() -> (Arc<MemoryStore>, Ledger<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let ledger = Ledger::new(Arc::clone(&store));
        (store, ledger)
    }

    #[tokio::test]
    async fn overview_scenario_income_expense_and_overdraft() {
        let (_, mut ledger) = ledger();

        let outcome = ledger
            .record_transaction(income(1_000_000.0, "salary"))
            .await
            .expect("income should record");
        assert_eq!(ledger.balance(), 1_000_000.0);
        assert_eq!(ledger.income(), 1_000_000.0);
        assert_eq!(ledger.expenses(), 0.0);
        assert_eq!(outcome.transaction.balance_start, 0.0);
        assert_eq!(outcome.transaction.balance_end, 1_000_000.0);

        let outcome = ledger
            .record_transaction(expense(50_000.0, "food"))
            .await
            .expect("expense should record");
        assert_eq!(ledger.balance(), 950_000.0);
        assert_eq!(ledger.expenses(), 50_000.0);
        assert_eq!(outcome.transaction.balance_start, 1_000_000.0);
        assert_eq!(outcome.transaction.balance_end, 950_000.0);

        // Exceeds the balance; the ledger imposes no overdraft floor
        ledger
            .record_transaction(expense(2_000_000.0, "shopping"))
            .await
            .expect("over-budget expense should still record");
        assert_eq!(ledger.balance(), -1_050_000.0);
        assert_eq!(ledger.income(), 1_000_000.0);
        assert_eq!(ledger.expenses(), 2_050_000.0);
    }

    #[tokio::test]
    async fn balance_equals_income_minus_expenses_after_every_call() {
        let (_, mut ledger) = ledger();
        let requests = vec![
            income(120.0, "freelance"),
            expense(30.5, "transport"),
            income(12.25, "gift"),
            expense(200.0, "bills"),
            income(0.75, "other"),
        ];

        for request in requests {
            ledger.record_transaction(request).await.expect("valid input");
            assert_eq!(ledger.balance(), ledger.income() - ledger.expenses());
        }
    }

    #[tokio::test]
    async fn recorded_transactions_chain_their_balances() {
        let (_, mut ledger) = ledger();
        ledger.record_transaction(income(100.0, "salary")).await.unwrap();
        ledger.record_transaction(expense(40.0, "food")).await.unwrap();
        ledger.record_transaction(expense(80.0, "health")).await.unwrap();
        ledger.record_transaction(income(15.0, "gift")).await.unwrap();

        let transactions = ledger.transactions();
        assert_eq!(transactions[0].balance_start, 0.0);
        for pair in transactions.windows(2) {
            assert_eq!(pair[1].balance_start, pair[0].balance_end);
        }
        assert_eq!(transactions.last().unwrap().balance_end, ledger.balance());
    }

    #[tokio::test]
    async fn invalid_input_is_rejected_without_any_state_change() {
        let (store, mut ledger) = ledger();
        ledger.record_transaction(income(50.0, "salary")).await.unwrap();

        let rejected = vec![
            income(0.0, "salary"),
            income(-10.0, "salary"),
            income(f64::NAN, "salary"),
            expense(f64::INFINITY, "food"),
            income(10.0, "groceries"),
            // valid category, wrong type
            income(10.0, "food"),
            expense(10.0, "salary"),
        ];

        for request in rejected {
            let err = ledger
                .record_transaction(request)
                .await
                .expect_err("must be rejected");
            assert!(matches!(err, LedgerError::InvalidTransaction(_)));
        }

        assert_eq!(ledger.balance(), 50.0);
        assert_eq!(ledger.income(), 50.0);
        assert_eq!(ledger.expenses(), 0.0);
        assert_eq!(ledger.transactions().len(), 1);
        // Nothing beyond the first record reached the store either
        assert_eq!(store.load_transactions().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn persistence_failure_keeps_the_in_memory_change_and_warns() {
        let (store, mut ledger) = ledger();
        store.fail_writes(true);

        let outcome = ledger
            .record_transaction(income(75.0, "allowance"))
            .await
            .expect("recording succeeds for the session");
        assert!(matches!(
            outcome.persistence_warning,
            Some(StorageError::Io(_))
        ));
        assert_eq!(ledger.balance(), 75.0);
        assert_eq!(ledger.transactions().len(), 1);

        // The store saw nothing
        store.fail_writes(false);
        assert!(store.load_summary().await.unwrap().is_none());
        assert!(store.load_transactions().await.unwrap().is_empty());

        // Later records persist again, warning-free
        let outcome = ledger
            .record_transaction(expense(25.0, "charity"))
            .await
            .unwrap();
        assert!(outcome.persistence_warning.is_none());
        let summary = store.load_summary().await.unwrap().unwrap();
        assert_eq!(summary.balance, 50.0);
    }

    #[tokio::test]
    async fn initialize_on_a_never_written_store_keeps_defaults() {
        let (_, mut ledger) = ledger();
        ledger.initialize().await.expect("empty store is not an error");

        assert_eq!(ledger.balance(), 0.0);
        assert_eq!(ledger.income(), 0.0);
        assert_eq!(ledger.expenses(), 0.0);
        assert!(ledger.transactions().is_empty());
        assert_eq!(ledger.language(), DEFAULT_LANGUAGE);
    }

    #[tokio::test]
    async fn initialize_is_all_or_nothing_on_storage_failure() {
        let (store, mut ledger) = ledger();
        ledger.record_transaction(income(500.0, "business")).await.unwrap();
        ledger.change_language("en").await.unwrap();

        let mut fresh = Ledger::new(Arc::clone(&store));
        store.fail_reads(true);
        let err = fresh.initialize().await.expect_err("load must fail");
        assert!(matches!(err, LedgerError::Storage(StorageError::Io(_))));

        // Degraded mode: fully zeroed, not partially loaded
        assert_eq!(fresh.balance(), 0.0);
        assert!(fresh.transactions().is_empty());
        assert_eq!(fresh.language(), DEFAULT_LANGUAGE);

        store.fail_reads(false);
        fresh.initialize().await.expect("load succeeds once storage is back");
        assert_eq!(fresh.balance(), 500.0);
        assert_eq!(fresh.transactions().len(), 1);
        assert_eq!(fresh.language(), "en");
    }

    #[tokio::test]
    async fn round_trip_through_the_store_reproduces_the_ledger() {
        let (store, mut ledger) = ledger();
        ledger
            .record_transaction(NewTransaction {
                transaction_type: TransactionType::Income,
                amount: 300.0,
                category: "royalty".to_string(),
                note: Some("q2 statement".to_string()),
            })
            .await
            .unwrap();
        ledger.record_transaction(expense(120.0, "entertainment")).await.unwrap();

        let mut reloaded = Ledger::new(Arc::clone(&store));
        reloaded.initialize().await.unwrap();

        assert_eq!(reloaded.balance(), ledger.balance());
        assert_eq!(reloaded.income(), ledger.income());
        assert_eq!(reloaded.expenses(), ledger.expenses());
        assert_eq!(reloaded.transactions(), ledger.transactions());
    }

    #[tokio::test]
    async fn reset_is_idempotent_and_clears_the_store() {
        let (store, mut ledger) = ledger();
        ledger.record_transaction(income(90.0, "pension")).await.unwrap();
        ledger.change_language("en").await.unwrap();

        ledger.reset().await.expect("reset should clear the store");
        ledger.reset().await.expect("second reset is a no-op");

        assert_eq!(ledger.balance(), 0.0);
        assert_eq!(ledger.income(), 0.0);
        assert_eq!(ledger.expenses(), 0.0);
        assert!(ledger.transactions().is_empty());
        assert_eq!(ledger.language(), DEFAULT_LANGUAGE);

        // No stale data resurrects on the next startup
        let mut fresh = Ledger::new(Arc::clone(&store));
        fresh.initialize().await.unwrap();
        assert_eq!(fresh.balance(), 0.0);
        assert!(fresh.transactions().is_empty());
        assert_eq!(fresh.language(), DEFAULT_LANGUAGE);
    }

    #[tokio::test]
    async fn reset_zeroes_memory_even_when_the_durable_clear_fails() {
        let (store, mut ledger) = ledger();
        ledger.record_transaction(income(60.0, "investment")).await.unwrap();

        store.fail_writes(true);
        let err = ledger.reset().await.expect_err("clear must fail");
        assert!(matches!(err, LedgerError::Storage(StorageError::Io(_))));

        // In-memory reset stands; the store still holds the stale records
        assert_eq!(ledger.balance(), 0.0);
        assert!(ledger.transactions().is_empty());
        store.fail_writes(false);
        assert_eq!(store.load_transactions().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn change_language_persists_the_preference() {
        let (store, mut ledger) = ledger();
        assert_eq!(ledger.language(), "id");

        ledger.change_language("en").await.unwrap();
        assert_eq!(ledger.language(), "en");
        let settings = store.load_settings().await.unwrap().unwrap();
        assert_eq!(settings.language, "en");
    }

    #[tokio::test]
    async fn empty_notes_are_normalized_to_absent() {
        let (_, mut ledger) = ledger();
        let outcome = ledger
            .record_transaction(NewTransaction {
                transaction_type: TransactionType::Expense,
                amount: 10.0,
                category: "debt".to_string(),
                note: Some(String::new()),
            })
            .await
            .unwrap();
        assert_eq!(outcome.transaction.note, None);
    }
}

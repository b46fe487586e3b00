use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{migrate::MigrateDatabase, Row, Sqlite, SqlitePool};
use std::sync::Arc;
use tracing::debug;

use crate::storage::traits::{LedgerStore, StorageError, StoreCategory};
use shared::{Settings, Summary, Transaction, TransactionType};

// The database URL for the production database
const DATABASE_URL: &str = "sqlite:money-tracker.db";

/// Embedded SQLite store for the ledger's three record categories.
///
/// The pool is reference-counted, so cloning the store shares the same
/// underlying database connection.
#[derive(Clone)]
pub struct SqliteStore {
    pool: Arc<SqlitePool>,
}

impl SqliteStore {
    /// Open (creating if missing) the database at `url` and ensure the
    /// schema exists.
    pub async fn new(url: &str) -> Result<Self, StorageError> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            Sqlite::create_database(url)
                .await
                .map_err(StorageError::unavailable)?;
        }

        let pool = SqlitePool::connect(url)
            .await
            .map_err(StorageError::unavailable)?;

        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Open the standard on-disk database.
    pub async fn init() -> Result<Self, StorageError> {
        Self::new(DATABASE_URL).await
    }

    /// Open a uniquely-named in-memory database for tests.
    pub async fn init_test() -> Result<Self, StorageError> {
        let test_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::new(&db_url).await
    }

    /// Create the three category tables if absent. Idempotent; there is no
    /// schema versioning beyond "exists or create".
    async fn setup_schema(pool: &SqlitePool) -> Result<(), StorageError> {
        // Single-row summary table; the fixed id keeps upserts trivial
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS summary (
                id INTEGER PRIMARY KEY CHECK (id = 0),
                balance REAL NOT NULL,
                income REAL NOT NULL,
                expenses REAL NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await
        .map_err(StorageError::unavailable)?;

        // Transactions table; seq preserves storage-insertion order
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS transactions (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                transaction_type TEXT NOT NULL,
                amount REAL NOT NULL,
                category TEXT NOT NULL,
                balance_start REAL NOT NULL,
                balance_end REAL NOT NULL,
                note TEXT,
                timestamp TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await
        .map_err(StorageError::unavailable)?;

        // Single-row settings table
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                id INTEGER PRIMARY KEY CHECK (id = 0),
                language TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await
        .map_err(StorageError::unavailable)?;

        debug!("sqlite schema ready");
        Ok(())
    }

    fn row_to_transaction(row: &sqlx::sqlite::SqliteRow) -> Result<Transaction, StorageError> {
        let type_tag: String = row.get("transaction_type");
        let transaction_type = TransactionType::parse(&type_tag).ok_or_else(|| {
            StorageError::io(format!("unrecognized transaction type tag: {}", type_tag))
        })?;

        let timestamp: String = row.get("timestamp");
        let timestamp = DateTime::parse_from_rfc3339(&timestamp)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| StorageError::io(format!("bad transaction timestamp: {}", e)))?;

        Ok(Transaction {
            id: row.get("id"),
            transaction_type,
            amount: row.get("amount"),
            category: row.get("category"),
            balance_start: row.get("balance_start"),
            balance_end: row.get("balance_end"),
            note: row.get("note"),
            timestamp,
        })
    }
}

#[async_trait]
impl LedgerStore for SqliteStore {
    async fn save_summary(&self, summary: &Summary) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO summary (id, balance, income, expenses)
            VALUES (0, ?, ?, ?)
            "#,
        )
        .bind(summary.balance)
        .bind(summary.income)
        .bind(summary.expenses)
        .execute(&*self.pool)
        .await
        .map_err(StorageError::io)?;
        Ok(())
    }

    async fn load_summary(&self) -> Result<Option<Summary>, StorageError> {
        let row = sqlx::query(
            r#"
            SELECT balance, income, expenses FROM summary WHERE id = 0
            "#,
        )
        .fetch_optional(&*self.pool)
        .await
        .map_err(StorageError::io)?;

        Ok(row.map(|r| Summary {
            balance: r.get("balance"),
            income: r.get("income"),
            expenses: r.get("expenses"),
        }))
    }

    async fn append_transaction(&self, transaction: &Transaction) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO transactions
                (id, transaction_type, amount, category, balance_start, balance_end, note, timestamp)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&transaction.id)
        .bind(transaction.transaction_type.as_str())
        .bind(transaction.amount)
        .bind(&transaction.category)
        .bind(transaction.balance_start)
        .bind(transaction.balance_end)
        .bind(transaction.note.as_deref())
        .bind(transaction.timestamp.to_rfc3339())
        .execute(&*self.pool)
        .await
        .map_err(StorageError::io)?;
        Ok(())
    }

    async fn load_transactions(&self) -> Result<Vec<Transaction>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT id, transaction_type, amount, category,
                   balance_start, balance_end, note, timestamp
            FROM transactions
            ORDER BY seq ASC
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(StorageError::io)?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    async fn save_settings(&self, settings: &Settings) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO settings (id, language) VALUES (0, ?)
            "#,
        )
        .bind(&settings.language)
        .execute(&*self.pool)
        .await
        .map_err(StorageError::io)?;
        Ok(())
    }

    async fn load_settings(&self) -> Result<Option<Settings>, StorageError> {
        let row = sqlx::query(
            r#"
            SELECT language FROM settings WHERE id = 0
            "#,
        )
        .fetch_optional(&*self.pool)
        .await
        .map_err(StorageError::io)?;

        Ok(row.map(|r| Settings {
            language: r.get("language"),
        }))
    }

    async fn clear(&self, categories: &[StoreCategory]) -> Result<(), StorageError> {
        for category in categories {
            let statement = match category {
                StoreCategory::Summary => "DELETE FROM summary",
                StoreCategory::Transactions => "DELETE FROM transactions",
                StoreCategory::Settings => "DELETE FROM settings",
            };
            sqlx::query(statement)
                .execute(&*self.pool)
                .await
                .map_err(StorageError::io)?;
        }
        Ok(())
    }
}

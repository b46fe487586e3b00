use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Language the UI layer should render in. Persisted in the settings record.
///
/// The tracker shipped with Indonesian as its default locale.
pub const DEFAULT_LANGUAGE: &str = "id";

/// Categories a transaction of type [`TransactionType::Income`] may carry.
pub const INCOME_CATEGORIES: &[&str] = &[
    "allowance",
    "business",
    "freelance",
    "gift",
    "investment",
    "pension",
    "royalty",
    "salary",
    "other",
];

/// Categories a transaction of type [`TransactionType::Expense`] may carry.
pub const EXPENSE_CATEGORIES: &[&str] = &[
    "bills",
    "charity",
    "debt",
    "entertainment",
    "food",
    "health",
    "shopping",
    "transport",
    "other",
];

/// Type of transaction for rendering and business logic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money added to the ledger
    Income,
    /// Money spent from the ledger
    Expense,
}

impl TransactionType {
    /// The lowercase tag used in persisted records ("income" / "expense").
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    /// Parse the persisted tag back into a type.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "income" => Some(TransactionType::Income),
            "expense" => Some(TransactionType::Expense),
            _ => None,
        }
    }

    /// The fixed category set valid for this transaction type.
    pub fn valid_categories(&self) -> &'static [&'static str] {
        match self {
            TransactionType::Income => INCOME_CATEGORIES,
            TransactionType::Expense => EXPENSE_CATEGORIES,
        }
    }

    /// Whether `category` belongs to this type's category set.
    pub fn allows_category(&self, category: &str) -> bool {
        self.valid_categories().contains(&category)
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded income or expense event.
///
/// Created exactly once when the ledger records it, then never mutated or
/// deleted. The balance snapshots are stamped by the ledger, not the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique within one store. Format: `<in|ex>-<epoch_millis>-<hex suffix>`
    pub id: String,
    pub transaction_type: TransactionType,
    /// Always positive; the type decides the sign of the balance change
    pub amount: f64,
    /// Member of the category set for `transaction_type`
    pub category: String,
    /// Ledger balance immediately before this transaction applied
    pub balance_start: f64,
    /// Ledger balance immediately after this transaction applied
    pub balance_end: f64,
    /// Optional free-text annotation
    pub note: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Generate a transaction ID from the type tag and creation time.
    /// Example: `in-1625846400123-af3c`
    pub fn generate_id(transaction_type: TransactionType, timestamp_ms: u64) -> String {
        let tag = match transaction_type {
            TransactionType::Income => "in",
            TransactionType::Expense => "ex",
        };
        format!("{}-{}-{}", tag, timestamp_ms, Self::generate_random_suffix(4))
    }

    /// Generate a random hex suffix for transaction IDs.
    fn generate_random_suffix(len: usize) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        format!("{:x}", now % (16_u128.pow(len as u32)))
            .chars()
            .take(len)
            .collect()
    }
}

/// The aggregate snapshot persisted independently of the full history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Signed running total; equals `income - expenses` at all times
    pub balance: f64,
    /// Sum of all income amounts
    pub income: f64,
    /// Sum of all expense amounts
    pub expenses: f64,
}

/// Display preferences, persisted alongside the ledger but orthogonal to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Locale tag for the presentation layer
    pub language: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

/// Input tuple an input collector submits to the ledger.
///
/// The collector is expected to pre-validate; the ledger re-validates anyway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub transaction_type: TransactionType,
    pub amount: f64,
    pub category: String,
    pub note: Option<String>,
}

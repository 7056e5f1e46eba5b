//! Ledger of transactions, categories and the monthly budget

use anyhow::{Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Number of categories reported in a summary
const TOP_CATEGORIES: usize = 5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    #[serde(rename = "income")]
    Income,
    #[serde(rename = "expense")]
    Expense,
}

impl std::str::FromStr for TransactionKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => bail!("unknown transaction kind '{other}' (expected income or expense)"),
        }
    }
}

/// A single income or expense entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: String,
    pub kind: TransactionKind,
    /// Always positive; `kind` carries the sign
    pub amount: f64,
    pub category_name: String,
    pub note: Option<String>,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }
}

/// Fields to change on an existing transaction; `None` keeps the current value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionUpdate {
    pub kind: Option<TransactionKind>,
    pub amount: Option<f64>,
    pub category_name: Option<String>,
    pub note: Option<String>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryEntry {
    pub name: String,
    pub icon: String,
}

impl CategoryEntry {
    pub fn new(name: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon: icon.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryTotal {
    pub name: String,
    pub amount: f64,
}

/// Aggregate view of a ledger
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinancialSummary {
    pub balance: f64,
    pub total_income: f64,
    pub total_expense: f64,
    pub top_spending_categories: Vec<CategoryTotal>,
    pub transaction_count: usize,
}

impl FinancialSummary {
    pub fn top_category(&self) -> Option<&str> {
        self.top_spending_categories.first().map(|c| c.name.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ledger {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub categories: Vec<CategoryEntry>,
    #[serde(default)]
    pub monthly_budget: Option<f64>,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    next_id: u64,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Default for Ledger {
    fn default() -> Self {
        Self::with_default_categories()
    }
}

impl Ledger {
    /// Empty ledger with no categories at all
    pub fn empty() -> Self {
        Self {
            transactions: Vec::new(),
            categories: Vec::new(),
            monthly_budget: None,
            currency: default_currency(),
            next_id: 0,
        }
    }

    /// Fresh ledger seeded with the starter categories
    pub fn with_default_categories() -> Self {
        let mut ledger = Self::empty();
        ledger.categories = vec![
            CategoryEntry::new("Food", "restaurant"),
            CategoryEntry::new("Transport", "car"),
            CategoryEntry::new("Shopping", "shopping-cart"),
            CategoryEntry::new("Bills", "receipt"),
            CategoryEntry::new("Salary", "cash"),
            CategoryEntry::new("Entertainment", "game-controller"),
        ];
        ledger
    }

    pub fn category_names(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.name.clone()).collect()
    }

    pub fn has_category(&self, name: &str) -> bool {
        self.categories
            .iter()
            .any(|c| c.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Record a transaction dated `date`; returns the new record
    pub fn add_transaction(
        &mut self,
        kind: TransactionKind,
        amount: f64,
        category_name: impl Into<String>,
        note: Option<String>,
        date: NaiveDate,
    ) -> Result<&Transaction> {
        if !amount.is_finite() || amount < 0.0 {
            bail!("amount must be a non-negative number, got {amount}");
        }
        self.next_id += 1;
        let txn = Transaction {
            id: format!("tx-{:04}", self.next_id),
            kind,
            amount,
            category_name: category_name.into(),
            note,
            date,
            created_at: Utc::now(),
        };
        tracing::info!(id = %txn.id, ?kind, amount, category = %txn.category_name, "transaction added");
        self.transactions.push(txn);
        Ok(&self.transactions[self.transactions.len() - 1])
    }

    /// Apply the fields set in `update` to an existing transaction
    pub fn update_transaction(
        &mut self,
        id: &str,
        update: TransactionUpdate,
    ) -> Result<&Transaction> {
        if let Some(a) = update.amount {
            if !a.is_finite() || a < 0.0 {
                bail!("amount must be a non-negative number, got {a}");
            }
        }
        let Some(txn) = self.transactions.iter_mut().find(|t| t.id == id) else {
            bail!("transaction not found: {id}");
        };
        if let Some(kind) = update.kind {
            txn.kind = kind;
        }
        if let Some(a) = update.amount {
            txn.amount = a;
        }
        if let Some(c) = update.category_name {
            txn.category_name = c;
        }
        if update.note.is_some() {
            txn.note = update.note;
        }
        if let Some(d) = update.date {
            txn.date = d;
        }
        tracing::info!(id, "transaction updated");
        Ok(&*txn)
    }

    /// Newest first by date; same-day entries newest-added first
    pub fn transactions_by_date_desc(&self) -> Vec<&Transaction> {
        let mut out: Vec<&Transaction> = self.transactions.iter().collect();
        out.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
        out
    }

    pub fn remove_transaction(&mut self, id: &str) -> Result<Transaction> {
        let Some(pos) = self.transactions.iter().position(|t| t.id == id) else {
            bail!("transaction not found: {id}");
        };
        tracing::info!(id, "transaction removed");
        Ok(self.transactions.remove(pos))
    }

    /// Add a category; names are unique ignoring ASCII case
    pub fn add_category(&mut self, name: &str, icon: &str) -> Result<&CategoryEntry> {
        let name = name.trim();
        if name.is_empty() {
            bail!("category name must not be empty");
        }
        if self.has_category(name) {
            bail!("category '{name}' already exists");
        }
        self.categories.push(CategoryEntry::new(name, icon));
        tracing::info!(name, "category added");
        Ok(&self.categories[self.categories.len() - 1])
    }

    /// Rename and/or re-icon a category. A rename is checked against the
    /// other names and carried over to transactions filed under the old name.
    pub fn update_category(
        &mut self,
        name: &str,
        new_name: Option<&str>,
        icon: Option<&str>,
    ) -> Result<&CategoryEntry> {
        let Some(pos) = self
            .categories
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name.trim()))
        else {
            bail!("category not found: {name}");
        };

        if let Some(new_name) = new_name.map(str::trim) {
            if new_name.is_empty() {
                bail!("category name must not be empty");
            }
            let taken = self
                .categories
                .iter()
                .enumerate()
                .any(|(i, c)| i != pos && c.name.eq_ignore_ascii_case(new_name));
            if taken {
                bail!("category '{new_name}' already exists");
            }
            let old_name =
                std::mem::replace(&mut self.categories[pos].name, new_name.to_string());
            for t in self
                .transactions
                .iter_mut()
                .filter(|t| t.category_name == old_name)
            {
                t.category_name = new_name.to_string();
            }
            tracing::info!(from = %old_name, to = new_name, "category renamed");
        }
        if let Some(icon) = icon {
            self.categories[pos].icon = icon.to_string();
        }
        Ok(&self.categories[pos])
    }

    pub fn remove_category(&mut self, name: &str) -> Result<CategoryEntry> {
        let Some(pos) = self
            .categories
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name.trim()))
        else {
            bail!("category not found: {name}");
        };
        tracing::info!(name, "category removed");
        Ok(self.categories.remove(pos))
    }

    pub fn set_monthly_budget(&mut self, amount: f64) -> Result<()> {
        if !amount.is_finite() || amount < 0.0 {
            bail!("budget must be a non-negative number, got {amount}");
        }
        self.monthly_budget = Some(amount);
        tracing::info!(amount, "monthly budget set");
        Ok(())
    }

    pub fn total_income(&self) -> f64 {
        self.transactions
            .iter()
            .filter(|t| t.is_income())
            .map(|t| t.amount)
            .sum()
    }

    pub fn total_expense(&self) -> f64 {
        self.transactions
            .iter()
            .filter(|t| t.is_expense())
            .map(|t| t.amount)
            .sum()
    }

    /// Totals, balance and the biggest expense categories
    pub fn summary(&self) -> FinancialSummary {
        let total_income = self.total_income();
        let total_expense = self.total_expense();

        // Insertion-ordered so equal totals keep first-seen order after the stable sort
        let mut per_category: Vec<CategoryTotal> = Vec::new();
        for t in self.transactions.iter().filter(|t| t.is_expense()) {
            match per_category.iter_mut().find(|c| c.name == t.category_name) {
                Some(c) => c.amount += t.amount,
                None => per_category.push(CategoryTotal {
                    name: t.category_name.clone(),
                    amount: t.amount,
                }),
            }
        }
        per_category.sort_by(|a, b| b.amount.total_cmp(&a.amount));
        per_category.truncate(TOP_CATEGORIES);

        FinancialSummary {
            balance: total_income - total_expense,
            total_income,
            total_expense,
            top_spending_categories: per_category,
            transaction_count: self.transactions.len(),
        }
    }
}

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A single purchase record. Created once at load time, never mutated.
#[derive(Debug, Clone, Deserialize)]
pub struct Transaction {
  pub customer: String,
  pub product: String,
  pub amount: f64,
  pub date: NaiveDate,
}

#[derive(Debug, Error)]
pub enum LedgerError {
  #[error("could not read transaction file {}: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("could not parse transaction file {}: {source}", path.display())]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },
  #[error("transaction {index} has an empty {field}")]
  EmptyField { index: usize, field: &'static str },
  #[error("transaction {index} has a negative amount: {amount}")]
  NegativeAmount { index: usize, amount: f64 },
  #[error("could not find home directory for the default data path")]
  NoHomeDir,
}

/// The in-memory transaction collection. Ordered, read-only after load.
#[derive(Debug, Clone)]
pub struct Ledger {
  transactions: Vec<Transaction>,
}

impl Ledger {
  /// Build a ledger from records, enforcing the load-time invariants:
  /// non-empty customer and product, non-negative amount.
  pub fn from_transactions(transactions: Vec<Transaction>) -> Result<Self, LedgerError> {
    for (index, t) in transactions.iter().enumerate() {
      if t.customer.trim().is_empty() {
        return Err(LedgerError::EmptyField { index, field: "customer" });
      }
      if t.product.trim().is_empty() {
        return Err(LedgerError::EmptyField { index, field: "product" });
      }
      if t.amount < 0.0 {
        return Err(LedgerError::NegativeAmount { index, amount: t.amount });
      }
    }

    Ok(Self { transactions })
  }

  /// Load the ledger from a JSON array of transaction records.
  pub fn load(path: &Path) -> Result<Self, LedgerError> {
    let content = fs::read_to_string(path)
      .map_err(|source| LedgerError::Read { path: path.to_path_buf(), source })?;

    let transactions: Vec<Transaction> = serde_json::from_str(&content)
      .map_err(|source| LedgerError::Parse { path: path.to_path_buf(), source })?;

    tracing::info!(count = transactions.len(), path = %path.display(), "loaded transactions");

    Self::from_transactions(transactions)
  }

  pub fn transactions(&self) -> &[Transaction] {
    &self.transactions
  }

  pub fn len(&self) -> usize {
    self.transactions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.transactions.is_empty()
  }

  /// Distinct customer names in first-seen order. The order is observable:
  /// entity detection binds the first name that matches a query.
  pub fn distinct_customers(&self) -> Vec<&str> {
    distinct(self.transactions.iter().map(|t| t.customer.as_str()))
  }

  /// Distinct product names in first-seen order.
  pub fn distinct_products(&self) -> Vec<&str> {
    distinct(self.transactions.iter().map(|t| t.product.as_str()))
  }

  /// All transactions of one customer, in ledger order.
  pub fn for_customer(&self, customer: &str) -> Vec<&Transaction> {
    self.transactions.iter().filter(|t| t.customer == customer).collect()
  }

  /// All transactions of one product, in ledger order.
  pub fn for_product(&self, product: &str) -> Vec<&Transaction> {
    self.transactions.iter().filter(|t| t.product == product).collect()
  }

  pub fn total_for(&self, customer: &str) -> f64 {
    self.for_customer(customer).iter().map(|t| t.amount).sum()
  }

  pub fn mean_for(&self, customer: &str) -> f64 {
    let items = self.for_customer(customer);
    if items.is_empty() {
      return 0.0;
    }
    items.iter().map(|t| t.amount).sum::<f64>() / items.len() as f64
  }

  pub fn overall_mean(&self) -> f64 {
    if self.transactions.is_empty() {
      return 0.0;
    }
    self.transactions.iter().map(|t| t.amount).sum::<f64>() / self.transactions.len() as f64
  }

  /// The most frequently purchased product. Ties break toward the product
  /// encountered first in the ledger.
  pub fn most_purchased_product(&self) -> Option<&str> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for t in &self.transactions {
      *counts.entry(t.product.as_str()).or_insert(0) += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for product in self.distinct_products() {
      let count = counts[product];
      if best.map_or(true, |(_, best_count)| count > best_count) {
        best = Some((product, count));
      }
    }

    best.map(|(product, _)| product)
  }

  /// Spend totals grouped by calendar month (YYYY-MM), sorted by month.
  pub fn monthly_totals(&self) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();
    for t in &self.transactions {
      let month = format!("{:04}-{:02}", t.date.year(), t.date.month());
      *totals.entry(month).or_insert(0.0) += t.amount;
    }
    totals
  }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
  let mut seen = Vec::new();
  for value in values {
    if !seen.contains(&value) {
      seen.push(value);
    }
  }
  seen
}

/// Render a currency amount the way the ledger file writes it: without a
/// fractional part when the value is integral.
pub fn format_amount(amount: f64) -> String {
  if amount.fract() == 0.0 {
    format!("{}", amount as i64)
  } else {
    format!("{amount}")
  }
}

/// Resolve the transaction file path: explicit flag, then the
/// KHATA_DATA_FILE env var, then ~/.khata/transactions.json.
pub fn data_file_path(flag: Option<&Path>) -> Result<PathBuf, LedgerError> {
  if let Some(path) = flag {
    return Ok(path.to_path_buf());
  }

  if let Ok(custom_path) = std::env::var("KHATA_DATA_FILE") {
    return Ok(PathBuf::from(custom_path));
  }

  let home = dirs::home_dir().ok_or(LedgerError::NoHomeDir)?;
  Ok(home.join(".khata").join("transactions.json"))
}

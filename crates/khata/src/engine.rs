use anyhow::Result;

use crate::corpus::Corpus;
use crate::intent;
use crate::model::EmbeddingModel;
use crate::retriever;
use crate::router;
use crate::transaction::Ledger;

pub const GREETING_REPLY: &str = "👋 Hi! Please ask a transaction-related question.";

pub const INVALID_QUERY_REPLY: &str = "❗ Please ask a valid transaction question.\n\n\
   Examples:\n\
   - What is Amit's total spending?\n\
   - Amit ne kya kya kharida?";

pub const RETRIEVAL_HEADER: &str = "📌 **Relevant Information:**\n";

/// The query-answering core. Owns the ledger, the precomputed retrieval
/// corpus and the encoder; all three are injected at construction instead
/// of living in process-wide singletons.
pub struct ChatEngine<M: EmbeddingModel> {
  ledger: Ledger,
  corpus: Corpus,
  model: M,
}

impl<M: EmbeddingModel> ChatEngine<M> {
  /// Build the corpus (one encoder call for all sentences) and freeze the
  /// engine state for the rest of the process lifetime.
  pub fn new(ledger: Ledger, mut model: M) -> Result<Self> {
    let corpus = Corpus::build(&ledger, &mut model)?;
    Ok(Self { ledger, corpus, model })
  }

  pub fn ledger(&self) -> &Ledger {
    &self.ledger
  }

  pub fn corpus(&self) -> &Corpus {
    &self.corpus
  }

  /// Answer one query. Every input produces some text; the only error path
  /// is an encoder failure during the retrieval fallback.
  pub fn respond(&mut self, query: &str) -> Result<String> {
    if intent::is_greeting(query) {
      return Ok(GREETING_REPLY.to_string());
    }

    if !intent::is_valid_query(query) {
      return Ok(INVALID_QUERY_REPLY.to_string());
    }

    if let Some(answer) = router::route(query, &self.ledger) {
      return Ok(answer);
    }

    let retrieved =
      retriever::retrieve(query, &mut self.model, &self.corpus, retriever::DEFAULT_TOP_K)?;

    let lines: Vec<String> = retrieved.into_iter().map(|sentence| format!("- {sentence}")).collect();
    Ok(format!("{}{}", RETRIEVAL_HEADER, lines.join("\n")))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::LexicalEmbeddingModel;
  use crate::transaction::Transaction;

  fn tx(customer: &str, product: &str, amount: f64, date: &str) -> Transaction {
    Transaction {
      customer: customer.to_string(),
      product: product.to_string(),
      amount,
      date: date.parse().unwrap(),
    }
  }

  fn engine() -> ChatEngine<LexicalEmbeddingModel> {
    let ledger = Ledger::from_transactions(vec![
      tx("Riya", "Laptop", 50000.0, "2024-01-01"),
      tx("Riya", "Mobile", 20000.0, "2024-02-01"),
    ])
    .unwrap();

    ChatEngine::new(ledger, LexicalEmbeddingModel::new()).unwrap()
  }

  #[test]
  fn test_greeting_short_circuits_everything() {
    let mut engine = engine();
    assert_eq!(engine.respond("hi").unwrap(), GREETING_REPLY);
    assert_eq!(engine.respond("  HELLO ").unwrap(), GREETING_REPLY);
  }

  #[test]
  fn test_junk_query_gets_fixed_guidance() {
    let mut engine = engine();
    assert_eq!(engine.respond("ok").unwrap(), INVALID_QUERY_REPLY);
    assert_eq!(engine.respond("thanks").unwrap(), INVALID_QUERY_REPLY);
  }

  #[test]
  fn test_short_query_gets_fixed_guidance() {
    let mut engine = engine();
    assert_eq!(engine.respond("laptop").unwrap(), INVALID_QUERY_REPLY);
  }

  #[test]
  fn test_total_spending_answer() {
    let mut engine = engine();
    let answer = engine.respond("What is Riya's total spending?").unwrap();
    assert!(answer.contains("₹70000"));
  }

  #[test]
  fn test_who_bought_lists_buyers_only() {
    let mut engine = engine();
    let answer = engine.respond("Who bought the Mobile?").unwrap();
    assert!(answer.contains("Riya"));
    assert!(!answer.contains("Laptop"));
  }

  #[test]
  fn test_unmatched_query_falls_back_to_retrieval() {
    let mut engine = engine();
    let answer = engine.respond("tell me something interesting").unwrap();

    assert!(answer.starts_with(RETRIEVAL_HEADER));
    // Up to top-k corpus sentences, verbatim, as bullets
    let bullets: Vec<&str> = answer.lines().skip(1).collect();
    assert!(!bullets.is_empty() && bullets.len() <= 3);
    for bullet in bullets {
      let sentence = bullet.strip_prefix("- ").unwrap();
      assert!(engine.corpus().sentences().iter().any(|s| s == sentence));
    }
  }

  #[test]
  fn test_retrieval_fallback_is_idempotent() {
    let mut engine = engine();
    let first = engine.respond("tell me something interesting").unwrap();
    let second = engine.respond("tell me something interesting").unwrap();
    assert_eq!(first, second);
  }
}

use anyhow::Result;

use crate::model::EmbeddingModel;
use crate::transaction::{format_amount, Ledger};

/// The retrieval corpus: one synthesized sentence per transaction, paired
/// positionally with its precomputed embedding. Index i always describes
/// transaction i.
pub struct Corpus {
  sentences: Vec<String>,
  vectors: Vec<Vec<f32>>,
}

impl Corpus {
  /// Human-readable sentence per transaction, in ledger order.
  pub fn synthesize(ledger: &Ledger) -> Vec<String> {
    ledger
      .transactions()
      .iter()
      .map(|t| {
        format!(
          "On {}, {} purchased a {} for ₹{}.",
          t.date,
          t.customer,
          t.product,
          format_amount(t.amount)
        )
      })
      .collect()
  }

  /// Synthesize the sentences and encode them all in one batch. Called once
  /// per process lifetime; the corpus is read-only afterwards.
  pub fn build(ledger: &Ledger, model: &mut impl EmbeddingModel) -> Result<Self> {
    let sentences = Self::synthesize(ledger);
    let vectors =
      if sentences.is_empty() { vec![] } else { model.compute_embeddings(&sentences)? };

    tracing::debug!(entries = sentences.len(), "built retrieval corpus");

    Ok(Self { sentences, vectors })
  }

  pub fn sentences(&self) -> &[String] {
    &self.sentences
  }

  pub fn vectors(&self) -> &[Vec<f32>] {
    &self.vectors
  }

  pub fn len(&self) -> usize {
    self.sentences.len()
  }

  pub fn is_empty(&self) -> bool {
    self.sentences.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::MockEmbeddingModel;
  use crate::transaction::Transaction;

  fn sample_ledger() -> Ledger {
    Ledger::from_transactions(vec![
      Transaction {
        customer: "Riya".to_string(),
        product: "Laptop".to_string(),
        amount: 50000.0,
        date: "2024-01-01".parse().unwrap(),
      },
      Transaction {
        customer: "Amit".to_string(),
        product: "Earbuds".to_string(),
        amount: 2999.5,
        date: "2024-02-15".parse().unwrap(),
      },
    ])
    .unwrap()
  }

  #[test]
  fn test_sentence_format() {
    let sentences = Corpus::synthesize(&sample_ledger());
    assert_eq!(sentences[0], "On 2024-01-01, Riya purchased a Laptop for ₹50000.");
    assert_eq!(sentences[1], "On 2024-02-15, Amit purchased a Earbuds for ₹2999.5.");
  }

  #[test]
  fn test_corpus_entry_count_matches_ledger() {
    let ledger = sample_ledger();
    let mut model = MockEmbeddingModel::new();
    let corpus = Corpus::build(&ledger, &mut model).unwrap();

    assert_eq!(corpus.len(), ledger.len());
    assert_eq!(corpus.sentences().len(), corpus.vectors().len());
  }

  #[test]
  fn test_empty_ledger_builds_empty_corpus() {
    let ledger = Ledger::from_transactions(vec![]).unwrap();
    let mut model = MockEmbeddingModel::new();
    let corpus = Corpus::build(&ledger, &mut model).unwrap();

    assert!(corpus.is_empty());
  }
}

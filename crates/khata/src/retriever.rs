use anyhow::{anyhow, Result};

use crate::corpus::Corpus;
use crate::model::EmbeddingModel;
use crate::similarity;

/// How many corpus sentences the fallback answer carries.
pub const DEFAULT_TOP_K: usize = 3;

/// Encode the query with the same model that produced the corpus vectors,
/// score every corpus entry by cosine similarity, and return the
/// min(top_k, corpus size) sentences in descending-similarity order.
///
/// No minimum-similarity threshold: the retriever always answers, even
/// when every score is low.
pub fn retrieve(
  query: &str,
  model: &mut impl EmbeddingModel,
  corpus: &Corpus,
  top_k: usize,
) -> Result<Vec<String>> {
  let mut query_vectors = model.compute_embeddings(&[query.to_string()])?;
  let query_vector =
    query_vectors.pop().ok_or_else(|| anyhow!("encoder returned no embedding for the query"))?;

  let scores: Vec<f32> = corpus
    .vectors()
    .iter()
    .map(|vector| similarity::cosine_similarity(&query_vector, vector))
    .collect();

  let ranked = similarity::rank_descending(&scores);

  tracing::debug!(
    top_score = ranked.first().map(|&i| scores[i]).unwrap_or(0.0),
    candidates = scores.len(),
    "retrieval scored corpus"
  );

  Ok(ranked.into_iter().take(top_k).map(|i| corpus.sentences()[i].clone()).collect())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::MockEmbeddingModel;
  use crate::transaction::{Ledger, Transaction};

  fn tx(customer: &str, product: &str, amount: f64, date: &str) -> Transaction {
    Transaction {
      customer: customer.to_string(),
      product: product.to_string(),
      amount,
      date: date.parse().unwrap(),
    }
  }

  /// Corpus of three entries with hand-picked vectors, plus a model whose
  /// next answer (the query embedding) is the first scripted vector.
  fn fixture() -> (Corpus, MockEmbeddingModel) {
    let ledger = Ledger::from_transactions(vec![
      tx("Riya", "Laptop", 50000.0, "2024-01-01"),
      tx("Riya", "Mobile", 20000.0, "2024-02-01"),
      tx("Amit", "Earbuds", 3000.0, "2024-03-05"),
    ])
    .unwrap();

    // Corpus vectors: entry 1 aligns with the query direction, entry 2 is
    // orthogonal, entry 0 points the other way.
    let mut corpus_model = MockEmbeddingModel::new().with_embeddings(vec![
      vec![-1.0, 0.0],
      vec![1.0, 0.0],
      vec![0.0, 1.0],
    ]);
    let corpus = Corpus::build(&ledger, &mut corpus_model).unwrap();

    let query_model = MockEmbeddingModel::new().with_embeddings(vec![vec![1.0, 0.0]]);
    (corpus, query_model)
  }

  #[test]
  fn test_retrieve_orders_by_descending_similarity() {
    let (corpus, mut model) = fixture();
    let result = retrieve("anything", &mut model, &corpus, 3).unwrap();

    assert_eq!(result[0], corpus.sentences()[1]);
    assert_eq!(result[1], corpus.sentences()[2]);
    assert_eq!(result[2], corpus.sentences()[0]);
  }

  #[test]
  fn test_retrieve_clamps_top_k_to_corpus_size() {
    let (corpus, mut model) = fixture();
    let result = retrieve("anything", &mut model, &corpus, 10).unwrap();
    assert_eq!(result.len(), 3);
  }

  #[test]
  fn test_retrieve_is_idempotent() {
    let (corpus, mut model) = fixture();
    let first = retrieve("anything", &mut model, &corpus, 3).unwrap();
    let second = retrieve("anything", &mut model, &corpus, 3).unwrap();
    assert_eq!(first, second);
  }

  #[test]
  fn test_retrieve_surfaces_encoder_failure() {
    let (corpus, _) = fixture();
    let mut model = MockEmbeddingModel::new().with_failure_on("broken query".to_string());
    assert!(retrieve("broken query", &mut model, &corpus, 3).is_err());
  }
}

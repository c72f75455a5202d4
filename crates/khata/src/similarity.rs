use std::cmp::Ordering;

/// Cosine similarity between two embeddings, in [-1, 1]. Mismatched
/// lengths and zero-magnitude vectors score 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
  if a.len() != b.len() {
    return 0.0;
  }

  let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
  let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
  let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

  if magnitude_a == 0.0 || magnitude_b == 0.0 {
    0.0
  } else {
    dot_product / (magnitude_a * magnitude_b)
  }
}

/// Indices of `scores` ordered by descending score. The sort is stable, so
/// equal scores keep their original (ascending index) order.
pub fn rank_descending(scores: &[f32]) -> Vec<usize> {
  let mut indices: Vec<usize> = (0..scores.len()).collect();
  indices.sort_by(|&a, &b| scores[b].partial_cmp(&scores[a]).unwrap_or(Ordering::Equal));
  indices
}

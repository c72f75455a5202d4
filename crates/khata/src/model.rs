use anyhow::{anyhow, Result};

#[cfg(feature = "neural")]
use ort::{
  session::{builder::GraphOptimizationLevel, Session},
  value::TensorRef,
};
#[cfg(feature = "neural")]
use tokenizers::Tokenizer;

/// Trait for computing text embeddings - allows swapping encoders and
/// testing with mocks. The same model instance must encode both the corpus
/// and the incoming queries.
pub trait EmbeddingModel {
  fn compute_embeddings(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Default embedding dimensionality for the lexical encoder.
pub const LEXICAL_DIM: usize = 64;

/// Deterministic offline encoder: feature hashing over lower-cased
/// alphanumeric tokens into a fixed-size L2-normalized vector. Not a neural
/// model, but stable across runs for a fixed version, which is all the
/// retriever requires.
pub struct LexicalEmbeddingModel {
  dim: usize,
}

impl LexicalEmbeddingModel {
  pub fn new() -> Self {
    Self { dim: LEXICAL_DIM }
  }

  pub fn with_dim(dim: usize) -> Self {
    Self { dim }
  }

  fn embed(&self, text: &str) -> Vec<f32> {
    let mut vector = vec![0.0f32; self.dim];
    let lowered = text.to_lowercase();
    let tokens = lowered.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty());

    let mut count = 0usize;
    for token in tokens {
      let hash = blake3::hash(token.as_bytes());
      let bytes = hash.as_bytes();

      let bucket = u64::from_le_bytes(bytes[..8].try_into().expect("hash has 32 bytes"));
      let sign = if bytes[8] & 1 == 0 { 1.0f32 } else { -1.0f32 };

      vector[(bucket as usize) % self.dim] += sign;
      count += 1;
    }

    if count == 0 {
      return vector;
    }

    let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if magnitude > 0.0 {
      for x in &mut vector {
        *x /= magnitude;
      }
    }

    vector
  }
}

impl Default for LexicalEmbeddingModel {
  fn default() -> Self {
    Self::new()
  }
}

impl EmbeddingModel for LexicalEmbeddingModel {
  fn compute_embeddings(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
    Ok(texts.iter().map(|text| self.embed(text)).collect())
  }
}

/// Real ONNX-based embedding model (all-MiniLM-L6-v2).
#[cfg(feature = "neural")]
pub struct OnnxEmbeddingModel {
  session: Session,
  tokenizer: Tokenizer,
}

#[cfg(feature = "neural")]
impl OnnxEmbeddingModel {
  /// Initialize the ONNX runtime, model session and tokenizer once. The
  /// tokenizer file path comes from KHATA_TOKENIZER_FILE, defaulting to
  /// ./tokenizer.json.
  pub fn new() -> Result<Self> {
    ort::init()
      .with_name("khata-model")
      .commit()
      .map_err(|e| anyhow!("Failed to initialize ONNX Runtime: {}", e))?;

    let session = Session::builder()
      .map_err(|e| anyhow!("Failed to create session builder: {}", e))?
      .with_optimization_level(GraphOptimizationLevel::Level1)
      .map_err(|e| anyhow!("Failed to set optimization level: {}", e))?
      .with_intra_threads(1)
      .map_err(|e| anyhow!("Failed to set thread count: {}", e))?
      .commit_from_url(
        "https://cdn.pyke.io/0/pyke:ort-rs/example-models@0.0.0/all-MiniLM-L6-v2.onnx",
      )
      .map_err(|e| anyhow!("Failed to load model: {}", e))?;

    let tokenizer_path =
      std::env::var("KHATA_TOKENIZER_FILE").unwrap_or_else(|_| "tokenizer.json".to_string());
    let tokenizer = Tokenizer::from_file(&tokenizer_path)
      .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path, e))?;

    Ok(Self { session, tokenizer })
  }
}

#[cfg(feature = "neural")]
impl EmbeddingModel for OnnxEmbeddingModel {
  fn compute_embeddings(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
    if texts.is_empty() {
      return Ok(vec![]);
    }

    let encodings = self
      .tokenizer
      .encode_batch(texts.to_vec(), true)
      .map_err(|e| anyhow!("Failed to encode texts: {}", e))?;

    let padded_token_length = encodings.iter().map(|e| e.len()).max().unwrap_or(0);

    let mut ids: Vec<i64> = Vec::with_capacity(texts.len() * padded_token_length);
    let mut mask: Vec<i64> = Vec::with_capacity(texts.len() * padded_token_length);

    for encoding in &encodings {
      let encoding_ids = encoding.get_ids();
      let encoding_mask = encoding.get_attention_mask();

      for i in 0..padded_token_length {
        if i < encoding_ids.len() {
          ids.push(encoding_ids[i] as i64);
          mask.push(encoding_mask[i] as i64);
        } else {
          ids.push(0);
          mask.push(0);
        }
      }
    }

    let ids_tensor = TensorRef::from_array_view(([texts.len(), padded_token_length], &*ids))?;
    let mask_tensor = TensorRef::from_array_view(([texts.len(), padded_token_length], &*mask))?;

    let outputs = self.session.run(ort::inputs![ids_tensor, mask_tensor])?;

    // Index 1 holds the pooled sentence embeddings for sentence transformers
    let embedding_output = if outputs.len() > 1 { &outputs[1] } else { &outputs[0] };
    let embeddings =
      embedding_output.try_extract_array::<f32>()?.into_dimensionality::<ndarray::Ix2>()?;

    let mut result = Vec::new();
    for i in 0..texts.len() {
      let row: Vec<f32> = embeddings.index_axis(ndarray::Axis(0), i).iter().copied().collect();
      result.push(normalize(row));
    }

    Ok(result)
  }
}

#[cfg(feature = "neural")]
fn normalize(vector: Vec<f32>) -> Vec<f32> {
  let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
  if magnitude > 0.0 {
    vector.into_iter().map(|x| x / magnitude).collect()
  } else {
    vector
  }
}

/// Mock embedding model for testing.
pub struct MockEmbeddingModel {
  pub fail_on_texts: Vec<String>,
  pub response_embeddings: Vec<Vec<f32>>,
}

impl MockEmbeddingModel {
  pub fn new() -> Self {
    Self { fail_on_texts: vec![], response_embeddings: vec![vec![0.1, 0.2, 0.3]; 10] }
  }

  pub fn with_failure_on(mut self, text: String) -> Self {
    self.fail_on_texts.push(text);
    self
  }

  pub fn with_embeddings(mut self, embeddings: Vec<Vec<f32>>) -> Self {
    self.response_embeddings = embeddings;
    self
  }
}

impl Default for MockEmbeddingModel {
  fn default() -> Self {
    Self::new()
  }
}

impl EmbeddingModel for MockEmbeddingModel {
  fn compute_embeddings(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
    for text in texts {
      if self.fail_on_texts.contains(text) {
        return Err(anyhow!("Mock failure for text: {}", text));
      }
    }

    // Cycle through the scripted embeddings
    let mut result = Vec::new();
    for (i, _text) in texts.iter().enumerate() {
      let embedding_index = i % self.response_embeddings.len();
      result.push(self.response_embeddings[embedding_index].clone());
    }

    Ok(result)
  }
}

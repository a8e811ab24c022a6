//! Mock embedding backend for deterministic testing.
//!
//! Produces embeddings derived from the input text alone, so the same
//! text always maps to the same vector. Failure and latency injection
//! cover the degraded-provider paths without a live endpoint.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use noteworks_core::{EmbeddingBackend, Error, Result, Vector};

/// Mock embedding backend for testing.
#[derive(Clone)]
pub struct MockEmbeddingBackend {
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<Vec<String>>>>,
}

#[derive(Debug, Clone)]
struct MockConfig {
    dimension: usize,
    model: String,
    fail: bool,
    latency_ms: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            dimension: 8,
            model: "mock-embed".to_string(),
            fail: false,
            latency_ms: 0,
        }
    }
}

impl MockEmbeddingBackend {
    /// Create a new mock backend with default configuration.
    pub fn new() -> Self {
        Self {
            config: Arc::new(MockConfig::default()),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the embedding dimension.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        Arc::make_mut(&mut self.config).dimension = dimension;
        self
    }

    /// Set the reported model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).model = model.into();
        self
    }

    /// Make every call fail, for testing degraded paths.
    pub fn with_failure(mut self) -> Self {
        Arc::make_mut(&mut self.config).fail = true;
        self
    }

    /// Set simulated latency for all calls.
    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        Arc::make_mut(&mut self.config).latency_ms = latency_ms;
        self
    }

    /// Number of `embed_texts` invocations so far.
    pub fn call_count(&self) -> usize {
        self.call_log.lock().unwrap().len()
    }

    /// Inputs of every `embed_texts` invocation, in call order.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.call_log.lock().unwrap().clone()
    }
}

impl Default for MockEmbeddingBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingBackend for MockEmbeddingBackend {
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>> {
        self.call_log.lock().unwrap().push(texts.to_vec());

        if self.config.latency_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(self.config.latency_ms)).await;
        }

        if self.config.fail {
            return Err(Error::Embedding("simulated provider failure".to_string()));
        }

        Ok(texts
            .iter()
            .map(|text| Vector::from(MockEmbeddingGenerator::generate(text, self.config.dimension)))
            .collect())
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

/// Mock embedding generator with deterministic output.
pub struct MockEmbeddingGenerator;

impl MockEmbeddingGenerator {
    /// Generate a deterministic embedding from text.
    ///
    /// Uses character-based hashing for reproducibility. The same text
    /// will always produce the same embedding, and texts sharing many
    /// characters land closer together than unrelated ones.
    pub fn generate(text: &str, dimension: usize) -> Vec<f32> {
        let mut vec = vec![0.0; dimension];

        for (i, c) in text.chars().enumerate() {
            let idx = (c as usize + i) % dimension;
            vec[idx] += 0.1;
        }

        Self::normalize(&mut vec);
        vec
    }

    /// Generate an embedding from a seed, for distinct but reproducible vectors.
    pub fn generate_with_seed(seed: u64, dimension: usize) -> Vec<f32> {
        let mut vec = vec![0.0; dimension];
        let mut state = seed;

        // Simple LCG for deterministic pseudo-random values
        for item in vec.iter_mut() {
            state = state.wrapping_mul(1664525).wrapping_add(1013904223);
            *item = ((state % 1000) as f32) / 1000.0 - 0.5;
        }

        Self::normalize(&mut vec);
        vec
    }

    fn normalize(vec: &mut [f32]) {
        let magnitude: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            vec.iter_mut().for_each(|x| *x /= magnitude);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_backend_deterministic() {
        let backend = MockEmbeddingBackend::new();

        let e1 = backend
            .embed_texts(&["quantum computing".to_string()])
            .await
            .unwrap();
        let e2 = backend
            .embed_texts(&["quantum computing".to_string()])
            .await
            .unwrap();

        assert_eq!(e1[0].as_slice(), e2[0].as_slice());
    }

    #[tokio::test]
    async fn test_mock_backend_dimension() {
        let backend = MockEmbeddingBackend::new().with_dimension(128);

        let vectors = backend.embed_texts(&["test".to_string()]).await.unwrap();
        assert_eq!(vectors[0].as_slice().len(), 128);
        assert_eq!(backend.dimension(), 128);
    }

    #[tokio::test]
    async fn test_mock_backend_failure() {
        let backend = MockEmbeddingBackend::new().with_failure();

        let result = backend.embed_texts(&["test".to_string()]).await;
        assert!(matches!(result, Err(Error::Embedding(_))));
    }

    #[tokio::test]
    async fn test_mock_backend_call_logging() {
        let backend = MockEmbeddingBackend::new();

        backend.embed_texts(&["a".to_string()]).await.unwrap();
        backend
            .embed_texts(&["b".to_string(), "c".to_string()])
            .await
            .unwrap();

        assert_eq!(backend.call_count(), 2);
        let calls = backend.calls();
        assert_eq!(calls[1], vec!["b".to_string(), "c".to_string()]);
    }

    #[tokio::test]
    async fn test_mock_backend_latency() {
        let backend = MockEmbeddingBackend::new().with_latency_ms(50);

        let start = std::time::Instant::now();
        backend.embed_texts(&["test".to_string()]).await.unwrap();
        assert!(start.elapsed().as_millis() >= 50);
    }

    #[test]
    fn test_generator_normalized() {
        let embedding = MockEmbeddingGenerator::generate("test", 128);
        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((magnitude - 1.0).abs() < 0.01, "Should be normalized");
    }

    #[test]
    fn test_generator_with_seed() {
        let e1 = MockEmbeddingGenerator::generate_with_seed(42, 256);
        let e2 = MockEmbeddingGenerator::generate_with_seed(42, 256);
        let e3 = MockEmbeddingGenerator::generate_with_seed(43, 256);

        assert_eq!(e1, e2, "Same seed should produce same vector");
        assert_ne!(e1, e3, "Different seed should produce different vector");
    }
}

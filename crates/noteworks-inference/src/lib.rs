//! Embedding provider client for Noteworks.
//!
//! Talks to OpenAI-compatible embedding endpoints and exposes the
//! result as [`noteworks_core::Vector`] values ready for storage.
//!
//! - [`OpenAIBackend`]: HTTP client for `/v1/embeddings` APIs
//! - [`mock::MockEmbeddingBackend`]: deterministic backend for tests
//!   (behind the `mock` feature)
//!
//! The client performs a single request per call and reports failures
//! as [`Error::Embedding`](noteworks_core::Error::Embedding); retry and
//! fallback policy belong to the callers.
//!
//! ```rust,ignore
//! use noteworks_inference::{EmbeddingBackend, OpenAIBackend};
//!
//! let backend = OpenAIBackend::from_env()?;
//! let vectors = backend.embed_texts(&["hello world".to_string()]).await?;
//! ```

#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod openai;

// Re-export core so consumers get one coherent namespace.
pub use noteworks_core::*;

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockEmbeddingBackend, MockEmbeddingGenerator};
pub use openai::{OpenAIBackend, OpenAIConfig};

//! # noteworks-search
//!
//! Semantic note retrieval engine for noteworks.
//!
//! This crate provides:
//! - Query planning (request validation and normalization)
//! - Structural candidate filtering via the note repository
//! - Cosine-similarity ranking with a deterministic recency fallback
//! - The retrieval orchestrator owning the latency and failure policy
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use noteworks_search::{RetrievalEngine, RetrievalRequest};
//! use noteworks_db::Database;
//! use noteworks_inference::OpenAIBackend;
//!
//! let db = Database::connect("postgres://...").await?;
//! let backend = Arc::new(OpenAIBackend::from_env()?);
//! let engine = RetrievalEngine::new(db, backend);
//!
//! let response = engine
//!     .retrieve(&RetrievalRequest {
//!         workspace_id: Some(workspace_id),
//!         note_type: Some(NoteType::Content),
//!         query: Some("lisbon food".to_string()),
//!         ..Default::default()
//!     })
//!     .await?;
//! ```

pub mod plan;
pub mod ranking;
pub mod retrieval;

// Re-export core types
pub use noteworks_core::*;

// Re-export engine types
pub use plan::plan_query;
pub use ranking::{cosine_similarity, rank_candidates};
pub use retrieval::{rank_with_fallback, RetrievalConfig, RetrievalEngine};

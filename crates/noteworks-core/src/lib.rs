//! # Noteworks Core
//!
//! Core types and traits shared across the Noteworks workspace: domain
//! models, the error type, retrieval plan and result types, storage and
//! inference trait seams, and the server event bus.
//!
//! Concrete implementations live in sibling crates:
//! - `noteworks-db`: Postgres repositories
//! - `noteworks-inference`: embedding provider clients
//! - `noteworks-search`: query planning and ranking
//! - `noteworks-jobs`: background recompute worker
//! - `noteworks-api`: HTTP server

pub mod defaults;
pub mod error;
pub mod events;
pub mod fields;
pub mod logging;
pub mod models;
pub mod search;
pub mod tags;
pub mod traits;
pub mod uuid_utils;

pub use error::{Error, Result};
pub use events::{EventBus, ServerEvent};
pub use fields::{derive_search_text, NoteField};
pub use models::*;
pub use search::{
    CandidateNote, RankedNote, RetrievalPlan, RetrievalRequest, RetrievalResponse, TagPredicate,
};
pub use tags::normalize_tags;
pub use traits::{EmbeddingBackend, EmbeddingRepository, JobRepository, NoteRepository};
pub use uuid_utils::{extract_timestamp, is_v7, new_v7};

//! Retrieval orchestrator: plan, filter, embed, rank.
//!
//! Owns the latency and failure policy for a search. The embedding call
//! runs under a bounded deadline; when it fails or times out, ranking
//! degrades to recency order and the request still succeeds.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, warn};

use noteworks_core::defaults::{EMBED_TIMEOUT_SECS, SEARCH_LATENCY_BUDGET_MS, SEARCH_RESULT_LIMIT};
use noteworks_core::{
    CandidateNote, EmbeddingBackend, Error, NoteRepository, Result, RetrievalRequest,
    RetrievalResponse, Vector,
};
use noteworks_db::Database;

use crate::plan::plan_query;
use crate::ranking::rank_candidates;

/// Configuration for the retrieval engine.
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    /// Maximum number of notes a single search returns.
    pub result_limit: usize,
    /// Deadline for the query-embedding call.
    pub embed_timeout: Duration,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            result_limit: SEARCH_RESULT_LIMIT,
            embed_timeout: Duration::from_secs(EMBED_TIMEOUT_SECS),
        }
    }
}

impl RetrievalConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            result_limit: std::env::var("SEARCH_RESULT_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(SEARCH_RESULT_LIMIT),
            embed_timeout: Duration::from_secs(
                std::env::var("SEARCH_EMBED_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(EMBED_TIMEOUT_SECS),
            ),
        }
    }

    /// Set the result cap.
    pub fn with_result_limit(mut self, limit: usize) -> Self {
        self.result_limit = limit;
        self
    }

    /// Set the embedding deadline.
    pub fn with_embed_timeout(mut self, timeout: Duration) -> Self {
        self.embed_timeout = timeout;
        self
    }
}

/// End-to-end retrieval engine.
///
/// The embedding backend is injected so test doubles can stand in for
/// the remote provider.
#[derive(Clone)]
pub struct RetrievalEngine {
    db: Database,
    embedder: Arc<dyn EmbeddingBackend>,
    config: RetrievalConfig,
}

impl RetrievalEngine {
    /// Create a new retrieval engine with default configuration.
    pub fn new(db: Database, embedder: Arc<dyn EmbeddingBackend>) -> Self {
        Self {
            db,
            embedder,
            config: RetrievalConfig::default(),
        }
    }

    /// Set the retrieval configuration.
    pub fn with_config(mut self, config: RetrievalConfig) -> Self {
        self.config = config;
        self
    }

    /// Get the current configuration.
    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Execute a search request end to end.
    ///
    /// Validation failures surface as [`Error::InvalidInput`] and storage
    /// failures as [`Error::Database`]; provider failures never escape,
    /// they downgrade the response to recency order with a warning.
    #[instrument(skip(self, request), fields(
        subsystem = "search",
        component = "retrieval",
        op = "retrieve",
    ))]
    pub async fn retrieve(&self, request: &RetrievalRequest) -> Result<RetrievalResponse> {
        let start = Instant::now();

        let plan = plan_query(request)?;
        let candidates = self.db.notes.find_candidates(&plan).await?;
        debug!(
            candidate_count = candidates.len(),
            has_query = plan.query_text.is_some(),
            "Candidate filter complete"
        );

        let response = rank_with_fallback(
            self.embedder.as_ref(),
            self.config.embed_timeout,
            self.config.result_limit,
            plan.query_text.as_deref(),
            candidates,
        )
        .await;

        let duration_ms = start.elapsed().as_millis();
        if duration_ms > SEARCH_LATENCY_BUDGET_MS {
            warn!(
                duration_ms = duration_ms as u64,
                slow = true,
                "Search exceeded latency budget"
            );
        }
        info!(
            result_count = response.notes.len(),
            semantic = response.semantic_available,
            duration_ms = duration_ms as u64,
            "Search completed"
        );

        Ok(response)
    }
}

/// Rank candidates, embedding the query text under a deadline first.
///
/// This is the orchestrator's fallback policy in one place, independent
/// of storage:
/// - an empty candidate set returns immediately and never calls the
///   provider;
/// - absent query text ranks by recency;
/// - a provider error or timeout ranks by recency and records a warning;
/// - only a successful embedding call produces semantic ordering.
pub async fn rank_with_fallback(
    embedder: &dyn EmbeddingBackend,
    embed_timeout: Duration,
    limit: usize,
    query_text: Option<&str>,
    candidates: Vec<CandidateNote>,
) -> RetrievalResponse {
    if candidates.is_empty() {
        return RetrievalResponse {
            notes: Vec::new(),
            semantic_available: false,
            warnings: Vec::new(),
        };
    }

    let Some(query) = query_text else {
        return RetrievalResponse {
            notes: rank_candidates(None, candidates, limit),
            semantic_available: false,
            warnings: Vec::new(),
        };
    };

    match embed_query(embedder, embed_timeout, query).await {
        Ok(query_vector) => RetrievalResponse {
            notes: rank_candidates(Some(&query_vector), candidates, limit),
            semantic_available: true,
            warnings: Vec::new(),
        },
        Err(e) => {
            warn!(
                subsystem = "search",
                component = "retrieval",
                error = %e,
                "Embedding unavailable, falling back to recency order"
            );
            RetrievalResponse {
                notes: rank_candidates(None, candidates, limit),
                semantic_available: false,
                warnings: vec![format!("semantic ranking unavailable: {e}")],
            }
        }
    }
}

/// Embed the query text, bounded by the configured deadline.
async fn embed_query(
    embedder: &dyn EmbeddingBackend,
    embed_timeout: Duration,
    query: &str,
) -> Result<Vector> {
    let vectors = tokio::time::timeout(embed_timeout, embedder.embed_texts(&[query.to_string()]))
        .await
        .map_err(|_| {
            Error::Embedding(format!(
                "query embedding timed out after {}ms",
                embed_timeout.as_millis()
            ))
        })??;

    vectors
        .into_iter()
        .next()
        .ok_or_else(|| Error::Embedding("provider returned no vector for the query".to_string()))
}

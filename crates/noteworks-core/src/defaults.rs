//! Centralized default constants for the noteworks system.
//!
//! **This module is the single source of truth** for all shared default values.
//! All crates should reference these constants instead of defining their own
//! magic numbers.
//!
//! Organized by domain area. When adding new constants, place them in the
//! appropriate section and document the rationale for the chosen value.

// =============================================================================
// EMBEDDING
// =============================================================================

/// Default embedding model name (OpenAI-compatible).
pub const EMBED_MODEL: &str = "text-embedding-3-small";

/// Default embedding vector dimension for text-embedding-3-small.
pub const EMBED_DIMENSION: usize = 1536;

/// Timeout for a single query-embedding request in seconds.
///
/// Must leave room inside the end-to-end search budget: on timeout the
/// engine still has to filter and rank before responding.
pub const EMBED_TIMEOUT_SECS: u64 = 4;

// =============================================================================
// SEARCH
// =============================================================================

/// Maximum number of notes a single search returns.
pub const SEARCH_RESULT_LIMIT: usize = 20;

/// End-to-end search latency budget in milliseconds. Searches exceeding
/// this are logged as slow.
pub const SEARCH_LATENCY_BUDGET_MS: u128 = 5000;

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 3000;

/// Default event bus broadcast channel capacity.
pub const EVENT_BUS_CAPACITY: usize = 256;

/// Default CORS max-age in seconds (1 hour).
pub const CORS_MAX_AGE_SECS: u64 = 3600;

// =============================================================================
// JOB PROCESSING
// =============================================================================

/// Default maximum retry count for failed embedding jobs.
pub const JOB_MAX_RETRIES: i32 = 3;

/// Default job worker safety-net poll interval in milliseconds.
///
/// With event-driven waking the worker sleeps until notified. This interval
/// only covers edge cases (crash recovery, external SQL inserts, races
/// between notify and claim).
pub const JOB_POLL_INTERVAL_MS: u64 = 1000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embed_timeout_fits_latency_budget() {
        // Use const block to satisfy clippy::assertions_on_constants
        const {
            assert!((EMBED_TIMEOUT_SECS as u128) * 1000 < SEARCH_LATENCY_BUDGET_MS);
        }
    }

    #[test]
    fn search_limit_is_positive() {
        const {
            assert!(SEARCH_RESULT_LIMIT > 0);
        }
    }

    #[test]
    fn job_retries_nonnegative() {
        const {
            assert!(JOB_MAX_RETRIES >= 0);
        }
    }

    #[test]
    fn embed_dimension_matches_model() {
        // text-embedding-3-small produces 1536-wide vectors unless truncated.
        const {
            assert!(EMBED_DIMENSION == 1536);
        }
    }
}

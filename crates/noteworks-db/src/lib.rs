//! # noteworks-db
//!
//! PostgreSQL database layer for Noteworks.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for notes, embeddings, and the job queue
//! - Candidate selection for retrieval (workspace, type, and tag filtering
//!   joined with stored pgvector embeddings)
//!
//! ## Example
//!
//! ```rust,ignore
//! use noteworks_db::Database;
//! use noteworks_core::CreateNoteRequest;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/noteworks").await?;
//!
//!     let note = db.notes.create(CreateNoteRequest {
//!         workspace_id: uuid::Uuid::now_v7(),
//!         owner_id: uuid::Uuid::now_v7(),
//!         ..Default::default()
//!     }).await?;
//!
//!     println!("Created note: {}", note.id);
//!     Ok(())
//! }
//! ```

pub mod embeddings;
pub mod jobs;
pub mod notes;
pub mod pool;

// Re-export core types
pub use noteworks_core::*;

// Re-export repository implementations
pub use embeddings::PgEmbeddingRepository;
pub use jobs::PgJobRepository;
pub use notes::PgNoteRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};

/// Combined database context with all repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Note repository for CRUD and candidate selection.
    pub notes: PgNoteRepository,
    /// Embedding repository for vector storage.
    pub embeddings: PgEmbeddingRepository,
    /// Job repository for background recompute.
    pub jobs: PgJobRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            notes: PgNoteRepository::new(pool.clone()),
            embeddings: PgEmbeddingRepository::new(pool.clone()),
            jobs: PgJobRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}

//! Embedding job queue repository implementation.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use tokio::sync::Notify;
use uuid::Uuid;

use noteworks_core::{
    new_v7, EmbeddingJob, Error, JobRepository, JobStatus, QueueStats, Result,
};

/// PostgreSQL implementation of JobRepository.
///
/// Clones share the notify handle, so a worker holding one clone wakes
/// when any other clone queues a job.
#[derive(Clone)]
pub struct PgJobRepository {
    pool: Pool<Postgres>,
    /// Notify handle for event-driven worker wake.
    notify: Arc<Notify>,
}

impl PgJobRepository {
    /// Create a new PgJobRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            pool,
            notify: Arc::new(Notify::new()),
        }
    }

    /// Create a new PgJobRepository sharing an existing notify handle.
    pub fn with_notify(pool: Pool<Postgres>, notify: Arc<Notify>) -> Self {
        Self { pool, notify }
    }

    /// Get the job notification handle for event-driven waking.
    pub fn job_notify(&self) -> Arc<Notify> {
        self.notify.clone()
    }

    /// Convert string from database to JobStatus.
    fn str_to_job_status(s: &str) -> JobStatus {
        match s {
            "pending" => JobStatus::Pending,
            "running" => JobStatus::Running,
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            _ => JobStatus::Pending, // fallback
        }
    }

    /// Parse a job row into an EmbeddingJob struct.
    fn parse_job_row(row: sqlx::postgres::PgRow) -> EmbeddingJob {
        let status: String = row.get("status");
        EmbeddingJob {
            id: row.get("id"),
            note_id: row.get("note_id"),
            status: Self::str_to_job_status(&status),
            error_message: row.get("error_message"),
            retry_count: row.get("retry_count"),
            max_retries: row.get("max_retries"),
            created_at: row.get("created_at"),
            started_at: row.get("started_at"),
            completed_at: row.get("completed_at"),
        }
    }
}

const JOB_COLUMNS: &str = "id, note_id, status, error_message, retry_count, max_retries,
                           created_at, started_at, completed_at";

#[async_trait]
impl JobRepository for PgJobRepository {
    async fn queue_deduplicated(&self, note_id: Uuid) -> Result<Option<Uuid>> {
        let job_id = new_v7();
        let now = Utc::now();

        // Atomic check-and-insert using INSERT ... WHERE NOT EXISTS to prevent
        // TOCTOU races when concurrent requests queue work for the same note.
        let result = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO embedding_job (id, note_id, status, created_at)
             SELECT $1, $2, 'pending', $3
             WHERE NOT EXISTS (
                 SELECT 1 FROM embedding_job
                 WHERE note_id = $2 AND status IN ('pending', 'running')
             )
             RETURNING id",
        )
        .bind(job_id)
        .bind(note_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.is_some() {
            self.notify.notify_waiters();
        }
        Ok(result)
    }

    async fn claim_next(&self) -> Result<Option<EmbeddingJob>> {
        let now = Utc::now();

        // FOR UPDATE SKIP LOCKED so concurrent workers never claim the same job.
        let query = format!(
            "UPDATE embedding_job
             SET status = 'running', started_at = $1
             WHERE id = (
                 SELECT id FROM embedding_job
                 WHERE status = 'pending'
                 ORDER BY created_at ASC
                 LIMIT 1
                 FOR UPDATE SKIP LOCKED
             )
             RETURNING {JOB_COLUMNS}"
        );

        let row = sqlx::query(&query)
            .bind(now)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.map(Self::parse_job_row))
    }

    async fn complete(&self, job_id: Uuid) -> Result<()> {
        let now = Utc::now();

        sqlx::query(
            "UPDATE embedding_job
             SET status = 'completed', completed_at = $1, error_message = NULL
             WHERE id = $2",
        )
        .bind(now)
        .bind(job_id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(())
    }

    async fn fail(&self, job_id: Uuid, error: &str) -> Result<()> {
        let now = Utc::now();

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let row = sqlx::query("SELECT retry_count, max_retries FROM embedding_job WHERE id = $1")
            .bind(job_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(Error::Database)?;

        // The row vanishes when its note is deleted mid-flight; nothing to record.
        let Some(row) = row else {
            return Ok(());
        };

        let retry_count: i32 = row.get("retry_count");
        let max_retries: i32 = row.get("max_retries");

        if retry_count < max_retries {
            // Requeue for retry; the next poll tick picks it up.
            sqlx::query(
                "UPDATE embedding_job
                 SET status = 'pending', retry_count = retry_count + 1,
                     error_message = $1, started_at = NULL
                 WHERE id = $2",
            )
            .bind(error)
            .bind(job_id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;
        } else {
            sqlx::query(
                "UPDATE embedding_job
                 SET status = 'failed', completed_at = $1, error_message = $2
                 WHERE id = $3",
            )
            .bind(now)
            .bind(error)
            .bind(job_id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;
        }

        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }

    async fn get(&self, job_id: Uuid) -> Result<Option<EmbeddingJob>> {
        let query = format!("SELECT {JOB_COLUMNS} FROM embedding_job WHERE id = $1");

        let row = sqlx::query(&query)
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.map(Self::parse_job_row))
    }

    async fn pending_count(&self) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM embedding_job WHERE status = 'pending'")
                .fetch_one(&self.pool)
                .await
                .map_err(Error::Database)?;
        Ok(count)
    }

    async fn queue_stats(&self) -> Result<QueueStats> {
        let row = sqlx::query(
            "SELECT
                COUNT(*) FILTER (WHERE status = 'pending') as pending,
                COUNT(*) FILTER (WHERE status = 'running') as running,
                COUNT(*) FILTER (WHERE status = 'completed' AND completed_at > NOW() - INTERVAL '1 hour') as completed_last_hour,
                COUNT(*) FILTER (WHERE status = 'failed' AND completed_at > NOW() - INTERVAL '1 hour') as failed_last_hour,
                COUNT(*) as total
             FROM embedding_job"
        )
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(QueueStats {
            pending: row.get::<i64, _>("pending"),
            running: row.get::<i64, _>("running"),
            completed_last_hour: row.get::<i64, _>("completed_last_hour"),
            failed_last_hour: row.get::<i64, _>("failed_last_hour"),
            total: row.get::<i64, _>("total"),
        })
    }
}

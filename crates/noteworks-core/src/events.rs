//! Server event types and event bus for real-time notifications.
//!
//! Aggregates events from multiple sources (job worker, note operations)
//! into a single broadcast channel. Downstream consumers subscribe
//! independently.

use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Unified server event type.
///
/// Events are serialized as JSON with a `type` tag field, e.g.:
/// `{"type":"JobStarted","job_id":"...","note_id":"..."}`
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// An embedding job was added to the queue.
    JobQueued { job_id: Uuid, note_id: Uuid },
    /// A job started processing.
    JobStarted { job_id: Uuid, note_id: Uuid },
    /// A job completed successfully.
    JobCompleted {
        job_id: Uuid,
        note_id: Uuid,
        #[serde(skip_serializing_if = "Option::is_none")]
        duration_ms: Option<i64>,
    },
    /// A job failed (terminally or pending retry).
    JobFailed {
        job_id: Uuid,
        note_id: Uuid,
        error: String,
    },
    /// A note was created, updated, or deleted.
    NoteUpdated {
        note_id: Uuid,
        workspace_id: Uuid,
        tags: Vec<String>,
    },
}

impl ServerEvent {
    /// Returns the event type name (used for logging and consumer filtering).
    pub fn event_type(&self) -> &'static str {
        match self {
            ServerEvent::JobQueued { .. } => "JobQueued",
            ServerEvent::JobStarted { .. } => "JobStarted",
            ServerEvent::JobCompleted { .. } => "JobCompleted",
            ServerEvent::JobFailed { .. } => "JobFailed",
            ServerEvent::NoteUpdated { .. } => "NoteUpdated",
        }
    }
}

/// Broadcast-based event bus for distributing server events to multiple consumers.
///
/// Uses `tokio::sync::broadcast` with a configurable buffer size. Slow
/// receivers that fall behind receive a `Lagged` error and miss events;
/// freshness matters more than completeness for these streams.
pub struct EventBus {
    tx: broadcast::Sender<ServerEvent>,
}

impl EventBus {
    /// Create a new event bus with the given buffer capacity.
    ///
    /// Recommended: 256 for production, 32 for tests.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Emit an event to all subscribers.
    ///
    /// If there are no active subscribers, the event is silently dropped.
    pub fn emit(&self, event: ServerEvent) {
        let subscriber_count = self.tx.receiver_count();
        tracing::debug!(
            event_type = %event.event_type(),
            subscriber_count,
            "EventBus emit"
        );
        let _ = self.tx.send(event);
    }

    /// Subscribe to receive events. Each subscriber gets its own independent stream.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.tx.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

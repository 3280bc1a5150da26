//! Event types for the sitedash event system
//!
//! Provides the shared `DashEvent` definitions and the `EventBus` used to
//! fan ingestion/report progress out to SSE clients and audit consumers.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Severity attached to user-visible notifications.
///
/// Mirrors the four toast classes the dashboard front-end renders. The same
/// scale doubles as the status-badge severity for table rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// sitedash event types
///
/// Events are broadcast via EventBus and serialized for SSE transmission.
/// All events use this central enum for type safety and exhaustive matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DashEvent {
    /// A workbook upload was accepted and ingestion began
    IngestStarted {
        /// Upload identifier
        upload_id: Uuid,
        /// Original workbook filename
        filename: String,
        /// When ingestion started
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Ingestion committed all classified sheets and purged orphans
    ///
    /// Triggers:
    /// - SSE: re-render KPI tiles, charts and tables
    /// - Audit: append to upload history
    IngestCompleted {
        /// Upload identifier
        upload_id: Uuid,
        /// Original workbook filename
        filename: String,
        /// Rows committed across all sheets, counted before the purge
        total_rows: usize,
        /// Dependent rows dropped because no project code could be resolved
        purged_rows: usize,
        /// Labels of the sheet roles that were committed
        processed_sheets: Vec<String>,
        /// When ingestion completed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Ingestion aborted before any state mutation
    IngestFailed {
        /// Upload identifier
        upload_id: Uuid,
        /// Original workbook filename
        filename: String,
        /// Parse error message
        error: String,
        /// When ingestion failed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A report artifact was generated
    ReportGenerated {
        /// Report identifier
        report_id: Uuid,
        /// Report type label (e.g. "weekly")
        report_type: String,
        /// Project filter ("all" or one project name)
        project: String,
        /// Whether the plain-text fallback renderer produced the artifact
        fallback: bool,
        /// When the report was generated
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// User-visible notification toast
    Notification {
        /// Message text
        message: String,
        /// Severity classification
        level: NotificationLevel,
        /// When the notification was raised
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl DashEvent {
    /// Get event type as string for SSE filtering
    pub fn event_type(&self) -> &str {
        match self {
            DashEvent::IngestStarted { .. } => "IngestStarted",
            DashEvent::IngestCompleted { .. } => "IngestCompleted",
            DashEvent::IngestFailed { .. } => "IngestFailed",
            DashEvent::ReportGenerated { .. } => "ReportGenerated",
            DashEvent::Notification { .. } => "Notification",
        }
    }

    /// Convenience constructor for notification events
    pub fn notification(message: impl Into<String>, level: NotificationLevel) -> Self {
        DashEvent::Notification {
            message: message.into(),
            level,
            timestamp: chrono::Utc::now(),
        }
    }
}

/// Central event distribution bus for application-wide events
///
/// Uses tokio::broadcast internally, providing:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Automatic cleanup when subscribers drop
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<DashEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<DashEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: DashEvent,
    ) -> Result<usize, broadcast::error::SendError<DashEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring the no-subscriber case
    ///
    /// Progress events are advisory; nobody listening is not an error.
    pub fn emit_lossy(&self, event: DashEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

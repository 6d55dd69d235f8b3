//! Bounded, append-only audit log of delivery attempts.
//!
//! The store is a fixed-capacity ring buffer: when an append would
//! exceed capacity, the oldest entry is evicted first. Entries are
//! never mutated after append and are not durable across restarts.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::notification::{Channel, NotificationEvent, NotificationResult};
use crate::redact::RedactedRecipient;

/// Default maximum number of retained log entries
pub const DEFAULT_LOG_CAPACITY: usize = 1000;

/// Lifecycle status of a logged delivery attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogStatus {
    Pending,
    Sent,
    Failed,
    Delivered,
}

/// One immutable record of a (request, channel) delivery attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationLog {
    /// Unique entry identifier
    pub id: Uuid,
    /// The triggering event
    pub event: NotificationEvent,
    /// The channel this attempt used
    pub channel: Channel,
    /// Display-safe recipient projection
    pub recipient: RedactedRecipient,
    /// Outcome status
    pub status: LogStatus,
    /// The originating result
    pub result: NotificationResult,
    /// When the entry was created
    pub created_at: DateTime<Utc>,
    /// Set only when the attempt succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<DateTime<Utc>>,
    /// Failure reason, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NotificationLog {
    /// Build a log entry from a delivery result.
    ///
    /// In-app delivery is immediate and final, so a successful in-app
    /// attempt is recorded as `Delivered`; other channels are `Sent`
    /// (handed to the transport, downstream delivery unconfirmed).
    pub fn from_result(
        event: NotificationEvent,
        recipient: RedactedRecipient,
        result: &NotificationResult,
    ) -> Self {
        let status = if result.success {
            match result.channel {
                Channel::InApp => LogStatus::Delivered,
                _ => LogStatus::Sent,
            }
        } else {
            LogStatus::Failed
        };

        Self {
            id: Uuid::new_v4(),
            event,
            channel: result.channel,
            recipient,
            status,
            created_at: Utc::now(),
            sent_at: result.success.then_some(result.timestamp),
            error: result.error.clone(),
            result: result.clone(),
        }
    }
}

/// Filters for querying the log store.
///
/// Filters are independent and AND-combined; `None` means "any".
/// Date bounds are inclusive on `created_at`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogQuery {
    pub event: Option<NotificationEvent>,
    pub channel: Option<Channel>,
    pub user_id: Option<String>,
    pub role: Option<String>,
    pub status: Option<LogStatus>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

impl LogQuery {
    pub fn event(mut self, event: NotificationEvent) -> Self {
        self.event = Some(event);
        self
    }

    pub fn channel(mut self, channel: Channel) -> Self {
        self.channel = Some(channel);
        self
    }

    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn status(mut self, status: LogStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn start_date(mut self, start: DateTime<Utc>) -> Self {
        self.start_date = Some(start);
        self
    }

    pub fn end_date(mut self, end: DateTime<Utc>) -> Self {
        self.end_date = Some(end);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn matches(&self, entry: &NotificationLog) -> bool {
        if self.event.is_some_and(|e| e != entry.event) {
            return false;
        }
        if self.channel.is_some_and(|c| c != entry.channel) {
            return false;
        }
        if let Some(user_id) = &self.user_id {
            if entry.recipient.user_id.as_deref() != Some(user_id.as_str()) {
                return false;
            }
        }
        if let Some(role) = &self.role {
            if entry.recipient.role.as_deref() != Some(role.as_str()) {
                return false;
            }
        }
        if self.status.is_some_and(|s| s != entry.status) {
            return false;
        }
        if self.start_date.is_some_and(|start| entry.created_at < start) {
            return false;
        }
        if self.end_date.is_some_and(|end| entry.created_at > end) {
            return false;
        }
        true
    }
}

/// Bounded in-memory store of [`NotificationLog`] entries.
///
/// Appends from concurrent channel dispatches are serialized through a
/// single mutex so the eviction-at-capacity invariant holds exactly
/// once per append.
pub struct NotificationLogStore {
    entries: Mutex<VecDeque<NotificationLog>>,
    capacity: usize,
}

impl Default for NotificationLogStore {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

impl NotificationLogStore {
    /// Create a store retaining at most `capacity` entries
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Maximum retained entry count
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append an entry, evicting the oldest entry first if the store
    /// is at capacity.
    pub async fn append(&self, entry: NotificationLog) {
        let mut entries = self.entries.lock().await;

        if entries.len() >= self.capacity {
            if let Some(evicted) = entries.pop_front() {
                tracing::debug!(
                    evicted_id = %evicted.id,
                    retained = entries.len(),
                    "Evicted oldest log entry at capacity"
                );
            }
        }

        entries.push_back(entry);
    }

    /// Query retained entries, newest first.
    ///
    /// Filtering happens before ordering; the limit is applied last.
    /// The store is never mutated by a query.
    pub async fn query(&self, query: &LogQuery) -> Vec<NotificationLog> {
        let entries = self.entries.lock().await;

        let mut matched: Vec<NotificationLog> = entries
            .iter()
            .rev()
            .filter(|entry| query.matches(entry))
            .cloned()
            .collect();

        // Entries arrive in append order; the reverse scan already
        // yields newest-first for equal timestamps.
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        if let Some(limit) = query.limit {
            matched.truncate(limit);
        }

        matched
    }

    /// Number of retained entries
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Whether the store holds no entries
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future;
use serde::Serialize;

use crate::audit::{NotificationLog, NotificationLogStore};
use crate::config::Settings;
use crate::error::{self, DispatchError};
use crate::providers::{build_providers, ChannelProvider};
use crate::redact;
use crate::template::{merge_variables, RenderedContent, TemplateRegistry};

use super::types::{Channel, NotificationRequest, NotificationResult};

/// Counters for dispatcher activity
#[derive(Debug, Default)]
pub struct DispatcherStats {
    /// Total requests accepted
    pub total_requests: AtomicU64,
    /// Total per-channel attempts
    pub total_attempts: AtomicU64,
    /// Attempts that succeeded
    pub total_delivered: AtomicU64,
    /// Attempts that failed
    pub total_failed: AtomicU64,
}

impl DispatcherStats {
    pub fn snapshot(&self) -> DispatcherStatsSnapshot {
        DispatcherStatsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            total_attempts: self.total_attempts.load(Ordering::Relaxed),
            total_delivered: self.total_delivered.load(Ordering::Relaxed),
            total_failed: self.total_failed.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of dispatcher statistics
#[derive(Debug, Clone, Serialize)]
pub struct DispatcherStatsSnapshot {
    pub total_requests: u64,
    pub total_attempts: u64,
    pub total_delivered: u64,
    pub total_failed: u64,
}

/// Orchestrates the per-channel fan-out of notification requests.
///
/// Each requested channel is processed independently and concurrently;
/// one channel's failure never blocks or rolls back another. Every
/// attempt, success or failure, appends exactly one redacted entry to
/// the audit log.
pub struct Dispatcher {
    providers: HashMap<Channel, Arc<dyn ChannelProvider>>,
    templates: Arc<TemplateRegistry>,
    log_store: Arc<NotificationLogStore>,
    stats: DispatcherStats,
}

impl Dispatcher {
    /// Create a dispatcher from explicit parts
    pub fn new(
        providers: HashMap<Channel, Arc<dyn ChannelProvider>>,
        templates: Arc<TemplateRegistry>,
        log_store: Arc<NotificationLogStore>,
    ) -> Self {
        Self {
            providers,
            templates,
            log_store,
            stats: DispatcherStats::default(),
        }
    }

    /// Wire the default registry, the provider factory, and a log store
    /// sized from settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            build_providers(settings),
            Arc::new(TemplateRegistry::with_defaults()),
            Arc::new(NotificationLogStore::new(settings.log.capacity)),
        )
    }

    /// The audit log store owned by this dispatcher
    pub fn log_store(&self) -> &Arc<NotificationLogStore> {
        &self.log_store
    }

    /// The template registry used for email/SMS rendering
    pub fn templates(&self) -> &Arc<TemplateRegistry> {
        &self.templates
    }

    /// Get dispatcher statistics
    pub fn stats(&self) -> DispatcherStatsSnapshot {
        self.stats.snapshot()
    }

    /// Dispatch a request over every requested channel.
    ///
    /// Returns one result per requested channel, in the requested
    /// order, regardless of completion order. Never returns an error:
    /// every failure mode is captured in the corresponding result.
    #[tracing::instrument(
        name = "dispatcher.send",
        skip(self, request),
        fields(event = %request.event, channel_count = request.channels.len())
    )]
    pub async fn send(&self, request: NotificationRequest) -> Vec<NotificationResult> {
        self.stats.total_requests.fetch_add(1, Ordering::Relaxed);

        // Ordered join: attempts run concurrently but results line up
        // with the requested channel list.
        let attempts = request
            .channels
            .iter()
            .map(|&channel| self.dispatch_channel(channel, &request));
        let results = future::join_all(attempts).await;

        let delivered = results.iter().filter(|r| r.success).count();
        tracing::debug!(
            event = %request.event,
            delivered = delivered,
            failed = results.len() - delivered,
            "Dispatched notification request"
        );

        results
    }

    async fn dispatch_channel(
        &self,
        channel: Channel,
        request: &NotificationRequest,
    ) -> NotificationResult {
        self.stats.total_attempts.fetch_add(1, Ordering::Relaxed);

        let result = match self.attempt(channel, request).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(
                    channel = %channel,
                    event = %request.event,
                    error = %e,
                    "Channel dispatch failed before delivery"
                );
                NotificationResult::from_error(channel, &e)
            }
        };

        if result.success {
            self.stats.total_delivered.fetch_add(1, Ordering::Relaxed);
        } else {
            self.stats.total_failed.fetch_add(1, Ordering::Relaxed);
        }

        let entry = NotificationLog::from_result(
            request.event,
            redact::redact(&request.recipient),
            &result,
        );
        self.log_store.append(entry).await;

        result
    }

    async fn attempt(
        &self,
        channel: Channel,
        request: &NotificationRequest,
    ) -> error::Result<NotificationResult> {
        let provider = self
            .providers
            .get(&channel)
            .ok_or(DispatchError::NoProvider(channel))?;

        let content = self.render(channel, request)?;

        Ok(provider
            .send(&request.recipient, &content, &request.metadata)
            .await)
    }

    /// Email and SMS go through the template registry; push and in-app
    /// use the caller-supplied title/message verbatim.
    fn render(
        &self,
        channel: Channel,
        request: &NotificationRequest,
    ) -> error::Result<RenderedContent> {
        match channel {
            Channel::Email | Channel::Sms => {
                let variables = merge_variables(&request.template.variables, &request.metadata);
                Ok(self.templates.resolve(request.event, channel, &variables)?)
            }
            Channel::Push => Ok(RenderedContent::Push {
                title: request.template.title.clone(),
                body: request.template.message.clone(),
            }),
            Channel::InApp => Ok(RenderedContent::InApp {
                title: request.template.title.clone(),
                body: request.template.message.clone(),
            }),
        }
    }
}

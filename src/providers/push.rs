use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::config::PushSettings;
use crate::error::DispatchError;
use crate::notification::{Channel, NotificationResult, Recipient};
use crate::template::RenderedContent;

use super::{local_message_id, ChannelProvider, DeploymentMode};

/// Push delivery through an HTTP messaging endpoint (FCM-shaped).
pub struct PushProvider {
    enabled: bool,
    mode: DeploymentMode,
    endpoint: String,
    server_key: String,
    client: reqwest::Client,
}

impl PushProvider {
    /// Provider that never touches the messaging endpoint
    pub fn simulated(enabled: bool) -> Self {
        Self {
            enabled,
            mode: DeploymentMode::Simulated,
            endpoint: String::new(),
            server_key: String::new(),
            client: reqwest::Client::new(),
        }
    }

    /// Provider backed by a real push messaging endpoint
    pub fn live(enabled: bool, settings: &PushSettings) -> Result<Self> {
        let endpoint = settings
            .endpoint
            .clone()
            .context("Push messaging endpoint not configured")?;

        Ok(Self {
            enabled,
            mode: DeploymentMode::Live,
            endpoint,
            server_key: settings.server_key.clone().unwrap_or_default(),
            client: reqwest::Client::new(),
        })
    }

    async fn deliver(
        &self,
        token: &str,
        title: &str,
        body: &str,
        data: &HashMap<String, String>,
    ) -> Result<String> {
        let payload = serde_json::json!({
            "to": token,
            "notification": {
                "title": title,
                "body": body,
            },
            "data": data,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.server_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("Push endpoint returned HTTP {}", response.status());
        }

        Ok(local_message_id(Channel::Push))
    }
}

#[async_trait]
impl ChannelProvider for PushProvider {
    async fn send(
        &self,
        recipient: &Recipient,
        content: &RenderedContent,
        metadata: &HashMap<String, String>,
    ) -> NotificationResult {
        if !self.enabled {
            return NotificationResult::from_error(
                Channel::Push,
                &DispatchError::ChannelDisabled(Channel::Push),
            );
        }

        let Some(token) = recipient.push_token.as_deref() else {
            return NotificationResult::from_error(
                Channel::Push,
                &DispatchError::PushTokenMissing,
            );
        };

        let RenderedContent::Push { title, body } = content else {
            return NotificationResult::from_error(
                Channel::Push,
                &DispatchError::ContentMismatch(Channel::Push),
            );
        };

        match self.mode {
            DeploymentMode::Simulated => {
                let message_id = local_message_id(Channel::Push);
                tracing::debug!(
                    title = %title,
                    message_id = %message_id,
                    "Simulated push delivery"
                );
                NotificationResult::delivered(Channel::Push, message_id)
            }
            DeploymentMode::Live => match self.deliver(token, title, body, metadata).await {
                Ok(message_id) => {
                    tracing::debug!(message_id = %message_id, "Push handed to messaging endpoint");
                    NotificationResult::delivered(Channel::Push, message_id)
                }
                Err(e) => {
                    tracing::error!(error = %e, "Push delivery failed");
                    NotificationResult::failed(Channel::Push, e.to_string())
                }
            },
        }
    }

    fn channel(&self) -> Channel {
        Channel::Push
    }
}

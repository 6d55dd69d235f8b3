use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::config::SmsSettings;
use crate::error::DispatchError;
use crate::notification::{Channel, NotificationResult, Recipient};
use crate::redact::mask_str;
use crate::template::RenderedContent;

use super::{local_message_id, ChannelProvider, DeploymentMode};

/// Maximum SMS body length in characters
pub const SMS_MAX_LENGTH: usize = 160;

/// SMS delivery through an HTTP gateway.
pub struct SmsProvider {
    enabled: bool,
    mode: DeploymentMode,
    gateway_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl SmsProvider {
    /// Provider that never touches the gateway
    pub fn simulated(enabled: bool) -> Self {
        Self {
            enabled,
            mode: DeploymentMode::Simulated,
            gateway_url: String::new(),
            api_key: String::new(),
            client: reqwest::Client::new(),
        }
    }

    /// Provider backed by a real SMS gateway
    pub fn live(enabled: bool, settings: &SmsSettings) -> Result<Self> {
        let gateway_url = settings
            .gateway_url
            .clone()
            .context("SMS gateway URL not configured")?;

        Ok(Self {
            enabled,
            mode: DeploymentMode::Live,
            gateway_url,
            api_key: settings.api_key.clone().unwrap_or_default(),
            client: reqwest::Client::new(),
        })
    }

    async fn deliver(&self, to: &str, message: &str) -> Result<String> {
        let payload = serde_json::json!({
            "to": to,
            "message": message,
        });

        let response = self
            .client
            .post(&self.gateway_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("SMS gateway returned HTTP {}", response.status());
        }

        Ok(local_message_id(Channel::Sms))
    }
}

#[async_trait]
impl ChannelProvider for SmsProvider {
    async fn send(
        &self,
        recipient: &Recipient,
        content: &RenderedContent,
        _metadata: &HashMap<String, String>,
    ) -> NotificationResult {
        if !self.enabled {
            return NotificationResult::from_error(
                Channel::Sms,
                &DispatchError::ChannelDisabled(Channel::Sms),
            );
        }

        let Some(phone) = recipient.phone.as_deref() else {
            return NotificationResult::from_error(
                Channel::Sms,
                &DispatchError::PhoneNumberMissing,
            );
        };

        let RenderedContent::Sms { text } = content else {
            return NotificationResult::from_error(
                Channel::Sms,
                &DispatchError::ContentMismatch(Channel::Sms),
            );
        };

        if text.chars().count() > SMS_MAX_LENGTH {
            return NotificationResult::from_error(Channel::Sms, &DispatchError::SmsTooLong);
        }

        match self.mode {
            DeploymentMode::Simulated => {
                let message_id = local_message_id(Channel::Sms);
                tracing::debug!(
                    to = %mask_str(phone),
                    message_id = %message_id,
                    "Simulated SMS delivery"
                );
                NotificationResult::delivered(Channel::Sms, message_id)
            }
            DeploymentMode::Live => match self.deliver(phone, text).await {
                Ok(message_id) => {
                    tracing::debug!(
                        to = %mask_str(phone),
                        message_id = %message_id,
                        "SMS handed to gateway"
                    );
                    NotificationResult::delivered(Channel::Sms, message_id)
                }
                Err(e) => {
                    tracing::error!(to = %mask_str(phone), error = %e, "SMS delivery failed");
                    NotificationResult::failed(Channel::Sms, e.to_string())
                }
            },
        }
    }

    fn channel(&self) -> Channel {
        Channel::Sms
    }
}

use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::EmailSettings;
use crate::error::DispatchError;
use crate::notification::{Channel, NotificationResult, Recipient};
use crate::redact::mask_str;
use crate::template::RenderedContent;

use super::{local_message_id, ChannelProvider, DeploymentMode};

/// Email delivery over SMTP.
pub struct EmailProvider {
    enabled: bool,
    mode: DeploymentMode,
    from: String,
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl EmailProvider {
    /// Provider that never touches a transport
    pub fn simulated(enabled: bool) -> Self {
        Self {
            enabled,
            mode: DeploymentMode::Simulated,
            from: String::new(),
            transport: None,
        }
    }

    /// Provider backed by a real SMTP relay
    pub fn live(enabled: bool, settings: &EmailSettings) -> Result<Self> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.smtp_host)?
            .port(settings.smtp_port);

        if let (Some(user), Some(pass)) = (&settings.username, &settings.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            enabled,
            mode: DeploymentMode::Live,
            from: settings.from.clone(),
            transport: Some(builder.build()),
        })
    }

    async fn deliver(
        &self,
        to: &str,
        subject: &str,
        text: &str,
        html: Option<&str>,
    ) -> Result<String> {
        let transport = self
            .transport
            .as_ref()
            .context("SMTP transport not configured")?;

        let builder = Message::builder()
            .from(self.from.parse::<Mailbox>()?)
            .to(to.parse::<Mailbox>()?)
            .subject(subject);

        let message = match html {
            Some(html) => builder.multipart(MultiPart::alternative_plain_html(
                text.to_string(),
                html.to_string(),
            ))?,
            None => builder
                .header(ContentType::TEXT_PLAIN)
                .body(text.to_string())?,
        };

        transport.send(message).await?;
        Ok(local_message_id(Channel::Email))
    }
}

#[async_trait]
impl ChannelProvider for EmailProvider {
    async fn send(
        &self,
        recipient: &Recipient,
        content: &RenderedContent,
        _metadata: &HashMap<String, String>,
    ) -> NotificationResult {
        if !self.enabled {
            return NotificationResult::from_error(
                Channel::Email,
                &DispatchError::ChannelDisabled(Channel::Email),
            );
        }

        let Some(address) = recipient.email.as_deref() else {
            return NotificationResult::from_error(
                Channel::Email,
                &DispatchError::EmailAddressMissing,
            );
        };

        let RenderedContent::Email { subject, text, html } = content else {
            return NotificationResult::from_error(
                Channel::Email,
                &DispatchError::ContentMismatch(Channel::Email),
            );
        };

        match self.mode {
            DeploymentMode::Simulated => {
                let message_id = local_message_id(Channel::Email);
                tracing::debug!(
                    to = %mask_str(address),
                    message_id = %message_id,
                    "Simulated email delivery"
                );
                NotificationResult::delivered(Channel::Email, message_id)
            }
            DeploymentMode::Live => {
                match self.deliver(address, subject, text, html.as_deref()).await {
                    Ok(message_id) => {
                        tracing::debug!(
                            to = %mask_str(address),
                            message_id = %message_id,
                            "Email handed to SMTP transport"
                        );
                        NotificationResult::delivered(Channel::Email, message_id)
                    }
                    Err(e) => {
                        tracing::error!(
                            to = %mask_str(address),
                            error = %e,
                            "Email delivery failed"
                        );
                        NotificationResult::failed(Channel::Email, e.to_string())
                    }
                }
            }
        }
    }

    fn channel(&self) -> Channel {
        Channel::Email
    }
}

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Domain occurrence that triggers a notification.
///
/// Used as the key into the template registry and as an audit log
/// filter field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationEvent {
    OtpSent,
    AccountCreated,
    PartnerApproved,
    PaymentFailed,
}

impl NotificationEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationEvent::OtpSent => "otp_sent",
            NotificationEvent::AccountCreated => "account_created",
            NotificationEvent::PartnerApproved => "partner_approved",
            NotificationEvent::PaymentFailed => "payment_failed",
        }
    }
}

impl std::fmt::Display for NotificationEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery mechanism for a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Email,
    Sms,
    Push,
    InApp,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Sms => "sms",
            Channel::Push => "push",
            Channel::InApp => "in_app",
        }
    }

    /// Human-readable channel name used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Channel::Email => "Email",
            Channel::Sms => "SMS",
            Channel::Push => "Push",
            Channel::InApp => "In-app",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Addressing information for a notification.
///
/// Only the fields relevant to the requested channels need to be
/// present; a missing required field fails that channel alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Recipient {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Caller-supplied template data.
///
/// `title`/`message` are used verbatim for push and in-app delivery;
/// `variables` feed placeholder substitution for the registry-rendered
/// channels (email, SMS).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateData {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_template: Option<String>,
    #[serde(default)]
    pub variables: HashMap<String, String>,
}

/// A request to deliver one event over one or more channels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRequest {
    /// The triggering event
    pub event: NotificationEvent,
    /// Channels to fan out over, processed independently
    pub channels: Vec<Channel>,
    /// Addressing information
    pub recipient: Recipient,
    /// Template data and substitution variables
    #[serde(default)]
    pub template: TemplateData,
    /// Request metadata; wins over template variables on key collision
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl NotificationRequest {
    /// Create a builder for a notification request
    pub fn builder(event: NotificationEvent) -> NotificationRequestBuilder {
        NotificationRequestBuilder::new(event)
    }
}

/// Builder for [`NotificationRequest`]
#[derive(Debug, Clone)]
pub struct NotificationRequestBuilder {
    event: NotificationEvent,
    channels: Vec<Channel>,
    recipient: Recipient,
    template: TemplateData,
    metadata: HashMap<String, String>,
}

impl NotificationRequestBuilder {
    pub fn new(event: NotificationEvent) -> Self {
        Self {
            event,
            channels: Vec::new(),
            recipient: Recipient::default(),
            template: TemplateData::default(),
            metadata: HashMap::new(),
        }
    }

    /// Add a channel to the fan-out
    pub fn channel(mut self, channel: Channel) -> Self {
        self.channels.push(channel);
        self
    }

    /// Replace the channel list
    pub fn channels(mut self, channels: Vec<Channel>) -> Self {
        self.channels = channels;
        self
    }

    /// Set the recipient
    pub fn recipient(mut self, recipient: Recipient) -> Self {
        self.recipient = recipient;
        self
    }

    /// Set the template data
    pub fn template(mut self, template: TemplateData) -> Self {
        self.template = template;
        self
    }

    /// Add a substitution variable
    pub fn variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.template.variables.insert(key.into(), value.into());
        self
    }

    /// Add a metadata entry
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Build the notification request
    pub fn build(self) -> NotificationRequest {
        NotificationRequest {
            event: self.event,
            channels: self.channels,
            recipient: self.recipient,
            template: self.template,
            metadata: self.metadata,
        }
    }
}

/// Outcome of one (request, channel) delivery attempt.
///
/// Exactly one of `message_id`/`error` is meaningful, gated by
/// `success`; the constructors enforce this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationResult {
    pub success: bool,
    pub channel: Channel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl NotificationResult {
    /// Successful delivery with a provider-assigned message identifier
    pub fn delivered(channel: Channel, message_id: impl Into<String>) -> Self {
        Self {
            success: true,
            channel,
            message_id: Some(message_id.into()),
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Failed delivery with a human-readable reason
    pub fn failed(channel: Channel, error: impl Into<String>) -> Self {
        Self {
            success: false,
            channel,
            message_id: None,
            error: Some(error.into()),
            timestamp: Utc::now(),
        }
    }

    /// Failed delivery carrying a dispatch error's message
    pub fn from_error(channel: Channel, error: &crate::error::DispatchError) -> Self {
        Self::failed(channel, error.to_string())
    }
}

//! Template types and error definitions

use thiserror::Error;

use crate::notification::{Channel, NotificationEvent};

/// Template-specific error type
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("No template registered for event {event} on channel {channel}")]
    NoTemplate {
        event: NotificationEvent,
        channel: Channel,
    },
}

/// Result type for template operations
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Channel-appropriate content produced by the template registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedContent {
    /// Subject plus text body, with an optional HTML alternative
    Email {
        subject: String,
        text: String,
        html: Option<String>,
    },
    /// A short plain-text string
    Sms { text: String },
    /// Title and body for a push payload
    Push { title: String, body: String },
    /// Title and body stored for the in-app inbox
    InApp { title: String, body: String },
}

impl RenderedContent {
    /// The channel this content was rendered for
    pub fn channel(&self) -> Channel {
        match self {
            RenderedContent::Email { .. } => Channel::Email,
            RenderedContent::Sms { .. } => Channel::Sms,
            RenderedContent::Push { .. } => Channel::Push,
            RenderedContent::InApp { .. } => Channel::InApp,
        }
    }
}

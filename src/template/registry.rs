//! Template registry keyed by (event, channel)

use std::collections::HashMap;

use dashmap::DashMap;

use crate::notification::{Channel, NotificationEvent};

use super::substitution::substitute;
use super::types::{RenderedContent, TemplateError, TemplateResult};

/// A registered template for one (event, channel) pair.
///
/// `defaults` holds per-field fallback values applied before the
/// caller's variables; the caller always wins on collision.
#[derive(Debug, Clone, Default)]
pub struct MessageTemplate {
    /// Email subject line (email only)
    pub subject: Option<String>,
    /// Push/in-app title
    pub title: Option<String>,
    /// Text body, shared by every channel
    pub body: String,
    /// HTML alternative (email only)
    pub html: Option<String>,
    /// Per-field default variables
    pub defaults: HashMap<String, String>,
}

impl MessageTemplate {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ..Default::default()
        }
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    pub fn default_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.defaults.insert(key.into(), value.into());
        self
    }
}

/// In-memory registry of message templates.
///
/// Every recognized (event, channel) pair must be registered; resolving
/// an unregistered pair is a clean `NoTemplate` failure, not a crash.
pub struct TemplateRegistry {
    templates: DashMap<(NotificationEvent, Channel), MessageTemplate>,
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            templates: DashMap::new(),
        }
    }

    /// Create a registry pre-populated with the built-in templates.
    ///
    /// Email and SMS are registered for every event; push and in-app
    /// content comes straight from the request payload and bypasses the
    /// registry.
    pub fn with_defaults() -> Self {
        let registry = Self::new();

        registry.register(
            NotificationEvent::OtpSent,
            Channel::Sms,
            MessageTemplate::new(
                "Your verification code is {{otp}}. It expires in {{expiry_minutes}} minutes.",
            )
            .default_var("expiry_minutes", "10"),
        );
        registry.register(
            NotificationEvent::OtpSent,
            Channel::Email,
            MessageTemplate::new(
                "Hello {{recipient_name}},\n\nYour one-time verification code is {{otp}}. \
                 It expires in {{expiry_minutes}} minutes.\n\nIf you did not request this \
                 code, please ignore this email.",
            )
            .subject("Your verification code")
            .html(
                "<p>Hello {{recipient_name}},</p><p>Your one-time verification code is \
                 <strong>{{otp}}</strong>. It expires in {{expiry_minutes}} minutes.</p>",
            )
            .default_var("expiry_minutes", "10"),
        );

        registry.register(
            NotificationEvent::AccountCreated,
            Channel::Sms,
            MessageTemplate::new("Your account has been created. Sign in to get started."),
        );
        registry.register(
            NotificationEvent::AccountCreated,
            Channel::Email,
            MessageTemplate::new(
                "Hello {{recipient_name}},\n\nYour account has been created. \
                 You can now sign in and complete your profile.",
            )
            .subject("Your account is ready"),
        );

        registry.register(
            NotificationEvent::PartnerApproved,
            Channel::Sms,
            MessageTemplate::new(
                "Good news {{partner_name}}: your partner application has been approved.",
            ),
        );
        registry.register(
            NotificationEvent::PartnerApproved,
            Channel::Email,
            MessageTemplate::new(
                "Hello {{partner_name}},\n\nYour partner application has been approved. \
                 You now have access to the partner dashboard.",
            )
            .subject("Your partner application has been approved"),
        );

        registry.register(
            NotificationEvent::PaymentFailed,
            Channel::Sms,
            MessageTemplate::new(
                "Payment of {{amount}} for order {{order_id}} failed. \
                 Please update your payment method.",
            ),
        );
        registry.register(
            NotificationEvent::PaymentFailed,
            Channel::Email,
            MessageTemplate::new(
                "Hello {{recipient_name}},\n\nYour payment of {{amount}} for order \
                 {{order_id}} could not be processed. Please update your payment method \
                 and try again.",
            )
            .subject("Payment failed for order {{order_id}}"),
        );

        registry
    }

    /// Register (or replace) a template for an (event, channel) pair
    pub fn register(
        &self,
        event: NotificationEvent,
        channel: Channel,
        template: MessageTemplate,
    ) {
        self.templates.insert((event, channel), template);
    }

    /// Check whether a pair is registered
    pub fn contains(&self, event: NotificationEvent, channel: Channel) -> bool {
        self.templates.contains_key(&(event, channel))
    }

    /// Number of registered templates
    pub fn count(&self) -> usize {
        self.templates.len()
    }

    /// Resolve the template for `(event, channel)` and render it with
    /// the given variable bag.
    ///
    /// Template defaults are applied first, then the caller's variables;
    /// any placeholder still unresolved renders as an empty string.
    pub fn resolve(
        &self,
        event: NotificationEvent,
        channel: Channel,
        variables: &HashMap<String, String>,
    ) -> TemplateResult<RenderedContent> {
        let template = self
            .templates
            .get(&(event, channel))
            .map(|t| t.clone())
            .ok_or(TemplateError::NoTemplate { event, channel })?;

        let mut effective = template.defaults.clone();
        for (key, value) in variables {
            effective.insert(key.clone(), value.clone());
        }

        let body = substitute(&template.body, &effective);
        let title = substitute(template.title.as_deref().unwrap_or_default(), &effective);

        let content = match channel {
            Channel::Email => RenderedContent::Email {
                subject: substitute(template.subject.as_deref().unwrap_or_default(), &effective),
                text: body,
                html: template.html.as_deref().map(|h| substitute(h, &effective)),
            },
            Channel::Sms => RenderedContent::Sms { text: body },
            Channel::Push => RenderedContent::Push { title, body },
            Channel::InApp => RenderedContent::InApp { title, body },
        };

        Ok(content)
    }
}

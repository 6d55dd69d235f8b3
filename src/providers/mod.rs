//! Channel providers: one independently swappable implementation per
//! delivery mechanism.
//!
//! Every provider validates its own preconditions (channel enabled,
//! required recipient field, content constraints) before touching any
//! transport, and performs exactly one delivery attempt; retry policy
//! belongs to the caller.

mod email;
mod factory;
mod in_app;
mod push;
mod sms;

pub use email::EmailProvider;
pub use factory::build_providers;
pub use in_app::InAppProvider;
pub use push::PushProvider;
pub use sms::{SmsProvider, SMS_MAX_LENGTH};

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

use crate::notification::{Channel, NotificationResult, Recipient};
use crate::template::RenderedContent;

/// How providers perform transmission, decided once at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    /// No external calls; deliveries succeed with locally generated ids
    #[default]
    Simulated,
    /// Real transports (SMTP, HTTP gateways)
    Live,
}

/// A delivery channel implementation.
///
/// The contract is exactly one attempt in, exactly one result out:
/// providers never retry internally and never panic on bad input.
#[async_trait]
pub trait ChannelProvider: Send + Sync {
    /// Attempt delivery of rendered content to a recipient.
    async fn send(
        &self,
        recipient: &Recipient,
        content: &RenderedContent,
        metadata: &HashMap<String, String>,
    ) -> NotificationResult;

    /// The channel this provider serves
    fn channel(&self) -> Channel;
}

/// Locally generated message identifier, e.g. `sms-1f7b...`.
pub(crate) fn local_message_id(channel: Channel) -> String {
    format!("{}-{}", channel, Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_message_id_prefix() {
        assert!(local_message_id(Channel::Sms).starts_with("sms-"));
        assert!(local_message_id(Channel::InApp).starts_with("in_app-"));
    }

    #[test]
    fn test_deployment_mode_deserialize() {
        let mode: DeploymentMode = serde_json::from_str("\"live\"").unwrap();
        assert_eq!(mode, DeploymentMode::Live);
        assert_eq!(DeploymentMode::default(), DeploymentMode::Simulated);
    }
}

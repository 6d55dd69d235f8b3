use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::DispatchError;
use crate::notification::{Channel, NotificationResult, Recipient};
use crate::template::RenderedContent;

use super::{local_message_id, ChannelProvider};

/// In-app delivery.
///
/// Degenerate provider: it never calls an external system and always
/// succeeds immediately. Retrieval of the stored notification is the
/// in-app inbox's concern, not ours.
pub struct InAppProvider {
    enabled: bool,
}

impl InAppProvider {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

#[async_trait]
impl ChannelProvider for InAppProvider {
    async fn send(
        &self,
        recipient: &Recipient,
        content: &RenderedContent,
        _metadata: &HashMap<String, String>,
    ) -> NotificationResult {
        if !self.enabled {
            return NotificationResult::from_error(
                Channel::InApp,
                &DispatchError::ChannelDisabled(Channel::InApp),
            );
        }

        let RenderedContent::InApp { title, .. } = content else {
            return NotificationResult::from_error(
                Channel::InApp,
                &DispatchError::ContentMismatch(Channel::InApp),
            );
        };

        let message_id = local_message_id(Channel::InApp);
        tracing::debug!(
            user_id = ?recipient.user_id,
            title = %title,
            message_id = %message_id,
            "Stored in-app notification"
        );
        NotificationResult::delivered(Channel::InApp, message_id)
    }

    fn channel(&self) -> Channel {
        Channel::InApp
    }
}

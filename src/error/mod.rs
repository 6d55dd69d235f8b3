use thiserror::Error;

use crate::notification::Channel;
use crate::template::TemplateError;

/// Channel-local failure during dispatch.
///
/// Every variant is converted into a failed `NotificationResult` before
/// it reaches the caller; nothing here propagates out of the dispatcher.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("{} channel is disabled", .0.label())]
    ChannelDisabled(Channel),

    #[error("Email address required for email notification")]
    EmailAddressMissing,

    #[error("Phone number required for SMS notification")]
    PhoneNumberMissing,

    #[error("Push token required for push notification")]
    PushTokenMissing,

    #[error("Message exceeds SMS length limit (160 characters)")]
    SmsTooLong,

    #[error("No provider registered for channel {0}")]
    NoProvider(Channel),

    #[error("Rendered content does not match channel {0}")]
    ContentMismatch(Channel),

    #[error(transparent)]
    Template(#[from] TemplateError),
}

pub type Result<T> = std::result::Result<T, DispatchError>;

//! PII masking for audit log entries.
//!
//! Only recognized PII shapes are redacted: email-shaped values keep
//! up to two characters of the local part, all-digit values keep the
//! last four digits. Anything else passes through unchanged.

use serde::{Deserialize, Serialize};

use crate::notification::Recipient;

/// Mask a single value, passing `None` through untouched.
pub fn mask(value: Option<&str>) -> Option<String> {
    value.map(mask_str)
}

/// Mask a single value. Total and pure.
pub fn mask_str(value: &str) -> String {
    if let Some((local, domain)) = value.split_once('@') {
        let prefix: String = local.chars().take(2).collect();
        return format!("{}***@{}", prefix, domain);
    }

    if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
        let start = value.len().saturating_sub(4);
        return format!("***{}", &value[start..]);
    }

    value.to_string()
}

/// Display-safe projection of a [`Recipient`] for logging.
///
/// `user_id` and `role` pass through; `email` and `phone` are masked.
/// The push token is a credential and is dropped entirely.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RedactedRecipient {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Derive the display-safe copy of a recipient.
pub fn redact(recipient: &Recipient) -> RedactedRecipient {
    RedactedRecipient {
        user_id: recipient.user_id.clone(),
        role: recipient.role.clone(),
        email: mask(recipient.email.as_deref()),
        phone: mask(recipient.phone.as_deref()),
    }
}

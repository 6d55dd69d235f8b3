//! Notification request/result types and the dispatcher.

mod dispatcher;
mod types;

pub use dispatcher::{Dispatcher, DispatcherStats, DispatcherStatsSnapshot};
pub use types::{
    Channel, NotificationEvent, NotificationRequest, NotificationRequestBuilder,
    NotificationResult, Recipient, TemplateData,
};

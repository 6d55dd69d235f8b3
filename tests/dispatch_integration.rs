//! Cross-component integration tests
//!
//! These tests drive the dispatcher end to end with simulated
//! providers: template resolution, per-channel fan-out, redacted audit
//! logging, and log store queries.

use std::collections::HashMap;
use std::sync::Arc;

use notify_dispatch::audit::{LogQuery, LogStatus, NotificationLogStore};
use notify_dispatch::config::Settings;
use notify_dispatch::notification::{
    Channel, Dispatcher, NotificationEvent, NotificationRequest, Recipient, TemplateData,
};
use notify_dispatch::providers::build_providers;
use notify_dispatch::template::TemplateRegistry;

fn simulated_dispatcher() -> Dispatcher {
    Dispatcher::from_settings(&Settings::default())
}

fn dispatcher_with_log_capacity(capacity: usize) -> Dispatcher {
    let settings = Settings::default();
    Dispatcher::new(
        build_providers(&settings),
        Arc::new(TemplateRegistry::with_defaults()),
        Arc::new(NotificationLogStore::new(capacity)),
    )
}

// =============================================================================
// Fan-out behavior
// =============================================================================

#[tokio::test]
async fn otp_over_sms_and_email_with_phone_only() {
    let dispatcher = simulated_dispatcher();

    let request = NotificationRequest::builder(NotificationEvent::OtpSent)
        .channels(vec![Channel::Sms, Channel::Email])
        .recipient(Recipient {
            phone: Some("9123456780".to_string()),
            ..Default::default()
        })
        .variable("otp", "4821")
        .variable("expiry_minutes", "10")
        .build();

    let results = dispatcher.send(request).await;
    assert_eq!(results.len(), 2);

    // SMS: phone present, rendered body fits the limit
    assert_eq!(results[0].channel, Channel::Sms);
    assert!(results[0].success);
    assert!(results[0].message_id.is_some());

    // Email: no address supplied, channel-local validation failure
    assert_eq!(results[1].channel, Channel::Email);
    assert!(!results[1].success);
    assert_eq!(
        results[1].error.as_deref(),
        Some("Email address required for email notification")
    );

    // Two log entries, SMS recipient phone masked
    let logs = dispatcher.log_store().query(&LogQuery::default()).await;
    assert_eq!(logs.len(), 2);
    let sms_log = logs
        .iter()
        .find(|l| l.channel == Channel::Sms)
        .expect("sms log entry");
    assert_eq!(sms_log.recipient.phone.as_deref(), Some("***6780"));
    assert_eq!(sms_log.status, LogStatus::Sent);
}

#[tokio::test]
async fn results_preserve_requested_channel_order() {
    let dispatcher = simulated_dispatcher();

    let request = NotificationRequest::builder(NotificationEvent::AccountCreated)
        .channels(vec![
            Channel::InApp,
            Channel::Push,
            Channel::Email,
            Channel::Sms,
        ])
        .recipient(Recipient {
            user_id: Some("user-9".to_string()),
            email: Some("dora@example.com".to_string()),
            phone: Some("5550001234".to_string()),
            push_token: Some("device-token".to_string()),
            role: None,
        })
        .template(TemplateData {
            title: "Welcome".to_string(),
            message: "Your account is ready".to_string(),
            ..Default::default()
        })
        .build();

    let results = dispatcher.send(request).await;
    assert_eq!(
        results.iter().map(|r| r.channel).collect::<Vec<_>>(),
        vec![Channel::InApp, Channel::Push, Channel::Email, Channel::Sms]
    );
    assert!(results.iter().all(|r| r.success));
}

#[tokio::test]
async fn sms_over_limit_fails_and_never_logs_a_message_id() {
    let dispatcher = simulated_dispatcher();

    // Force an over-limit rendering through a custom template
    dispatcher.templates().register(
        NotificationEvent::PaymentFailed,
        Channel::Sms,
        notify_dispatch::template::MessageTemplate::new("{{filler}}"),
    );

    let request = NotificationRequest::builder(NotificationEvent::PaymentFailed)
        .channel(Channel::Sms)
        .recipient(Recipient {
            phone: Some("9123456780".to_string()),
            ..Default::default()
        })
        .variable("filler", "y".repeat(200))
        .build();

    let results = dispatcher.send(request).await;
    assert!(!results[0].success);
    assert_eq!(
        results[0].error.as_deref(),
        Some("Message exceeds SMS length limit (160 characters)")
    );

    let logs = dispatcher.log_store().query(&LogQuery::default()).await;
    assert_eq!(logs.len(), 1);
    assert!(logs[0].result.message_id.is_none());
    assert_eq!(logs[0].status, LogStatus::Failed);
}

#[tokio::test]
async fn disabled_channel_fails_without_blocking_siblings() {
    let mut settings = Settings::default();
    settings.channels.sms = false;

    let dispatcher = Dispatcher::from_settings(&settings);
    let request = NotificationRequest::builder(NotificationEvent::OtpSent)
        .channels(vec![Channel::Sms, Channel::InApp])
        .recipient(Recipient {
            phone: Some("9123456780".to_string()),
            ..Default::default()
        })
        .variable("otp", "4821")
        .build();

    let results = dispatcher.send(request).await;
    assert!(!results[0].success);
    assert_eq!(results[0].error.as_deref(), Some("SMS channel is disabled"));
    assert!(results[1].success);
}

#[tokio::test]
async fn push_uses_caller_supplied_title_and_message() {
    let dispatcher = simulated_dispatcher();

    // No push template is registered; push must still succeed because
    // content comes straight from the payload.
    let request = NotificationRequest::builder(NotificationEvent::PaymentFailed)
        .channel(Channel::Push)
        .recipient(Recipient {
            push_token: Some("device-token".to_string()),
            ..Default::default()
        })
        .template(TemplateData {
            title: "Payment failed".to_string(),
            message: "Please update your payment method".to_string(),
            ..Default::default()
        })
        .build();

    let results = dispatcher.send(request).await;
    assert!(results[0].success);
}

#[tokio::test]
async fn metadata_wins_over_template_variables() {
    let dispatcher = simulated_dispatcher();

    let request = NotificationRequest::builder(NotificationEvent::OtpSent)
        .channel(Channel::Sms)
        .recipient(Recipient {
            phone: Some("9123456780".to_string()),
            ..Default::default()
        })
        .variable("otp", "1111")
        .metadata("otp", "4821")
        .build();

    let results = dispatcher.send(request).await;
    assert!(results[0].success);
    // The rendered body is not exposed through the result; the contract
    // is exercised directly against the registry.
    let mut variables = HashMap::new();
    variables.insert("otp".to_string(), "4821".to_string());
    let content = dispatcher
        .templates()
        .resolve(NotificationEvent::OtpSent, Channel::Sms, &variables)
        .unwrap();
    let notify_dispatch::template::RenderedContent::Sms { text } = content else {
        panic!("expected SMS content");
    };
    assert!(text.contains("4821"));
}

// =============================================================================
// Audit log store
// =============================================================================

#[test]
fn log_store_default_capacity() {
    let store = NotificationLogStore::default();
    assert_eq!(store.capacity(), notify_dispatch::audit::DEFAULT_LOG_CAPACITY);
    assert!(tokio_test::block_on(store.is_empty()));
}

#[tokio::test]
async fn log_store_never_exceeds_capacity() {
    let dispatcher = dispatcher_with_log_capacity(5);

    for _ in 0..4 {
        let request = NotificationRequest::builder(NotificationEvent::OtpSent)
            .channels(vec![Channel::Sms, Channel::InApp])
            .recipient(Recipient {
                phone: Some("9123456780".to_string()),
                ..Default::default()
            })
            .variable("otp", "4821")
            .build();
        let _ = dispatcher.send(request).await;
    }

    // 8 appends against capacity 5
    assert_eq!(dispatcher.log_store().len().await, 5);
}

#[tokio::test]
async fn failed_status_query_with_limit() {
    let dispatcher = simulated_dispatcher();

    // 3 failed attempts (missing email address)
    for _ in 0..3 {
        let request = NotificationRequest::builder(NotificationEvent::PaymentFailed)
            .channel(Channel::Email)
            .build();
        let _ = dispatcher.send(request).await;
    }
    // 7 sent attempts
    for _ in 0..7 {
        let request = NotificationRequest::builder(NotificationEvent::OtpSent)
            .channel(Channel::Sms)
            .recipient(Recipient {
                phone: Some("9123456780".to_string()),
                ..Default::default()
            })
            .variable("otp", "4821")
            .build();
        let _ = dispatcher.send(request).await;
    }

    let failed = dispatcher
        .log_store()
        .query(&LogQuery::default().status(LogStatus::Failed).limit(5))
        .await;
    assert_eq!(failed.len(), 3);
    assert!(failed.iter().all(|l| l.status == LogStatus::Failed));
    for pair in failed.windows(2) {
        assert!(pair[0].created_at >= pair[1].created_at);
    }
}

#[tokio::test]
async fn query_by_event_and_user() {
    let dispatcher = simulated_dispatcher();

    let request = NotificationRequest::builder(NotificationEvent::PartnerApproved)
        .channel(Channel::Email)
        .recipient(Recipient {
            user_id: Some("partner-3".to_string()),
            email: Some("eve@example.com".to_string()),
            role: Some("partner".to_string()),
            ..Default::default()
        })
        .variable("partner_name", "Eve")
        .build();
    let _ = dispatcher.send(request).await;

    let other = NotificationRequest::builder(NotificationEvent::OtpSent)
        .channel(Channel::Sms)
        .recipient(Recipient {
            user_id: Some("user-1".to_string()),
            phone: Some("9123456780".to_string()),
            ..Default::default()
        })
        .variable("otp", "4821")
        .build();
    let _ = dispatcher.send(other).await;

    let partner_logs = dispatcher
        .log_store()
        .query(
            &LogQuery::default()
                .event(NotificationEvent::PartnerApproved)
                .user_id("partner-3")
                .role("partner"),
        )
        .await;
    assert_eq!(partner_logs.len(), 1);
    assert_eq!(partner_logs[0].recipient.email.as_deref(), Some("ev***@example.com"));
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test]
async fn concurrent_requests_serialize_log_appends() {
    let dispatcher = Arc::new(dispatcher_with_log_capacity(100));

    let mut handles = Vec::new();
    for i in 0..20 {
        let dispatcher = dispatcher.clone();
        handles.push(tokio::spawn(async move {
            let request = NotificationRequest::builder(NotificationEvent::OtpSent)
                .channels(vec![Channel::Sms, Channel::InApp])
                .recipient(Recipient {
                    user_id: Some(format!("user-{i}")),
                    phone: Some("9123456780".to_string()),
                    ..Default::default()
                })
                .variable("otp", "4821")
                .build();
            dispatcher.send(request).await
        }));
    }

    for handle in handles {
        let results = handle.await.unwrap();
        assert_eq!(results.len(), 2);
    }

    // No lost or duplicated appends
    assert_eq!(dispatcher.log_store().len().await, 40);
}

//! Multi-channel notification dispatch core.
//!
//! A logical event (OTP sent, payment failed, ...) is rendered into
//! channel-specific content, delivered through independent channel
//! providers (email, SMS, push, in-app), and every delivery attempt is
//! recorded in a bounded, privacy-redacted audit log.

// Infrastructure layer (shared components)
pub mod config;
pub mod error;
pub mod telemetry;

// Domain layer (business logic)
pub mod audit;
pub mod notification;
pub mod providers;
pub mod redact;
pub mod template;

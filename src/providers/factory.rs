//! Provider table factory

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::Settings;
use crate::notification::Channel;

use super::email::EmailProvider;
use super::in_app::InAppProvider;
use super::push::PushProvider;
use super::sms::SmsProvider;
use super::{ChannelProvider, DeploymentMode};

/// Build the provider table from settings.
///
/// In `Live` mode each provider is constructed from its transport
/// settings; if a transport cannot be built (missing endpoint,
/// unresolvable relay) the factory falls back to the simulated
/// provider for that channel rather than failing startup.
pub fn build_providers(settings: &Settings) -> HashMap<Channel, Arc<dyn ChannelProvider>> {
    let mut providers: HashMap<Channel, Arc<dyn ChannelProvider>> = HashMap::new();

    tracing::info!(mode = ?settings.mode, "Building channel providers");

    let email: Arc<dyn ChannelProvider> = match settings.mode {
        DeploymentMode::Live => match EmailProvider::live(settings.channels.email, &settings.email)
        {
            Ok(provider) => Arc::new(provider),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Live email transport unavailable, falling back to simulated"
                );
                Arc::new(EmailProvider::simulated(settings.channels.email))
            }
        },
        DeploymentMode::Simulated => Arc::new(EmailProvider::simulated(settings.channels.email)),
    };
    providers.insert(Channel::Email, email);

    let sms: Arc<dyn ChannelProvider> = match settings.mode {
        DeploymentMode::Live => match SmsProvider::live(settings.channels.sms, &settings.sms) {
            Ok(provider) => Arc::new(provider),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Live SMS gateway unavailable, falling back to simulated"
                );
                Arc::new(SmsProvider::simulated(settings.channels.sms))
            }
        },
        DeploymentMode::Simulated => Arc::new(SmsProvider::simulated(settings.channels.sms)),
    };
    providers.insert(Channel::Sms, sms);

    let push: Arc<dyn ChannelProvider> = match settings.mode {
        DeploymentMode::Live => match PushProvider::live(settings.channels.push, &settings.push) {
            Ok(provider) => Arc::new(provider),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Live push endpoint unavailable, falling back to simulated"
                );
                Arc::new(PushProvider::simulated(settings.channels.push))
            }
        },
        DeploymentMode::Simulated => Arc::new(PushProvider::simulated(settings.channels.push)),
    };
    providers.insert(Channel::Push, push);

    providers.insert(
        Channel::InApp,
        Arc::new(InAppProvider::new(settings.channels.in_app)),
    );

    providers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_all_four_channels() {
        let providers = build_providers(&Settings::default());

        assert_eq!(providers.len(), 4);
        for channel in [Channel::Email, Channel::Sms, Channel::Push, Channel::InApp] {
            assert_eq!(providers[&channel].channel(), channel);
        }
    }

    #[test]
    fn test_live_mode_falls_back_without_transport_settings() {
        let settings = Settings {
            mode: DeploymentMode::Live,
            ..Default::default()
        };

        // Gateway/endpoint settings are absent; the factory must still
        // produce a provider per channel.
        let providers = build_providers(&settings);
        assert_eq!(providers.len(), 4);
    }
}

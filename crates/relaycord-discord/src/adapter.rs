use std::sync::Arc;
use std::time::Duration;

use serenity::gateway::GatewayError;
use serenity::model::gateway::GatewayIntents;
use serenity::model::id::ApplicationId;
use serenity::Client;
use tracing::{error, info, warn};

use relaycord_agent::Relay;
use relaycord_core::config::DiscordConfig;

use crate::error::DiscordError;
use crate::handler::RelayHandler;

/// Discord channel adapter.
///
/// Wraps a serenity `Client` and drives the event loop. Reconnects whenever
/// the gateway drops; only a rejected token ends the loop.
pub struct DiscordAdapter {
    relay: Arc<Relay>,
    config: DiscordConfig,
}

impl DiscordAdapter {
    pub fn new(config: &DiscordConfig, relay: Arc<Relay>) -> Self {
        Self {
            relay,
            config: config.clone(),
        }
    }

    fn intents() -> GatewayIntents {
        GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT
    }

    /// Connect to Discord and keep reconnecting whenever the gateway drops.
    ///
    /// Returns only when Discord refuses the token.
    pub async fn run(self) -> Result<(), DiscordError> {
        if self.config.bot_token.is_empty() {
            warn!("Discord: no bot token configured, login will fail");
        }

        loop {
            let mut client = loop {
                match self.build_client().await {
                    Ok(c) => break c,
                    Err(e) => {
                        error!("Discord: client build failed ({e}), retrying in 30s");
                        tokio::time::sleep(Duration::from_secs(30)).await;
                    }
                }
            };

            info!("Discord: gateway connecting");

            match client.start().await {
                Err(serenity::Error::Gateway(GatewayError::InvalidAuthentication)) => {
                    error!("Discord: bot token rejected");
                    return Err(DiscordError::InvalidToken);
                }
                Err(e) => warn!("Discord: gateway error ({e}), reconnecting in 5s"),
                Ok(()) => info!("Discord: gateway stopped cleanly, reconnecting in 5s"),
            }

            tokio::time::sleep(Duration::from_secs(5)).await;
        }
    }

    /// Build a fresh serenity `Client` with our event handler.
    async fn build_client(&self) -> Result<Client, serenity::Error> {
        let handler = RelayHandler {
            relay: Arc::clone(&self.relay),
        };

        let mut builder =
            Client::builder(&self.config.bot_token, Self::intents()).event_handler(handler);
        if let Some(id) = self.config.application_id() {
            builder = builder.application_id(ApplicationId::new(id));
        }
        builder.await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intents_include_message_content() {
        let intents = DiscordAdapter::intents();
        assert!(intents.contains(GatewayIntents::MESSAGE_CONTENT));
        assert!(intents.contains(GatewayIntents::GUILD_MESSAGES));
        assert!(!intents.contains(GatewayIntents::GUILD_PRESENCES));
    }
}
